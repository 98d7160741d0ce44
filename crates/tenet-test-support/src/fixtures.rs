//! Counters and sinks for observing how often code under test calls back.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

/// Counts evaluations of an expression with side effects.
#[derive(Debug, Clone, Default)]
pub struct CallCounter {
    calls: Arc<AtomicUsize>,
}

impl CallCounter {
    /// Counter starting at zero.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one evaluation and pass `value` through.
    pub fn tick<T>(&self, value: T) -> T {
        self.calls.fetch_add(1, Ordering::SeqCst);
        value
    }

    /// Number of evaluations so far.
    #[must_use]
    pub fn count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

/// Sink that only counts how many events it received.
#[derive(Debug, Clone, Default)]
pub struct CountingSink {
    calls: Arc<AtomicUsize>,
}

impl CountingSink {
    /// Sink with no events recorded.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Callback to register; every call increments the shared count.
    #[must_use]
    pub fn sink<U: ?Sized + 'static>(&self) -> impl Fn(&U) + Send + Sync + use<U> {
        let calls = Arc::clone(&self.calls);
        move |_event: &U| {
            calls.fetch_add(1, Ordering::SeqCst);
        }
    }

    /// Number of events received so far.
    #[must_use]
    pub fn count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

/// Sink that keeps an owned copy of every event it received.
#[derive(Debug)]
pub struct RecordingSink<T> {
    events: Arc<Mutex<Vec<T>>>,
}

impl<T> Default for RecordingSink<T> {
    fn default() -> Self {
        Self {
            events: Arc::new(Mutex::new(Vec::new())),
        }
    }
}

impl<T> Clone for RecordingSink<T> {
    fn clone(&self) -> Self {
        Self {
            events: Arc::clone(&self.events),
        }
    }
}

impl<T: Clone + Send + 'static> RecordingSink<T> {
    /// Sink with no events recorded.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Callback to register; borrowed events are converted to owned copies.
    #[must_use]
    pub fn sink<U>(&self) -> impl Fn(&U) + Send + Sync + use<T, U>
    where
        U: ?Sized + ToOwned<Owned = T> + 'static,
    {
        let events = Arc::clone(&self.events);
        move |event: &U| {
            events
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .push(event.to_owned());
        }
    }

    /// Copy of every event received, in arrival order.
    #[must_use]
    pub fn events(&self) -> Vec<T> {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}
