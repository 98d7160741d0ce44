//! Replace-only handler slots for process-wide hooks.
//!
//! # Design
//! - One slot holds at most one handler; registering swaps the pointer, so
//!   concurrent readers observe either the previous or the new handler.
//! - There is no unregister primitive; the last registration wins.

use std::fmt::{self, Debug, Formatter};
use std::sync::Arc;

use arc_swap::ArcSwapOption;

/// Process-wide slot holding the current handler of type `H`.
pub struct HandlerSlot<H> {
    current: ArcSwapOption<H>,
}

impl<H> HandlerSlot<H> {
    /// Slot with no handler registered.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            current: ArcSwapOption::new(None),
        }
    }

    /// Slot pre-populated with `handler`.
    #[must_use]
    pub fn with_handler(handler: H) -> Self {
        Self {
            current: ArcSwapOption::new(Some(Arc::new(handler))),
        }
    }

    /// Install `handler`, replacing whatever was registered before.
    pub fn replace(&self, handler: H) {
        self.current.store(Some(Arc::new(handler)));
    }

    /// Snapshot of the registered handler, if any.
    #[must_use]
    pub fn current(&self) -> Option<Arc<H>> {
        self.current.load_full()
    }

    /// Whether a handler is registered.
    #[must_use]
    pub fn is_set(&self) -> bool {
        self.current.load().is_some()
    }
}

impl<H> Default for HandlerSlot<H> {
    fn default() -> Self {
        Self::empty()
    }
}

impl<H> Debug for HandlerSlot<H> {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("HandlerSlot")
            .field("set", &self.is_set())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Barrier;

    type Fetcher = Box<dyn Fn() -> String + Send + Sync>;

    #[test]
    fn empty_slot_has_no_handler() {
        let slot: HandlerSlot<Fetcher> = HandlerSlot::default();
        assert!(!slot.is_set());
        assert!(slot.current().is_none());
        assert_eq!(format!("{slot:?}"), "HandlerSlot { set: false }");
    }

    #[test]
    fn last_registration_wins() {
        let slot: HandlerSlot<Fetcher> = HandlerSlot::with_handler(Box::new(|| String::from("first")));
        slot.replace(Box::new(|| String::from("second")));
        slot.replace(Box::new(|| String::from("third")));

        let handler = slot.current().expect("handler registered");
        assert_eq!((*handler)(), "third");
    }

    #[test]
    fn snapshot_survives_replacement() {
        let slot: HandlerSlot<Fetcher> = HandlerSlot::with_handler(Box::new(|| String::from("old")));
        let snapshot = slot.current().expect("handler registered");
        slot.replace(Box::new(|| String::from("new")));

        assert_eq!((*snapshot)(), "old");
        assert_eq!((*slot.current().expect("handler registered"))(), "new");
    }

    #[test]
    fn concurrent_readers_see_old_or_new_handler() {
        const READERS: usize = 8;
        let slot: HandlerSlot<Fetcher> = HandlerSlot::with_handler(Box::new(|| String::from("old")));
        let barrier = Barrier::new(READERS + 1);

        std::thread::scope(|scope| {
            for _ in 0..READERS {
                scope.spawn(|| {
                    barrier.wait();
                    for _ in 0..1_000 {
                        let handler = slot.current().expect("slot never empties");
                        let value = (*handler)();
                        assert!(value == "old" || value == "new", "torn value {value}");
                    }
                });
            }
            barrier.wait();
            for _ in 0..100 {
                slot.replace(Box::new(|| String::from("new")));
            }
        });
    }
}
