//! Per-call-site once guard.

use std::sync::atomic::{AtomicBool, Ordering};

/// Flag that lets exactly one caller through for the life of the process.
///
/// Concurrent first callers race on a single swap; the winner runs the
/// action and the others return immediately without waiting for it.
#[derive(Debug, Default)]
pub struct UsageOnce {
    fired: AtomicBool,
}

impl UsageOnce {
    /// Guard that has not fired yet.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            fired: AtomicBool::new(false),
        }
    }

    /// Run `action` if no caller has passed this guard before.
    ///
    /// Returns whether `action` ran.
    pub fn call_once<F: FnOnce()>(&self, action: F) -> bool {
        if self.fired.load(Ordering::Acquire) || self.fired.swap(true, Ordering::AcqRel) {
            return false;
        }
        action();
        true
    }

    /// Whether some caller already passed the guard.
    #[must_use]
    pub fn has_fired(&self) -> bool {
        self.fired.load(Ordering::Acquire)
    }
}

/// Report `context` through [`log_api_usage`](crate::log_api_usage) the
/// first time control reaches this call site, and never again.
///
/// The context expression is only evaluated on that first visit.
///
/// ```
/// fn open_checkpoint() {
///     tenet_usage::log_api_usage_once!("checkpoint.open");
/// }
///
/// open_checkpoint();
/// open_checkpoint();
/// ```
#[macro_export]
macro_rules! log_api_usage_once {
    ($context:expr $(,)?) => {{
        static ONCE: $crate::UsageOnce = $crate::UsageOnce::new();
        ONCE.call_once(|| $crate::log_api_usage($context));
    }};
}
