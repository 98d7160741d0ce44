//! Process-wide stack-trace hook.
//!
//! # Design
//! - The hook sits in a replace-only slot; registering swaps one pointer, so
//!   failure paths on other threads see either the old or the new hook.
//! - Errors capture the current hook when raised and only call it when a
//!   backtrace is actually requested.

use std::backtrace::Backtrace;
use std::fmt::{self, Debug, Formatter};
use std::sync::Arc;

use once_cell::sync::Lazy;
use tenet_telemetry::HandlerSlot;

static STACK_TRACE_FETCHER: Lazy<HandlerSlot<StackTraceFetcher>> = Lazy::new(HandlerSlot::empty);

/// Zero-argument function producing the current call stack as text.
pub struct StackTraceFetcher {
    fetch: Box<dyn Fn() -> String + Send + Sync>,
}

impl StackTraceFetcher {
    /// Wrap `fetch` as a hook.
    pub fn new<F>(fetch: F) -> Self
    where
        F: Fn() -> String + Send + Sync + 'static,
    {
        Self {
            fetch: Box::new(fetch),
        }
    }

    /// Run the hook.
    #[must_use]
    pub fn fetch(&self) -> String {
        (self.fetch)()
    }
}

impl Debug for StackTraceFetcher {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> fmt::Result {
        formatter.write_str("StackTraceFetcher")
    }
}

/// Install the process-wide stack-trace hook, replacing any previous one.
pub fn set_stack_trace_fetcher<F>(fetch: F)
where
    F: Fn() -> String + Send + Sync + 'static,
{
    STACK_TRACE_FETCHER.replace(StackTraceFetcher::new(fetch));
    tracing::debug!("stack trace fetcher replaced");
}

/// Snapshot of the installed hook, if any.
#[must_use]
pub fn current_stack_trace_fetcher() -> Option<Arc<StackTraceFetcher>> {
    STACK_TRACE_FETCHER.current()
}

/// Run the installed hook; empty when none is installed.
#[must_use]
pub fn fetch_stack_trace() -> String {
    current_stack_trace_fetcher().map_or_else(String::new, |fetcher| fetcher.fetch())
}

/// Capture the calling thread's backtrace regardless of `RUST_BACKTRACE`.
///
/// Suitable as an argument to [`set_stack_trace_fetcher`].
#[must_use]
pub fn capture_backtrace() -> String {
    Backtrace::force_capture().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    #[serial]
    fn installed_hook_is_used_and_replaced() {
        set_stack_trace_fetcher(|| "first".to_string());
        assert_eq!(fetch_stack_trace(), "first");

        set_stack_trace_fetcher(|| "second".to_string());
        assert_eq!(fetch_stack_trace(), "second");

        set_stack_trace_fetcher(String::new);
        assert!(fetch_stack_trace().is_empty());
    }

    #[test]
    fn fetcher_runs_the_wrapped_function() {
        let fetcher = StackTraceFetcher::new(|| "frame".to_string());
        assert_eq!(fetcher.fetch(), "frame");
        assert_eq!(format!("{fetcher:?}"), "StackTraceFetcher");
    }

    #[test]
    fn capture_backtrace_produces_text() {
        assert!(!capture_backtrace().is_empty());
    }
}
