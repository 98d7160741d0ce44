//! The error raised by every failed enforce check.

use std::borrow::Cow;
use std::error::Error;
use std::fmt::{self, Debug, Display, Formatter};
use std::sync::Arc;

use once_cell::sync::OnceCell;
use tenet_telemetry::SourceLocation;

use crate::stack_trace::StackTraceFetcher;

/// Result alias for code guarded by enforce checks.
pub type EnforceResult<T> = std::result::Result<T, EnforceError>;

/// Category of a failed check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EnforceKind {
    /// A general invariant (including comparisons) did not hold.
    NotMet,
    /// A finiteness invariant on a numeric value did not hold.
    FiniteNotMet,
}

/// Address of the object whose method raised the error.
///
/// Only the address is kept so the error stays `Send + Sync`; it identifies
/// the instance in diagnostics and is never dereferenced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CallerAddress(usize);

impl CallerAddress {
    /// Capture the address of `object`.
    #[must_use]
    pub fn of<T: ?Sized>(object: &T) -> Self {
        Self(std::ptr::from_ref(object).cast::<()>().addr())
    }

    /// Raw address value.
    #[must_use]
    pub const fn addr(self) -> usize {
        self.0
    }
}

impl Display for CallerAddress {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> fmt::Result {
        write!(formatter, "{:#x}", self.0)
    }
}

/// Error raised when an enforce check fails.
///
/// `Display` renders `"[enforce fail at <file>:<line>] <condition>. <message>"`.
/// The backtrace is fetched from the hook captured at raise time, on first
/// request only.
pub struct EnforceError {
    kind: EnforceKind,
    location: SourceLocation,
    condition: &'static str,
    message: Cow<'static, str>,
    caller: Option<CallerAddress>,
    context: Vec<String>,
    fetcher: Option<Arc<StackTraceFetcher>>,
    backtrace: OnceCell<String>,
}

impl EnforceError {
    pub(crate) fn new(
        kind: EnforceKind,
        location: SourceLocation,
        condition: &'static str,
        message: Cow<'static, str>,
        caller: Option<CallerAddress>,
        fetcher: Option<Arc<StackTraceFetcher>>,
    ) -> Self {
        Self {
            kind,
            location,
            condition,
            message,
            caller,
            context: Vec::new(),
            fetcher,
            backtrace: OnceCell::new(),
        }
    }

    /// Failure category.
    #[must_use]
    pub const fn kind(&self) -> EnforceKind {
        self.kind
    }

    /// Whether this error came from a finiteness check.
    #[must_use]
    pub fn is_finite_violation(&self) -> bool {
        self.kind == EnforceKind::FiniteNotMet
    }

    /// Where the failed check was written.
    #[must_use]
    pub const fn location(&self) -> SourceLocation {
        self.location
    }

    /// Source text of the failed condition; empty for unconditional failures.
    #[must_use]
    pub const fn condition(&self) -> &'static str {
        self.condition
    }

    /// Message supplied by the call site (operands for comparisons).
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Address of the object that raised the error, for with-caller checks.
    #[must_use]
    pub const fn caller(&self) -> Option<CallerAddress> {
        self.caller
    }

    #[cfg(test)]
    pub(crate) const fn message_is_borrowed(&self) -> bool {
        matches!(self.message, Cow::Borrowed(_))
    }

    /// Context lines added while the error propagated.
    #[must_use]
    pub fn context(&self) -> &[String] {
        &self.context
    }

    /// Attach a line of context describing what the caller was doing.
    pub fn add_context(&mut self, context: impl Into<String>) {
        self.context.push(context.into());
    }

    /// Builder form of [`Self::add_context`].
    #[must_use]
    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.add_context(context);
        self
    }

    /// Backtrace text from the hook installed when the error was raised.
    ///
    /// Empty when no hook was installed.
    #[must_use]
    pub fn backtrace(&self) -> &str {
        self.backtrace.get_or_init(|| {
            self.fetcher
                .as_ref()
                .map_or_else(String::new, |fetcher| fetcher.fetch())
        })
    }

    /// Failure description followed by any context lines.
    #[must_use]
    pub fn what_without_backtrace(&self) -> String {
        let mut out = self.to_string();
        for line in &self.context {
            out.push('\n');
            out.push_str(line);
        }
        out
    }

    /// Full diagnostic: description, context lines, then the backtrace.
    #[must_use]
    pub fn what(&self) -> String {
        let mut out = self.what_without_backtrace();
        let backtrace = self.backtrace();
        if !backtrace.is_empty() {
            out.push('\n');
            out.push_str(backtrace);
        }
        out
    }
}

impl Display for EnforceError {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> fmt::Result {
        write!(formatter, "[enforce fail at {}]", self.location)?;
        match (self.condition.is_empty(), self.message.is_empty()) {
            (true, true) => Ok(()),
            (true, false) => write!(formatter, " {}", self.message),
            (false, true) => write!(formatter, " {}", self.condition),
            (false, false) => write!(formatter, " {}. {}", self.condition, self.message),
        }
    }
}

impl Debug for EnforceError {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("EnforceError")
            .field("kind", &self.kind)
            .field("location", &self.location)
            .field("condition", &self.condition)
            .field("message", &self.message)
            .field("caller", &self.caller)
            .field("context", &self.context)
            .finish_non_exhaustive()
    }
}

impl Error for EnforceError {}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn error(condition: &'static str, message: &'static str) -> EnforceError {
        EnforceError::new(
            EnforceKind::NotMet,
            SourceLocation::new("src/ops/matmul.rs", 31),
            condition,
            Cow::Borrowed(message),
            None,
            None,
        )
    }

    #[test]
    fn display_tags_location_condition_and_message() {
        let err = error("a == b", "4 vs 5");
        assert_eq!(err.to_string(), "[enforce fail at matmul.rs:31] a == b. 4 vs 5");
    }

    #[test]
    fn display_drops_empty_parts() {
        assert_eq!(error("ok", "").to_string(), "[enforce fail at matmul.rs:31] ok");
        assert_eq!(
            error("", "unsupported").to_string(),
            "[enforce fail at matmul.rs:31] unsupported"
        );
        assert_eq!(error("", "").to_string(), "[enforce fail at matmul.rs:31]");
    }

    #[test]
    fn context_lines_follow_the_description() {
        let mut err = error("x > 0", "0 vs 0");
        err.add_context("while running op Relu");
        let err = err.with_context("in net main");

        assert_eq!(err.context().len(), 2);
        assert_eq!(
            err.what_without_backtrace(),
            "[enforce fail at matmul.rs:31] x > 0. 0 vs 0\nwhile running op Relu\nin net main"
        );
        assert_eq!(err.what(), err.what_without_backtrace());
        assert!(err.backtrace().is_empty());
    }

    #[test]
    fn backtrace_is_fetched_once_and_appended() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let fetcher = StackTraceFetcher::new(move || {
            counter.fetch_add(1, Ordering::SeqCst);
            "frame #0: main".to_string()
        });
        let err = EnforceError::new(
            EnforceKind::FiniteNotMet,
            SourceLocation::new("loss.rs", 5),
            "loss.is_finite()",
            Cow::Borrowed(""),
            None,
            Some(Arc::new(fetcher)),
        );

        assert_eq!(calls.load(Ordering::SeqCst), 0);
        assert_eq!(
            err.what(),
            "[enforce fail at loss.rs:5] loss.is_finite()\nframe #0: main"
        );
        assert_eq!(err.backtrace(), "frame #0: main");
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(err.is_finite_violation());
    }

    #[test]
    fn caller_address_identifies_the_instance() {
        let first = [0u8; 4];
        let second = [0u8; 4];
        let address = CallerAddress::of(&first);

        assert_eq!(address, CallerAddress::of(&first));
        assert_ne!(address, CallerAddress::of(&second));
        assert_eq!(address.to_string(), format!("{:#x}", address.addr()));
    }

    #[test]
    fn error_is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync + 'static>() {}
        assert_send_sync::<EnforceError>();
    }
}
