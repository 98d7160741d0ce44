#![forbid(unsafe_code)]
#![deny(
    unused_must_use,
    clippy::all,
    clippy::pedantic,
    clippy::nursery,
    rustdoc::broken_intra_doc_links,
    rustdoc::bare_urls,
    missing_docs
)]
#![allow(clippy::module_name_repetitions)]

//! Always-on invariant checks that return structured errors.
//!
//! Checks evaluate their condition once; on success they do nothing, on
//! failure they return an [`EnforceError`] from the enclosing function that
//! records where the check was written, the condition text, a message built
//! from the call site's arguments and, for comparisons, both operand values.
//!
//! ```
//! use tenet_enforce::{EnforceResult, enforce, enforce_eq};
//!
//! fn reshape(len: usize, rows: usize, cols: usize) -> EnforceResult<()> {
//!     enforce!(rows > 0 && cols > 0, "empty shape");
//!     enforce_eq!(rows * cols, len, "cannot reshape");
//!     Ok(())
//! }
//!
//! let err = reshape(6, 4, 2).unwrap_err();
//! assert!(err.to_string().ends_with("rows * cols == len. 8 vs 6. cannot reshape"));
//! ```
//!
//! Layout: engine.rs (raise path and plain checks), compare.rs (comparison
//! checks), checkers.rs (pluggable checkers), message.rs (message builder),
//! error.rs (error type), `stack_trace.rs` (backtrace hook).

pub mod checkers;
pub mod compare;
pub mod engine;
pub mod error;
pub mod message;
pub mod stack_trace;

pub use checkers::CheckResult;
pub use engine::{enforce_finite_not_met, enforce_not_met};
pub use error::{CallerAddress, EnforceError, EnforceKind, EnforceResult};
pub use message::{CompileTimeEmptyString, IntoEnforceMessage};
pub use stack_trace::{
    StackTraceFetcher, capture_backtrace, current_stack_trace_fetcher, fetch_stack_trace,
    set_stack_trace_fetcher,
};
pub use tenet_telemetry::SourceLocation;
