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

//! Logging plumbing shared across the Tenet workspace.
//!
//! This crate owns the severity-gated line emitter that enforce and usage
//! code log through, the configuration that drives it, and the replace-only
//! handler slot behind every process-wide hook.
//!
//! Layout: init.rs (config + subscriber install), severity.rs (severity gate
//! and emitter), location.rs (source locations), handler.rs (hook slots),
//! error.rs (error types).

pub mod error;
pub mod handler;
pub mod init;
pub mod location;
pub mod severity;

pub use error::{Result, TelemetryError};
pub use handler::HandlerSlot;
pub use init::{
    DEFAULT_LOG_FILTER, LogFormat, LoggingConfig, apply_logging_levels, init_logging,
    log_format_from_config, set_use_fatal_for_enforce, use_fatal_for_enforce,
};
pub use location::SourceLocation;
pub use severity::{
    COMPILE_TIME_MIN_SEVERITY, Severity, emit, is_enabled, is_using_rich_logging,
    min_severity, set_min_severity, show_log_info_to_stderr,
};
