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

//! Low-overhead usage reporting.
//!
//! Call sites report free-form API usage strings or distributed-training
//! snapshots to whichever sink the process registered. Without a sink the
//! events are dropped. [`log_api_usage_once!`] reports from a call site at
//! most once per process; repeat visits cost one atomic load.
//!
//! Layout: api.rs (API usage sink), once.rs (once guard), ddp.rs
//! (distributed-training record and sink).

pub mod api;
pub mod ddp;
pub mod once;

pub use api::{API_USAGE_STDERR_ENV, ApiUsageSink, log_api_usage, set_api_usage_logger};
pub use ddp::{
    DDP_RUNTIME_LOGGING_SAMPLE_RATE, DdpLoggingData, DdpUsageSink, RuntimeSample, log_ddp_usage,
    set_ddp_usage_logger,
};
pub use once::UsageOnce;
