//! Free-form API usage reporting.
//!
//! # Design
//! - One replace-only slot holds the sink; reporting loads it and calls it
//!   synchronously on the caller's thread.
//! - With no sink registered, reports are dropped rather than queued.
//! - Setting `TENET_API_USAGE_STDERR` before the first report starts the
//!   slot with a sink that logs every event.

use std::fmt::{self, Debug, Formatter};

use once_cell::sync::Lazy;
use tenet_telemetry::HandlerSlot;

/// Environment variable enabling the logging sink at first use.
pub const API_USAGE_STDERR_ENV: &str = "TENET_API_USAGE_STDERR";

static API_USAGE_SINK: Lazy<HandlerSlot<ApiUsageSink>> = Lazy::new(|| {
    initial_slot(std::env::var(API_USAGE_STDERR_ENV).ok().as_deref())
});

/// Callback receiving API usage context strings.
pub struct ApiUsageSink {
    report: Box<dyn Fn(&str) + Send + Sync>,
}

impl ApiUsageSink {
    /// Wrap `report` as a sink.
    pub fn new<F>(report: F) -> Self
    where
        F: Fn(&str) + Send + Sync + 'static,
    {
        Self {
            report: Box::new(report),
        }
    }

    /// Deliver one event.
    pub fn report(&self, context: &str) {
        (self.report)(context);
    }
}

impl Debug for ApiUsageSink {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> fmt::Result {
        formatter.write_str("ApiUsageSink")
    }
}

/// Register the process-wide API usage sink, replacing any previous one.
pub fn set_api_usage_logger<F>(report: F)
where
    F: Fn(&str) + Send + Sync + 'static,
{
    API_USAGE_SINK.replace(ApiUsageSink::new(report));
    tracing::debug!("api usage sink replaced");
}

/// Report `context` to the registered sink; a no-op when none is registered.
///
/// Every call reaches the sink. Use
/// [`log_api_usage_once!`](crate::log_api_usage_once) to report a call site
/// only once.
pub fn log_api_usage(context: impl AsRef<str>) {
    if let Some(sink) = API_USAGE_SINK.current() {
        sink.report(context.as_ref());
    }
}

fn initial_slot(stderr_flag: Option<&str>) -> HandlerSlot<ApiUsageSink> {
    if stderr_flag.is_some_and(|value| !value.is_empty()) {
        HandlerSlot::with_handler(ApiUsageSink::new(log_usage_event))
    } else {
        HandlerSlot::empty()
    }
}

fn log_usage_event(context: &str) {
    tracing::info!(target: "tenet::api_usage", "API_USAGE {context}");
}
