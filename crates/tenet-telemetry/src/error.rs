//! Error types for telemetry operations.

use thiserror::Error;

/// Result alias for telemetry operations.
pub type Result<T> = std::result::Result<T, TelemetryError>;

/// Errors raised by telemetry helpers.
#[derive(Debug, Error)]
pub enum TelemetryError {
    /// Installing the tracing subscriber failed.
    #[error("failed to install tracing subscriber")]
    SubscriberInstall {
        /// Underlying tracing subscriber error.
        #[source]
        source: tracing_subscriber::util::TryInitError,
    },
    /// A logging setting could not be parsed.
    #[error("invalid logging setting '{name}': '{value}'")]
    InvalidSetting {
        /// Name of the setting (environment variable or config key).
        name: &'static str,
        /// Offending raw value.
        value: String,
    },
}
