//! Logging initialisation primitives and configuration.
//!
//! # Design
//! - Centralises logging setup (fmt or JSON) with a single entry point.
//! - Reads every knob from the environment once so processes configure
//!   logging without threading flags through call sites.
//! - Pushes severity and enforce settings into process-wide atomics that the
//!   hot paths read without locking.

use std::sync::atomic::{AtomicBool, Ordering};

use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use crate::error::{Result, TelemetryError};
use crate::severity::{self, Severity};

/// Default tracing filter when neither `RUST_LOG` nor `TENET_LOG_FILTER` is set.
pub const DEFAULT_LOG_FILTER: &str = "info";

const ENV_LOG_FILTER: &str = "TENET_LOG_FILTER";
const ENV_LOG_FORMAT: &str = "TENET_LOG_FORMAT";
const ENV_LOG_LEVEL: &str = "TENET_LOG_LEVEL";
const ENV_FATAL_FOR_ENFORCE: &str = "TENET_USE_FATAL_FOR_ENFORCE";
const CONFIG_LOG_FORMAT: &str = "log_format";

static FATAL_FOR_ENFORCE: AtomicBool = AtomicBool::new(false);

/// Configure and install the global tracing subscriber.
///
/// The severity minimum and enforce mode from `config` are applied before
/// the subscriber is installed, so they take effect even when installation
/// fails.
///
/// # Errors
///
/// Returns an error if the tracing subscriber cannot be installed (for example,
/// because another subscriber has already been set globally).
pub fn init_logging(config: &LoggingConfig) -> Result<()> {
    apply_logging_levels(config);
    install_fmt_subscriber(config)
}

/// Push the severity minimum and enforce mode into process-wide state.
pub fn apply_logging_levels(config: &LoggingConfig) {
    severity::set_min_severity(config.min_severity);
    set_use_fatal_for_enforce(config.fatal_for_enforce);
}

/// Whether failed enforce checks abort the process instead of returning.
#[must_use]
pub fn use_fatal_for_enforce() -> bool {
    FATAL_FOR_ENFORCE.load(Ordering::Relaxed)
}

/// Toggle abort-on-enforce mode.
pub fn set_use_fatal_for_enforce(enabled: bool) {
    FATAL_FOR_ENFORCE.store(enabled, Ordering::Relaxed);
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoggingConfig {
    /// Tracing filter directive (e.g., `info`, `tenet_enforce=debug`).
    pub filter: String,
    /// Output format selection for the tracing subscriber.
    pub format: LogFormat,
    /// Minimum severity level on the shared scale (see [`Severity::level`]).
    pub min_severity: i32,
    /// Abort the process on failed enforce checks.
    pub fatal_for_enforce: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: DEFAULT_LOG_FILTER.to_string(),
            format: LogFormat::infer(),
            min_severity: Severity::Warning.level(),
            fatal_for_enforce: false,
        }
    }
}

impl LoggingConfig {
    /// Build a configuration from the `TENET_*` environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if a variable is present but cannot be parsed.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build a configuration from an arbitrary variable lookup.
    ///
    /// # Errors
    ///
    /// Returns an error if a variable is present but cannot be parsed.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(filter) = lookup(ENV_LOG_FILTER).filter(|value| !value.trim().is_empty()) {
            config.filter = filter;
        }
        if let Some(format) = lookup(ENV_LOG_FORMAT) {
            config.format = parse_format(&format).ok_or(TelemetryError::InvalidSetting {
                name: ENV_LOG_FORMAT,
                value: format,
            })?;
        }
        if let Some(level) = lookup(ENV_LOG_LEVEL) {
            config.min_severity = parse_severity(&level).ok_or(TelemetryError::InvalidSetting {
                name: ENV_LOG_LEVEL,
                value: level,
            })?;
        }
        if let Some(flag) = lookup(ENV_FATAL_FOR_ENFORCE) {
            config.fatal_for_enforce = parse_flag(&flag).ok_or(TelemetryError::InvalidSetting {
                name: ENV_FATAL_FOR_ENFORCE,
                value: flag,
            })?;
        }

        Ok(config)
    }
}

/// Available output formats for the logger.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    /// Emit logs as structured JSON objects.
    Json,
    /// Emit human-readable, pretty-printed logs.
    Pretty,
}

impl LogFormat {
    /// Choose a sensible default for the current build.
    #[must_use]
    pub const fn infer() -> Self {
        if cfg!(debug_assertions) {
            Self::Pretty
        } else {
            Self::Json
        }
    }
}

/// Read the `log_format` key of a JSON configuration map.
///
/// A missing map or key yields `Ok(None)`.
///
/// # Errors
///
/// Returns [`TelemetryError::InvalidSetting`] when the key holds anything
/// other than `"json"` or `"pretty"`, matching [`LoggingConfig::from_lookup`].
pub fn log_format_from_config(config: Option<&serde_json::Value>) -> Result<Option<LogFormat>> {
    let Some(raw) = config.and_then(|value| value.get(CONFIG_LOG_FORMAT)) else {
        return Ok(None);
    };
    raw.as_str()
        .and_then(parse_format)
        .map(Some)
        .ok_or_else(|| TelemetryError::InvalidSetting {
            name: CONFIG_LOG_FORMAT,
            value: raw.as_str().map_or_else(|| raw.to_string(), str::to_owned),
        })
}

fn parse_format(value: &str) -> Option<LogFormat> {
    match value.trim().to_ascii_lowercase().as_str() {
        "json" => Some(LogFormat::Json),
        "pretty" => Some(LogFormat::Pretty),
        _ => None,
    }
}

fn parse_severity(value: &str) -> Option<i32> {
    let value = value.trim();
    if let Ok(level) = value.parse::<i32>() {
        return Some(level);
    }
    let severity = match value.to_ascii_lowercase().as_str() {
        "fatal" => Severity::Fatal,
        "error" => Severity::Error,
        "warning" | "warn" => Severity::Warning,
        "info" => Severity::Info,
        _ => return None,
    };
    Some(severity.level())
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" | "" => Some(false),
        _ => None,
    }
}

fn install_fmt_subscriber(config: &LoggingConfig) -> Result<()> {
    match config.format {
        LogFormat::Json => tracing_subscriber::registry()
            .with(build_env_filter(&config.filter))
            .with(
                fmt::layer()
                    .json()
                    .with_target(false)
                    .with_thread_ids(false),
            )
            .try_init()
            .map_err(|source| TelemetryError::SubscriberInstall { source }),
        LogFormat::Pretty => tracing_subscriber::registry()
            .with(build_env_filter(&config.filter))
            .with(fmt::layer().with_target(false).with_thread_ids(false))
            .try_init()
            .map_err(|source| TelemetryError::SubscriberInstall { source }),
    }
}

fn build_env_filter(filter: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use serial_test::serial;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(key, value)| ((*key).to_string(), (*value).to_string()))
            .collect();
        move |name: &str| map.get(name).cloned()
    }

    #[test]
    fn log_format_from_config_parses_variants() {
        let json_config = json!({"log_format": "json"});
        assert_eq!(
            log_format_from_config(Some(&json_config)).expect("valid format"),
            Some(LogFormat::Json)
        );

        let pretty_config = json!({"log_format": " Pretty "});
        assert_eq!(
            log_format_from_config(Some(&pretty_config)).expect("valid format"),
            Some(LogFormat::Pretty)
        );

        assert_eq!(log_format_from_config(None).expect("no map"), None);
        assert_eq!(
            log_format_from_config(Some(&json!({"log_filter": "debug"}))).expect("no key"),
            None
        );
    }

    #[test]
    fn config_map_and_environment_reject_the_same_formats() {
        let err = log_format_from_config(Some(&json!({"log_format": "unknown"})))
            .expect_err("unknown format must be rejected");
        assert!(matches!(
            err,
            TelemetryError::InvalidSetting { name: "log_format", ref value } if value == "unknown"
        ));

        let err = log_format_from_config(Some(&json!({"log_format": 7})))
            .expect_err("non-string format must be rejected");
        assert!(matches!(err, TelemetryError::InvalidSetting { name: "log_format", .. }));

        let err = LoggingConfig::from_lookup(lookup_from(&[("TENET_LOG_FORMAT", "unknown")]))
            .expect_err("unknown format must be rejected");
        assert!(matches!(
            err,
            TelemetryError::InvalidSetting { name: "TENET_LOG_FORMAT", ref value } if value == "unknown"
        ));
    }

    #[test]
    fn empty_environment_yields_defaults() {
        let config = LoggingConfig::from_lookup(lookup_from(&[])).expect("defaults");
        assert_eq!(config, LoggingConfig::default());
        assert_eq!(config.min_severity, 1);
        assert!(!config.fatal_for_enforce);
    }

    #[test]
    fn environment_overrides_every_setting() {
        let config = LoggingConfig::from_lookup(lookup_from(&[
            ("TENET_LOG_FILTER", "tenet_enforce=debug"),
            ("TENET_LOG_FORMAT", "JSON"),
            ("TENET_LOG_LEVEL", "-2"),
            ("TENET_USE_FATAL_FOR_ENFORCE", "true"),
        ]))
        .expect("valid config");

        assert_eq!(config.filter, "tenet_enforce=debug");
        assert_eq!(config.format, LogFormat::Json);
        assert_eq!(config.min_severity, -2);
        assert!(config.fatal_for_enforce);
    }

    #[test]
    fn severity_names_are_accepted() {
        let config = LoggingConfig::from_lookup(lookup_from(&[("TENET_LOG_LEVEL", "Error")]))
            .expect("valid level");
        assert_eq!(config.min_severity, Severity::Error.level());
    }

    #[test]
    fn invalid_values_are_reported_with_their_name() {
        let err = LoggingConfig::from_lookup(lookup_from(&[("TENET_LOG_LEVEL", "loud")]))
            .expect_err("level must be rejected");
        assert!(matches!(
            err,
            TelemetryError::InvalidSetting { name: "TENET_LOG_LEVEL", ref value } if value == "loud"
        ));

        let err = LoggingConfig::from_lookup(lookup_from(&[(
            "TENET_USE_FATAL_FOR_ENFORCE",
            "maybe",
        )]))
        .expect_err("flag must be rejected");
        assert!(matches!(
            err,
            TelemetryError::InvalidSetting { name: "TENET_USE_FATAL_FOR_ENFORCE", .. }
        ));
    }

    #[test]
    #[serial]
    fn apply_logging_levels_updates_process_state() {
        let previous_level = severity::min_severity();
        let previous_fatal = use_fatal_for_enforce();

        apply_logging_levels(&LoggingConfig {
            min_severity: Severity::Error.level(),
            fatal_for_enforce: true,
            ..LoggingConfig::default()
        });
        assert_eq!(severity::min_severity(), 2);
        assert!(use_fatal_for_enforce());

        severity::set_min_severity(previous_level);
        set_use_fatal_for_enforce(previous_fatal);
    }

    #[test]
    #[serial]
    fn init_logging_installs_subscriber_once() {
        let previous_level = severity::min_severity();
        let config = LoggingConfig {
            format: LogFormat::Pretty,
            ..LoggingConfig::default()
        };
        let _ = init_logging(&config);
        assert!(matches!(
            init_logging(&config),
            Err(TelemetryError::SubscriberInstall { .. })
        ));
        severity::set_min_severity(previous_level);
    }
}
