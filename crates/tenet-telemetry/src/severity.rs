//! Severity gate and line emitter.
//!
//! # Design
//! - Callers only ask "is this severity enabled" and "emit a line"; which
//!   backend writes the line is fixed at build time by the `rich-logging`
//!   feature.
//! - The runtime minimum lives in a single atomic so the gate is a load and
//!   a compare on the hot path.

use std::sync::atomic::{AtomicI32, Ordering};

use crate::location::SourceLocation;

/// Lines below this level are dropped regardless of the runtime minimum.
pub const COMPILE_TIME_MIN_SEVERITY: i32 = Severity::Verbose(u8::MAX).level();

const DEFAULT_MIN_SEVERITY: i32 = Severity::Warning.level();

static MIN_SEVERITY: AtomicI32 = AtomicI32::new(DEFAULT_MIN_SEVERITY);

/// Severity of an emitted line.
///
/// Levels map to integers: `Fatal = 3`, `Error = 2`, `Warning = 1`,
/// `Info = 0` and `Verbose(n) = -n`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Unrecoverable condition; the caller is about to abort.
    Fatal,
    /// Operation failed.
    Error,
    /// Suspicious but recoverable.
    Warning,
    /// Informational.
    Info,
    /// Verbose output at the given depth.
    Verbose(u8),
}

impl Severity {
    /// Integer level on the shared severity scale.
    #[must_use]
    #[allow(clippy::cast_lossless)]
    pub const fn level(self) -> i32 {
        match self {
            Self::Fatal => 3,
            Self::Error => 2,
            Self::Warning => 1,
            Self::Info => 0,
            Self::Verbose(depth) => -(depth as i32),
        }
    }

    /// Map an integer level back to a severity, clamping above `Fatal`.
    #[must_use]
    pub fn from_level(level: i32) -> Self {
        match level {
            i32::MIN..=-1 => Self::Verbose(u8::try_from(level.unsigned_abs()).unwrap_or(u8::MAX)),
            0 => Self::Info,
            1 => Self::Warning,
            2 => Self::Error,
            _ => Self::Fatal,
        }
    }

    /// Single-letter tag used by the minimal backend.
    #[must_use]
    pub const fn letter(self) -> char {
        match self {
            Self::Fatal => 'F',
            Self::Error => 'E',
            Self::Warning => 'W',
            Self::Info => 'I',
            Self::Verbose(_) => 'V',
        }
    }
}

/// Whether the build routes lines through `tracing` rather than raw stderr.
#[must_use]
pub const fn is_using_rich_logging() -> bool {
    cfg!(feature = "rich-logging")
}

/// Current runtime minimum severity level.
#[must_use]
pub fn min_severity() -> i32 {
    MIN_SEVERITY.load(Ordering::Relaxed)
}

/// Replace the runtime minimum severity level.
pub fn set_min_severity(level: i32) {
    MIN_SEVERITY.store(level, Ordering::Relaxed);
}

/// Lower the runtime minimum so informational lines reach stderr.
pub fn show_log_info_to_stderr() {
    MIN_SEVERITY.fetch_min(Severity::Info.level(), Ordering::Relaxed);
    tracing::debug!("info level lines enabled");
}

/// Whether a line at `severity` would be emitted.
#[must_use]
pub fn is_enabled(severity: Severity) -> bool {
    let level = severity.level();
    level >= COMPILE_TIME_MIN_SEVERITY && level >= min_severity()
}

/// Emit a single line at `severity` if the gate allows it.
pub fn emit(severity: Severity, location: SourceLocation, message: &str) {
    if !is_enabled(severity) {
        return;
    }
    backend::write_line(severity, location, message);
}

#[cfg(feature = "rich-logging")]
mod backend {
    use super::Severity;
    use crate::location::SourceLocation;

    pub(super) fn write_line(severity: Severity, location: SourceLocation, message: &str) {
        let file = location.basename();
        let line = location.line();
        match severity {
            Severity::Fatal => tracing::error!(file, line, fatal = true, "{message}"),
            Severity::Error => tracing::error!(file, line, "{message}"),
            Severity::Warning => tracing::warn!(file, line, "{message}"),
            Severity::Info => tracing::info!(file, line, "{message}"),
            Severity::Verbose(depth) => tracing::debug!(file, line, depth, "{message}"),
        }
    }
}

#[cfg(not(feature = "rich-logging"))]
mod backend {
    use super::Severity;
    use crate::location::SourceLocation;

    pub(super) fn write_line(severity: Severity, location: SourceLocation, message: &str) {
        eprintln!("{}", super::format_line(severity, location, message));
    }
}

#[cfg_attr(feature = "rich-logging", allow(dead_code))]
fn format_line(severity: Severity, location: SourceLocation, message: &str) -> String {
    format!("[{} {location}] {message}", severity.letter())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    fn levels_follow_the_shared_scale() {
        assert_eq!(Severity::Fatal.level(), 3);
        assert_eq!(Severity::Error.level(), 2);
        assert_eq!(Severity::Warning.level(), 1);
        assert_eq!(Severity::Info.level(), 0);
        assert_eq!(Severity::Verbose(2).level(), -2);
    }

    #[test]
    fn compile_time_floor_is_the_deepest_verbose_level() {
        assert_eq!(COMPILE_TIME_MIN_SEVERITY, -255);
        assert_eq!(Severity::from_level(COMPILE_TIME_MIN_SEVERITY), Severity::Verbose(u8::MAX));
    }

    #[test]
    fn from_level_round_trips_known_levels() {
        for severity in [
            Severity::Fatal,
            Severity::Error,
            Severity::Warning,
            Severity::Info,
            Severity::Verbose(3),
        ] {
            assert_eq!(Severity::from_level(severity.level()), severity);
        }
        assert_eq!(Severity::from_level(9), Severity::Fatal);
        assert_eq!(Severity::from_level(-1000), Severity::Verbose(u8::MAX));
    }

    #[test]
    #[serial]
    fn gate_respects_runtime_minimum() {
        let previous = min_severity();
        set_min_severity(Severity::Warning.level());
        assert!(is_enabled(Severity::Error));
        assert!(is_enabled(Severity::Warning));
        assert!(!is_enabled(Severity::Info));

        show_log_info_to_stderr();
        assert!(is_enabled(Severity::Info));
        assert!(!is_enabled(Severity::Verbose(1)));

        set_min_severity(previous);
    }

    #[test]
    #[serial]
    fn show_log_info_never_raises_the_minimum() {
        let previous = min_severity();
        set_min_severity(Severity::Verbose(2).level());
        show_log_info_to_stderr();
        assert_eq!(min_severity(), -2);
        set_min_severity(previous);
    }

    #[test]
    fn minimal_line_format_carries_letter_and_location() {
        let line = format_line(
            Severity::Error,
            SourceLocation::new("src/net/socket.rs", 88),
            "connection reset",
        );
        assert_eq!(line, "[E socket.rs:88] connection reset");
    }

    #[test]
    #[serial]
    fn emit_below_minimum_is_silent() {
        let previous = min_severity();
        set_min_severity(Severity::Fatal.level());
        emit(Severity::Info, SourceLocation::caller(), "dropped");
        set_min_severity(previous);
    }

    #[test]
    fn rich_logging_tracks_the_feature() {
        assert_eq!(is_using_rich_logging(), cfg!(feature = "rich-logging"));
    }
}
