//! Raise path for failed checks.
//!
//! # Design
//! - Callers invoke the engine only after the guarded condition evaluated
//!   false; every entry point produces an [`EnforceError`] that the macros
//!   return immediately, so code after a failed check never runs.
//! - The stack-trace hook is captured here but not called.
//! - In fatal-for-enforce mode the general path logs the failure and aborts
//!   instead of returning.

use tenet_telemetry::{Severity, SourceLocation};

use crate::error::{CallerAddress, EnforceError, EnforceKind};
use crate::message::IntoEnforceMessage;
use crate::stack_trace::current_stack_trace_fetcher;

/// Build the error for a failed general check.
///
/// Aborts the process after logging at `Fatal` when fatal-for-enforce mode
/// is enabled.
#[cold]
#[inline(never)]
#[must_use]
pub fn enforce_not_met(
    location: SourceLocation,
    condition: &'static str,
    message: impl IntoEnforceMessage,
    caller: Option<CallerAddress>,
) -> EnforceError {
    let error = raise(EnforceKind::NotMet, location, condition, message, caller);
    if tenet_telemetry::use_fatal_for_enforce() {
        tenet_telemetry::emit(Severity::Fatal, location, &error.what());
        std::process::abort();
    }
    error
}

/// Build the error for a failed finiteness check.
#[cold]
#[inline(never)]
#[must_use]
pub fn enforce_finite_not_met(
    location: SourceLocation,
    condition: &'static str,
    message: impl IntoEnforceMessage,
    caller: Option<CallerAddress>,
) -> EnforceError {
    raise(EnforceKind::FiniteNotMet, location, condition, message, caller)
}

fn raise(
    kind: EnforceKind,
    location: SourceLocation,
    condition: &'static str,
    message: impl IntoEnforceMessage,
    caller: Option<CallerAddress>,
) -> EnforceError {
    EnforceError::new(
        kind,
        location,
        condition,
        message.into_message(),
        caller,
        current_stack_trace_fetcher(),
    )
}

/// Return an [`EnforceError`] from the enclosing function unless `condition`
/// holds.
///
/// Extra arguments are concatenated into the message with [`str_cat!`](crate::str_cat).
/// The error is converted with `From`, so the enclosing function may return
/// any error type that can absorb an [`EnforceError`].
///
/// ```
/// use tenet_enforce::{EnforceResult, enforce};
///
/// fn checked_div(a: i32, b: i32) -> EnforceResult<i32> {
///     enforce!(b != 0, "division of ", a, " by zero");
///     Ok(a / b)
/// }
///
/// assert_eq!(checked_div(6, 3).unwrap(), 2);
/// let err = checked_div(1, 0).unwrap_err();
/// assert!(err.to_string().ends_with("b != 0. division of 1 by zero"));
/// ```
#[macro_export]
macro_rules! enforce {
    ($cond:expr $(,)?) => {
        $crate::__enforce_impl!(enforce_not_met, $cond, ::core::option::Option::None, [])
    };
    ($cond:expr, $($arg:tt)+) => {
        $crate::__enforce_impl!(enforce_not_met, $cond, ::core::option::Option::None, [$($arg)+])
    };
}

/// [`enforce!`](crate::enforce) for methods: records the address of `caller` on the error.
#[macro_export]
macro_rules! enforce_with_caller {
    ($caller:expr, $cond:expr $(,)?) => {
        $crate::__enforce_impl!(
            enforce_not_met,
            $cond,
            ::core::option::Option::Some($crate::CallerAddress::of($caller)),
            []
        )
    };
    ($caller:expr, $cond:expr, $($arg:tt)+) => {
        $crate::__enforce_impl!(
            enforce_not_met,
            $cond,
            ::core::option::Option::Some($crate::CallerAddress::of($caller)),
            [$($arg)+]
        )
    };
}

/// Like [`enforce!`](crate::enforce) but raises a finiteness violation.
///
/// The macro does not inspect values itself; the condition decides what
/// counts as finite.
#[macro_export]
macro_rules! enforce_finite {
    ($cond:expr $(,)?) => {
        $crate::__enforce_impl!(enforce_finite_not_met, $cond, ::core::option::Option::None, [])
    };
    ($cond:expr, $($arg:tt)+) => {
        $crate::__enforce_impl!(
            enforce_finite_not_met,
            $cond,
            ::core::option::Option::None,
            [$($arg)+]
        )
    };
}

/// [`enforce_finite!`](crate::enforce_finite) for methods: records the address of `caller`.
#[macro_export]
macro_rules! enforce_finite_with_caller {
    ($caller:expr, $cond:expr $(,)?) => {
        $crate::__enforce_impl!(
            enforce_finite_not_met,
            $cond,
            ::core::option::Option::Some($crate::CallerAddress::of($caller)),
            []
        )
    };
    ($caller:expr, $cond:expr, $($arg:tt)+) => {
        $crate::__enforce_impl!(
            enforce_finite_not_met,
            $cond,
            ::core::option::Option::Some($crate::CallerAddress::of($caller)),
            [$($arg)+]
        )
    };
}

/// Return an [`EnforceError`] unconditionally, with an empty condition.
#[macro_export]
macro_rules! enforce_fail {
    ($($arg:tt)*) => {
        return ::core::result::Result::Err(::core::convert::From::from(
            $crate::engine::enforce_not_met(
                $crate::SourceLocation::new(::core::file!(), ::core::line!()),
                "",
                $crate::str_cat!($($arg)*),
                ::core::option::Option::None,
            ),
        ))
    };
}

#[doc(hidden)]
#[macro_export]
macro_rules! __enforce_impl {
    ($raise:ident, $cond:expr, $caller:expr, [$($arg:tt)*]) => {
        if !($cond) {
            return ::core::result::Result::Err(::core::convert::From::from(
                $crate::engine::$raise(
                    $crate::SourceLocation::new(::core::file!(), ::core::line!()),
                    ::core::stringify!($cond),
                    $crate::str_cat!($($arg)*),
                    $caller,
                ),
            ));
        }
    };
}
