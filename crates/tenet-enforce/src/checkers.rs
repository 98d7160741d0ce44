//! Pluggable checker functions for [`enforce_that!`](crate::enforce_that).
//!
//! A checker evaluates its arguments once and returns either
//! [`CheckResult::Ok`] or a description of what went wrong. Crates define
//! their own checkers the same way:
//!
//! ```
//! use tenet_enforce::{CheckResult, EnforceResult, enforce_that};
//!
//! fn is_vector(shape: &[usize]) -> CheckResult {
//!     if shape.len() == 1 {
//!         return CheckResult::Ok;
//!     }
//!     CheckResult::failed(format!("shape {shape:?} is not a vector"))
//! }
//!
//! fn bias(shape: &[usize]) -> EnforceResult<()> {
//!     enforce_that!(is_vector(shape), "bias input");
//!     Ok(())
//! }
//!
//! let err = bias(&[2, 3]).unwrap_err();
//! assert_eq!(err.message(), "shape [2, 3] is not a vector. bias input");
//! ```

use std::fmt::Display;

/// Outcome of a checker function.
#[must_use]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckResult {
    /// The checked property holds.
    Ok,
    /// The property does not hold; the string describes why.
    Failed(String),
}

impl CheckResult {
    /// Failure with the given description.
    pub fn failed(message: impl Into<String>) -> Self {
        Self::Failed(message.into())
    }

    /// Whether the property holds.
    #[must_use]
    pub const fn is_ok(&self) -> bool {
        matches!(self, Self::Ok)
    }
}

fn compare<L, R>(holds: bool, lhs: &L, rhs: &R) -> CheckResult
where
    L: Display + ?Sized,
    R: Display + ?Sized,
{
    if holds {
        CheckResult::Ok
    } else {
        CheckResult::Failed(format!("{lhs} vs {rhs}"))
    }
}

/// `lhs == rhs`.
pub fn equals<L, R>(lhs: L, rhs: R) -> CheckResult
where
    L: PartialEq<R> + Display,
    R: Display,
{
    compare(lhs == rhs, &lhs, &rhs)
}

/// `lhs != rhs`.
pub fn not_equals<L, R>(lhs: L, rhs: R) -> CheckResult
where
    L: PartialEq<R> + Display,
    R: Display,
{
    compare(lhs != rhs, &lhs, &rhs)
}

/// `lhs < rhs`.
pub fn less<L, R>(lhs: L, rhs: R) -> CheckResult
where
    L: PartialOrd<R> + Display,
    R: Display,
{
    compare(lhs < rhs, &lhs, &rhs)
}

/// `lhs <= rhs`.
pub fn less_equals<L, R>(lhs: L, rhs: R) -> CheckResult
where
    L: PartialOrd<R> + Display,
    R: Display,
{
    compare(lhs <= rhs, &lhs, &rhs)
}

/// `lhs > rhs`.
pub fn greater<L, R>(lhs: L, rhs: R) -> CheckResult
where
    L: PartialOrd<R> + Display,
    R: Display,
{
    compare(lhs > rhs, &lhs, &rhs)
}

/// `lhs >= rhs`.
pub fn greater_equals<L, R>(lhs: L, rhs: R) -> CheckResult
where
    L: PartialOrd<R> + Display,
    R: Display,
{
    compare(lhs >= rhs, &lhs, &rhs)
}

/// Run a checker and return an [`EnforceError`](crate::EnforceError) from the
/// enclosing function when it reports a failure.
///
/// The condition text is the stringified checker call; the message is the
/// checker's description followed by any extra arguments.
#[macro_export]
macro_rules! enforce_that {
    ($check:expr $(,)?) => {
        $crate::__enforce_that_impl!($check, ::core::option::Option::None, [])
    };
    ($check:expr, $($arg:expr),+ $(,)?) => {
        $crate::__enforce_that_impl!($check, ::core::option::Option::None, [$($arg),+])
    };
}

/// [`enforce_that!`](crate::enforce_that) recording the address of `caller`.
#[macro_export]
macro_rules! enforce_that_with_caller {
    ($caller:expr, $check:expr $(,)?) => {
        $crate::__enforce_that_impl!(
            $check,
            ::core::option::Option::Some($crate::CallerAddress::of($caller)),
            []
        )
    };
    ($caller:expr, $check:expr, $($arg:expr),+ $(,)?) => {
        $crate::__enforce_that_impl!(
            $check,
            ::core::option::Option::Some($crate::CallerAddress::of($caller)),
            [$($arg),+]
        )
    };
}

#[doc(hidden)]
#[macro_export]
macro_rules! __enforce_that_impl {
    ($check:expr, $caller:expr, [$($arg:expr),*]) => {
        if let $crate::CheckResult::Failed(failure) = $check {
            return ::core::result::Result::Err(::core::convert::From::from(
                $crate::engine::enforce_not_met(
                    $crate::SourceLocation::new(::core::file!(), ::core::line!()),
                    ::core::stringify!($check),
                    $crate::message::append_extras(
                        failure,
                        &[$(&$arg as &dyn ::core::fmt::Display),*],
                    ),
                    $caller,
                ),
            ));
        }
    };
}
