//! Comparison checks that report both operand values on failure.
//!
//! Each macro evaluates its operands exactly once, left to right, binds them
//! by reference and only formats them when the comparison fails. The failure
//! message reads `"<lhs> vs <rhs>"`, followed by `". <extra...>"` when extra
//! context is supplied; the condition text is the stringified expression,
//! e.g. `"x == y"`.

use std::fmt::Display;

use crate::message::append_extras;

/// Failure message for a binary comparison.
#[must_use]
pub fn binary_failure_message<L, R>(lhs: &L, rhs: &R, extras: &[&dyn Display]) -> String
where
    L: Display + ?Sized,
    R: Display + ?Sized,
{
    append_extras(format!("{lhs} vs {rhs}"), extras)
}

/// Check `lhs <op> rhs`, returning an [`EnforceError`](crate::EnforceError)
/// from the enclosing function when it does not hold.
#[macro_export]
macro_rules! enforce_binary_op {
    ($op:tt, $lhs:expr, $rhs:expr $(,)?) => {
        $crate::__enforce_binary_impl!($op, $lhs, $rhs, ::core::option::Option::None, [])
    };
    ($op:tt, $lhs:expr, $rhs:expr, $($arg:expr),+ $(,)?) => {
        $crate::__enforce_binary_impl!($op, $lhs, $rhs, ::core::option::Option::None, [$($arg),+])
    };
}

/// [`enforce_binary_op!`](crate::enforce_binary_op) for methods: records the address of `caller`.
#[macro_export]
macro_rules! enforce_binary_op_with_caller {
    ($caller:expr, $op:tt, $lhs:expr, $rhs:expr $(,)?) => {
        $crate::__enforce_binary_impl!(
            $op,
            $lhs,
            $rhs,
            ::core::option::Option::Some($crate::CallerAddress::of($caller)),
            []
        )
    };
    ($caller:expr, $op:tt, $lhs:expr, $rhs:expr, $($arg:expr),+ $(,)?) => {
        $crate::__enforce_binary_impl!(
            $op,
            $lhs,
            $rhs,
            ::core::option::Option::Some($crate::CallerAddress::of($caller)),
            [$($arg),+]
        )
    };
}

#[doc(hidden)]
#[macro_export]
macro_rules! __enforce_binary_impl {
    ($op:tt, $lhs:expr, $rhs:expr, $caller:expr, [$($arg:expr),*]) => {
        match (&$lhs, &$rhs) {
            (lhs, rhs) => {
                if !(*lhs $op *rhs) {
                    return ::core::result::Result::Err(::core::convert::From::from(
                        $crate::engine::enforce_not_met(
                            $crate::SourceLocation::new(::core::file!(), ::core::line!()),
                            ::core::concat!(
                                ::core::stringify!($lhs),
                                " ",
                                ::core::stringify!($op),
                                " ",
                                ::core::stringify!($rhs)
                            ),
                            $crate::compare::binary_failure_message(
                                lhs,
                                rhs,
                                &[$(&$arg as &dyn ::core::fmt::Display),*],
                            ),
                            $caller,
                        ),
                    ));
                }
            }
        }
    };
}

/// Enforce `lhs == rhs`.
///
/// ```
/// use tenet_enforce::{EnforceResult, enforce_eq};
///
/// fn check() -> EnforceResult<()> {
///     enforce_eq!(2 + 2, 5);
///     Ok(())
/// }
///
/// assert!(check().unwrap_err().to_string().contains("2 + 2 == 5. 4 vs 5"));
/// ```
#[macro_export]
macro_rules! enforce_eq {
    ($($args:tt)+) => { $crate::__enforce_op_shim!(==, $($args)+) };
}

/// Enforce `lhs != rhs`.
#[macro_export]
macro_rules! enforce_ne {
    ($($args:tt)+) => { $crate::__enforce_op_shim!(!=, $($args)+) };
}

/// Enforce `lhs < rhs`.
#[macro_export]
macro_rules! enforce_lt {
    ($($args:tt)+) => { $crate::__enforce_op_shim!(<, $($args)+) };
}

/// Enforce `lhs <= rhs`.
#[macro_export]
macro_rules! enforce_le {
    ($($args:tt)+) => { $crate::__enforce_op_shim!(<=, $($args)+) };
}

/// Enforce `lhs > rhs`.
#[macro_export]
macro_rules! enforce_gt {
    ($($args:tt)+) => { $crate::__enforce_op_shim!(>, $($args)+) };
}

/// Enforce `lhs >= rhs`.
#[macro_export]
macro_rules! enforce_ge {
    ($($args:tt)+) => { $crate::__enforce_op_shim!(>=, $($args)+) };
}

/// [`enforce_eq!`](crate::enforce_eq) recording the address of `caller`.
#[macro_export]
macro_rules! enforce_eq_with_caller {
    ($caller:expr, $($args:tt)+) => { $crate::__enforce_op_shim_with_caller!($caller, ==, $($args)+) };
}

/// [`enforce_ne!`](crate::enforce_ne) recording the address of `caller`.
#[macro_export]
macro_rules! enforce_ne_with_caller {
    ($caller:expr, $($args:tt)+) => { $crate::__enforce_op_shim_with_caller!($caller, !=, $($args)+) };
}

/// [`enforce_lt!`](crate::enforce_lt) recording the address of `caller`.
#[macro_export]
macro_rules! enforce_lt_with_caller {
    ($caller:expr, $($args:tt)+) => { $crate::__enforce_op_shim_with_caller!($caller, <, $($args)+) };
}

/// [`enforce_le!`](crate::enforce_le) recording the address of `caller`.
#[macro_export]
macro_rules! enforce_le_with_caller {
    ($caller:expr, $($args:tt)+) => { $crate::__enforce_op_shim_with_caller!($caller, <=, $($args)+) };
}

/// [`enforce_gt!`](crate::enforce_gt) recording the address of `caller`.
#[macro_export]
macro_rules! enforce_gt_with_caller {
    ($caller:expr, $($args:tt)+) => { $crate::__enforce_op_shim_with_caller!($caller, >, $($args)+) };
}

/// [`enforce_ge!`](crate::enforce_ge) recording the address of `caller`.
#[macro_export]
macro_rules! enforce_ge_with_caller {
    ($caller:expr, $($args:tt)+) => { $crate::__enforce_op_shim_with_caller!($caller, >=, $($args)+) };
}

#[doc(hidden)]
#[macro_export]
macro_rules! __enforce_op_shim {
    ($op:tt, $lhs:expr, $rhs:expr $(, $arg:expr)* $(,)?) => {
        $crate::__enforce_binary_impl!($op, $lhs, $rhs, ::core::option::Option::None, [$($arg),*])
    };
}

#[doc(hidden)]
#[macro_export]
macro_rules! __enforce_op_shim_with_caller {
    ($caller:expr, $op:tt, $lhs:expr, $rhs:expr $(, $arg:expr)* $(,)?) => {
        $crate::__enforce_binary_impl!(
            $op,
            $lhs,
            $rhs,
            ::core::option::Option::Some($crate::CallerAddress::of($caller)),
            [$($arg),*]
        )
    };
}
