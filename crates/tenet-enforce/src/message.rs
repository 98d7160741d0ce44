//! Failure message construction.
//!
//! Messages are only built on the failure path. A call site that supplies no
//! extra context passes [`CompileTimeEmptyString`], which turns into an empty
//! borrowed message without touching the allocator.

use std::borrow::Cow;
use std::fmt::{Display, Write};

/// Marker for "no message supplied".
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CompileTimeEmptyString;

/// Message forms accepted by the enforce engine.
pub trait IntoEnforceMessage {
    /// Convert into the stored message text.
    fn into_message(self) -> Cow<'static, str>;
}

impl IntoEnforceMessage for String {
    fn into_message(self) -> Cow<'static, str> {
        Cow::Owned(self)
    }
}

impl IntoEnforceMessage for &'static str {
    fn into_message(self) -> Cow<'static, str> {
        Cow::Borrowed(self)
    }
}

impl IntoEnforceMessage for Cow<'static, str> {
    fn into_message(self) -> Cow<'static, str> {
        self
    }
}

impl IntoEnforceMessage for CompileTimeEmptyString {
    fn into_message(self) -> Cow<'static, str> {
        Cow::Borrowed("")
    }
}

/// Concatenate the `Display` renderings of `parts` without separators.
#[must_use]
pub fn concat_display(parts: &[&dyn Display]) -> String {
    let mut out = String::new();
    for part in parts {
        let _ = write!(out, "{part}");
    }
    out
}

/// Append `". <extras...>"` to `message` when any extras are supplied.
#[must_use]
pub fn append_extras(mut message: String, extras: &[&dyn Display]) -> String {
    if extras.is_empty() {
        return message;
    }
    message.push_str(". ");
    for extra in extras {
        let _ = write!(message, "{extra}");
    }
    message
}

/// Concatenate heterogeneous printable values into one message.
///
/// With no arguments this yields [`CompileTimeEmptyString`]; a single
/// literal becomes a `&'static str`; otherwise a `String` holding every
/// argument's `Display` output back to back.
///
/// ```
/// use tenet_enforce::str_cat;
///
/// assert_eq!(str_cat!("shape ", 3, "x", 4.5), "shape 3x4.5");
/// let fixed: &'static str = str_cat!("input must be 4-D");
/// assert_eq!(fixed, "input must be 4-D");
/// ```
#[macro_export]
macro_rules! str_cat {
    () => {
        $crate::message::CompileTimeEmptyString
    };
    ($literal:literal $(,)?) => {
        ::core::concat!($literal)
    };
    ($($arg:expr),+ $(,)?) => {
        $crate::message::concat_display(&[$(&$arg as &dyn ::core::fmt::Display),+])
    };
}
