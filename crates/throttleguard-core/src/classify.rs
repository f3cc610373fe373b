//! Classification of remote failures into transient and non-transient.
//!
//! A failure is **transient** when the remote service signals rate-limit
//! exhaustion, either through a structured error code or, for errors that
//! carry no code, through the word "throttling" in their text. Everything
//! else (invalid requests, authorization failures, missing resources and
//! local faults) is **non-transient** and must never be retried.

use std::borrow::Cow;

/// Structured error codes that identify throttling, compared case-insensitively.
pub const THROTTLING_CODES: &[&str] = &["ThrottlingException", "TooManyRequestsException"];

/// Marker searched for, case-insensitively, in an error's text.
pub const THROTTLING_MARKER: &str = "throttling";

/// Outcome of classifying a failed attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Classification {
    /// Rate limited; worth retrying after a wait.
    Transient,
    /// Any other failure; propagate immediately.
    NonTransient,
}

impl Classification {
    /// Whether the failure may be retried.
    pub fn is_transient(self) -> bool {
        matches!(self, Self::Transient)
    }
}

/// Minimal structural view of a collaborator error.
///
/// The invoker only needs an optional structured code and the error's
/// textual representation. Implement this for the error type your remote
/// client returns.
pub trait ErrorShape {
    /// Structured error code reported by the service, if any.
    fn code(&self) -> Option<&str> {
        None
    }

    /// Full textual representation of the error.
    fn text(&self) -> Cow<'_, str>;
}

impl ErrorShape for std::io::Error {
    fn text(&self) -> Cow<'_, str> {
        Cow::Owned(self.to_string())
    }
}

impl ErrorShape for String {
    fn text(&self) -> Cow<'_, str> {
        Cow::Borrowed(self)
    }
}

impl ErrorShape for &str {
    fn text(&self) -> Cow<'_, str> {
        Cow::Borrowed(self)
    }
}

/// Classify an error as transient or non-transient.
///
/// # Examples
///
/// ```rust
/// use throttleguard_core::classify::{Classification, classify};
///
/// assert_eq!(classify(&"Rate exceeded (Throttling)"), Classification::Transient);
/// assert_eq!(classify(&"AccessDeniedException"), Classification::NonTransient);
/// ```
pub fn classify<E: ErrorShape + ?Sized>(error: &E) -> Classification {
    match error.code() {
        Some(code) if is_throttling_code(code) => Classification::Transient,
        _ => classify_message(&error.text()),
    }
}

/// Classify an error from its text alone.
pub fn classify_message(text: &str) -> Classification {
    if text.to_lowercase().contains(THROTTLING_MARKER) {
        Classification::Transient
    } else {
        Classification::NonTransient
    }
}

/// Whether `code` names a throttling condition.
pub fn is_throttling_code(code: &str) -> bool {
    THROTTLING_CODES
        .iter()
        .any(|known| known.eq_ignore_ascii_case(code))
}
