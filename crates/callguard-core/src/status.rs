//! HTTP-style status exposure for error classification.
//!
//! The executor decides whether a failure is a rate-limit failure by looking
//! at the status an error reports and at its message. Errors opt in by
//! implementing [`ErrorStatus`]; the default reports no status, so message
//! inspection alone applies.

use std::fmt;

/// The HTTP status that marks a rate-limited call.
pub const TOO_MANY_REQUESTS: u16 = 429;

/// An error that may carry an HTTP-style status code.
pub trait ErrorStatus: fmt::Display {
    /// The status code attached to this error, if any.
    fn status(&self) -> Option<u16> {
        None
    }
}

impl ErrorStatus for std::io::Error {}

impl ErrorStatus for String {}

impl ErrorStatus for &'static str {}

impl ErrorStatus for Box<dyn std::error::Error + Send + Sync> {}

impl<T: ErrorStatus + ?Sized> ErrorStatus for std::sync::Arc<T> {
    fn status(&self) -> Option<u16> {
        (**self).status()
    }
}
