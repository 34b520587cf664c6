//! Unified error type for composed callguard stacks.
//!
//! When admission control, the resilient executor and the response cache are
//! stacked around one operation, each layer reports its own error enum.
//! [`GuardError<E>`] gives callers a single type to match on: every component
//! error converts into it with `From`, and the wrapped operation's error
//! lands in [`GuardError::Application`].
//!
//! ```
//! use callguard_core::GuardError;
//! use std::time::Duration;
//!
//! fn describe(err: &GuardError<std::io::Error>) -> String {
//!     match err {
//!         GuardError::RateLimited { retry_after, .. } => {
//!             format!("slow down for {:?}", retry_after)
//!         }
//!         GuardError::CircuitOpen { key } => format!("{key} is cooling down"),
//!         GuardError::InvalidUrl { url, .. } => format!("refusing {url}"),
//!         GuardError::NoCacheAvailable { url } => format!("{url} is offline"),
//!         GuardError::Application(e) => e.to_string(),
//!     }
//! }
//!
//! let err: GuardError<std::io::Error> = GuardError::RateLimited {
//!     limit: 100,
//!     retry_after: Duration::from_secs(3),
//! };
//! assert_eq!(describe(&err), "slow down for 3s");
//! ```

use crate::status::{ErrorStatus, TOO_MANY_REQUESTS};
use std::time::Duration;
use thiserror::Error;

/// Error produced by any layer of a callguard stack.
#[derive(Debug, Clone, Error)]
pub enum GuardError<E> {
    /// The admission controller refused the call.
    #[error("rate limit exceeded ({limit} per window); retry after {retry_after:?}")]
    RateLimited {
        limit: usize,
        retry_after: Duration,
    },

    /// The executor short-circuited the call.
    #[error("Rate limit circuit is open. Please wait and try again.")]
    CircuitOpen { key: String },

    /// The cache rejected a malformed or unsafe URL.
    #[error("invalid url {url:?}: {reason}")]
    InvalidUrl { url: String, reason: String },

    /// The network failed and nothing usable was cached.
    #[error("network failed and no cache available for {url}")]
    NoCacheAvailable { url: String },

    /// The wrapped operation failed.
    #[error("{0}")]
    Application(E),
}

impl<E> GuardError<E> {
    pub fn is_rate_limited(&self) -> bool {
        matches!(self, GuardError::RateLimited { .. })
    }

    pub fn is_circuit_open(&self) -> bool {
        matches!(self, GuardError::CircuitOpen { .. })
    }

    pub fn is_application(&self) -> bool {
        matches!(self, GuardError::Application(_))
    }

    /// Extracts the operation's error, if that is what this is.
    pub fn application_error(self) -> Option<E> {
        match self {
            GuardError::Application(e) => Some(e),
            _ => None,
        }
    }

    /// Maps the operation's error, leaving guard variants untouched.
    ///
    /// ```
    /// use callguard_core::GuardError;
    ///
    /// let err: GuardError<String> = GuardError::Application("boom".into());
    /// let mapped: GuardError<usize> = err.map_application(|s| s.len());
    /// assert_eq!(mapped.application_error(), Some(4));
    /// ```
    pub fn map_application<F, T>(self, f: F) -> GuardError<T>
    where
        F: FnOnce(E) -> T,
    {
        match self {
            GuardError::RateLimited { limit, retry_after } => {
                GuardError::RateLimited { limit, retry_after }
            }
            GuardError::CircuitOpen { key } => GuardError::CircuitOpen { key },
            GuardError::InvalidUrl { url, reason } => GuardError::InvalidUrl { url, reason },
            GuardError::NoCacheAvailable { url } => GuardError::NoCacheAvailable { url },
            GuardError::Application(e) => GuardError::Application(f(e)),
        }
    }
}

impl<E: ErrorStatus> ErrorStatus for GuardError<E> {
    fn status(&self) -> Option<u16> {
        match self {
            GuardError::RateLimited { .. } => Some(TOO_MANY_REQUESTS),
            GuardError::Application(e) => e.status(),
            _ => None,
        }
    }
}
