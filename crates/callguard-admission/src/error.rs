use callguard_core::{ErrorStatus, GuardError, TOO_MANY_REQUESTS};
use std::time::Duration;
use thiserror::Error;

/// Rejection returned by [`AdmissionController::enforce`](crate::AdmissionController::enforce).
///
/// Maps onto an HTTP 429 with a `Retry-After` of [`retry_after_secs`](Self::retry_after_secs).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("rate limit exceeded for {key}: {limit} requests per window, retry after {}s", retry_after.as_secs())]
pub struct RateLimitedError {
    /// The key whose window is full.
    pub key: String,
    /// Configured maximum requests per window.
    pub limit: usize,
    /// Time until the oldest request leaves the window, rounded up to whole seconds.
    pub retry_after: Duration,
}

impl RateLimitedError {
    /// Always 429.
    pub fn status_code(&self) -> u16 {
        TOO_MANY_REQUESTS
    }

    pub fn retry_after_secs(&self) -> u64 {
        self.retry_after.as_secs()
    }
}

impl ErrorStatus for RateLimitedError {
    fn status(&self) -> Option<u16> {
        Some(TOO_MANY_REQUESTS)
    }
}

/// Errors returned by the [`Admission`](crate::Admission) service.
#[derive(Debug, Clone, Error)]
pub enum AdmissionError<E> {
    /// The request was refused before reaching the inner service.
    #[error(transparent)]
    RateLimited(#[from] RateLimitedError),

    /// The inner service returned an error.
    #[error("{0}")]
    Inner(E),
}

impl<E> AdmissionError<E> {
    pub fn is_rate_limited(&self) -> bool {
        matches!(self, AdmissionError::RateLimited(_))
    }

    pub fn into_inner(self) -> Option<E> {
        match self {
            AdmissionError::Inner(e) => Some(e),
            AdmissionError::RateLimited(_) => None,
        }
    }
}

impl<E: ErrorStatus> ErrorStatus for AdmissionError<E> {
    fn status(&self) -> Option<u16> {
        match self {
            AdmissionError::RateLimited(_) => Some(TOO_MANY_REQUESTS),
            AdmissionError::Inner(e) => e.status(),
        }
    }
}

impl<E> From<RateLimitedError> for GuardError<E> {
    fn from(err: RateLimitedError) -> Self {
        GuardError::RateLimited {
            limit: err.limit,
            retry_after: err.retry_after,
        }
    }
}

impl<E> From<AdmissionError<E>> for GuardError<E> {
    fn from(err: AdmissionError<E>) -> Self {
        match err {
            AdmissionError::RateLimited(limited) => limited.into(),
            AdmissionError::Inner(e) => GuardError::Application(e),
        }
    }
}
