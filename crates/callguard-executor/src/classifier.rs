use callguard_core::{ErrorStatus, TOO_MANY_REQUESTS};

/// Whether a failure is worth backing off for.
///
/// True when the error reports status 429, or when its message mentions
/// "rate limit" in any letter case. Everything else is treated as an
/// application failure and returned to the caller untouched.
///
/// ```
/// use callguard_executor::is_rate_limit_error;
///
/// assert!(is_rate_limit_error(&"Rate Limit exceeded for /patients"));
/// assert!(!is_rate_limit_error(&"record not found"));
/// ```
pub fn is_rate_limit_error<E>(error: &E) -> bool
where
    E: ErrorStatus + ?Sized,
{
    error.status() == Some(TOO_MANY_REQUESTS)
        || error.to_string().to_lowercase().contains("rate limit")
}
