use crate::backoff::ExponentialBackoff;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

/// Per-call observer invoked with the 1-based retry number and its delay.
pub type RetryObserver = Arc<dyn Fn(usize, Duration) + Send + Sync>;

/// Retry and circuit policy for one [`execute`](crate::RateLimitExecutor::execute) call.
///
/// Calls sharing a `key` share a circuit, whatever their other options.
///
/// ```
/// use callguard_executor::ExecuteOptions;
/// use std::time::Duration;
///
/// let options = ExecuteOptions::new("GET /patients")
///     .max_retries(2)
///     .base_delay(Duration::from_millis(250))
///     .on_retry(|attempt, delay| println!("retry {attempt} in {delay:?}"));
/// assert_eq!(options.key(), "GET /patients");
/// ```
#[derive(Clone)]
pub struct ExecuteOptions {
    pub(crate) key: String,
    pub(crate) max_retries: usize,
    pub(crate) base_delay: Duration,
    pub(crate) max_delay: Duration,
    pub(crate) circuit_breaker_threshold: usize,
    pub(crate) circuit_breaker_timeout: Duration,
    pub(crate) on_retry: Option<RetryObserver>,
}

impl ExecuteOptions {
    /// Options for `key` with defaults.
    ///
    /// Defaults:
    /// - max_retries: 4
    /// - base_delay: 1000ms
    /// - max_delay: 8000ms
    /// - circuit_breaker_threshold: 3
    /// - circuit_breaker_timeout: 60 seconds
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            max_retries: 4,
            base_delay: Duration::from_millis(1000),
            max_delay: Duration::from_millis(8000),
            circuit_breaker_threshold: 3,
            circuit_breaker_timeout: Duration::from_secs(60),
            on_retry: None,
        }
    }

    /// Replaces the key, keeping the rest of the policy.
    pub fn with_key(&self, key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            ..self.clone()
        }
    }

    pub fn max_retries(mut self, max_retries: usize) -> Self {
        self.max_retries = max_retries;
        self
    }

    pub fn base_delay(mut self, delay: Duration) -> Self {
        self.base_delay = delay;
        self
    }

    pub fn max_delay(mut self, delay: Duration) -> Self {
        self.max_delay = delay;
        self
    }

    /// Consecutive rate-limit failures that open the circuit. Zero is treated as one.
    pub fn circuit_breaker_threshold(mut self, threshold: usize) -> Self {
        self.circuit_breaker_threshold = threshold.max(1);
        self
    }

    pub fn circuit_breaker_timeout(mut self, timeout: Duration) -> Self {
        self.circuit_breaker_timeout = timeout;
        self
    }

    pub fn on_retry<F>(mut self, f: F) -> Self
    where
        F: Fn(usize, Duration) + Send + Sync + 'static,
    {
        self.on_retry = Some(Arc::new(f));
        self
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn backoff(&self) -> ExponentialBackoff {
        ExponentialBackoff::new(self.base_delay, self.max_delay)
    }
}

impl fmt::Debug for ExecuteOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExecuteOptions")
            .field("key", &self.key)
            .field("max_retries", &self.max_retries)
            .field("base_delay", &self.base_delay)
            .field("max_delay", &self.max_delay)
            .field("circuit_breaker_threshold", &self.circuit_breaker_threshold)
            .field("circuit_breaker_timeout", &self.circuit_breaker_timeout)
            .field("on_retry", &self.on_retry.is_some())
            .finish()
    }
}
