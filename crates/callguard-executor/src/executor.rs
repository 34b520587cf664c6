use crate::circuit::{Admission, Circuit, CircuitSnapshot};
use crate::classifier::is_rate_limit_error;
use crate::config::ExecutorConfig;
use crate::error::ExecuteError;
use crate::events::ExecutorEvent;
use crate::options::ExecuteOptions;
use callguard_core::ErrorStatus;
use std::collections::HashMap;
use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::time::Instant;

#[cfg(feature = "metrics")]
use metrics::counter;

#[cfg(feature = "tracing")]
use tracing::{debug, info};

struct Shared {
    config: ExecutorConfig,
    circuits: Mutex<HashMap<String, Circuit>>,
}

/// Runs operations under exponential backoff and a per-key circuit breaker.
///
/// Only rate-limit failures (see [`is_rate_limit_error`]) are retried and
/// counted against the circuit. Every other error is returned on the first
/// attempt without touching circuit state.
///
/// Cloning is cheap; clones share circuits.
///
/// # Examples
///
/// ```
/// use callguard_executor::{ExecuteOptions, RateLimitExecutor};
/// use std::time::Duration;
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() {
/// let executor = RateLimitExecutor::builder().name("labs").build();
///
/// let options = ExecuteOptions::new("GET /labs/42")
///     .max_retries(2)
///     .base_delay(Duration::from_millis(10));
///
/// let result = executor
///     .execute(&options, || async { Ok::<_, String>("hemoglobin: 13.5") })
///     .await;
/// assert_eq!(result.unwrap(), "hemoglobin: 13.5");
/// # }
/// ```
#[derive(Clone)]
pub struct RateLimitExecutor {
    shared: Arc<Shared>,
}

impl RateLimitExecutor {
    pub fn new(config: ExecutorConfig) -> Self {
        Self {
            shared: Arc::new(Shared {
                config,
                circuits: Mutex::new(HashMap::new()),
            }),
        }
    }

    /// Shorthand for [`ExecutorConfig::builder`].
    pub fn builder() -> crate::ExecutorConfigBuilder {
        ExecutorConfig::builder()
    }

    pub fn config(&self) -> &ExecutorConfig {
        &self.shared.config
    }

    fn circuits(&self) -> MutexGuard<'_, HashMap<String, Circuit>> {
        self.shared
            .circuits
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// Runs `operation` until it succeeds, fails with a non-rate-limit error,
    /// exhausts `max_retries`, or finds its circuit open.
    ///
    /// The circuit is consulted before every attempt, so a circuit opened
    /// mid-loop stops the remaining retries.
    pub async fn execute<T, E, F, Fut>(
        &self,
        options: &ExecuteOptions,
        mut operation: F,
    ) -> Result<T, ExecuteError<E>>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: ErrorStatus,
    {
        let key = options.key.as_str();
        let backoff = options.backoff();
        let mut attempt = 0;

        loop {
            if let Some(remaining) = self.admit(key) {
                self.emit_rejected(key, remaining);
                return Err(ExecuteError::CircuitOpen {
                    key: key.to_string(),
                });
            }

            let error = match operation().await {
                Ok(value) => {
                    self.with_circuit(key, Circuit::record_success);
                    self.emit_success(key, attempt + 1);
                    return Ok(value);
                }
                Err(error) => error,
            };

            if !is_rate_limit_error(&error) {
                self.emit_failure(key, attempt + 1, false);
                return Err(ExecuteError::Operation(error));
            }

            let now = Instant::now();
            let opened = self.with_circuit(key, |circuit| {
                circuit.record_rate_limited(
                    now,
                    options.circuit_breaker_threshold,
                    options.circuit_breaker_timeout,
                )
            });
            if let Some(failure_count) = opened {
                self.emit_opened(key, failure_count, options.circuit_breaker_timeout);
            }

            if attempt >= options.max_retries {
                self.emit_failure(key, attempt + 1, true);
                return Err(ExecuteError::Operation(error));
            }

            let delay = backoff.next_interval(attempt);
            if let Some(observer) = &options.on_retry {
                observer(attempt + 1, delay);
            }
            self.emit_retry(key, attempt + 1, delay);

            drop(error);
            tokio::time::sleep(delay).await;
            attempt += 1;
        }
    }

    /// What the next call for `key` would see.
    pub fn circuit(&self, key: &str) -> CircuitSnapshot {
        let now = Instant::now();
        self.circuits()
            .get(key)
            .map_or(CircuitSnapshot::CLOSED, |circuit| circuit.snapshot(now))
    }

    /// Clears one key's failures and any open period.
    pub fn reset(&self, key: &str) {
        self.circuits().remove(key);
    }

    /// Clears every key.
    pub fn reset_all(&self) {
        self.circuits().clear();
    }

    /// Number of keys with circuit state.
    pub fn tracked_keys(&self) -> usize {
        self.circuits().len()
    }

    fn with_circuit<R>(&self, key: &str, f: impl FnOnce(&mut Circuit) -> R) -> R {
        let mut circuits = self.circuits();
        f(circuits.entry(key.to_string()).or_default())
    }

    /// Returns the remaining open time when the call must be rejected.
    fn admit(&self, key: &str) -> Option<Duration> {
        let now = Instant::now();
        match self.with_circuit(key, |circuit| circuit.admit(now)) {
            Admission::Closed => None,
            Admission::Reclosed => {
                self.emit_closed(key);
                None
            }
            Admission::Open { remaining } => Some(remaining),
        }
    }

    fn emit(&self, event: ExecutorEvent) {
        self.shared.config.event_listeners.emit(&event);
    }

    fn name(&self) -> String {
        self.shared.config.name.clone()
    }

    fn emit_rejected(&self, key: &str, open_remaining: Duration) {
        #[cfg(feature = "tracing")]
        debug!(
            executor = %self.shared.config.name,
            key,
            open_remaining_ms = open_remaining.as_millis() as u64,
            "call rejected, circuit open"
        );

        #[cfg(feature = "metrics")]
        counter!("executor_calls_total", "executor" => self.name(), "outcome" => "rejected")
            .increment(1);

        self.emit(ExecutorEvent::CallRejected {
            source: self.name(),
            key: key.to_string(),
            timestamp: std::time::Instant::now(),
            open_remaining,
        });
    }

    fn emit_success(&self, key: &str, attempts: usize) {
        #[cfg(feature = "metrics")]
        counter!("executor_calls_total", "executor" => self.name(), "outcome" => "success")
            .increment(1);

        self.emit(ExecutorEvent::Success {
            source: self.name(),
            key: key.to_string(),
            timestamp: std::time::Instant::now(),
            attempts,
        });
    }

    fn emit_failure(&self, key: &str, attempts: usize, rate_limited: bool) {
        #[cfg(feature = "tracing")]
        debug!(
            executor = %self.shared.config.name,
            key,
            attempts,
            rate_limited,
            "operation failed"
        );

        #[cfg(feature = "metrics")]
        counter!("executor_calls_total", "executor" => self.name(), "outcome" => "error")
            .increment(1);

        self.emit(ExecutorEvent::Failure {
            source: self.name(),
            key: key.to_string(),
            timestamp: std::time::Instant::now(),
            attempts,
            rate_limited,
        });
    }

    fn emit_retry(&self, key: &str, attempt: usize, delay: Duration) {
        #[cfg(feature = "tracing")]
        debug!(
            executor = %self.shared.config.name,
            key,
            attempt,
            delay_ms = delay.as_millis() as u64,
            "rate limited, backing off"
        );

        #[cfg(feature = "metrics")]
        counter!("executor_retries_total", "executor" => self.name()).increment(1);

        self.emit(ExecutorEvent::Retry {
            source: self.name(),
            key: key.to_string(),
            timestamp: std::time::Instant::now(),
            attempt,
            delay,
        });
    }

    fn emit_opened(&self, key: &str, failure_count: usize, open_for: Duration) {
        #[cfg(feature = "tracing")]
        info!(
            executor = %self.shared.config.name,
            key,
            failure_count,
            open_for_ms = open_for.as_millis() as u64,
            "circuit opened"
        );

        #[cfg(feature = "metrics")]
        counter!("executor_circuit_transitions_total", "executor" => self.name(), "to" => "open")
            .increment(1);

        self.emit(ExecutorEvent::CircuitOpened {
            source: self.name(),
            key: key.to_string(),
            timestamp: std::time::Instant::now(),
            failure_count,
            open_for,
        });
    }

    fn emit_closed(&self, key: &str) {
        #[cfg(feature = "tracing")]
        info!(executor = %self.shared.config.name, key, "circuit closed");

        #[cfg(feature = "metrics")]
        counter!("executor_circuit_transitions_total", "executor" => self.name(), "to" => "closed")
            .increment(1);

        self.emit(ExecutorEvent::CircuitClosed {
            source: self.name(),
            key: key.to_string(),
            timestamp: std::time::Instant::now(),
        });
    }
}

impl Default for RateLimitExecutor {
    fn default() -> Self {
        Self::builder().build()
    }
}

impl std::fmt::Debug for RateLimitExecutor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RateLimitExecutor")
            .field("config", &self.shared.config)
            .field("tracked_keys", &self.tracked_keys())
            .finish()
    }
}
