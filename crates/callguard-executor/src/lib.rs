//! Exponential backoff and per-key circuit breaking for rate-limited calls.
//!
//! A [`RateLimitExecutor`] wraps an asynchronous operation. When the
//! operation fails with a rate-limit error (status 429, or a message that
//! mentions "rate limit") it is retried after `min(base * 2^n, max)`, and the
//! failure is counted against the call's key. Once a key collects
//! `circuit_breaker_threshold` consecutive rate-limit failures its circuit
//! opens and further calls fail immediately with
//! [`ExecuteError::CircuitOpen`] until `circuit_breaker_timeout` passes.
//!
//! Any other error is returned on the first attempt, untouched.
//!
//! # Circuit states
//!
//! - **Closed**: calls run; rate-limit failures accumulate
//! - **Open**: calls are rejected without running
//!
//! There is no probing half-open state. The first call after the open
//! period expires clears the failure count and runs as a normal attempt.
//!
//! # Examples
//!
//! ```
//! use callguard_executor::{ExecuteError, ExecuteOptions, RateLimitExecutor};
//! use std::time::Duration;
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let executor = RateLimitExecutor::builder()
//!     .name("pharmacy")
//!     .on_circuit_opened(|key, _| eprintln!("{key} is being throttled"))
//!     .build();
//!
//! let options = ExecuteOptions::new("POST /prescriptions")
//!     .max_retries(1)
//!     .base_delay(Duration::from_millis(5))
//!     .circuit_breaker_threshold(1);
//!
//! let first = executor
//!     .execute(&options, || async { Err::<(), _>("429 rate limit".to_string()) })
//!     .await;
//! assert!(first.unwrap_err().is_circuit_open());
//!
//! let second = executor.execute(&options, || async { Ok::<_, String>(()) }).await;
//! assert!(matches!(second, Err(ExecuteError::CircuitOpen { .. })));
//! # }
//! ```

mod backoff;
mod circuit;
mod classifier;
mod config;
mod error;
mod events;
mod executor;
mod layer;
mod options;

pub use backoff::ExponentialBackoff;
pub use circuit::{CircuitSnapshot, CircuitState};
pub use classifier::is_rate_limit_error;
pub use config::{ExecutorConfig, ExecutorConfigBuilder};
pub use error::ExecuteError;
pub use events::ExecutorEvent;
pub use executor::RateLimitExecutor;
pub use layer::ResilientLayer;
pub use options::{ExecuteOptions, RetryObserver};

use crate::layer::KeyExtractor;
use callguard_core::ErrorStatus;
use futures::future::BoxFuture;
use std::task::{Context, Poll};
use tower::{Service, ServiceExt};

/// A Tower [`Service`] that retries rate-limited requests and honors the
/// per-key circuit.
pub struct Resilient<S, Req> {
    inner: S,
    executor: RateLimitExecutor,
    options: ExecuteOptions,
    key_extractor: Option<KeyExtractor<Req>>,
}

impl<S, Req> Resilient<S, Req> {
    pub(crate) fn new(
        inner: S,
        executor: RateLimitExecutor,
        options: ExecuteOptions,
        key_extractor: Option<KeyExtractor<Req>>,
    ) -> Self {
        Self {
            inner,
            executor,
            options,
            key_extractor,
        }
    }

    pub fn executor(&self) -> &RateLimitExecutor {
        &self.executor
    }
}

impl<S: Clone, Req> Clone for Resilient<S, Req> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
            executor: self.executor.clone(),
            options: self.options.clone(),
            key_extractor: self.key_extractor.clone(),
        }
    }
}

impl<S, Req> Service<Req> for Resilient<S, Req>
where
    S: Service<Req> + Clone + Send + 'static,
    S::Future: Send + 'static,
    S::Response: Send + 'static,
    S::Error: ErrorStatus + Send + 'static,
    Req: Clone + Send + 'static,
{
    type Response = S::Response;
    type Error = ExecuteError<S::Error>;
    type Future = BoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx).map_err(ExecuteError::Operation)
    }

    fn call(&mut self, req: Req) -> Self::Future {
        let options = match &self.key_extractor {
            Some(extract) => self.options.with_key(extract(&req)),
            None => self.options.clone(),
        };
        let executor = self.executor.clone();
        let service = self.inner.clone();

        Box::pin(async move {
            executor
                .execute(&options, move || service.clone().oneshot(req.clone()))
                .await
        })
    }
}
