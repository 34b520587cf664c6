//! Which failures are retried and counted.

use super::Calls;
use callguard_core::ErrorStatus;
use callguard_executor::{ExecuteError, ExecuteOptions, RateLimitExecutor};
use std::fmt;
use tokio::time::Instant;

#[derive(Debug, PartialEq)]
struct HttpError {
    status: u16,
    message: &'static str,
}

impl fmt::Display for HttpError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.status, self.message)
    }
}

impl std::error::Error for HttpError {}

impl ErrorStatus for HttpError {
    fn status(&self) -> Option<u16> {
        Some(self.status)
    }
}

#[tokio::test(start_paused = true)]
async fn non_rate_limit_errors_return_immediately() {
    let executor = RateLimitExecutor::default();
    let calls = Calls::default();
    let options = ExecuteOptions::new("k").circuit_breaker_threshold(1);
    let start = Instant::now();

    let c = calls.clone();
    let err = executor
        .execute(&options, move || {
            c.hit();
            async {
                Err::<(), _>(HttpError {
                    status: 500,
                    message: "internal error",
                })
            }
        })
        .await
        .unwrap_err();

    assert_eq!(calls.count(), 1);
    assert_eq!(start.elapsed(), std::time::Duration::ZERO);
    assert_eq!(
        err.into_operation_error(),
        Some(HttpError {
            status: 500,
            message: "internal error"
        })
    );
    assert_eq!(executor.circuit("k").failure_count, 0);
    assert!(!executor.circuit("k").is_open());
}

#[tokio::test(start_paused = true)]
async fn status_429_is_retried_without_any_message() {
    let executor = RateLimitExecutor::default();
    let calls = Calls::default();
    let options = ExecuteOptions::new("k").max_retries(1);

    let c = calls.clone();
    let result = executor
        .execute(&options, move || {
            let n = c.hit();
            async move {
                if n == 1 {
                    Err(HttpError {
                        status: 429,
                        message: "slow down",
                    })
                } else {
                    Ok("done")
                }
            }
        })
        .await;

    assert_eq!(result.unwrap(), "done");
    assert_eq!(calls.count(), 2);
}

#[tokio::test(start_paused = true)]
async fn rate_limit_messages_are_matched_case_insensitively() {
    let executor = RateLimitExecutor::default();
    let calls = Calls::default();
    let options = ExecuteOptions::new("k").max_retries(2).circuit_breaker_threshold(10);

    let c = calls.clone();
    let err = executor
        .execute(&options, move || {
            c.hit();
            async {
                Err::<(), _>(std::io::Error::other("upstream said: RATE LIMIT reached"))
            }
        })
        .await
        .unwrap_err();

    assert_eq!(calls.count(), 3);
    assert!(matches!(err, ExecuteError::Operation(_)));
    assert_eq!(executor.circuit("k").failure_count, 3);
}

#[tokio::test(start_paused = true)]
async fn failure_events_carry_the_classification() {
    let seen = std::sync::Arc::new(std::sync::Mutex::new(Vec::new()));
    let s = std::sync::Arc::clone(&seen);
    let executor = RateLimitExecutor::builder()
        .on_failure(move |key, attempts, rate_limited| {
            s.lock().unwrap().push((key.to_string(), attempts, rate_limited));
        })
        .build();

    let options = ExecuteOptions::new("k").max_retries(1).circuit_breaker_threshold(10);
    let _ = executor
        .execute(&options, || async { Err::<(), _>("not found".to_string()) })
        .await;
    let _ = executor
        .execute(&options, || async { Err::<(), _>("rate limit".to_string()) })
        .await;

    assert_eq!(
        *seen.lock().unwrap(),
        vec![("k".to_string(), 1, false), ("k".to_string(), 2, true)]
    );
}
