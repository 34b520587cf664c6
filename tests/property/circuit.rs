//! Property tests for the per-key circuit breaker.
//!
//! Invariants tested:
//! - The operation runs at most threshold times before the circuit rejects
//! - Non-rate-limit errors never touch circuit state

use callguard_executor::{ExecuteOptions, RateLimitExecutor};
use proptest::prelude::*;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::runtime::Builder;

proptest! {
    #![proptest_config(ProptestConfig::with_cases(40))]

    /// Property: a persistently throttled key stops invoking the operation
    /// once the threshold is reached
    #[test]
    fn operation_runs_at_most_threshold_times(
        threshold in 1usize..=6,
        max_retries in 0usize..=6,
        calls in 1usize..=6,
    ) {
        let rt = Builder::new_current_thread()
            .enable_time()
            .start_paused(true)
            .build()
            .unwrap();
        rt.block_on(async {
            let executor = RateLimitExecutor::default();
            let options = ExecuteOptions::new("k")
                .max_retries(max_retries)
                .base_delay(Duration::from_millis(10))
                .circuit_breaker_threshold(threshold)
                .circuit_breaker_timeout(Duration::from_secs(3600));
            let invoked = Arc::new(AtomicUsize::new(0));

            for _ in 0..calls {
                let counter = Arc::clone(&invoked);
                let _ = executor
                    .execute(&options, move || {
                        counter.fetch_add(1, Ordering::SeqCst);
                        async { Err::<(), _>("rate limit".to_string()) }
                    })
                    .await;
            }

            let total = calls * (max_retries + 1);
            prop_assert_eq!(invoked.load(Ordering::SeqCst), total.min(threshold));
            Ok(())
        })?;
    }

    /// Property: application errors are returned after one attempt
    #[test]
    fn application_errors_are_not_retried(max_retries in 0usize..=10, threshold in 1usize..=5) {
        let rt = Builder::new_current_thread()
            .enable_time()
            .start_paused(true)
            .build()
            .unwrap();
        rt.block_on(async {
            let executor = RateLimitExecutor::default();
            let options = ExecuteOptions::new("k")
                .max_retries(max_retries)
                .circuit_breaker_threshold(threshold);
            let invoked = Arc::new(AtomicUsize::new(0));

            for _ in 0..threshold + 1 {
                let counter = Arc::clone(&invoked);
                let result = executor
                    .execute(&options, move || {
                        counter.fetch_add(1, Ordering::SeqCst);
                        async { Err::<(), _>("validation failed".to_string()) }
                    })
                    .await;
                prop_assert!(!result.unwrap_err().is_circuit_open());
            }

            prop_assert_eq!(invoked.load(Ordering::SeqCst), threshold + 1);
            prop_assert_eq!(executor.circuit("k").failure_count, 0);
            Ok(())
        })?;
    }
}
