//! Property tests for exponential backoff.
//!
//! Invariants tested:
//! - Delay n equals min(base * 2^n, max)
//! - Delays never decrease and never exceed max

use callguard_executor::ExponentialBackoff;
use proptest::prelude::*;
use std::time::Duration;

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    /// Property: delays follow min(base * 2^n, max)
    #[test]
    fn delays_match_the_formula(
        base_ms in 1u64..=5_000,
        max_ms in 1u64..=120_000,
        attempt in 0usize..=20,
    ) {
        let backoff = ExponentialBackoff::new(
            Duration::from_millis(base_ms),
            Duration::from_millis(max_ms),
        );
        let expected = (base_ms as u128 * (1u128 << attempt)).min(max_ms as u128);
        prop_assert_eq!(backoff.next_interval(attempt).as_millis(), expected);
    }

    /// Property: the schedule is monotone and capped
    #[test]
    fn schedule_is_monotone_and_capped(
        base_ms in 1u64..=5_000,
        max_ms in 1u64..=120_000,
        n in 1usize..=64,
    ) {
        let max = Duration::from_millis(max_ms);
        let backoff = ExponentialBackoff::new(Duration::from_millis(base_ms), max);
        let delays: Vec<Duration> = backoff.delays(n).collect();

        prop_assert!(delays.windows(2).all(|pair| pair[0] <= pair[1]));
        prop_assert!(delays.iter().all(|&d| d <= max));
    }
}
