//! Property tests for cache expiry.
//!
//! Invariants tested:
//! - An entry is served while its age is within its TTL
//! - Once its age exceeds the TTL it is absent and purged

use callguard_cache::{AssetClass, CachedResponse, ResponseCache};
use callguard_core::ManualClock;
use proptest::prelude::*;
use std::time::Duration;
use url::Url;

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    /// Property: freshness is exactly age <= ttl
    #[test]
    fn served_iff_age_within_ttl(
        start in 0u64..=1_900_000_000_000,
        ttl_ms in 0u64..=86_400_000,
        age_ms in 0u64..=172_800_000,
    ) {
        let clock = ManualClock::new(start);
        let cache = ResponseCache::builder()
            .base_url(Url::parse("https://clinic.test").unwrap())
            .clock(clock.clone())
            .build();

        cache
            .cache_api_response("/api/x", &CachedResponse::ok("x"), Duration::from_millis(ttl_ms))
            .unwrap();
        clock.advance(Duration::from_millis(age_ms));

        let found = cache.get_cached_api_response("/api/x").unwrap();
        prop_assert_eq!(found.is_some(), age_ms <= ttl_ms);
        prop_assert_eq!(cache.entry_count(AssetClass::Api), usize::from(age_ms <= ttl_ms));
    }
}
