//! Expiry on read, driven by a manual clock.

use super::base;
use callguard_cache::{
    AssetClass, CachedResponse, ResponseCache, CACHED_AT_HEADER, TTL_HEADER,
};
use callguard_core::ManualClock;
use std::time::Duration;

fn cache(clock: &ManualClock) -> ResponseCache {
    ResponseCache::builder()
        .name("ttl")
        .base_url(base())
        .clock(clock.clone())
        .build()
}

#[test]
fn entry_is_gone_after_its_ttl() {
    let clock = ManualClock::new(1_000_000);
    let cache = cache(&clock);

    cache
        .cache_api_response("/x", &CachedResponse::ok("payload"), Duration::from_millis(5000))
        .unwrap();
    let hit = cache.get_cached_api_response("/x").unwrap();
    assert_eq!(hit.unwrap().body().as_ref(), b"payload");

    clock.advance(Duration::from_millis(6000));
    assert!(cache.get_cached_api_response("/x").unwrap().is_none());
    assert_eq!(cache.entry_count(AssetClass::Api), 0);
}

#[test]
fn entry_is_still_served_when_age_equals_ttl() {
    let clock = ManualClock::new(0);
    let cache = cache(&clock);

    cache
        .cache_api_response("/x", &CachedResponse::ok("payload"), Duration::from_millis(5000))
        .unwrap();

    clock.advance(Duration::from_millis(5000));
    assert!(cache.get_cached_api_response("/x").unwrap().is_some());

    clock.advance(Duration::from_millis(1));
    assert!(cache.get_cached_api_response("/x").unwrap().is_none());
    assert_eq!(cache.entry_count(AssetClass::Api), 0);
}

#[test]
fn metadata_headers_hold_integer_milliseconds() {
    let clock = ManualClock::new(1_717_000_000_123);
    let cache = cache(&clock);

    cache
        .cache_api_response("/api/labs", &CachedResponse::ok("[]"), Duration::from_secs(90))
        .unwrap();
    let entry = cache.get_cached_api_response("/api/labs").unwrap().unwrap();

    assert_eq!(entry.headers()[CACHED_AT_HEADER], "1717000000123");
    assert_eq!(entry.headers()[TTL_HEADER], "90000");
}

#[test]
fn restoring_overwrites_the_timestamp() {
    let clock = ManualClock::new(0);
    let cache = cache(&clock);
    let ttl = Duration::from_secs(10);

    cache.cache_api_response("/api/a", &CachedResponse::ok("1"), ttl).unwrap();
    clock.advance(Duration::from_secs(8));
    cache.cache_api_response("/api/a", &CachedResponse::ok("2"), ttl).unwrap();
    clock.advance(Duration::from_secs(8));

    let entry = cache.get_cached_api_response("/api/a").unwrap().unwrap();
    assert_eq!(entry.body().as_ref(), b"2");
    assert_eq!(entry.age(16_000), Some(Duration::from_secs(8)));
}

#[test]
fn entries_without_metadata_never_expire() {
    let response = CachedResponse::ok("legacy");
    assert!(response.is_fresh(u64::MAX));
}
