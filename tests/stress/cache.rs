//! Response cache stress tests

use callguard_cache::{AssetClass, CachedResponse, ResponseCache};
use std::time::{Duration, Instant};
use url::Url;

/// Test: Bounded namespaces stay within capacity under churn
#[test]
fn bounded_cache_stays_within_capacity() {
    let cache = ResponseCache::builder()
        .base_url(Url::parse("https://clinic.test").unwrap())
        .capacity(128)
        .build();

    for i in 0..10_000 {
        cache
            .cache_api_response(
                &format!("/api/patients/{i}"),
                &CachedResponse::ok(format!("patient {i}")),
                Duration::from_secs(60),
            )
            .unwrap();
    }

    assert_eq!(cache.entry_count(AssetClass::Api), 128);
    assert!(cache.get_cached_api_response("/api/patients/9999").unwrap().is_some());
    assert!(cache.get_cached_api_response("/api/patients/0").unwrap().is_none());
}

/// Test: Concurrent readers and writers
#[tokio::test(flavor = "multi_thread", worker_threads = 8)]
#[ignore]
async fn stress_concurrent_reads_and_writes() {
    let cache = ResponseCache::builder()
        .base_url(Url::parse("https://clinic.test").unwrap())
        .build();
    let start = Instant::now();

    let mut handles = Vec::new();
    for worker in 0..8 {
        let cache = cache.clone();
        handles.push(tokio::spawn(async move {
            for i in 0..10_000 {
                let url = format!("/api/wards/{}", (worker * 10_000 + i) % 500);
                cache
                    .cache_api_response(&url, &CachedResponse::ok("ward"), Duration::from_secs(60))
                    .unwrap();
                assert!(cache.get_cached_api_response(&url).unwrap().is_some());
            }
        }));
    }
    for handle in handles {
        handle.await.unwrap();
    }

    println!("160k cache operations in {:?}", start.elapsed());
    assert_eq!(cache.entry_count(AssetClass::Api), 500);
}
