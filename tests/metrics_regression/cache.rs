//! Response cache metrics regression tests

use super::helpers::*;
use serial_test::serial;

use callguard_cache::{CachedResponse, ResponseCache};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use url::Url;

#[tokio::test]
#[serial]
async fn cache_metrics_exist() {
    init_recorder();

    let cache = ResponseCache::builder()
        .name("test_cache")
        .base_url(Url::parse("https://clinic.test").unwrap())
        .build();

    cache.get_cached_api_response("/api/a").unwrap();
    cache
        .cache_api_response("/api/a", &CachedResponse::ok("a"), Duration::from_secs(60))
        .unwrap();
    cache.get_cached_api_response("/api/a").unwrap();

    assert_counter_exists("response_cache_requests_total");
    assert_metric_has_label("response_cache_requests_total", "cache", "test_cache");
    assert_metric_has_label("response_cache_requests_total", "result", "hit");
    assert_metric_has_label("response_cache_requests_total", "result", "miss");
}

#[tokio::test]
#[serial]
async fn cache_fallback_metric() {
    init_recorder();

    let offline = Arc::new(AtomicBool::new(false));
    let flag = Arc::clone(&offline);
    let mut origin = tower::service_fn(move |_: Url| {
        let down = flag.load(Ordering::SeqCst);
        async move {
            if down {
                Err(std::io::Error::other("offline"))
            } else {
                Ok(CachedResponse::ok("fresh"))
            }
        }
    });

    let cache = ResponseCache::builder()
        .name("fallback_cache")
        .base_url(Url::parse("https://clinic.test").unwrap())
        .build();

    cache.network_first(&mut origin, "/api/b").await.unwrap();
    offline.store(true, Ordering::SeqCst);
    cache.network_first(&mut origin, "/api/b").await.unwrap();

    assert_counter_exists("response_cache_fallbacks_total");
    assert_metric_has_label("response_cache_fallbacks_total", "cache", "fallback_cache");
}
