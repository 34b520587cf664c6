//! The caching Tower service.

use super::{base, Origin};
use callguard_cache::{CacheStrategyLayer, FetchStrategy, ResponseCache};
use callguard_core::GuardError;
use tower::{Layer, ServiceBuilder, ServiceExt};

#[tokio::test]
async fn layer_applies_the_configured_strategy() {
    let origin = Origin::default();
    let cache = ResponseCache::builder().base_url(base()).build();

    let service = ServiceBuilder::new()
        .layer(CacheStrategyLayer::new(cache.clone()).strategy(FetchStrategy::CacheFirst))
        .service(origin.clone());

    for _ in 0..4 {
        let response = service.clone().oneshot("/api/wards").await.unwrap();
        assert_eq!(response.body().as_ref(), b"/api/wards v1");
    }
    assert_eq!(origin.calls(), 1);
}

#[tokio::test]
async fn offline_errors_convert_into_guard_errors() {
    let origin = Origin::default();
    origin.set_offline(true);
    let service = ResponseCache::builder()
        .base_url(base())
        .build()
        .layer()
        .layer(origin);

    let err = service.oneshot("/api/wards").await.unwrap_err();
    let unified: GuardError<std::io::Error> = err.into();
    assert!(matches!(
        unified,
        GuardError::NoCacheAvailable { ref url } if url == "https://clinic.test/api/wards"
    ));
}
