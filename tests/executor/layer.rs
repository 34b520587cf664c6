//! The resilient Tower service.

use super::Calls;
use callguard_core::GuardError;
use callguard_executor::{ExecuteOptions, RateLimitExecutor, ResilientLayer};
use std::time::Duration;
use tower::{ServiceBuilder, ServiceExt};

#[tokio::test(start_paused = true)]
async fn requests_are_resent_after_rate_limiting() {
    let calls = Calls::default();
    let c = calls.clone();
    let inner = tower::service_fn(move |req: String| {
        let n = c.hit();
        async move {
            if n < 3 {
                Err("rate limit".to_string())
            } else {
                Ok(format!("{req} after {n} calls"))
            }
        }
    });

    let service = ServiceBuilder::new()
        .layer(ResilientLayer::<String>::new(
            RateLimitExecutor::default(),
            ExecuteOptions::new("svc").base_delay(Duration::from_millis(50)),
        ))
        .service(inner);

    let response = service.oneshot("GET /wards".to_string()).await.unwrap();
    assert_eq!(response, "GET /wards after 3 calls");
}

#[tokio::test(start_paused = true)]
async fn circuit_open_converts_into_guard_error() {
    let inner = tower::service_fn(|_: String| async { Err::<(), _>("rate limit".to_string()) });
    let executor = RateLimitExecutor::default();
    let layer = ResilientLayer::<String>::new(
        executor.clone(),
        ExecuteOptions::new("svc")
            .max_retries(0)
            .circuit_breaker_threshold(1),
    );
    let service = ServiceBuilder::new().layer(layer).service(inner);

    let first = service.clone().oneshot("a".to_string()).await.unwrap_err();
    let unified: GuardError<String> = first.into();
    assert!(unified.is_application());

    let second = service.oneshot("b".to_string()).await.unwrap_err();
    let unified: GuardError<String> = second.into();
    assert!(unified.is_circuit_open());
}
