//! Admission controller stress tests

use callguard_admission::AdmissionController;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Test: Concurrent checks on one key never over-admit
#[tokio::test(flavor = "multi_thread", worker_threads = 8)]
async fn concurrent_checks_admit_exactly_the_limit() {
    let controller = AdmissionController::builder()
        .max_requests(100)
        .window(Duration::from_secs(3600))
        .build();
    let admitted = Arc::new(AtomicUsize::new(0));

    let mut handles = Vec::new();
    for _ in 0..32 {
        let controller = controller.clone();
        let admitted = Arc::clone(&admitted);
        handles.push(tokio::spawn(async move {
            for _ in 0..50 {
                if !controller.check_key("shared").is_limited {
                    admitted.fetch_add(1, Ordering::SeqCst);
                }
                tokio::task::yield_now().await;
            }
        }));
    }
    for handle in handles {
        handle.await.unwrap();
    }

    assert_eq!(admitted.load(Ordering::SeqCst), 100);
    assert_eq!(controller.stats()["shared"].requests, 100);
}

/// Test: Many distinct keys, then a sweep
#[tokio::test]
#[ignore]
async fn stress_many_keys() {
    let controller = AdmissionController::builder()
        .max_requests(10)
        .window(Duration::from_millis(200))
        .build();

    let start = Instant::now();
    for i in 0..100_000 {
        controller.check_key(format!("user-{i}"));
    }
    println!("100k distinct keys checked in {:?}", start.elapsed());
    assert_eq!(controller.tracked_keys(), 100_000);

    tokio::time::sleep(Duration::from_millis(250)).await;
    let start = Instant::now();
    assert_eq!(controller.sweep(), 100_000);
    println!("Swept 100k keys in {:?}", start.elapsed());
    assert_eq!(controller.tracked_keys(), 0);
}
