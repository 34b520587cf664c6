//! Background sweeping of idle keys.

use callguard_admission::AdmissionController;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::advance;

#[tokio::test(start_paused = true)]
async fn idle_keys_are_dropped() {
    let swept = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&swept);
    let controller = AdmissionController::builder()
        .max_requests(5)
        .window(Duration::from_secs(1))
        .on_swept(move |removed, _| {
            counter.fetch_add(removed, Ordering::SeqCst);
        })
        .build();

    controller.check_key("a");
    controller.check_key("b");
    advance(Duration::from_millis(500)).await;
    controller.check_key("c");
    advance(Duration::from_millis(600)).await;

    assert_eq!(controller.sweep(), 2);
    assert_eq!(controller.tracked_keys(), 1);
    assert_eq!(swept.load(Ordering::SeqCst), 2);
}

#[tokio::test(start_paused = true)]
async fn spawned_sweeper_runs_every_window() {
    let controller = AdmissionController::builder()
        .max_requests(5)
        .window(Duration::from_secs(1))
        .build();
    let handle = controller.spawn_sweeper();

    controller.check_key("a");
    assert_eq!(controller.tracked_keys(), 1);

    tokio::time::sleep(Duration::from_millis(2100)).await;
    assert_eq!(controller.tracked_keys(), 0);
    assert!(!handle.is_finished());

    handle.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn sweeper_stops_with_its_controller() {
    let controller = AdmissionController::builder()
        .window(Duration::from_millis(100))
        .build();
    let handle = controller.spawn_sweeper();
    drop(controller);

    tokio::time::sleep(Duration::from_millis(350)).await;
    assert!(handle.is_finished());
}
