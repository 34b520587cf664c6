use crate::window::instant_after;
use crate::AdmissionController;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};

/// Owns the background task started by [`AdmissionController::spawn_sweeper`].
///
/// The task stops when the handle is shut down or dropped, or once every
/// clone of the controller has been dropped.
#[derive(Debug)]
pub struct SweeperHandle {
    task: Option<JoinHandle<()>>,
}

impl SweeperHandle {
    /// Stops the sweeper and waits for the task to wind down.
    pub async fn shutdown(mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
            let _ = task.await;
        }
    }

    pub fn is_finished(&self) -> bool {
        self.task.as_ref().map_or(true, JoinHandle::is_finished)
    }
}

impl Drop for SweeperHandle {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

impl AdmissionController {
    /// Starts a task that calls [`sweep`](Self::sweep) once per window.
    ///
    /// The task holds only a weak reference to the controller's state.
    ///
    /// # Panics
    ///
    /// Panics if called outside a Tokio runtime.
    pub fn spawn_sweeper(&self) -> SweeperHandle {
        let shared = Arc::downgrade(&self.shared);
        let period = self.shared.config.window;

        let task = tokio::spawn(async move {
            let mut interval = tokio::time::interval_at(instant_after(Instant::now(), period), period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

            loop {
                interval.tick().await;
                let Some(shared) = shared.upgrade() else {
                    break;
                };
                shared.sweep();
            }
        });

        SweeperHandle { task: Some(task) }
    }
}
