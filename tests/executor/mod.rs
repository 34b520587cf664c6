//! Tests for backoff retries and per-key circuit breaking.
//!
//! Test organization:
//! - backoff.rs: delay schedule observed through real retries
//! - circuit.rs: opening, rejection and reclosing
//! - classification.rs: which errors are retried
//! - layer.rs: the Tower service

mod classification;
mod layer;

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// Counts invocations of an operation.
#[derive(Clone, Default)]
pub(crate) struct Calls(Arc<AtomicUsize>);

impl Calls {
    pub(crate) fn hit(&self) -> usize {
        self.0.fetch_add(1, Ordering::SeqCst) + 1
    }

    pub(crate) fn count(&self) -> usize {
        self.0.load(Ordering::SeqCst)
    }
}
