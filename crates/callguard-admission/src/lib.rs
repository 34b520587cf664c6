//! Keyed sliding-window admission control.
//!
//! An [`AdmissionController`] answers one question per call: may this caller
//! make another request right now? Every key (by default the caller's user
//! id) owns a window of request instants. A request is admitted while fewer
//! than `max_requests` instants fall inside the trailing `window`.
//!
//! # Features
//!
//! - **Sliding window**: no fixed buckets, so no burst at bucket edges
//! - **Pluggable keys**: derive the key from any part of the [`RequestContext`]
//! - **Retry hints**: [`enforce`](AdmissionController::enforce) returns a 429-style error
//!   with a whole-second `retry_after`
//! - **Sweeping**: [`sweep`](AdmissionController::sweep) on demand, or a background
//!   task owned through a [`SweeperHandle`]
//! - **Event system**: observe permits, limits and sweeps
//!
//! # Examples
//!
//! ```
//! use callguard_admission::{AdmissionController, RequestContext};
//! use std::time::Duration;
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let controller = AdmissionController::builder()
//!     .max_requests(100)
//!     .window(Duration::from_secs(60))
//!     .name("patient-api")
//!     .on_limited(|key, retry_after| {
//!         println!("{key} must wait {retry_after:?}");
//!     })
//!     .build();
//!
//! let sweeper = controller.spawn_sweeper();
//!
//! match controller.enforce(&RequestContext::for_user("nurse-1")) {
//!     Ok(decision) => println!("{} requests left", decision.remaining),
//!     Err(limited) => println!("429, retry after {}s", limited.retry_after_secs()),
//! }
//!
//! sweeper.shutdown().await;
//! # }
//! ```

mod config;
mod context;
mod controller;
mod error;
mod events;
mod layer;
mod sweeper;
mod window;

pub use config::{AdmissionConfig, AdmissionConfigBuilder, KeyGenerator};
pub use context::{RequestContext, ANONYMOUS_KEY};
pub use controller::{AdmissionController, AdmissionDecision, KeyStats};
pub use error::{AdmissionError, RateLimitedError};
pub use events::AdmissionEvent;
pub use layer::AdmissionLayer;
pub use sweeper::SweeperHandle;

use crate::layer::ContextExtractor;
use futures::future::BoxFuture;
use std::task::{Context, Poll};
use tower::Service;

/// A Tower [`Service`] that refuses requests whose key is over its limit.
///
/// Refused requests never reach the inner service and fail with
/// [`AdmissionError::RateLimited`].
pub struct Admission<S, Req> {
    inner: S,
    controller: AdmissionController,
    extractor: ContextExtractor<Req>,
}

impl<S, Req> Admission<S, Req> {
    pub(crate) fn new(
        inner: S,
        controller: AdmissionController,
        extractor: ContextExtractor<Req>,
    ) -> Self {
        Self {
            inner,
            controller,
            extractor,
        }
    }

    pub fn controller(&self) -> &AdmissionController {
        &self.controller
    }
}

impl<S: Clone, Req> Clone for Admission<S, Req> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
            controller: self.controller.clone(),
            extractor: std::sync::Arc::clone(&self.extractor),
        }
    }
}

impl<S, Req> Service<Req> for Admission<S, Req>
where
    S: Service<Req> + Send,
    S::Future: Send + 'static,
    S::Error: Send + 'static,
    S::Response: Send + 'static,
{
    type Response = S::Response;
    type Error = AdmissionError<S::Error>;
    type Future = BoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx).map_err(AdmissionError::Inner)
    }

    fn call(&mut self, req: Req) -> Self::Future {
        let context = (self.extractor)(&req);
        match self.controller.enforce(&context) {
            Ok(_) => {
                let fut = self.inner.call(req);
                Box::pin(async move { fut.await.map_err(AdmissionError::Inner) })
            }
            Err(limited) => Box::pin(async move { Err(AdmissionError::RateLimited(limited)) }),
        }
    }
}
