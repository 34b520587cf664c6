//! Resilience for outbound calls to rate-limited backends.
//!
//! `callguard` bundles three components that can be used alone or stacked
//! around the same operation. Each is available as its own crate and as a
//! feature of this meta-crate.
//!
//! # Components
//!
//! - **Admission** (`admission` feature): keyed sliding-window admission
//!   control that refuses work above `max_requests` per window
//! - **Executor** (`executor` feature): exponential backoff for rate-limit
//!   failures plus a per-key circuit breaker
//! - **Cache** (`cache` feature): versioned TTL response cache with
//!   cache-first and network-first fetching
//!
//! The `metrics` and `tracing` features are forwarded to every enabled
//! component.
//!
//! # Usage
//!
//! ```toml
//! [dependencies]
//! callguard = { version = "0.1", features = ["admission", "executor"] }
//! ```
//!
//! # Example
//!
//! An executor retrying calls that the admission controller refuses. A
//! refusal is a 429, so the executor backs off and tries again once the
//! window has room.
//!
//! ```rust,no_run
//! # #[cfg(all(feature = "admission", feature = "executor"))]
//! # {
//! use callguard::admission::{AdmissionController, RequestContext};
//! use callguard::executor::{ExecuteOptions, RateLimitExecutor, ResilientLayer};
//! use std::time::Duration;
//! use tower::ServiceBuilder;
//!
//! # async fn example() {
//! let admission = AdmissionController::builder()
//!     .name("records")
//!     .max_requests(10)
//!     .window(Duration::from_secs(1))
//!     .build();
//!
//! let retries = ResilientLayer::<String>::new(
//!     RateLimitExecutor::builder().name("records").build(),
//!     ExecuteOptions::new("records").base_delay(Duration::from_millis(250)),
//! );
//!
//! let service = ServiceBuilder::new()
//!     .layer(retries)
//!     .layer(admission.layer(|_: &String| RequestContext::for_user("clinician-7")))
//!     .service(tower::service_fn(|req: String| async move {
//!         Ok::<_, std::io::Error>(req)
//!     }));
//! # let _ = service;
//! # }
//! # }
//! ```
//!
//! # Individual Crates
//!
//! - `callguard-admission`
//! - `callguard-executor`
//! - `callguard-cache`
//! - `callguard-core` (events, unified error, clock)

// Re-export core (always available)
pub use callguard_core as core;
pub use callguard_core::{ErrorStatus, GuardError};

#[cfg(feature = "admission")]
pub use callguard_admission as admission;

#[cfg(feature = "executor")]
pub use callguard_executor as executor;

#[cfg(feature = "cache")]
pub use callguard_cache as cache;
