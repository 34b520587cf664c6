//! Core infrastructure for callguard.
//!
//! This crate holds what the admission controller, the resilient executor and
//! the response cache share:
//! - Event system for observability
//! - Unified error type for composed stacks
//! - [`ErrorStatus`], the HTTP-style status hook used to classify failures
//! - A wall clock port for components that persist timestamps

pub mod clock;
pub mod error;
pub mod events;
pub mod status;

pub use clock::{Clock, SharedClock, SystemClock};
pub use error::GuardError;
pub use events::{EventListener, EventListeners, FnListener, GuardEvent};
pub use status::{ErrorStatus, TOO_MANY_REQUESTS};

#[cfg(any(test, feature = "test-helpers"))]
pub use clock::ManualClock;
