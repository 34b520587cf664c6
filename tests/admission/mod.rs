//! Tests for keyed sliding-window admission.
//!
//! Test organization:
//! - sliding_window.rs: window boundaries and the limit bound
//! - keys.rs: key derivation, isolation and reset
//! - sweeper.rs: background pruning and shutdown
//! - layer.rs: the Tower service

mod sweeper;
