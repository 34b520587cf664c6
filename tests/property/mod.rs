//! Property-based tests for callguard components.
//!
//! Run with: cargo test --test property_tests

pub mod backoff;
pub mod cache_ttl;
pub mod circuit;
