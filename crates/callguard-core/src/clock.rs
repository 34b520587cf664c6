//! Wall clock port.
//!
//! Monotonic bookkeeping (rate-limit windows, circuit timeouts) uses
//! `tokio::time::Instant` directly. Components that serialize timestamps,
//! such as the response cache's metadata headers, need wall-clock
//! milliseconds instead and read them through [`Clock`] so tests can pin
//! the time.

use std::fmt;
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

/// Source of wall-clock time in milliseconds since the Unix epoch.
pub trait Clock: Send + Sync + fmt::Debug {
    fn now_millis(&self) -> u64;
}

/// Shared handle to a clock.
pub type SharedClock = Arc<dyn Clock>;

/// Clock backed by [`SystemTime`].
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl SystemClock {
    pub fn new() -> Self {
        Self
    }

    /// Returns the system clock as a [`SharedClock`].
    pub fn shared() -> SharedClock {
        Arc::new(Self)
    }
}

impl Clock for SystemClock {
    fn now_millis(&self) -> u64 {
        // A clock set before 1970 reads as the epoch.
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis() as u64)
            .unwrap_or(0)
    }
}

#[cfg(any(test, feature = "test-helpers"))]
pub use manual::ManualClock;

#[cfg(any(test, feature = "test-helpers"))]
mod manual {
    use super::Clock;
    use std::sync::atomic::{AtomicU64, Ordering};
    use std::sync::Arc;
    use std::time::Duration;

    /// Clock whose time only moves when told to.
    ///
    /// Clones share the same time, so a clone handed to a component can be
    /// advanced from the test body.
    ///
    /// ```rust,ignore
    /// use callguard_core::{Clock, ManualClock};
    /// use std::time::Duration;
    ///
    /// let clock = ManualClock::new(1_000);
    /// clock.advance(Duration::from_millis(250));
    /// assert_eq!(clock.now_millis(), 1_250);
    /// ```
    #[derive(Debug, Clone, Default)]
    pub struct ManualClock {
        millis: Arc<AtomicU64>,
    }

    impl ManualClock {
        /// Creates a clock reading `start_millis`.
        pub fn new(start_millis: u64) -> Self {
            Self {
                millis: Arc::new(AtomicU64::new(start_millis)),
            }
        }

        pub fn advance(&self, by: Duration) {
            self.millis
                .fetch_add(by.as_millis() as u64, Ordering::SeqCst);
        }

        pub fn set(&self, millis: u64) {
            self.millis.store(millis, Ordering::SeqCst);
        }
    }

    impl Clock for ManualClock {
        fn now_millis(&self) -> u64 {
            self.millis.load(Ordering::SeqCst)
        }
    }
}
