use std::time::Duration;

/// Doubling backoff capped at a maximum interval.
///
/// Attempt `n` (0-indexed) waits `min(initial * 2^n, max)`. Growth that would
/// overflow a [`Duration`] saturates at the cap.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExponentialBackoff {
    initial_interval: Duration,
    max_interval: Duration,
}

impl ExponentialBackoff {
    pub fn new(initial_interval: Duration, max_interval: Duration) -> Self {
        Self {
            initial_interval,
            max_interval,
        }
    }

    /// Delay before the retry that follows failed attempt `attempt`.
    pub fn next_interval(&self, attempt: usize) -> Duration {
        u32::try_from(attempt)
            .ok()
            .and_then(|n| 2u32.checked_pow(n))
            .and_then(|factor| self.initial_interval.checked_mul(factor))
            .map_or(self.max_interval, |interval| interval.min(self.max_interval))
    }

    /// The first `n` delays, in order.
    pub fn delays(&self, n: usize) -> impl Iterator<Item = Duration> + '_ {
        (0..n).map(move |attempt| self.next_interval(attempt))
    }
}
