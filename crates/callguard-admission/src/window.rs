use std::collections::VecDeque;
use std::time::Duration;
use tokio::time::Instant;

/// Stand-in for "never" when a window would overflow `Instant`.
const FAR_FUTURE: Duration = Duration::from_secs(86_400 * 365 * 30);

pub(crate) fn instant_after(at: Instant, by: Duration) -> Instant {
    at.checked_add(by)
        .or_else(|| at.checked_add(FAR_FUTURE))
        .unwrap_or(at)
}

/// Request instants recorded for one key, oldest first.
#[derive(Debug, Default)]
pub(crate) struct RateLimitWindow {
    timestamps: VecDeque<Instant>,
}

impl RateLimitWindow {
    /// Drops every instant at or before `now - window`.
    pub(crate) fn prune(&mut self, now: Instant, window: Duration) {
        while let Some(&oldest) = self.timestamps.front() {
            if now.saturating_duration_since(oldest) >= window {
                self.timestamps.pop_front();
            } else {
                break;
            }
        }
    }

    /// Number of instants inside the window ending at `now`, without pruning.
    pub(crate) fn count_within(&self, now: Instant, window: Duration) -> usize {
        self.timestamps
            .iter()
            .filter(|&&t| now.saturating_duration_since(t) < window)
            .count()
    }

    /// When the oldest retained instant leaves the window.
    pub(crate) fn reset_time(&self, now: Instant, window: Duration) -> Instant {
        self.timestamps
            .front()
            .map_or(instant_after(now, window), |&oldest| instant_after(oldest, window))
    }

    pub(crate) fn record(&mut self, now: Instant) {
        self.timestamps.push_back(now);
    }

    pub(crate) fn len(&self) -> usize {
        self.timestamps.len()
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.timestamps.is_empty()
    }
}
