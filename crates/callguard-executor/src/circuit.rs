use std::time::Duration;
use tokio::time::Instant;

/// Observable state of one key's circuit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum CircuitState {
    /// Calls are attempted; rate-limit failures accumulate.
    Closed,
    /// Calls are rejected without invoking the operation.
    Open,
}

/// Point-in-time view of a key's circuit, as the next call would see it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CircuitSnapshot {
    pub state: CircuitState,
    /// Consecutive rate-limit failures since the last success or reset.
    pub failure_count: usize,
    /// Time left before the circuit stops rejecting, when open.
    pub open_remaining: Option<Duration>,
}

impl CircuitSnapshot {
    pub(crate) const CLOSED: CircuitSnapshot = CircuitSnapshot {
        state: CircuitState::Closed,
        failure_count: 0,
        open_remaining: None,
    };

    pub fn is_open(&self) -> bool {
        self.state == CircuitState::Open
    }
}

/// Result of consulting a circuit before an attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Admission {
    Closed,
    /// The open period just ran out; the state was cleared.
    Reclosed,
    Open { remaining: Duration },
}

#[derive(Debug, Default)]
pub(crate) struct Circuit {
    failure_count: usize,
    open_until: Option<Instant>,
}

impl Circuit {
    /// Checks whether an attempt may proceed. An expired opening is cleared
    /// here, so the attempt runs against a fresh closed circuit.
    pub(crate) fn admit(&mut self, now: Instant) -> Admission {
        match self.open_until {
            Some(until) if now < until => Admission::Open {
                remaining: until - now,
            },
            Some(_) => {
                self.failure_count = 0;
                self.open_until = None;
                Admission::Reclosed
            }
            None => Admission::Closed,
        }
    }

    pub(crate) fn record_success(&mut self) {
        self.failure_count = 0;
        self.open_until = None;
    }

    /// Counts a rate-limit failure. Returns the new failure count when this
    /// failure opened the circuit.
    pub(crate) fn record_rate_limited(
        &mut self,
        now: Instant,
        threshold: usize,
        timeout: Duration,
    ) -> Option<usize> {
        self.failure_count += 1;
        let already_open = self.open_until.is_some_and(|until| now < until);
        if self.failure_count >= threshold && !already_open {
            self.open_until = Some(open_until(now, timeout));
            Some(self.failure_count)
        } else {
            None
        }
    }

    pub(crate) fn snapshot(&self, now: Instant) -> CircuitSnapshot {
        match self.open_until {
            Some(until) if now < until => CircuitSnapshot {
                state: CircuitState::Open,
                failure_count: self.failure_count,
                open_remaining: Some(until - now),
            },
            Some(_) => CircuitSnapshot::CLOSED,
            None => CircuitSnapshot {
                state: CircuitState::Closed,
                failure_count: self.failure_count,
                open_remaining: None,
            },
        }
    }
}

/// Stand-in for "never" when a timeout would overflow `Instant`.
const FAR_FUTURE: Duration = Duration::from_secs(86_400 * 365 * 30);

fn open_until(now: Instant, timeout: Duration) -> Instant {
    now.checked_add(timeout)
        .or_else(|| now.checked_add(FAR_FUTURE))
        .unwrap_or(now)
}
