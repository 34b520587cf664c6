use callguard_core::GuardEvent;
use std::time::{Duration, Instant};

/// Events emitted by the resilient executor.
#[derive(Debug, Clone)]
pub enum ExecutorEvent {
    /// A rate-limited attempt failed and another one is scheduled.
    Retry {
        source: String,
        key: String,
        timestamp: Instant,
        /// 1-based number of the retry about to happen.
        attempt: usize,
        delay: Duration,
    },
    /// The operation succeeded.
    Success {
        source: String,
        key: String,
        timestamp: Instant,
        attempts: usize,
    },
    /// The operation failed and the error was handed back to the caller.
    Failure {
        source: String,
        key: String,
        timestamp: Instant,
        attempts: usize,
        rate_limited: bool,
    },
    /// Consecutive rate-limit failures reached the threshold.
    CircuitOpened {
        source: String,
        key: String,
        timestamp: Instant,
        failure_count: usize,
        open_for: Duration,
    },
    /// An open period expired and the next call found the circuit closed.
    CircuitClosed {
        source: String,
        key: String,
        timestamp: Instant,
    },
    /// A call was refused because the key's circuit is open.
    CallRejected {
        source: String,
        key: String,
        timestamp: Instant,
        open_remaining: Duration,
    },
}

impl GuardEvent for ExecutorEvent {
    fn event_type(&self) -> &'static str {
        match self {
            ExecutorEvent::Retry { .. } => "retry",
            ExecutorEvent::Success { .. } => "success",
            ExecutorEvent::Failure { .. } => "failure",
            ExecutorEvent::CircuitOpened { .. } => "circuit_opened",
            ExecutorEvent::CircuitClosed { .. } => "circuit_closed",
            ExecutorEvent::CallRejected { .. } => "call_rejected",
        }
    }

    fn timestamp(&self) -> Instant {
        match self {
            ExecutorEvent::Retry { timestamp, .. }
            | ExecutorEvent::Success { timestamp, .. }
            | ExecutorEvent::Failure { timestamp, .. }
            | ExecutorEvent::CircuitOpened { timestamp, .. }
            | ExecutorEvent::CircuitClosed { timestamp, .. }
            | ExecutorEvent::CallRejected { timestamp, .. } => *timestamp,
        }
    }

    fn source(&self) -> &str {
        match self {
            ExecutorEvent::Retry { source, .. }
            | ExecutorEvent::Success { source, .. }
            | ExecutorEvent::Failure { source, .. }
            | ExecutorEvent::CircuitOpened { source, .. }
            | ExecutorEvent::CircuitClosed { source, .. }
            | ExecutorEvent::CallRejected { source, .. } => source,
        }
    }

    fn key(&self) -> Option<&str> {
        match self {
            ExecutorEvent::Retry { key, .. }
            | ExecutorEvent::Success { key, .. }
            | ExecutorEvent::Failure { key, .. }
            | ExecutorEvent::CircuitOpened { key, .. }
            | ExecutorEvent::CircuitClosed { key, .. }
            | ExecutorEvent::CallRejected { key, .. } => Some(key),
        }
    }
}
