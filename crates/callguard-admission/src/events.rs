use callguard_core::GuardEvent;
use std::time::{Duration, Instant};

/// Events emitted by the admission controller.
#[derive(Debug, Clone)]
pub enum AdmissionEvent {
    /// A check was admitted and recorded in the key's window.
    Permitted {
        source: String,
        key: String,
        timestamp: Instant,
        current: usize,
        remaining: usize,
    },
    /// A check was refused because the key's window is full.
    Limited {
        source: String,
        key: String,
        timestamp: Instant,
        limit: usize,
        retry_after: Duration,
    },
    /// A sweep pruned stale timestamps and dropped empty keys.
    Swept {
        source: String,
        timestamp: Instant,
        removed_keys: usize,
        tracked_keys: usize,
    },
}

impl GuardEvent for AdmissionEvent {
    fn event_type(&self) -> &'static str {
        match self {
            AdmissionEvent::Permitted { .. } => "permitted",
            AdmissionEvent::Limited { .. } => "limited",
            AdmissionEvent::Swept { .. } => "swept",
        }
    }

    fn timestamp(&self) -> Instant {
        match self {
            AdmissionEvent::Permitted { timestamp, .. }
            | AdmissionEvent::Limited { timestamp, .. }
            | AdmissionEvent::Swept { timestamp, .. } => *timestamp,
        }
    }

    fn source(&self) -> &str {
        match self {
            AdmissionEvent::Permitted { source, .. }
            | AdmissionEvent::Limited { source, .. }
            | AdmissionEvent::Swept { source, .. } => source,
        }
    }

    fn key(&self) -> Option<&str> {
        match self {
            AdmissionEvent::Permitted { key, .. } | AdmissionEvent::Limited { key, .. } => {
                Some(key)
            }
            AdmissionEvent::Swept { .. } => None,
        }
    }
}
