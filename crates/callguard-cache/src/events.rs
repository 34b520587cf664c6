use callguard_core::GuardEvent;
use std::time::{Duration, Instant};

/// Events emitted by the response cache.
#[derive(Debug, Clone)]
pub enum CacheEvent {
    /// A cached entry was served.
    Hit {
        source: String,
        url: String,
        timestamp: Instant,
        namespace: String,
    },
    /// No usable entry existed.
    Miss {
        source: String,
        url: String,
        timestamp: Instant,
        namespace: String,
    },
    /// A response was written.
    Stored {
        source: String,
        url: String,
        timestamp: Instant,
        namespace: String,
        ttl: Option<Duration>,
    },
    /// A stale entry was found on read and deleted.
    Expired {
        source: String,
        url: String,
        timestamp: Instant,
        age: Duration,
    },
    /// Network-first served a cached entry after the network failed.
    Fallback {
        source: String,
        url: String,
        timestamp: Instant,
    },
    /// Namespaces were deleted by a generation sweep or a full clear.
    Cleared {
        source: String,
        timestamp: Instant,
        namespaces: Vec<String>,
    },
}

impl GuardEvent for CacheEvent {
    fn event_type(&self) -> &'static str {
        match self {
            CacheEvent::Hit { .. } => "hit",
            CacheEvent::Miss { .. } => "miss",
            CacheEvent::Stored { .. } => "stored",
            CacheEvent::Expired { .. } => "expired",
            CacheEvent::Fallback { .. } => "fallback",
            CacheEvent::Cleared { .. } => "cleared",
        }
    }

    fn timestamp(&self) -> Instant {
        match self {
            CacheEvent::Hit { timestamp, .. }
            | CacheEvent::Miss { timestamp, .. }
            | CacheEvent::Stored { timestamp, .. }
            | CacheEvent::Expired { timestamp, .. }
            | CacheEvent::Fallback { timestamp, .. }
            | CacheEvent::Cleared { timestamp, .. } => *timestamp,
        }
    }

    fn source(&self) -> &str {
        match self {
            CacheEvent::Hit { source, .. }
            | CacheEvent::Miss { source, .. }
            | CacheEvent::Stored { source, .. }
            | CacheEvent::Expired { source, .. }
            | CacheEvent::Fallback { source, .. }
            | CacheEvent::Cleared { source, .. } => source,
        }
    }

    /// The normalized URL, for per-entry events.
    fn key(&self) -> Option<&str> {
        match self {
            CacheEvent::Hit { url, .. }
            | CacheEvent::Miss { url, .. }
            | CacheEvent::Stored { url, .. }
            | CacheEvent::Expired { url, .. }
            | CacheEvent::Fallback { url, .. } => Some(url),
            CacheEvent::Cleared { .. } => None,
        }
    }
}
