use crate::config::AdmissionConfig;
use crate::context::RequestContext;
use crate::error::RateLimitedError;
use crate::events::AdmissionEvent;
use crate::window::RateLimitWindow;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;
use tokio::time::Instant;

#[cfg(feature = "metrics")]
use metrics::{counter, gauge};

#[cfg(feature = "tracing")]
use tracing::debug;

/// Outcome of a single admission check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdmissionDecision {
    /// The key the check counted against.
    pub key: String,
    /// Configured maximum requests per window.
    pub limit: usize,
    /// Requests already in the window before this check.
    pub current: usize,
    /// `limit - current`, floored at zero.
    pub remaining: usize,
    /// When the oldest retained request leaves the window.
    pub reset_time: Instant,
    pub is_limited: bool,
}

impl AdmissionDecision {
    /// Time until [`reset_time`](Self::reset_time) rounded up to whole seconds.
    pub fn retry_after(&self, now: Instant) -> Duration {
        ceil_secs(self.reset_time.saturating_duration_since(now))
    }
}

/// Per-key usage reported by [`AdmissionController::stats`].
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct KeyStats {
    /// Requests currently inside the window.
    pub requests: usize,
    /// `requests / max_requests * 100`.
    pub percentage: f64,
}

pub(crate) struct Shared {
    pub(crate) config: AdmissionConfig,
    windows: Mutex<HashMap<String, RateLimitWindow>>,
}

impl Shared {
    fn windows(&self) -> std::sync::MutexGuard<'_, HashMap<String, RateLimitWindow>> {
        self.windows.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Prunes every key and drops the ones left empty. Returns keys removed.
    pub(crate) fn sweep(&self) -> usize {
        let now = Instant::now();
        let window = self.config.window;

        let (removed, tracked) = {
            let mut windows = self.windows();
            let before = windows.len();
            windows.retain(|_, w| {
                w.prune(now, window);
                !w.is_empty()
            });
            (before - windows.len(), windows.len())
        };

        #[cfg(feature = "tracing")]
        debug!(
            admission = %self.config.name,
            removed_keys = removed,
            tracked_keys = tracked,
            "swept admission windows"
        );

        #[cfg(feature = "metrics")]
        gauge!("admission_tracked_keys", "admission" => self.config.name.clone()).set(tracked as f64);

        self.config.event_listeners.emit(&AdmissionEvent::Swept {
            source: self.config.name.clone(),
            timestamp: std::time::Instant::now(),
            removed_keys: removed,
            tracked_keys: tracked,
        });

        removed
    }
}

/// Keyed sliding-window admission controller.
///
/// Each key owns a window of request instants. A check prunes instants older
/// than the window, compares the remaining count against the limit and, when
/// admitted, records the current instant. Pruning, counting and recording
/// happen under one lock, so concurrent checks on the same key can never
/// admit more than `max_requests` inside a window.
///
/// Cloning is cheap; clones share the same windows.
///
/// # Examples
///
/// ```
/// use callguard_admission::{AdmissionController, RequestContext};
/// use std::time::Duration;
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() {
/// let controller = AdmissionController::builder()
///     .max_requests(2)
///     .window(Duration::from_secs(1))
///     .build();
///
/// let ctx = RequestContext::for_user("nurse-9");
/// assert!(!controller.check(&ctx).is_limited);
/// assert!(!controller.check(&ctx).is_limited);
/// assert!(controller.check(&ctx).is_limited);
/// # }
/// ```
#[derive(Clone)]
pub struct AdmissionController {
    pub(crate) shared: Arc<Shared>,
}

impl AdmissionController {
    /// Creates a controller from a finished configuration.
    pub fn new(config: AdmissionConfig) -> Self {
        Self {
            shared: Arc::new(Shared {
                config,
                windows: Mutex::new(HashMap::new()),
            }),
        }
    }

    /// Shorthand for [`AdmissionConfig::builder`].
    pub fn builder() -> crate::AdmissionConfigBuilder {
        AdmissionConfig::builder()
    }

    pub fn config(&self) -> &AdmissionConfig {
        &self.shared.config
    }

    /// The key a context counts against.
    pub fn key_for(&self, context: &RequestContext) -> String {
        (self.shared.config.key_generator)(context)
    }

    /// Checks the context's key and records the request when admitted.
    pub fn check(&self, context: &RequestContext) -> AdmissionDecision {
        self.check_key(self.key_for(context))
    }

    /// Checks an explicit key and records the request when admitted.
    pub fn check_key(&self, key: impl Into<String>) -> AdmissionDecision {
        let key = key.into();
        let config = &self.shared.config;
        let now = Instant::now();

        let (current, reset_time, is_limited, tracked) = {
            let mut windows = self.shared.windows();
            let window = windows.entry(key.clone()).or_default();
            window.prune(now, config.window);

            let current = window.len();
            let reset_time = window.reset_time(now, config.window);
            let is_limited = current >= config.max_requests;
            if !is_limited {
                window.record(now);
            }
            (current, reset_time, is_limited, windows.len())
        };

        let decision = AdmissionDecision {
            key,
            limit: config.max_requests,
            current,
            remaining: config.max_requests.saturating_sub(current),
            reset_time,
            is_limited,
        };

        #[cfg(feature = "metrics")]
        {
            let result = if is_limited { "limited" } else { "permitted" };
            counter!("admission_checks_total", "admission" => config.name.clone(), "result" => result)
                .increment(1);
            gauge!("admission_tracked_keys", "admission" => config.name.clone()).set(tracked as f64);
        }
        #[cfg(not(feature = "metrics"))]
        let _ = tracked;

        if is_limited {
            let retry_after = decision.retry_after(now);

            #[cfg(feature = "tracing")]
            debug!(
                admission = %config.name,
                key = %decision.key,
                limit = decision.limit,
                retry_after_secs = retry_after.as_secs(),
                "admission limited"
            );

            config.event_listeners.emit(&AdmissionEvent::Limited {
                source: config.name.clone(),
                key: decision.key.clone(),
                timestamp: std::time::Instant::now(),
                limit: decision.limit,
                retry_after,
            });
        } else {
            config.event_listeners.emit(&AdmissionEvent::Permitted {
                source: config.name.clone(),
                key: decision.key.clone(),
                timestamp: std::time::Instant::now(),
                current: decision.current,
                remaining: decision.remaining,
            });
        }

        decision
    }

    /// Like [`check`](Self::check), but turns a refusal into an error carrying
    /// the retry hint.
    pub fn enforce(&self, context: &RequestContext) -> Result<AdmissionDecision, RateLimitedError> {
        let decision = self.check(context);
        if decision.is_limited {
            Err(RateLimitedError {
                retry_after: decision.retry_after(Instant::now()),
                limit: decision.limit,
                key: decision.key,
            })
        } else {
            Ok(decision)
        }
    }

    /// Forgets one key's history.
    pub fn reset(&self, key: &str) {
        self.shared.windows().remove(key);
    }

    /// Forgets every key.
    pub fn reset_all(&self) {
        self.shared.windows().clear();
    }

    /// Current usage per tracked key. Does not modify any window.
    pub fn stats(&self) -> HashMap<String, KeyStats> {
        let config = &self.shared.config;
        let now = Instant::now();
        let windows = self.shared.windows();

        windows
            .iter()
            .map(|(key, window)| {
                let requests = window.count_within(now, config.window);
                let percentage = requests as f64 / config.max_requests as f64 * 100.0;
                (
                    key.clone(),
                    KeyStats {
                        requests,
                        percentage,
                    },
                )
            })
            .collect()
    }

    /// Number of keys currently holding a window.
    pub fn tracked_keys(&self) -> usize {
        self.shared.windows().len()
    }

    /// Prunes every window and drops keys left empty. Returns keys removed.
    pub fn sweep(&self) -> usize {
        self.shared.sweep()
    }
}

impl Default for AdmissionController {
    fn default() -> Self {
        Self::builder().build()
    }
}

impl std::fmt::Debug for AdmissionController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AdmissionController")
            .field("config", &self.shared.config)
            .field("tracked_keys", &self.tracked_keys())
            .finish()
    }
}

fn ceil_secs(d: Duration) -> Duration {
    let secs = d.as_secs() + u64::from(d.subsec_nanos() > 0);
    Duration::from_secs(secs)
}
