use crate::events::ExecutorEvent;
use crate::RateLimitExecutor;
use callguard_core::{EventListeners, FnListener};
use std::time::Duration;

/// Executor-wide configuration: identity and observers.
///
/// Retry and circuit policy travel with each call in
/// [`ExecuteOptions`](crate::ExecuteOptions).
pub struct ExecutorConfig {
    pub(crate) event_listeners: EventListeners<ExecutorEvent>,
    pub(crate) name: String,
}

impl ExecutorConfig {
    pub fn builder() -> ExecutorConfigBuilder {
        ExecutorConfigBuilder::new()
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl std::fmt::Debug for ExecutorConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExecutorConfig")
            .field("name", &self.name)
            .field("listeners", &self.event_listeners.len())
            .finish()
    }
}

/// Builder for [`ExecutorConfig`].
pub struct ExecutorConfigBuilder {
    event_listeners: EventListeners<ExecutorEvent>,
    name: String,
}

impl Default for ExecutorConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ExecutorConfigBuilder {
    /// Creates a new builder named `"<unnamed>"` with no listeners.
    pub fn new() -> Self {
        Self {
            event_listeners: EventListeners::new(),
            name: "<unnamed>".to_string(),
        }
    }

    /// Sets the name for this executor instance (used in events, logs and metrics).
    pub fn name<S: Into<String>>(mut self, name: S) -> Self {
        self.name = name.into();
        self
    }

    /// Registers a callback before every retry.
    ///
    /// # Callback Signature
    /// `Fn(&str, usize, Duration)` - key, 1-based retry number, delay before it.
    pub fn on_retry<F>(mut self, f: F) -> Self
    where
        F: Fn(&str, usize, Duration) + Send + Sync + 'static,
    {
        self.event_listeners.add(FnListener::new(move |event: &ExecutorEvent| {
            if let ExecutorEvent::Retry {
                key,
                attempt,
                delay,
                ..
            } = event
            {
                f(key, *attempt, *delay);
            }
        }));
        self
    }

    /// Registers a callback when a key's circuit opens.
    ///
    /// # Callback Signature
    /// `Fn(&str, usize)` - key and the failure count that tripped it.
    ///
    /// # Example
    /// ```rust
    /// use callguard_executor::ExecutorConfig;
    ///
    /// let executor = ExecutorConfig::builder()
    ///     .name("pharmacy")
    ///     .on_circuit_opened(|key, failures| {
    ///         eprintln!("{key} tripped after {failures} rate-limited calls");
    ///     })
    ///     .build();
    /// ```
    pub fn on_circuit_opened<F>(mut self, f: F) -> Self
    where
        F: Fn(&str, usize) + Send + Sync + 'static,
    {
        self.event_listeners.add(FnListener::new(move |event: &ExecutorEvent| {
            if let ExecutorEvent::CircuitOpened {
                key, failure_count, ..
            } = event
            {
                f(key, *failure_count);
            }
        }));
        self
    }

    /// Registers a callback when an expired circuit lets calls through again.
    pub fn on_circuit_closed<F>(mut self, f: F) -> Self
    where
        F: Fn(&str) + Send + Sync + 'static,
    {
        self.event_listeners.add(FnListener::new(move |event: &ExecutorEvent| {
            if let ExecutorEvent::CircuitClosed { key, .. } = event {
                f(key);
            }
        }));
        self
    }

    /// Registers a callback when a call is refused by an open circuit.
    ///
    /// # Callback Signature
    /// `Fn(&str, Duration)` - key and the time left before the circuit closes.
    pub fn on_call_rejected<F>(mut self, f: F) -> Self
    where
        F: Fn(&str, Duration) + Send + Sync + 'static,
    {
        self.event_listeners.add(FnListener::new(move |event: &ExecutorEvent| {
            if let ExecutorEvent::CallRejected {
                key,
                open_remaining,
                ..
            } = event
            {
                f(key, *open_remaining);
            }
        }));
        self
    }

    /// Registers a callback when an operation succeeds.
    ///
    /// # Callback Signature
    /// `Fn(&str, usize)` - key and the number of attempts it took.
    pub fn on_success<F>(mut self, f: F) -> Self
    where
        F: Fn(&str, usize) + Send + Sync + 'static,
    {
        self.event_listeners.add(FnListener::new(move |event: &ExecutorEvent| {
            if let ExecutorEvent::Success { key, attempts, .. } = event {
                f(key, *attempts);
            }
        }));
        self
    }

    /// Registers a callback when an error is handed back to the caller.
    ///
    /// # Callback Signature
    /// `Fn(&str, usize, bool)` - key, attempts made, whether the final error
    /// was rate-limit classified.
    pub fn on_failure<F>(mut self, f: F) -> Self
    where
        F: Fn(&str, usize, bool) + Send + Sync + 'static,
    {
        self.event_listeners.add(FnListener::new(move |event: &ExecutorEvent| {
            if let ExecutorEvent::Failure {
                key,
                attempts,
                rate_limited,
                ..
            } = event
            {
                f(key, *attempts, *rate_limited);
            }
        }));
        self
    }

    pub fn build_config(self) -> ExecutorConfig {
        ExecutorConfig {
            event_listeners: self.event_listeners,
            name: self.name,
        }
    }

    /// Builds the executor.
    pub fn build(self) -> RateLimitExecutor {
        RateLimitExecutor::new(self.build_config())
    }
}
