use crate::context::{user_or_anonymous, RequestContext};
use crate::events::AdmissionEvent;
use crate::AdmissionController;
use callguard_core::{EventListeners, FnListener};
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

/// Maps a request context to the key whose window it counts against.
pub type KeyGenerator = Arc<dyn Fn(&RequestContext) -> String + Send + Sync>;

/// Configuration for the admission controller.
pub struct AdmissionConfig {
    pub(crate) max_requests: usize,
    pub(crate) window: Duration,
    pub(crate) key_generator: KeyGenerator,
    pub(crate) skip_successful_requests: bool,
    pub(crate) skip_failed_requests: bool,
    pub(crate) event_listeners: EventListeners<AdmissionEvent>,
    pub(crate) name: String,
}

impl AdmissionConfig {
    /// Creates a new configuration builder.
    pub fn builder() -> AdmissionConfigBuilder {
        AdmissionConfigBuilder::new()
    }

    pub fn max_requests(&self) -> usize {
        self.max_requests
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    /// Accepted for configuration compatibility; has no effect on counting.
    pub fn skip_successful_requests(&self) -> bool {
        self.skip_successful_requests
    }

    /// Accepted for configuration compatibility; has no effect on counting.
    pub fn skip_failed_requests(&self) -> bool {
        self.skip_failed_requests
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl fmt::Debug for AdmissionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AdmissionConfig")
            .field("name", &self.name)
            .field("max_requests", &self.max_requests)
            .field("window", &self.window)
            .field("skip_successful_requests", &self.skip_successful_requests)
            .field("skip_failed_requests", &self.skip_failed_requests)
            .field("listeners", &self.event_listeners.len())
            .finish_non_exhaustive()
    }
}

/// Builder for [`AdmissionConfig`].
pub struct AdmissionConfigBuilder {
    max_requests: usize,
    window: Duration,
    key_generator: KeyGenerator,
    skip_successful_requests: bool,
    skip_failed_requests: bool,
    event_listeners: EventListeners<AdmissionEvent>,
    name: String,
}

impl Default for AdmissionConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl AdmissionConfigBuilder {
    /// Creates a new builder with defaults.
    ///
    /// Defaults:
    /// - max_requests: 100
    /// - window: 60 seconds
    /// - key_generator: the context's user id, or `"anonymous"`
    /// - name: `"<unnamed>"`
    pub fn new() -> Self {
        Self {
            max_requests: 100,
            window: Duration::from_secs(60),
            key_generator: Arc::new(user_or_anonymous),
            skip_successful_requests: false,
            skip_failed_requests: false,
            event_listeners: EventListeners::new(),
            name: "<unnamed>".to_string(),
        }
    }

    /// Sets how many requests a key may make inside one window.
    pub fn max_requests(mut self, max_requests: usize) -> Self {
        self.max_requests = max_requests;
        self
    }

    /// Sets the length of the sliding window.
    ///
    /// The window also sets the sweep period of
    /// [`spawn_sweeper`](crate::AdmissionController::spawn_sweeper).
    pub fn window(mut self, window: Duration) -> Self {
        self.window = window;
        self
    }

    /// Sets the function that derives a window key from a request context.
    ///
    /// # Example
    /// ```rust
    /// use callguard_admission::{AdmissionConfig, RequestContext};
    ///
    /// let controller = AdmissionConfig::builder()
    ///     .max_requests(20)
    ///     .key_generator(|ctx: &RequestContext| {
    ///         ctx.attribute("tenant").unwrap_or("shared").to_string()
    ///     })
    ///     .build();
    ///
    /// let ctx = RequestContext::for_user("nurse-4").with_attribute("tenant", "north");
    /// assert_eq!(controller.key_for(&ctx), "north");
    /// ```
    pub fn key_generator<F>(mut self, f: F) -> Self
    where
        F: Fn(&RequestContext) -> String + Send + Sync + 'static,
    {
        self.key_generator = Arc::new(f);
        self
    }

    pub fn skip_successful_requests(mut self, skip: bool) -> Self {
        self.skip_successful_requests = skip;
        self
    }

    pub fn skip_failed_requests(mut self, skip: bool) -> Self {
        self.skip_failed_requests = skip;
        self
    }

    /// Sets the name for this controller instance (used in events, logs and metrics).
    pub fn name<S: Into<String>>(mut self, name: S) -> Self {
        self.name = name.into();
        self
    }

    /// Registers a callback when a check is admitted.
    ///
    /// # Callback Signature
    /// `Fn(&str, usize)` - the key and the decision's `remaining`, counted
    /// before this request was recorded.
    pub fn on_permitted<F>(mut self, f: F) -> Self
    where
        F: Fn(&str, usize) + Send + Sync + 'static,
    {
        self.event_listeners.add(FnListener::new(move |event: &AdmissionEvent| {
            if let AdmissionEvent::Permitted { key, remaining, .. } = event {
                f(key, *remaining);
            }
        }));
        self
    }

    /// Registers a callback when a check is refused.
    ///
    /// # Callback Signature
    /// `Fn(&str, Duration)` - the key and how long until its oldest request
    /// leaves the window.
    ///
    /// # Example
    /// ```rust
    /// use callguard_admission::AdmissionConfig;
    /// use std::sync::atomic::{AtomicUsize, Ordering};
    /// use std::sync::Arc;
    ///
    /// let refused = Arc::new(AtomicUsize::new(0));
    /// let counter = Arc::clone(&refused);
    ///
    /// let controller = AdmissionConfig::builder()
    ///     .max_requests(10)
    ///     .on_limited(move |key, retry_after| {
    ///         counter.fetch_add(1, Ordering::SeqCst);
    ///         println!("{key} limited for {retry_after:?}");
    ///     })
    ///     .build();
    /// ```
    pub fn on_limited<F>(mut self, f: F) -> Self
    where
        F: Fn(&str, Duration) + Send + Sync + 'static,
    {
        self.event_listeners.add(FnListener::new(move |event: &AdmissionEvent| {
            if let AdmissionEvent::Limited {
                key, retry_after, ..
            } = event
            {
                f(key, *retry_after);
            }
        }));
        self
    }

    /// Registers a callback after each sweep.
    ///
    /// # Callback Signature
    /// `Fn(usize, usize)` - keys removed, keys still tracked.
    pub fn on_swept<F>(mut self, f: F) -> Self
    where
        F: Fn(usize, usize) + Send + Sync + 'static,
    {
        self.event_listeners.add(FnListener::new(move |event: &AdmissionEvent| {
            if let AdmissionEvent::Swept {
                removed_keys,
                tracked_keys,
                ..
            } = event
            {
                f(*removed_keys, *tracked_keys);
            }
        }));
        self
    }

    /// Builds the configuration without creating a controller.
    ///
    /// # Panics
    ///
    /// Panics if `max_requests` is zero or `window` is zero.
    pub fn build_config(self) -> AdmissionConfig {
        assert!(self.max_requests > 0, "max_requests must be at least 1");
        assert!(!self.window.is_zero(), "window must be non-zero");

        AdmissionConfig {
            max_requests: self.max_requests,
            window: self.window,
            key_generator: self.key_generator,
            skip_successful_requests: self.skip_successful_requests,
            skip_failed_requests: self.skip_failed_requests,
            event_listeners: self.event_listeners,
            name: self.name,
        }
    }

    /// Builds the admission controller.
    ///
    /// # Panics
    ///
    /// Panics if `max_requests` is zero or `window` is zero.
    pub fn build(self) -> AdmissionController {
        AdmissionController::new(self.build_config())
    }
}
