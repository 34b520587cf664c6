use crate::events::CacheEvent;
use crate::namespace::{AssetClass, CacheNamespaces};
use crate::storage::{CacheStorage, MemoryStorage};
use crate::ResponseCache;
use callguard_core::{Clock, EventListeners, FnListener, SharedClock, SystemClock};
use std::num::NonZeroUsize;
use std::sync::Arc;
use std::time::Duration;
use url::Url;

/// Configuration for the response cache.
pub struct CacheConfig {
    pub(crate) name: String,
    pub(crate) namespaces: CacheNamespaces,
    pub(crate) base_url: Option<Url>,
    pub(crate) api_ttl: Duration,
    pub(crate) static_ttl: Option<Duration>,
    pub(crate) image_ttl: Option<Duration>,
    pub(crate) clock: SharedClock,
    pub(crate) storage: Arc<dyn CacheStorage>,
    pub(crate) event_listeners: EventListeners<CacheEvent>,
}

impl CacheConfig {
    pub fn builder() -> CacheConfigBuilder {
        CacheConfigBuilder::new()
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn namespaces(&self) -> &CacheNamespaces {
        &self.namespaces
    }

    pub fn base_url(&self) -> Option<&Url> {
        self.base_url.as_ref()
    }

    /// TTL stamped on entries of the given class; `None` means no expiry.
    pub fn ttl_for(&self, class: AssetClass) -> Option<Duration> {
        match class {
            AssetClass::Api => Some(self.api_ttl),
            AssetClass::Static => self.static_ttl,
            AssetClass::Image => self.image_ttl,
        }
    }
}

impl std::fmt::Debug for CacheConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CacheConfig")
            .field("name", &self.name)
            .field("namespaces", &self.namespaces)
            .field("base_url", &self.base_url.as_ref().map(Url::as_str))
            .field("api_ttl", &self.api_ttl)
            .field("static_ttl", &self.static_ttl)
            .field("image_ttl", &self.image_ttl)
            .field("clock", &self.clock)
            .finish_non_exhaustive()
    }
}

/// Builder for [`CacheConfig`].
pub struct CacheConfigBuilder {
    name: String,
    prefix: String,
    version: String,
    base_url: Option<Url>,
    api_ttl: Duration,
    static_ttl: Option<Duration>,
    image_ttl: Option<Duration>,
    capacity: Option<NonZeroUsize>,
    clock: SharedClock,
    storage: Option<Arc<dyn CacheStorage>>,
    event_listeners: EventListeners<CacheEvent>,
}

impl Default for CacheConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl CacheConfigBuilder {
    /// Creates a new builder with defaults.
    ///
    /// Defaults:
    /// - prefix: `"callguard"`, version: `"v1"`
    /// - base_url: none (only absolute URLs are accepted)
    /// - api_ttl: 5 minutes; static and image entries never expire
    /// - storage: unbounded [`MemoryStorage`]
    /// - clock: [`SystemClock`]
    /// - name: `"<unnamed>"`
    pub fn new() -> Self {
        Self {
            name: "<unnamed>".to_string(),
            prefix: "callguard".to_string(),
            version: "v1".to_string(),
            base_url: None,
            api_ttl: Duration::from_secs(5 * 60),
            static_ttl: None,
            image_ttl: None,
            capacity: None,
            clock: SystemClock::shared(),
            storage: None,
            event_listeners: EventListeners::new(),
        }
    }

    /// Sets the name for this cache instance (used in events, logs and metrics).
    pub fn name<S: Into<String>>(mut self, name: S) -> Self {
        self.name = name.into();
        self
    }

    /// Sets the leading part of every namespace name.
    pub fn prefix<S: Into<String>>(mut self, prefix: S) -> Self {
        self.prefix = prefix.into();
        self
    }

    /// Sets the cache generation.
    ///
    /// Bumping the version on deploy makes entries written by older
    /// versions unreachable; [`ResponseCache::clear_old_caches`] then
    /// deletes them.
    pub fn version<S: Into<String>>(mut self, version: S) -> Self {
        self.version = version.into();
        self
    }

    /// Sets the origin that relative URLs are resolved against.
    pub fn base_url(mut self, base: Url) -> Self {
        self.base_url = Some(base);
        self
    }

    /// Sets the TTL stamped on API responses stored by the fetch strategies.
    pub fn api_ttl(mut self, ttl: Duration) -> Self {
        self.api_ttl = ttl;
        self
    }

    pub fn static_ttl(mut self, ttl: Duration) -> Self {
        self.static_ttl = Some(ttl);
        self
    }

    pub fn image_ttl(mut self, ttl: Duration) -> Self {
        self.image_ttl = Some(ttl);
        self
    }

    /// Bounds each namespace of the default [`MemoryStorage`] to `capacity`
    /// entries with LRU eviction. Zero means unbounded.
    ///
    /// Ignored when a custom [`storage`](Self::storage) is set.
    pub fn capacity(mut self, capacity: usize) -> Self {
        self.capacity = NonZeroUsize::new(capacity);
        self
    }

    /// Replaces the default in-memory storage.
    pub fn storage<T: CacheStorage>(mut self, storage: T) -> Self {
        self.storage = Some(Arc::new(storage));
        self
    }

    /// Replaces the system clock used for the metadata timestamps.
    pub fn clock<C: Clock + 'static>(mut self, clock: C) -> Self {
        self.clock = Arc::new(clock);
        self
    }

    /// Registers a callback when a cached entry is served.
    pub fn on_hit<F>(mut self, f: F) -> Self
    where
        F: Fn(&str) + Send + Sync + 'static,
    {
        self.event_listeners.add(FnListener::new(move |event: &CacheEvent| {
            if let CacheEvent::Hit { url, .. } = event {
                f(url);
            }
        }));
        self
    }

    /// Registers a callback when no usable entry exists.
    pub fn on_miss<F>(mut self, f: F) -> Self
    where
        F: Fn(&str) + Send + Sync + 'static,
    {
        self.event_listeners.add(FnListener::new(move |event: &CacheEvent| {
            if let CacheEvent::Miss { url, .. } = event {
                f(url);
            }
        }));
        self
    }

    /// Registers a callback when a response is written.
    ///
    /// # Callback Signature
    /// `Fn(&str, Option<Duration>)` - normalized URL and the stamped TTL.
    pub fn on_stored<F>(mut self, f: F) -> Self
    where
        F: Fn(&str, Option<Duration>) + Send + Sync + 'static,
    {
        self.event_listeners.add(FnListener::new(move |event: &CacheEvent| {
            if let CacheEvent::Stored { url, ttl, .. } = event {
                f(url, *ttl);
            }
        }));
        self
    }

    /// Registers a callback when a stale entry is purged on read.
    pub fn on_expired<F>(mut self, f: F) -> Self
    where
        F: Fn(&str, Duration) + Send + Sync + 'static,
    {
        self.event_listeners.add(FnListener::new(move |event: &CacheEvent| {
            if let CacheEvent::Expired { url, age, .. } = event {
                f(url, *age);
            }
        }));
        self
    }

    /// Registers a callback when network-first falls back to the cache.
    ///
    /// # Example
    /// ```rust
    /// use callguard_cache::CacheConfig;
    ///
    /// let cache = CacheConfig::builder()
    ///     .name("records")
    ///     .on_fallback(|url| eprintln!("offline, served {url} from cache"))
    ///     .build();
    /// ```
    pub fn on_fallback<F>(mut self, f: F) -> Self
    where
        F: Fn(&str) + Send + Sync + 'static,
    {
        self.event_listeners.add(FnListener::new(move |event: &CacheEvent| {
            if let CacheEvent::Fallback { url, .. } = event {
                f(url);
            }
        }));
        self
    }

    /// Registers a callback when namespaces are deleted.
    pub fn on_cleared<F>(mut self, f: F) -> Self
    where
        F: Fn(&[String]) + Send + Sync + 'static,
    {
        self.event_listeners.add(FnListener::new(move |event: &CacheEvent| {
            if let CacheEvent::Cleared { namespaces, .. } = event {
                f(namespaces);
            }
        }));
        self
    }

    pub fn build_config(self) -> CacheConfig {
        let storage = match (self.storage, self.capacity) {
            (Some(storage), _) => storage,
            (None, Some(capacity)) => Arc::new(MemoryStorage::with_capacity(capacity)),
            (None, None) => Arc::new(MemoryStorage::new()) as Arc<dyn CacheStorage>,
        };

        CacheConfig {
            name: self.name,
            namespaces: CacheNamespaces::new(self.prefix, self.version),
            base_url: self.base_url,
            api_ttl: self.api_ttl,
            static_ttl: self.static_ttl,
            image_ttl: self.image_ttl,
            clock: self.clock,
            storage,
            event_listeners: self.event_listeners,
        }
    }

    /// Builds the response cache.
    pub fn build(self) -> ResponseCache {
        ResponseCache::new(self.build_config())
    }
}
