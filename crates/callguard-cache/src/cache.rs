use crate::config::{CacheConfig, CacheConfigBuilder};
use crate::error::InvalidUrlError;
use crate::events::CacheEvent;
use crate::namespace::AssetClass;
use crate::response::CachedResponse;
use crate::storage::CacheStorage;
use crate::validate::normalize_url;
use std::sync::Arc;
use std::time::{Duration, Instant};
use url::Url;

#[cfg(feature = "metrics")]
use metrics::counter;

#[cfg(feature = "tracing")]
use tracing::{debug, info, warn};

/// Versioned, namespaced response cache.
///
/// Entries are keyed by normalized absolute URL and stored in the namespace
/// of their [`AssetClass`]. Expiry is checked on read: a stale entry is
/// deleted by the lookup that finds it. The network-first fallback is the
/// exception; it serves whatever is stored and leaves it in place.
///
/// Cloning is cheap; clones share storage.
///
/// # Examples
///
/// ```
/// use callguard_cache::{CachedResponse, ResponseCache};
/// use std::time::Duration;
/// use url::Url;
///
/// let cache = ResponseCache::builder()
///     .name("records")
///     .base_url(Url::parse("https://clinic.test").unwrap())
///     .build();
///
/// cache
///     .cache_api_response("/api/wards", &CachedResponse::ok("[]"), Duration::from_secs(60))
///     .unwrap();
/// let cached = cache.get_cached_api_response("/api/wards").unwrap();
/// assert_eq!(cached.unwrap().body().as_ref(), b"[]");
/// ```
#[derive(Clone)]
pub struct ResponseCache {
    config: Arc<CacheConfig>,
}

impl ResponseCache {
    pub fn new(config: CacheConfig) -> Self {
        Self {
            config: Arc::new(config),
        }
    }

    /// Shorthand for [`CacheConfig::builder`].
    pub fn builder() -> CacheConfigBuilder {
        CacheConfig::builder()
    }

    pub fn config(&self) -> &CacheConfig {
        &self.config
    }

    fn storage(&self) -> &dyn CacheStorage {
        self.config.storage.as_ref()
    }

    fn now_millis(&self) -> u64 {
        self.config.clock.now_millis()
    }

    /// Validates `url` and resolves it against the configured base origin.
    pub fn normalize(&self, url: &str) -> Result<Url, InvalidUrlError> {
        normalize_url(self.config.base_url.as_ref(), url)
    }

    /// Stores a copy of `response` in the API namespace, stamped with the
    /// current time and `ttl`.
    ///
    /// Relative paths such as `"/x"` only resolve when the cache was built
    /// with a [`base_url`](CacheConfigBuilder::base_url); without one they
    /// are refused with [`InvalidUrlError`]. Absolute URLs always work.
    ///
    /// ```
    /// use callguard_cache::{CachedResponse, ResponseCache};
    /// use std::time::Duration;
    /// use url::Url;
    ///
    /// let relative_only = ResponseCache::default();
    /// let resp = CachedResponse::ok("{}");
    /// assert!(relative_only.cache_api_response("/x", &resp, Duration::from_secs(5)).is_err());
    ///
    /// let cache = ResponseCache::builder()
    ///     .base_url(Url::parse("https://clinic.test").unwrap())
    ///     .build();
    /// cache.cache_api_response("/x", &resp, Duration::from_secs(5)).unwrap();
    /// assert!(cache.get_cached_api_response("/x").unwrap().is_some());
    /// ```
    pub fn cache_api_response(
        &self,
        url: &str,
        response: &CachedResponse,
        ttl: Duration,
    ) -> Result<(), InvalidUrlError> {
        let url = self.normalize(url)?;
        self.store(AssetClass::Api, &url, response, Some(ttl));
        Ok(())
    }

    /// Returns the API entry for `url` if it is still within its TTL.
    ///
    /// A stale entry is deleted and reported as absent.
    pub fn get_cached_api_response(
        &self,
        url: &str,
    ) -> Result<Option<CachedResponse>, InvalidUrlError> {
        let url = self.normalize(url)?;
        Ok(self.lookup(AssetClass::Api, &url))
    }

    /// Returns the entry for `url` from the namespace of its asset class.
    pub fn get(&self, url: &str) -> Result<Option<CachedResponse>, InvalidUrlError> {
        let url = self.normalize(url)?;
        Ok(self.lookup(AssetClass::of(&url), &url))
    }

    /// Number of entries currently held for `class`, fresh or not.
    pub fn entry_count(&self, class: AssetClass) -> usize {
        self.storage().len(&self.config.namespaces.name(class))
    }

    /// Deletes every namespace that does not belong to the current version.
    ///
    /// Returns the deleted namespace names.
    pub fn clear_old_caches(&self) -> Vec<String> {
        let namespaces = &self.config.namespaces;
        let stale: Vec<String> = self
            .storage()
            .namespaces()
            .into_iter()
            .filter(|name| !namespaces.is_current(name))
            .collect();
        self.delete_namespaces(stale)
    }

    /// Deletes every namespace, current ones included.
    pub fn clear_all_caches(&self) -> Vec<String> {
        let all = self.storage().namespaces();
        self.delete_namespaces(all)
    }

    fn delete_namespaces(&self, names: Vec<String>) -> Vec<String> {
        let deleted: Vec<String> = names
            .into_iter()
            .filter(|name| self.storage().delete_namespace(name))
            .collect();

        if !deleted.is_empty() {
            #[cfg(feature = "tracing")]
            info!(
                cache = %self.config.name,
                namespaces = ?deleted,
                "cache namespaces deleted"
            );

            self.emit(CacheEvent::Cleared {
                source: self.name(),
                timestamp: Instant::now(),
                namespaces: deleted.clone(),
            });
        }
        deleted
    }

    pub(crate) fn ttl_for(&self, class: AssetClass) -> Option<Duration> {
        self.config.ttl_for(class)
    }

    pub(crate) fn store(
        &self,
        class: AssetClass,
        url: &Url,
        response: &CachedResponse,
        ttl: Option<Duration>,
    ) {
        let namespace = self.config.namespaces.name(class);
        let stamped = response.stamped(self.now_millis(), ttl);
        self.storage().put(&namespace, url.as_str(), stamped);

        self.emit(CacheEvent::Stored {
            source: self.name(),
            url: url.to_string(),
            timestamp: Instant::now(),
            namespace,
            ttl,
        });
    }

    /// Reads a fresh entry, purging it when its TTL has elapsed.
    pub(crate) fn lookup(&self, class: AssetClass, url: &Url) -> Option<CachedResponse> {
        let namespace = self.config.namespaces.name(class);
        let key = url.as_str();
        let now = self.now_millis();

        let found = match self.storage().get(&namespace, key) {
            Some(entry) if entry.is_fresh(now) => Some(entry),
            Some(entry) => {
                self.storage().delete(&namespace, key);
                let age = entry.age(now).unwrap_or_default();
                self.emit(CacheEvent::Expired {
                    source: self.name(),
                    url: key.to_string(),
                    timestamp: Instant::now(),
                    age,
                });
                None
            }
            None => None,
        };

        self.record_lookup(&namespace, key, found.is_some());
        found
    }

    /// Reads an entry regardless of its age, leaving it in place.
    pub(crate) fn lookup_any(&self, class: AssetClass, url: &Url) -> Option<CachedResponse> {
        let namespace = self.config.namespaces.name(class);
        let key = url.as_str();
        let found = self.storage().get(&namespace, key);
        self.record_lookup(&namespace, key, found.is_some());
        found
    }

    fn record_lookup(&self, namespace: &str, key: &str, hit: bool) {
        #[cfg(feature = "tracing")]
        debug!(cache = %self.config.name, url = key, namespace, hit, "cache lookup");

        #[cfg(feature = "metrics")]
        counter!(
            "response_cache_requests_total",
            "cache" => self.name(),
            "result" => if hit { "hit" } else { "miss" }
        )
        .increment(1);

        let namespace = namespace.to_string();
        let event = if hit {
            CacheEvent::Hit {
                source: self.name(),
                url: key.to_string(),
                timestamp: Instant::now(),
                namespace,
            }
        } else {
            CacheEvent::Miss {
                source: self.name(),
                url: key.to_string(),
                timestamp: Instant::now(),
                namespace,
            }
        };
        self.emit(event);
    }

    pub(crate) fn emit_fallback(&self, url: &Url) {
        #[cfg(feature = "tracing")]
        warn!(cache = %self.config.name, url = url.as_str(), "network failed, serving cached response");

        #[cfg(feature = "metrics")]
        counter!("response_cache_fallbacks_total", "cache" => self.name()).increment(1);

        self.emit(CacheEvent::Fallback {
            source: self.name(),
            url: url.to_string(),
            timestamp: Instant::now(),
        });
    }

    fn emit(&self, event: CacheEvent) {
        self.config.event_listeners.emit(&event);
    }

    fn name(&self) -> String {
        self.config.name.clone()
    }
}

impl std::fmt::Debug for ResponseCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResponseCache")
            .field("config", &self.config)
            .finish()
    }
}

impl Default for ResponseCache {
    fn default() -> Self {
        Self::builder().build()
    }
}
