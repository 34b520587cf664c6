use crate::{CachedFetch, FetchStrategy, ResponseCache};
use tower::Layer;

/// A Tower [`Layer`] that puts a [`ResponseCache`] in front of a fetcher.
///
/// The wrapped service must implement `Service<Url, Response = CachedResponse>`.
/// The resulting [`CachedFetch`] accepts any request that is `AsRef<str>`,
/// so relative paths can be passed when the cache has a base URL.
///
/// # Examples
///
/// ```
/// use callguard_cache::{CacheStrategyLayer, CachedResponse, FetchStrategy, ResponseCache};
/// use tower::ServiceBuilder;
/// use url::Url;
///
/// let cache = ResponseCache::builder()
///     .base_url(Url::parse("https://clinic.test").unwrap())
///     .build();
///
/// let service = ServiceBuilder::new()
///     .layer(CacheStrategyLayer::new(cache).strategy(FetchStrategy::NetworkFirst))
///     .service(tower::service_fn(|url: Url| async move {
///         Ok::<_, std::io::Error>(CachedResponse::ok(url.path().to_string()))
///     }));
/// # let _ = service;
/// ```
#[derive(Debug, Clone)]
pub struct CacheStrategyLayer {
    cache: ResponseCache,
    strategy: FetchStrategy,
}

impl CacheStrategyLayer {
    /// Creates a layer using [`FetchStrategy::Auto`].
    pub fn new(cache: ResponseCache) -> Self {
        Self {
            cache,
            strategy: FetchStrategy::default(),
        }
    }

    pub fn strategy(mut self, strategy: FetchStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    pub fn cache(&self) -> &ResponseCache {
        &self.cache
    }
}

impl<S> Layer<S> for CacheStrategyLayer {
    type Service = CachedFetch<S>;

    fn layer(&self, service: S) -> Self::Service {
        CachedFetch::new(service, self.cache.clone(), self.strategy)
    }
}

impl ResponseCache {
    /// Creates a [`CacheStrategyLayer`] sharing this cache.
    pub fn layer(&self) -> CacheStrategyLayer {
        CacheStrategyLayer::new(self.clone())
    }
}
