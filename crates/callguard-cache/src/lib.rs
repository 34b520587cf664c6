//! Versioned TTL response cache with cache-first and network-first fetching.
//!
//! Responses are kept in one namespace per asset class (static assets, API
//! responses, images), named `<prefix>-<class>-<version>`. Bumping the
//! version makes older entries unreachable, and
//! [`ResponseCache::clear_old_caches`] deletes them.
//!
//! Every stored entry is stamped with two headers holding integer
//! milliseconds: [`CACHED_AT_HEADER`] and, when the entry expires,
//! [`TTL_HEADER`]. An entry older than its TTL is deleted by the next
//! freshness-checked read; only the network-first fallback ignores age.
//!
//! # Strategies
//!
//! - **Cache-first**: serve a fresh entry, otherwise fetch, store and return
//! - **Network-first**: fetch and store; on a network error serve any
//!   cached entry, even a stale one, or fail with
//!   [`CacheError::NoCacheAvailable`]
//! - **Auto**: network-first for `/api/` URLs, cache-first for the rest
//!
//! Only 2xx responses are stored. URLs are validated before anything else
//! happens: non-HTTP(S) schemes, embedded credentials and unparseable input
//! are refused with [`CacheError::InvalidUrl`].
//!
//! # Examples
//!
//! ```
//! use callguard_cache::{CachedResponse, ResponseCache};
//! use url::Url;
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let cache = ResponseCache::builder()
//!     .name("records")
//!     .prefix("hms")
//!     .version("2024.06")
//!     .base_url(Url::parse("https://clinic.test").unwrap())
//!     .build();
//!
//! let mut origin = tower::service_fn(|url: Url| async move {
//!     Ok::<_, std::io::Error>(CachedResponse::ok(format!("payload for {}", url.path())))
//! });
//!
//! let fresh = cache.network_first(&mut origin, "/api/patients/7").await.unwrap();
//! assert_eq!(fresh.body().as_ref(), b"payload for /api/patients/7");
//! # }
//! ```

mod cache;
mod config;
mod error;
mod events;
mod layer;
mod namespace;
mod response;
mod storage;
mod strategy;
mod validate;

pub use cache::ResponseCache;
pub use config::{CacheConfig, CacheConfigBuilder};
pub use error::{CacheError, InvalidUrlError, UrlRejection};
pub use events::CacheEvent;
pub use layer::CacheStrategyLayer;
pub use namespace::{AssetClass, CacheNamespaces};
pub use response::{CachedResponse, CACHED_AT_HEADER, TTL_HEADER};
pub use storage::{CacheStorage, MemoryStorage};
pub use strategy::FetchStrategy;
pub use validate::normalize_url;

use futures::future::BoxFuture;
use std::task::{Context, Poll};
use tower::Service;
use url::Url;

/// A Tower [`Service`] that serves requests through a [`ResponseCache`].
#[derive(Debug, Clone)]
pub struct CachedFetch<S> {
    inner: S,
    cache: ResponseCache,
    strategy: FetchStrategy,
}

impl<S> CachedFetch<S> {
    pub(crate) fn new(inner: S, cache: ResponseCache, strategy: FetchStrategy) -> Self {
        Self {
            inner,
            cache,
            strategy,
        }
    }

    pub fn cache(&self) -> &ResponseCache {
        &self.cache
    }

    pub fn get_ref(&self) -> &S {
        &self.inner
    }
}

impl<S, R> Service<R> for CachedFetch<S>
where
    S: Service<Url, Response = CachedResponse> + Clone + Send + 'static,
    S::Future: Send + 'static,
    S::Error: Send + 'static,
    R: AsRef<str> + Send + 'static,
{
    type Response = CachedResponse;
    type Error = CacheError<S::Error>;
    type Future = BoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        // A cache hit never touches the fetcher; readiness is awaited per call.
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, req: R) -> Self::Future {
        let cache = self.cache.clone();
        let strategy = self.strategy;
        let mut inner = self.inner.clone();

        Box::pin(async move { cache.fetch(&mut inner, req.as_ref(), strategy).await })
    }
}
