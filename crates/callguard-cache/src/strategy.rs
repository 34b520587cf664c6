//! Cache-first and network-first fetching.

use crate::cache::ResponseCache;
use crate::error::CacheError;
use crate::namespace::AssetClass;
use crate::response::CachedResponse;
use tower::{Service, ServiceExt};
use url::Url;

/// How a request consults the cache and the network.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FetchStrategy {
    /// Serve a fresh cached entry; fetch and store only on a miss.
    CacheFirst,
    /// Fetch and store; fall back to any cached entry if the fetch fails.
    NetworkFirst,
    /// Network-first for API URLs, cache-first for everything else.
    #[default]
    Auto,
}

impl FetchStrategy {
    fn resolve(self, class: AssetClass) -> Resolved {
        match (self, class) {
            (FetchStrategy::CacheFirst, _) => Resolved::CacheFirst,
            (FetchStrategy::NetworkFirst, _) => Resolved::NetworkFirst,
            (FetchStrategy::Auto, AssetClass::Api) => Resolved::NetworkFirst,
            (FetchStrategy::Auto, _) => Resolved::CacheFirst,
        }
    }
}

enum Resolved {
    CacheFirst,
    NetworkFirst,
}

impl ResponseCache {
    /// Fetches `url` through `fetcher` using `strategy`.
    ///
    /// The URL is validated and normalized first; an invalid URL never
    /// reaches the cache or the network. Only 2xx responses are stored,
    /// in the namespace and with the TTL of the URL's asset class.
    pub async fn fetch<S>(
        &self,
        fetcher: &mut S,
        url: &str,
        strategy: FetchStrategy,
    ) -> Result<CachedResponse, CacheError<S::Error>>
    where
        S: Service<Url, Response = CachedResponse>,
    {
        let url = self.normalize(url)?;
        let class = AssetClass::of(&url);
        match strategy.resolve(class) {
            Resolved::CacheFirst => self.cache_first_normalized(fetcher, url, class).await,
            Resolved::NetworkFirst => self.network_first_normalized(fetcher, url, class).await,
        }
    }

    /// Serves a fresh cached entry, or fetches, stores and returns.
    pub async fn cache_first<S>(
        &self,
        fetcher: &mut S,
        url: &str,
    ) -> Result<CachedResponse, CacheError<S::Error>>
    where
        S: Service<Url, Response = CachedResponse>,
    {
        self.fetch(fetcher, url, FetchStrategy::CacheFirst).await
    }

    /// Fetches and stores; when the fetch fails, serves whatever entry is
    /// cached for `url`, stale or not, or fails with
    /// [`CacheError::NoCacheAvailable`].
    ///
    /// A stale entry served this way is left in place, so it stays
    /// available for the rest of the outage.
    pub async fn network_first<S>(
        &self,
        fetcher: &mut S,
        url: &str,
    ) -> Result<CachedResponse, CacheError<S::Error>>
    where
        S: Service<Url, Response = CachedResponse>,
    {
        self.fetch(fetcher, url, FetchStrategy::NetworkFirst).await
    }

    async fn cache_first_normalized<S>(
        &self,
        fetcher: &mut S,
        url: Url,
        class: AssetClass,
    ) -> Result<CachedResponse, CacheError<S::Error>>
    where
        S: Service<Url, Response = CachedResponse>,
    {
        if let Some(cached) = self.lookup(class, &url) {
            return Ok(cached);
        }

        let response = call(fetcher, url.clone())
            .await
            .map_err(CacheError::Network)?;
        self.store_if_success(class, &url, &response);
        Ok(response)
    }

    async fn network_first_normalized<S>(
        &self,
        fetcher: &mut S,
        url: Url,
        class: AssetClass,
    ) -> Result<CachedResponse, CacheError<S::Error>>
    where
        S: Service<Url, Response = CachedResponse>,
    {
        match call(fetcher, url.clone()).await {
            Ok(response) => {
                self.store_if_success(class, &url, &response);
                Ok(response)
            }
            Err(error) => match self.lookup_any(class, &url) {
                Some(cached) => {
                    self.emit_fallback(&url);
                    Ok(cached)
                }
                None => Err(CacheError::NoCacheAvailable {
                    url: url.into(),
                    source: error,
                }),
            },
        }
    }

    fn store_if_success(&self, class: AssetClass, url: &Url, response: &CachedResponse) {
        if response.is_success() {
            self.store(class, url, response, self.ttl_for(class));
        }
    }
}

async fn call<S>(fetcher: &mut S, url: Url) -> Result<CachedResponse, S::Error>
where
    S: Service<Url, Response = CachedResponse>,
{
    ServiceExt::<Url>::ready(fetcher).await?.call(url).await
}
