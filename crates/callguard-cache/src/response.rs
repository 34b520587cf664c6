use bytes::Bytes;
use http::header::{HeaderMap, HeaderName, HeaderValue};
use http::StatusCode;
use std::time::Duration;

/// Wall-clock milliseconds at which an entry was stored.
pub const CACHED_AT_HEADER: HeaderName = HeaderName::from_static("x-callguard-cached-at");

/// Lifetime of an entry in milliseconds.
pub const TTL_HEADER: HeaderName = HeaderName::from_static("x-callguard-ttl");

/// A fully buffered HTTP response, as stored in and served from the cache.
#[derive(Debug, Clone, PartialEq)]
pub struct CachedResponse {
    status: StatusCode,
    headers: HeaderMap,
    body: Bytes,
}

impl CachedResponse {
    pub fn new(status: StatusCode, body: impl Into<Bytes>) -> Self {
        Self {
            status,
            headers: HeaderMap::new(),
            body: body.into(),
        }
    }

    /// A `200 OK` response with the given body.
    pub fn ok(body: impl Into<Bytes>) -> Self {
        Self::new(StatusCode::OK, body)
    }

    pub fn with_header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    pub fn headers_mut(&mut self) -> &mut HeaderMap {
        &mut self.headers
    }

    pub fn body(&self) -> &Bytes {
        &self.body
    }

    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }

    /// When the entry was stored, if it carries the metadata header.
    pub fn cached_at(&self) -> Option<u64> {
        header_millis(&self.headers, &CACHED_AT_HEADER)
    }

    /// The entry's TTL, if it carries the metadata header.
    pub fn ttl(&self) -> Option<Duration> {
        header_millis(&self.headers, &TTL_HEADER).map(Duration::from_millis)
    }

    /// Age at `now_millis`, if the entry carries a storage timestamp.
    pub fn age(&self, now_millis: u64) -> Option<Duration> {
        self.cached_at()
            .map(|at| Duration::from_millis(now_millis.saturating_sub(at)))
    }

    /// Whether the entry may still be served at `now_millis`.
    ///
    /// Entries without both metadata headers never expire by age.
    pub fn is_fresh(&self, now_millis: u64) -> bool {
        match (self.age(now_millis), self.ttl()) {
            (Some(age), Some(ttl)) => age <= ttl,
            _ => true,
        }
    }

    /// A copy stamped with the storage time and, when given, the TTL.
    pub(crate) fn stamped(&self, now_millis: u64, ttl: Option<Duration>) -> Self {
        let mut stamped = self.clone();
        stamped
            .headers
            .insert(CACHED_AT_HEADER, HeaderValue::from(now_millis));
        match ttl {
            Some(ttl) => {
                let millis = u64::try_from(ttl.as_millis()).unwrap_or(u64::MAX);
                stamped.headers.insert(TTL_HEADER, HeaderValue::from(millis));
            }
            None => {
                stamped.headers.remove(TTL_HEADER);
            }
        }
        stamped
    }
}

impl From<http::Response<Bytes>> for CachedResponse {
    fn from(response: http::Response<Bytes>) -> Self {
        let (parts, body) = response.into_parts();
        Self {
            status: parts.status,
            headers: parts.headers,
            body,
        }
    }
}

impl From<CachedResponse> for http::Response<Bytes> {
    fn from(cached: CachedResponse) -> Self {
        let mut response = http::Response::new(cached.body);
        *response.status_mut() = cached.status;
        *response.headers_mut() = cached.headers;
        response
    }
}

fn header_millis(headers: &HeaderMap, name: &HeaderName) -> Option<u64> {
    headers.get(name)?.to_str().ok()?.trim().parse().ok()
}
