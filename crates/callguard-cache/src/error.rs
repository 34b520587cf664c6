use callguard_core::{ErrorStatus, GuardError};
use std::fmt;
use thiserror::Error;

/// Why a URL was refused.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UrlRejection {
    /// The input could not be parsed, even relative to the base origin.
    Unparseable(url::ParseError),
    /// Only `http` and `https` are fetched and cached.
    UnsupportedScheme(String),
    /// User info in a URL would end up in cache keys and logs.
    EmbeddedCredentials,
}

impl fmt::Display for UrlRejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UrlRejection::Unparseable(e) => write!(f, "unparseable: {e}"),
            UrlRejection::UnsupportedScheme(scheme) => write!(f, "unsupported scheme {scheme:?}"),
            UrlRejection::EmbeddedCredentials => f.write_str("embedded credentials"),
        }
    }
}

/// A URL failed validation before any cache or network access.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid url {url:?}: {reason}")]
pub struct InvalidUrlError {
    pub url: String,
    pub reason: UrlRejection,
}

/// Errors returned by the fetch strategies.
#[derive(Debug, Error)]
pub enum CacheError<E> {
    /// The URL was refused; nothing was fetched.
    #[error(transparent)]
    InvalidUrl(#[from] InvalidUrlError),

    /// Network-first: the fetch failed and nothing was cached for the URL.
    #[error("network failed and no cache available for {url}")]
    NoCacheAvailable { url: String, source: E },

    /// Cache-first: the entry was missing and the fetch failed.
    #[error("{0}")]
    Network(E),
}

impl<E> CacheError<E> {
    pub fn is_invalid_url(&self) -> bool {
        matches!(self, CacheError::InvalidUrl(_))
    }

    pub fn is_no_cache_available(&self) -> bool {
        matches!(self, CacheError::NoCacheAvailable { .. })
    }

    /// The fetcher's error, when the network was reached.
    pub fn network_error(&self) -> Option<&E> {
        match self {
            CacheError::NoCacheAvailable { source, .. } => Some(source),
            CacheError::Network(e) => Some(e),
            CacheError::InvalidUrl(_) => None,
        }
    }
}

impl<E: ErrorStatus> ErrorStatus for CacheError<E> {
    fn status(&self) -> Option<u16> {
        match self {
            CacheError::Network(e) => e.status(),
            _ => None,
        }
    }
}

impl<E> From<InvalidUrlError> for GuardError<E> {
    fn from(err: InvalidUrlError) -> Self {
        GuardError::InvalidUrl {
            url: err.url,
            reason: err.reason.to_string(),
        }
    }
}

impl<E> From<CacheError<E>> for GuardError<E> {
    fn from(err: CacheError<E>) -> Self {
        match err {
            CacheError::InvalidUrl(invalid) => invalid.into(),
            CacheError::NoCacheAvailable { url, .. } => GuardError::NoCacheAvailable { url },
            CacheError::Network(e) => GuardError::Application(e),
        }
    }
}
