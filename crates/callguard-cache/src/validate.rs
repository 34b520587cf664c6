use crate::error::{InvalidUrlError, UrlRejection};
use url::Url;

/// Parses `input`, resolving relative references against `base`, and
/// returns the normalized absolute URL used as the cache key.
///
/// Without a base only absolute URLs are accepted.
pub fn normalize_url(base: Option<&Url>, input: &str) -> Result<Url, InvalidUrlError> {
    let reject = |reason| InvalidUrlError {
        url: input.to_string(),
        reason,
    };

    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(reject(UrlRejection::Unparseable(url::ParseError::EmptyHost)));
    }

    let parsed = match base {
        Some(base) => base.join(trimmed),
        None => Url::parse(trimmed),
    };
    let mut url = parsed.map_err(|e| reject(UrlRejection::Unparseable(e)))?;

    match url.scheme() {
        "http" | "https" => {}
        other => return Err(reject(UrlRejection::UnsupportedScheme(other.to_string()))),
    }

    if !url.username().is_empty() || url.password().is_some() {
        return Err(reject(UrlRejection::EmbeddedCredentials));
    }

    url.set_fragment(None);
    Ok(url)
}
