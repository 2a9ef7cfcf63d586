//! Remote poster images
//!
//! Posters are only fetched from hosts on an allow-list of [`RemotePattern`]s.
//! An [`ImageLoader`] fetches the bytes; anything that is not a successful
//! `image/*` response counts as a failed load.

use async_trait::async_trait;
use reqwest::{Client, Url, header::CONTENT_TYPE};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{ImageError, ImageResult};

/// Host a poster may be served from
///
/// `port` must equal the URL's explicit port; `None` only matches URLs on the
/// scheme's default port. `pathname` is either an exact path or a prefix
/// ending in `/**`; `None` matches any path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemotePattern {
    pub protocol: String,
    pub hostname: String,
    #[serde(default)]
    pub port: Option<u16>,
    #[serde(default)]
    pub pathname: Option<String>,
}

impl RemotePattern {
    pub fn new(protocol: &str, hostname: &str, port: Option<u16>, pathname: Option<&str>) -> Self {
        Self {
            protocol: protocol.to_string(),
            hostname: hostname.to_string(),
            port,
            pathname: pathname.map(str::to_owned),
        }
    }

    /// Check whether `url` is covered by this pattern
    pub fn matches(&self, url: &Url) -> bool {
        if url.scheme() != self.protocol {
            return false;
        }

        if url.host_str() != Some(self.hostname.as_str()) {
            return false;
        }

        if url.port() != self.port {
            return false;
        }

        match self.pathname.as_deref() {
            None => true,
            Some(pattern) => match pattern.strip_suffix("/**") {
                Some(prefix) => url
                    .path()
                    .strip_prefix(prefix)
                    .is_some_and(|rest| rest.is_empty() || rest.starts_with('/')),
                None => url.path() == pattern,
            },
        }
    }
}

/// Poster hosts allowed out of the box
pub fn default_remote_patterns() -> Vec<RemotePattern> {
    vec![
        RemotePattern::new("https", "static.hdrezka.ac", None, Some("/i/**")),
        RemotePattern::new("http", "localhost", Some(3000), None),
        RemotePattern::new("https", "picsum.photos", None, None),
    ]
}

/// Check `url` against an allow-list; unparsable URLs are never allowed
pub fn is_allowed(patterns: &[RemotePattern], url: &str) -> bool {
    match Url::parse(url) {
        Ok(url) => patterns.iter().any(|pattern| pattern.matches(&url)),
        Err(_) => false,
    }
}

/// A successfully loaded image
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadedImage {
    pub content_type: String,
    pub bytes: Vec<u8>,
}

/// Capability to load a remote image
#[async_trait]
pub trait ImageLoader: Send + Sync {
    async fn load(&self, url: &str) -> ImageResult<LoadedImage>;
}

/// [`ImageLoader`] fetching images over HTTP
#[derive(Clone)]
pub struct HttpImageLoader {
    client: Client,
}

impl HttpImageLoader {
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl ImageLoader for HttpImageLoader {
    async fn load(&self, url: &str) -> ImageResult<LoadedImage> {
        debug!("Loading image {}", url);

        let response = self.client.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(ImageError::Status(status));
        }

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map(str::to_owned);

        let content_type = match content_type {
            Some(content_type) if content_type.starts_with("image/") => content_type,
            other => return Err(ImageError::NotAnImage(other)),
        };

        let bytes = response.bytes().await?.to_vec();
        Ok(LoadedImage {
            content_type,
            bytes,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn url(value: &str) -> Url {
        Url::parse(value).unwrap()
    }

    #[test]
    fn test_pathname_glob() {
        let pattern = RemotePattern::new("https", "static.hdrezka.ac", None, Some("/i/**"));

        assert!(pattern.matches(&url("https://static.hdrezka.ac/i/poster.jpg")));
        assert!(pattern.matches(&url("https://static.hdrezka.ac/i/2024/01/a.jpg")));
        assert!(!pattern.matches(&url("https://static.hdrezka.ac/img/poster.jpg")));
        assert!(!pattern.matches(&url("https://static.hdrezka.ac/poster.jpg")));
    }

    #[test]
    fn test_protocol_host_and_port_must_match() {
        let pattern = RemotePattern::new("https", "static.hdrezka.ac", None, Some("/i/**"));

        assert!(!pattern.matches(&url("http://static.hdrezka.ac/i/poster.jpg")));
        assert!(!pattern.matches(&url("https://evil.example/i/poster.jpg")));
        assert!(!pattern.matches(&url("https://static.hdrezka.ac:8443/i/poster.jpg")));
        // Default port is not an explicit port
        assert!(pattern.matches(&url("https://static.hdrezka.ac:443/i/poster.jpg")));
    }

    #[test]
    fn test_default_patterns() {
        let patterns = default_remote_patterns();

        assert!(is_allowed(&patterns, "https://static.hdrezka.ac/i/poster.jpg"));
        assert!(is_allowed(&patterns, "http://localhost:3000/uploads/a.png"));
        assert!(is_allowed(&patterns, "https://picsum.photos/200/300"));
        assert!(!is_allowed(&patterns, "http://localhost/uploads/a.png"));
        assert!(!is_allowed(&patterns, "https://example.com/a.png"));
        assert!(!is_allowed(&patterns, "not a url"));
    }

    #[test]
    fn test_pattern_from_config_json() {
        let pattern: RemotePattern =
            serde_json::from_str(r#"{"protocol": "https", "hostname": "image.tmdb.org"}"#).unwrap();

        assert_eq!(pattern.port, None);
        assert!(pattern.matches(&url("https://image.tmdb.org/t/p/w500/x.jpg")));
    }
}
