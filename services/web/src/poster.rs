//! Poster URL normalization and the placeholder fallback
//!
//! Catalog entries carry poster URLs in whatever shape the scraper found them:
//! bare hosts, protocol-relative URLs, surrounding whitespace or nothing at
//! all. [`normalize_poster_url`] turns every one of those into something an
//! image element can load, and [`PosterImage`] tracks whether loading it
//! failed so the placeholder can be shown instead.

use common::images::ImageLoader;
use tracing::error;

/// 1×1 transparent PNG shown when a movie has no usable poster
pub const PLACEHOLDER_IMAGE: &str = "data:image/png;base64,iVBORw0KGgoAAAANSUhEUgAAAAEAAAABCAYAAAAfFcSJAAAACklEQVR4nGMAAQAABQABDQottAAAAABJRU5ErkJggg==";

/// Raw bytes of [`PLACEHOLDER_IMAGE`]
pub const PLACEHOLDER_PNG: &[u8] = &[
    0x89, 0x50, 0x4e, 0x47, 0x0d, 0x0a, 0x1a, 0x0a, 0x00, 0x00, 0x00, 0x0d, 0x49, 0x48, 0x44, 0x52,
    0x00, 0x00, 0x00, 0x01, 0x00, 0x00, 0x00, 0x01, 0x08, 0x06, 0x00, 0x00, 0x00, 0x1f, 0x15, 0xc4,
    0x89, 0x00, 0x00, 0x00, 0x0a, 0x49, 0x44, 0x41, 0x54, 0x78, 0x9c, 0x63, 0x00, 0x01, 0x00, 0x00,
    0x05, 0x00, 0x01, 0x0d, 0x0a, 0x2d, 0xb4, 0x00, 0x00, 0x00, 0x00, 0x49, 0x45, 0x4e, 0x44, 0xae,
    0x42, 0x60, 0x82,
];

pub const PLACEHOLDER_CONTENT_TYPE: &str = "image/png";

/// Turn a raw poster URL into an absolute one
///
/// - surrounding whitespace is dropped
/// - an empty URL becomes [`PLACEHOLDER_IMAGE`]
/// - `//host/path` becomes `https://host/path`
/// - anything else without an `http://` or `https://` scheme gets `https://`
///
/// Absolute `http://` URLs are returned as they are. The placeholder itself
/// is returned unchanged so that normalizing twice is a no-op.
pub fn normalize_poster_url(url: &str) -> String {
    let url = url.trim();

    if url.is_empty() {
        return PLACEHOLDER_IMAGE.to_string();
    }

    if url.starts_with("http://") || url.starts_with("https://") || url == PLACEHOLDER_IMAGE {
        return url.to_string();
    }

    if url.starts_with("//") {
        format!("https:{}", url)
    } else {
        format!("https://{}", url)
    }
}

/// Poster source together with its load state
///
/// The displayed source is derived from the state instead of being swapped on
/// the element: once a load fails, [`PosterImage::src`] answers the
/// placeholder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PosterImage {
    requested: String,
    failed: bool,
}

impl PosterImage {
    pub fn new(raw_url: &str) -> Self {
        Self {
            requested: normalize_poster_url(raw_url),
            failed: false,
        }
    }

    /// Source to display
    pub fn src(&self) -> &str {
        if self.failed {
            PLACEHOLDER_IMAGE
        } else {
            &self.requested
        }
    }

    /// Normalized source, regardless of load state
    pub fn requested_src(&self) -> &str {
        &self.requested
    }

    pub fn is_placeholder(&self) -> bool {
        self.src() == PLACEHOLDER_IMAGE
    }

    pub fn has_failed(&self) -> bool {
        self.failed
    }

    /// Record that loading [`PosterImage::requested_src`] failed
    pub fn mark_failed(&mut self) {
        self.failed = true;
    }
}

/// Image bytes ready to be served for a poster
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PosterBody {
    pub content_type: String,
    pub bytes: Vec<u8>,
    /// The placeholder is being served instead of the requested poster
    pub fallback: bool,
}

impl PosterBody {
    /// The placeholder PNG, marked as a fallback
    pub fn placeholder() -> Self {
        Self {
            content_type: PLACEHOLDER_CONTENT_TYPE.to_string(),
            bytes: PLACEHOLDER_PNG.to_vec(),
            fallback: true,
        }
    }
}

/// Load a poster, falling back to the placeholder when the load fails
///
/// Failures are logged and recorded on `poster`; they never reach the caller.
pub async fn resolve_poster(loader: &dyn ImageLoader, poster: &mut PosterImage) -> PosterBody {
    if poster.is_placeholder() {
        return PosterBody::placeholder();
    }

    match loader.load(poster.src()).await {
        Ok(image) => PosterBody {
            content_type: image.content_type,
            bytes: image.bytes,
            fallback: false,
        },
        Err(e) => {
            error!("Image load error for URL {}: {}", poster.requested_src(), e);
            poster.mark_failed();
            PosterBody::placeholder()
        }
    }
}
