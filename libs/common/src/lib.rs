//! Common library for the movie catalog
//!
//! This crate holds the models and clients for the collaborators the web
//! front-end consumes: the credentials auth provider, the movie catalog and
//! the remote hosts posters are served from.

use reqwest::Url;

pub mod auth;
pub mod catalog;
pub mod error;
pub mod images;
pub mod models;

/// Parse a collaborator base URL, rejecting URLs that cannot carry a path
pub(crate) fn parse_base_url(base_url: &str) -> Option<Url> {
    Url::parse(base_url)
        .ok()
        .filter(|url| !url.cannot_be_a_base())
}

/// Append path segments to a base URL, escaping each segment
pub(crate) fn endpoint(base: &Url, segments: &[&str]) -> Url {
    let mut url = base.clone();
    if let Ok(mut path) = url.path_segments_mut() {
        path.pop_if_empty().extend(segments);
    }
    url
}
