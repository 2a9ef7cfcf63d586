//! Movie catalog capability
//!
//! The catalog is owned elsewhere; the front-end only reads it.

use async_trait::async_trait;
use reqwest::{Client, StatusCode, Url};
use tracing::debug;

use crate::{
    error::{CatalogError, CatalogResult},
    models::Movie,
};

/// Read access to the movie catalog
#[async_trait]
pub trait CatalogSource: Send + Sync {
    /// List the movies to show on the catalog page
    async fn list_movies(&self) -> CatalogResult<Vec<Movie>>;

    /// Get a single movie, `None` when the catalog does not know the id
    async fn get_movie(&self, id: &str) -> CatalogResult<Option<Movie>>;
}

/// [`CatalogSource`] backed by the catalog's JSON API
#[derive(Clone)]
pub struct HttpCatalog {
    client: Client,
    base_url: Url,
}

impl HttpCatalog {
    /// Create a new catalog client rooted at `base_url`
    pub fn new(client: Client, base_url: &str) -> CatalogResult<Self> {
        let base_url = crate::parse_base_url(base_url)
            .ok_or_else(|| CatalogError::InvalidBaseUrl(base_url.to_string()))?;

        Ok(Self { client, base_url })
    }
}

#[async_trait]
impl CatalogSource for HttpCatalog {
    async fn list_movies(&self) -> CatalogResult<Vec<Movie>> {
        let url = crate::endpoint(&self.base_url, &["api", "movies"]);
        debug!("Listing movies from {}", url);

        let response = self.client.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(CatalogError::Status(status));
        }

        Ok(response.json().await?)
    }

    async fn get_movie(&self, id: &str) -> CatalogResult<Option<Movie>> {
        let url = crate::endpoint(&self.base_url, &["api", "movies", id]);
        debug!("Fetching movie from {}", url);

        let response = self.client.get(url).send().await?;
        match response.status() {
            StatusCode::NOT_FOUND => Ok(None),
            status if status.is_success() => Ok(Some(response.json().await?)),
            status => Err(CatalogError::Status(status)),
        }
    }
}
