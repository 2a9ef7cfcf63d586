//! Application state shared across handlers

use std::sync::Arc;

use anyhow::{Context, Result};
use common::{
    auth::{AuthConnector, HttpAuthConnector},
    catalog::{CatalogSource, HttpCatalog},
    images::{HttpImageLoader, ImageLoader, RemotePattern},
};

use crate::config::AppConfig;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub auth: Arc<dyn AuthConnector>,
    /// Provider id credentials are submitted to
    pub auth_provider_id: String,
    pub catalog: Arc<dyn CatalogSource>,
    pub images: Arc<dyn ImageLoader>,
    pub remote_patterns: Arc<Vec<RemotePattern>>,
}

impl AppState {
    /// Build the HTTP collaborators described by `config`
    pub fn from_config(config: &AppConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("Failed to build HTTP client")?;

        let auth = HttpAuthConnector::new(client.clone(), &config.auth.base_url)
            .context("Invalid auth provider configuration")?;
        let catalog = HttpCatalog::new(client.clone(), &config.catalog.base_url)
            .context("Invalid catalog configuration")?;

        Ok(Self {
            auth: Arc::new(auth),
            auth_provider_id: config.auth.provider.clone(),
            catalog: Arc::new(catalog),
            images: Arc::new(HttpImageLoader::new(client)),
            remote_patterns: Arc::new(config.images.remote_patterns.clone()),
        })
    }
}
