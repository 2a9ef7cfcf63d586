//! Custom error types for the web front-end

use askama::Template;
use axum::{
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};
use thiserror::Error;

use crate::templates::NotFoundTemplate;

/// Custom error type for page handlers
#[derive(Error, Debug)]
pub enum WebError {
    /// No page at this path
    #[error("Not found")]
    NotFound,

    /// A page template failed to render
    #[error("Template error: {0}")]
    Template(#[from] askama::Error),

    /// The movie catalog could not be read
    #[error("Catalog error: {0}")]
    Catalog(#[from] common::error::CatalogError),
}

impl IntoResponse for WebError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            WebError::NotFound => match NotFoundTemplate.render() {
                Ok(page) => return (StatusCode::NOT_FOUND, Html(page)).into_response(),
                Err(e) => {
                    tracing::error!("Failed to render not found page: {}", e);
                    (StatusCode::NOT_FOUND, "Page not found")
                }
            },
            WebError::Template(_) | WebError::Catalog(_) => {
                tracing::error!("Request failed: {}", self);
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
            }
        };

        (status, Html(format!("<h1>{}</h1>", message))).into_response()
    }
}

/// Type alias for handler results
pub type WebResult<T> = Result<T, WebError>;
