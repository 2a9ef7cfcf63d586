//! Custom error types for the collaborator clients
//!
//! Each external collaborator gets its own error enum so callers can decide
//! per collaborator which failures are user-visible.

use reqwest::StatusCode;
use thiserror::Error;

/// Errors raised while talking to the credentials auth provider
#[derive(Error, Debug)]
pub enum AuthProviderError {
    /// The request could not be sent or its body could not be read
    #[error("Auth provider request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The provider answered with a non-success status
    #[error("Auth provider returned status {0}")]
    Status(StatusCode),

    /// The configured base URL is unusable
    #[error("Invalid auth provider URL: {0}")]
    InvalidBaseUrl(String),
}

/// Errors raised while reading the movie catalog
#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("Catalog request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Catalog returned status {0}")]
    Status(StatusCode),

    #[error("Invalid catalog URL: {0}")]
    InvalidBaseUrl(String),
}

/// Errors raised while loading a remote image
#[derive(Error, Debug)]
pub enum ImageError {
    #[error("Image request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Image host returned status {0}")]
    Status(StatusCode),

    /// The response was not an image (content type attached when present)
    #[error("Response is not an image: {0:?}")]
    NotAnImage(Option<String>),
}

/// Type alias for Result with AuthProviderError
pub type AuthResult<T> = Result<T, AuthProviderError>;

/// Type alias for Result with CatalogError
pub type CatalogResult<T> = Result<T, CatalogError>;

/// Type alias for Result with ImageError
pub type ImageResult<T> = Result<T, ImageError>;
