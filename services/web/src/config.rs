//! Service configuration
//!
//! # Environment Variables
//!
//! Every key can be overridden with a `MOVIES_` variable; nested keys use a
//! double underscore:
//!
//! - `MOVIES_LISTEN_ADDR`: address to listen on (default `0.0.0.0:3000`)
//! - `MOVIES_LOG_LEVEL`: log filter used when `RUST_LOG` is unset (default `info`)
//! - `MOVIES_AUTH__BASE_URL`: root of the credentials auth provider
//! - `MOVIES_AUTH__PROVIDER`: provider id credentials are sent to (default `credentials`)
//! - `MOVIES_CATALOG__BASE_URL`: root of the movie catalog API
//!
//! Poster hosts are only configurable from `config/default.toml`.

use common::images::{RemotePattern, default_remote_patterns};
use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

/// Service configuration
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    #[serde(default = "default_listen_addr")]
    pub listen_addr: String,
    #[serde(default = "default_log_level")]
    pub log_level: String,
    #[serde(default)]
    pub auth: AuthConfig,
    #[serde(default)]
    pub catalog: CatalogConfig,
    #[serde(default)]
    pub images: ImagesConfig,
}

/// Credentials auth provider
#[derive(Debug, Clone, Deserialize)]
pub struct AuthConfig {
    #[serde(default = "default_service_url")]
    pub base_url: String,
    #[serde(default = "default_provider")]
    pub provider: String,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            base_url: default_service_url(),
            provider: default_provider(),
        }
    }
}

/// Movie catalog
#[derive(Debug, Clone, Deserialize)]
pub struct CatalogConfig {
    #[serde(default = "default_service_url")]
    pub base_url: String,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            base_url: default_service_url(),
        }
    }
}

/// Hosts posters may be proxied from
#[derive(Debug, Clone, Deserialize)]
pub struct ImagesConfig {
    #[serde(default = "default_remote_patterns")]
    pub remote_patterns: Vec<RemotePattern>,
}

impl Default for ImagesConfig {
    fn default() -> Self {
        Self {
            remote_patterns: default_remote_patterns(),
        }
    }
}

fn default_listen_addr() -> String {
    "0.0.0.0:3000".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_service_url() -> String {
    "http://localhost:3000".to_string()
}

fn default_provider() -> String {
    "credentials".to_string()
}

impl AppConfig {
    /// Load configuration from `config/default.toml` (optional) and the
    /// environment
    pub fn load() -> Result<Self, ConfigError> {
        Config::builder()
            .add_source(File::with_name("config/default").required(false))
            .add_source(
                Environment::with_prefix("MOVIES")
                    .prefix_separator("_")
                    .separator("__"),
            )
            .build()?
            .try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    const VARS: &[&str] = &[
        "MOVIES_LISTEN_ADDR",
        "MOVIES_LOG_LEVEL",
        "MOVIES_AUTH__BASE_URL",
        "MOVIES_AUTH__PROVIDER",
        "MOVIES_CATALOG__BASE_URL",
    ];

    fn clear_env() {
        for var in VARS {
            unsafe {
                std::env::remove_var(var);
            }
        }
    }

    #[test]
    #[serial]
    fn test_defaults() {
        clear_env();

        let config = AppConfig::load().unwrap();

        assert_eq!(config.listen_addr, "0.0.0.0:3000");
        assert_eq!(config.log_level, "info");
        assert_eq!(config.auth.base_url, "http://localhost:3000");
        assert_eq!(config.auth.provider, "credentials");
        assert_eq!(config.catalog.base_url, "http://localhost:3000");
        assert_eq!(config.images.remote_patterns, default_remote_patterns());
    }

    #[test]
    #[serial]
    fn test_environment_overrides() {
        clear_env();
        unsafe {
            std::env::set_var("MOVIES_LISTEN_ADDR", "127.0.0.1:8080");
            std::env::set_var("MOVIES_AUTH__BASE_URL", "https://auth.example.com");
            std::env::set_var("MOVIES_AUTH__PROVIDER", "email-password");
            std::env::set_var("MOVIES_CATALOG__BASE_URL", "https://catalog.example.com");
        }

        let config = tokio_test::assert_ok!(AppConfig::load());

        assert_eq!(config.listen_addr, "127.0.0.1:8080");
        assert_eq!(config.auth.base_url, "https://auth.example.com");
        assert_eq!(config.auth.provider, "email-password");
        assert_eq!(config.catalog.base_url, "https://catalog.example.com");
        assert_eq!(config.log_level, "info");

        clear_env();
    }
}
