//! Web front-end for the movie catalog
//!
//! Server-rendered pages for signing in and browsing the catalog. The auth
//! provider, the catalog and the poster hosts are reached through the
//! capabilities in the `common` crate.

pub mod config;
pub mod error;
pub mod forms;
pub mod movie_card;
pub mod navigation;
pub mod poster;
pub mod routes;
pub mod signin;
pub mod state;
pub mod templates;

pub use state::AppState;
