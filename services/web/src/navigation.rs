//! Routing capability handed to page components
//!
//! Components never build responses themselves. They ask a [`Navigator`] to
//! go somewhere, and the handler turns whatever was requested into the HTTP
//! answer.

use std::{
    collections::HashMap,
    sync::{
        Mutex,
        atomic::{AtomicBool, Ordering},
    },
};

/// Client-side routing as seen by a component
pub trait Navigator: Send + Sync {
    /// Navigate to `path`
    fn push(&self, path: &str);

    /// Re-derive server state for the current page
    fn refresh(&self);

    /// Value of a query parameter of the current page
    fn query_param(&self, name: &str) -> Option<String>;
}

/// [`Navigator`] for one server-rendered request
///
/// Navigation is recorded instead of performed; the route handler reads
/// [`ServerNavigator::location`] once the component is done.
#[derive(Debug, Default)]
pub struct ServerNavigator {
    query: HashMap<String, String>,
    location: Mutex<Option<String>>,
    refreshed: AtomicBool,
}

impl ServerNavigator {
    pub fn new(query: HashMap<String, String>) -> Self {
        Self {
            query,
            location: Mutex::new(None),
            refreshed: AtomicBool::new(false),
        }
    }

    /// Last path pushed, if any
    pub fn location(&self) -> Option<String> {
        self.location.lock().ok().and_then(|location| location.clone())
    }

    pub fn refresh_requested(&self) -> bool {
        self.refreshed.load(Ordering::SeqCst)
    }
}

impl Navigator for ServerNavigator {
    fn push(&self, path: &str) {
        if let Ok(mut location) = self.location.lock() {
            *location = Some(path.to_string());
        }
    }

    fn refresh(&self) {
        self.refreshed.store(true, Ordering::SeqCst);
    }

    fn query_param(&self, name: &str) -> Option<String> {
        self.query.get(name).cloned()
    }
}
