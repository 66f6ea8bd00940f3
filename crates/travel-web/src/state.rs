//! Shared application state for the HTTP server.
//!
//! [`AppState`] bundles the store, the roster cache, the session table,
//! and the page renderer. It is wrapped in [`Arc`] and injected via
//! Axum's `State` extractor.

use std::path::PathBuf;
use std::sync::Arc;

use travel_db::{RosterCache, TravelStore};

use crate::session::Sessions;
use crate::views::ViewRenderer;

/// Default directory for static assets, relative to the working directory.
pub const DEFAULT_STATIC_DIR: &str = "public";

/// Shared state for the Axum application.
pub struct AppState {
    /// Query layer.
    pub store: Arc<dyn TravelStore>,
    /// Cached user list, invalidated when a user is created.
    pub roster: RosterCache,
    /// Current-user tracking.
    pub sessions: Sessions,
    /// Page renderer.
    pub views: ViewRenderer,
    /// Directory served for any path without a route.
    pub static_dir: PathBuf,
}

impl AppState {
    /// Create state with shared-session semantics starting on the seed user.
    pub fn new(store: Arc<dyn TravelStore>, views: ViewRenderer) -> Self {
        Self {
            store,
            roster: RosterCache::new(),
            sessions: Sessions::default(),
            views,
            static_dir: PathBuf::from(DEFAULT_STATIC_DIR),
        }
    }

    /// Replace the session table.
    #[must_use]
    pub fn with_sessions(mut self, sessions: Sessions) -> Self {
        self.sessions = sessions;
        self
    }

    /// Serve static assets from `dir`.
    #[must_use]
    pub fn with_static_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.static_dir = dir.into();
        self
    }

    /// The store as a trait object reference.
    pub fn store(&self) -> &dyn TravelStore {
        self.store.as_ref()
    }
}
