//! Axum router construction for the tracker.
//!
//! Assembles the page routes into a single [`Router`], falls back to the
//! static asset directory for every other path, attaches the session
//! layer, and traces each request.

use std::sync::Arc;

use axum::Router;
use axum::routing::{get, post};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::state::AppState;

/// Build the complete Axum router for the tracker.
///
/// The router includes:
/// - `GET /` -- tracker page
/// - `POST /add` -- add a visited country
/// - `POST /add-city` -- add a visited city
/// - `POST /delete-city` -- remove a visited city
/// - `POST /user` -- new-user form or profile switch
/// - `POST /new` -- create a profile
/// - anything else -- files under [`AppState::static_dir`]
pub fn build_router(state: Arc<AppState>) -> Router {
    let assets = ServeDir::new(&state.static_dir);
    let sessions = state.sessions.layer();

    Router::new()
        .route("/", get(handlers::index))
        .route("/add", post(handlers::add_country))
        .route("/add-city", post(handlers::add_city))
        .route("/delete-city", post(handlers::delete_city))
        .route("/user", post(handlers::select_user))
        .route("/new", post(handlers::new_user))
        .fallback_service(assets)
        .layer(sessions)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
