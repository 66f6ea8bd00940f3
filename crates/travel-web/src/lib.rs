//! Server-rendered HTTP front end for the travel tracker.
//!
//! This crate provides an Axum application that renders the tracker
//! pages with `minijinja` and applies the form submissions:
//!
//! - **`GET /`** -- visited countries, visited cities, and the user switcher
//! - **`POST /add`**, **`/add-city`**, **`/delete-city`** -- edit the
//!   current user's visited sets
//! - **`POST /user`**, **`/new`** -- switch profile or create one
//! - Everything else is served from the static asset directory
//!
//! # Request flow
//!
//! A handler reads the current user from [`Sessions`], calls the
//! [`TravelStore`](travel_db::TravelStore), and either redirects with
//! `302 Found` (success) or re-renders the page with the error and the
//! submitted input (failure). Successful writes always redirect so a
//! browser refresh cannot resubmit the form.

pub mod error;
pub mod handlers;
pub mod router;
pub mod server;
pub mod session;
pub mod state;
pub mod views;

// Re-export primary types for convenience.
pub use error::{FormError, WebError};
pub use router::build_router;
pub use server::{ServerConfig, ServerError, start_server};
pub use session::{SessionMode, SessionTable, Sessions};
pub use state::AppState;
pub use views::ViewRenderer;
