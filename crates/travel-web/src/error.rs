//! Error types for the HTTP layer.
//!
//! [`FormError`] is what a visitor sees inline on the page: the message
//! text is part of the HTTP contract. [`WebError`] covers failures that
//! prevent a page from being rendered at all and becomes a `500`.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use travel_db::DbError;

/// Message shown for store failures on pages that re-render.
pub const GENERIC_ERROR: &str = "An error occurred. Please try again.";

/// Plain-text body returned when creating a user fails in the store.
pub const NEW_USER_ERROR: &str = "An error occurred while creating the new user.";

/// A rejected form submission, rendered inline with the submitted input.
#[derive(Debug, thiserror::Error)]
pub enum FormError {
    /// `country` was blank.
    #[error("Country name cannot be empty.")]
    EmptyCountry,

    /// `country` did not match any country name.
    #[error("Invalid country name. Please try again.")]
    UnknownCountry,

    /// The current user already has this country.
    #[error("The country is already added.")]
    DuplicateCountry,

    /// `city` was blank.
    #[error("City name cannot be empty.")]
    EmptyCity,

    /// The current user already has this city.
    #[error("This city is already added.")]
    DuplicateCity,

    /// `name` was blank on the new-user form.
    #[error("Name cannot be empty.")]
    EmptyName,

    /// The store failed; the details are logged, not shown.
    #[error("An error occurred. Please try again.")]
    Store(#[from] DbError),
}

/// Failures that prevent a page from being rendered.
#[derive(Debug, thiserror::Error)]
pub enum WebError {
    /// The store could not supply the page data.
    #[error("store error: {0}")]
    Store(#[from] DbError),

    /// A template failed to load or render.
    #[error("template error: {0}")]
    Template(#[from] minijinja::Error),

    /// A template file could not be read from disk.
    #[error("failed to read template {path}: {source}")]
    TemplateFile {
        /// Path that was read.
        path: String,
        /// The underlying I/O error.
        source: std::io::Error,
    },
}

impl IntoResponse for WebError {
    fn into_response(self) -> Response {
        tracing::error!(error = %self, "Failed to render page");
        (StatusCode::INTERNAL_SERVER_ERROR, GENERIC_ERROR).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn store_failures_show_the_generic_message() {
        let err = FormError::from(DbError::Unavailable(String::from("connection refused")));
        assert_eq!(err.to_string(), GENERIC_ERROR);
    }

    #[test]
    fn web_errors_become_500() {
        let response = WebError::Store(DbError::Unavailable(String::from("down"))).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
