//! Error types for the travel tracker binary.

use crate::config::ConfigError;

/// Top-level startup error.
///
/// Each variant wraps a subsystem error so `main` can propagate any of
/// them with `?`.
#[derive(Debug, thiserror::Error)]
pub enum StartupError {
    /// Configuration loading failed.
    #[error("config error: {source}")]
    Config {
        /// The underlying config error.
        #[from]
        source: ConfigError,
    },

    /// Pool construction or migrations failed.
    #[error("database error: {source}")]
    Database {
        /// The underlying database error.
        #[from]
        source: travel_db::DbError,
    },

    /// Page templates could not be loaded.
    #[error("template error: {source}")]
    Templates {
        /// The underlying rendering error.
        #[from]
        source: travel_web::WebError,
    },

    /// The HTTP listener failed.
    #[error("server error: {source}")]
    Server {
        /// The underlying server error.
        #[from]
        source: travel_web::ServerError,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_errors_become_startup_errors() {
        let err = StartupError::from(ConfigError::Invalid {
            field: "database.max_connections",
            message: String::from("must be at least 1"),
        });
        assert!(matches!(err, StartupError::Config { .. }));
        assert!(err.to_string().starts_with("config error: "));
        assert!(err.to_string().contains("database.max_connections"));
    }
}
