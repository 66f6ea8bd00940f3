//! Error types for the query layer.
//!
//! [`DbError`] is the store failure of the error taxonomy: connectivity
//! loss, a failed statement, or a bad connection setting. Duplicate
//! inserts are not errors; they come back as
//! [`InsertOutcome::Duplicate`](crate::InsertOutcome::Duplicate).

/// Errors that can occur in the query layer.
#[derive(Debug, thiserror::Error)]
pub enum DbError {
    /// A `PostgreSQL` operation failed.
    #[error("PostgreSQL error: {0}")]
    Postgres(#[from] sqlx::Error),

    /// A `PostgreSQL` migration failed.
    #[error("PostgreSQL migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    /// The store cannot serve requests right now.
    #[error("store unavailable: {0}")]
    Unavailable(String),

    /// A configuration error.
    #[error("Configuration error: {0}")]
    Config(String),
}
