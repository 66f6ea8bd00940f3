//! `PostgreSQL` connection pool and configuration.
//!
//! Connection settings arrive as separate parts (host, port, user,
//! password, database) because that is how the deployment environment
//! supplies them (`DB_HOST`, `DB_PORT`, ...). All queries built on this
//! pool are parameterized to prevent SQL injection.

use std::time::Duration;

use sqlx::PgPool;
use sqlx::postgres::{PgConnectOptions, PgPoolOptions};

use crate::error::DbError;

/// Default maximum number of connections in the pool.
const DEFAULT_MAX_CONNECTIONS: u32 = 5;

/// Default connection timeout in seconds.
const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 5;

/// Default idle timeout in seconds.
const DEFAULT_IDLE_TIMEOUT_SECS: u64 = 300;

/// Configuration for the `PostgreSQL` connection pool.
#[derive(Clone)]
pub struct PostgresConfig {
    /// Server host name or address.
    pub host: String,
    /// Server port.
    pub port: u16,
    /// Login role.
    pub user: String,
    /// Login password.
    pub password: String,
    /// Database name.
    pub database: String,
    /// Maximum number of connections in the pool.
    pub max_connections: u32,
    /// Connection (and pool acquire) timeout.
    pub connect_timeout: Duration,
    /// Idle connection timeout.
    pub idle_timeout: Duration,
}

impl core::fmt::Debug for PostgresConfig {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("PostgresConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("user", &self.user)
            .field("password", &"<redacted>")
            .field("database", &self.database)
            .field("max_connections", &self.max_connections)
            .field("connect_timeout", &self.connect_timeout)
            .field("idle_timeout", &self.idle_timeout)
            .finish()
    }
}

impl PostgresConfig {
    /// Create a configuration from connection parts with default pool settings.
    pub fn new(host: &str, port: u16, user: &str, password: &str, database: &str) -> Self {
        Self {
            host: host.to_owned(),
            port,
            user: user.to_owned(),
            password: password.to_owned(),
            database: database.to_owned(),
            max_connections: DEFAULT_MAX_CONNECTIONS,
            connect_timeout: Duration::from_secs(DEFAULT_CONNECT_TIMEOUT_SECS),
            idle_timeout: Duration::from_secs(DEFAULT_IDLE_TIMEOUT_SECS),
        }
    }

    /// Set the maximum number of connections.
    #[must_use]
    pub const fn with_max_connections(mut self, max: u32) -> Self {
        self.max_connections = max;
        self
    }

    /// Set the connection timeout.
    #[must_use]
    pub const fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// Set the idle connection timeout.
    #[must_use]
    pub const fn with_idle_timeout(mut self, timeout: Duration) -> Self {
        self.idle_timeout = timeout;
        self
    }

    /// Build `sqlx` connect options from the configured parts.
    pub fn connect_options(&self) -> PgConnectOptions {
        PgConnectOptions::new()
            .host(&self.host)
            .port(self.port)
            .username(&self.user)
            .password(&self.password)
            .database(&self.database)
    }
}

/// Connection pool handle to `PostgreSQL`.
#[derive(Clone)]
pub struct PostgresPool {
    pool: PgPool,
}

impl PostgresPool {
    /// Connect to `PostgreSQL` using the provided configuration.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Config`] if the pool size is zero, or
    /// [`DbError::Postgres`] if the connection fails.
    pub async fn connect(config: &PostgresConfig) -> Result<Self, DbError> {
        if config.max_connections == 0 {
            return Err(DbError::Config(String::from(
                "max_connections must be at least 1",
            )));
        }

        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(config.connect_timeout)
            .idle_timeout(config.idle_timeout)
            .connect_with(config.connect_options())
            .await?;

        tracing::info!(
            host = %config.host,
            port = config.port,
            database = %config.database,
            max_connections = config.max_connections,
            "Connected to PostgreSQL"
        );

        Ok(Self { pool })
    }

    /// Run all pending migrations from the `migrations/` directory.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Migration`] if any migration fails.
    pub async fn run_migrations(&self) -> Result<(), DbError> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        tracing::info!("Database migrations completed");
        Ok(())
    }

    /// Return a reference to the underlying [`PgPool`].
    pub const fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Close all connections in the pool gracefully.
    pub async fn close(&self) {
        self.pool.close().await;
        tracing::info!("PostgreSQL pool closed");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn debug_output_redacts_password() {
        let config = PostgresConfig::new("localhost", 5432, "postgres", "hunter2", "world");
        let rendered = format!("{config:?}");
        assert!(rendered.contains("localhost"));
        assert!(!rendered.contains("hunter2"));
    }

    #[test]
    fn builders_override_pool_defaults() {
        let config = PostgresConfig::new("db", 5433, "u", "p", "d")
            .with_max_connections(1)
            .with_connect_timeout(Duration::from_secs(2))
            .with_idle_timeout(Duration::from_secs(30));
        assert_eq!(config.max_connections, 1);
        assert_eq!(config.connect_timeout, Duration::from_secs(2));
        assert_eq!(config.idle_timeout, Duration::from_secs(30));
    }

    #[test]
    fn connect_options_carry_parts() {
        let config = PostgresConfig::new("db.internal", 6543, "travel", "secret", "world");
        let options = config.connect_options();
        assert_eq!(options.get_host(), "db.internal");
        assert_eq!(options.get_port(), 6543);
        assert_eq!(options.get_username(), "travel");
        assert_eq!(options.get_database(), Some("world"));
    }
}
