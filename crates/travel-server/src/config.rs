//! Layered runtime configuration.
//!
//! Sources, lowest precedence first:
//!
//! 1. Built-in defaults (the `Default` impls below)
//! 2. `travel-tracker.toml` in the working directory, or the file named
//!    by `TRAVEL_CONFIG` (which must then exist)
//! 3. `TRAVEL__SECTION__KEY` environment variables, e.g.
//!    `TRAVEL__SERVER__PORT=8080`
//! 4. `DB_USER`, `DB_HOST`, `DB_NAME`, `DB_PASSWORD`, `DB_PORT`, which
//!    map onto the `database` section

use std::path::PathBuf;
use std::time::Duration;

use config::{Config, Environment, File, FileFormat, Map};
use serde::Deserialize;
use travel_db::PostgresConfig;
use travel_types::UserId;
use travel_web::{ServerConfig, SessionMode};

/// Config file read when `TRAVEL_CONFIG` is not set.
pub const DEFAULT_CONFIG_FILE: &str = "travel-tracker.toml";

/// Environment variable naming an explicit config file.
pub const CONFIG_PATH_ENV: &str = "TRAVEL_CONFIG";

/// Prefix for structured environment overrides.
const ENV_PREFIX: &str = "TRAVEL";

/// Connection variables understood for compatibility with existing
/// deployments, and the keys they set.
const DB_ENV_OVERRIDES: [(&str, &str); 5] = [
    ("DB_USER", "database.user"),
    ("DB_HOST", "database.host"),
    ("DB_NAME", "database.name"),
    ("DB_PASSWORD", "database.password"),
    ("DB_PORT", "database.port"),
];

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// A source could not be read or the merged values did not deserialize.
    #[error("failed to load configuration: {source}")]
    Load {
        /// The underlying error from the `config` crate.
        #[from]
        source: config::ConfigError,
    },

    /// A value deserialized but is outside its allowed range.
    #[error("invalid configuration value for {field}: {message}")]
    Invalid {
        /// Dotted key of the offending value.
        field: &'static str,
        /// What is wrong with it.
        message: String,
    },
}

/// Root configuration.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// HTTP listener and assets.
    pub server: ServerSection,
    /// Current-user tracking.
    pub session: SessionSection,
    /// PostgreSQL connection.
    pub database: DatabaseSection,
    /// Log output.
    pub logging: LoggingSection,
}

/// `[server]` section.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerSection {
    /// Bind address.
    pub host: String,
    /// Bind port.
    pub port: u16,
    /// Directory served for paths without a route.
    pub static_dir: PathBuf,
    /// Directory holding `index.html` and `new.html` to use instead of
    /// the built-in pages.
    pub templates_dir: Option<PathBuf>,
}

impl Default for ServerSection {
    fn default() -> Self {
        Self {
            host: String::from("0.0.0.0"),
            port: 3000,
            static_dir: PathBuf::from(travel_web::state::DEFAULT_STATIC_DIR),
            templates_dir: None,
        }
    }
}

impl ServerSection {
    /// Listener settings for [`travel_web::start_server`].
    pub fn listener(&self) -> ServerConfig {
        ServerConfig {
            host: self.host.clone(),
            port: self.port,
        }
    }
}

/// `[session]` section.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SessionSection {
    /// `shared` or `cookie`.
    pub mode: SessionMode,
    /// Profile every caller starts on.
    pub default_user_id: UserId,
    /// Seconds of inactivity before a cookie-mode session is forgotten.
    pub idle_timeout_secs: u64,
    /// Upper bound on live cookie-mode sessions.
    pub max_sessions: usize,
}

impl Default for SessionSection {
    fn default() -> Self {
        Self {
            mode: SessionMode::Shared,
            default_user_id: UserId::SEED,
            idle_timeout_secs: 604_800,
            max_sessions: travel_web::session::DEFAULT_MAX_SESSIONS,
        }
    }
}

/// `[database]` section.
#[derive(Clone, Deserialize)]
#[serde(default)]
pub struct DatabaseSection {
    /// Server host.
    pub host: String,
    /// Server port.
    pub port: u16,
    /// Role to connect as.
    pub user: String,
    /// Role password.
    pub password: String,
    /// Database name.
    pub name: String,
    /// Pool size.
    pub max_connections: u32,
    /// Seconds to wait for a pooled connection.
    pub connect_timeout_secs: u64,
    /// Apply embedded migrations at startup.
    pub run_migrations: bool,
}

impl Default for DatabaseSection {
    fn default() -> Self {
        Self {
            host: String::from("localhost"),
            port: 5432,
            user: String::from("postgres"),
            password: String::new(),
            name: String::from("world"),
            max_connections: 5,
            connect_timeout_secs: 5,
            run_migrations: true,
        }
    }
}

impl std::fmt::Debug for DatabaseSection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DatabaseSection")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("user", &self.user)
            .field("password", &"[REDACTED]")
            .field("name", &self.name)
            .field("max_connections", &self.max_connections)
            .field("connect_timeout_secs", &self.connect_timeout_secs)
            .field("run_migrations", &self.run_migrations)
            .finish()
    }
}

impl DatabaseSection {
    /// Pool settings for [`travel_db::PostgresPool::connect`].
    pub fn pool_config(&self) -> PostgresConfig {
        PostgresConfig::new(&self.host, self.port, &self.user, &self.password, &self.name)
            .with_max_connections(self.max_connections)
            .with_connect_timeout(Duration::from_secs(self.connect_timeout_secs))
    }
}

/// Log line format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable lines.
    #[default]
    Pretty,
    /// One JSON object per line.
    Json,
}

/// `[logging]` section.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct LoggingSection {
    /// Output format.
    pub format: LogFormat,
    /// `EnvFilter` directives used when `RUST_LOG` is unset.
    pub filter: Option<String>,
}

impl AppConfig {
    /// Load configuration from the process environment and config file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if a source is unreadable or a value is
    /// invalid.
    pub fn load() -> Result<Self, ConfigError> {
        let vars: Map<String, String> = std::env::vars().collect();
        Self::from_sources(&vars)
    }

    /// Load configuration using `vars` in place of the process environment.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if a source is unreadable or a value is
    /// invalid.
    pub fn from_sources(vars: &Map<String, String>) -> Result<Self, ConfigError> {
        let file = match vars.get(CONFIG_PATH_ENV) {
            Some(path) => File::new(path, FileFormat::Toml).required(true),
            None => File::new(DEFAULT_CONFIG_FILE, FileFormat::Toml).required(false),
        };

        let mut builder = Config::builder().add_source(file).add_source(
            Environment::with_prefix(ENV_PREFIX)
                .separator("__")
                .source(Some(vars.clone())),
        );
        for (var, key) in DB_ENV_OVERRIDES {
            builder = builder.set_override_option(key, vars.get(var).cloned())?;
        }

        let config: Self = builder.build()?.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.database.max_connections == 0 {
            return Err(ConfigError::Invalid {
                field: "database.max_connections",
                message: String::from("must be at least 1"),
            });
        }
        if self.session.max_sessions == 0 {
            return Err(ConfigError::Invalid {
                field: "session.max_sessions",
                message: String::from("must be at least 1"),
            });
        }
        if self.session.default_user_id.into_inner() <= 0 {
            return Err(ConfigError::Invalid {
                field: "session.default_user_id",
                message: format!("{} is not a valid user id", self.session.default_user_id),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::panic)]

    use rstest::rstest;

    use super::*;

    fn vars(pairs: &[(&str, &str)]) -> Map<String, String> {
        pairs
            .iter()
            .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
            .collect()
    }

    fn temp_file(name: &str, contents: &str) -> PathBuf {
        let path = std::env::temp_dir().join(format!(
            "travel_config_{}_{:?}_{name}",
            std::process::id(),
            std::thread::current().id(),
        ));
        std::fs::write(&path, contents).unwrap();
        path
    }

    #[test]
    fn defaults_apply_without_sources() {
        let config = AppConfig::from_sources(&Map::new()).unwrap();
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.server.static_dir, PathBuf::from("public"));
        assert!(config.server.templates_dir.is_none());
        assert_eq!(config.session.mode, SessionMode::Shared);
        assert_eq!(config.session.default_user_id, UserId(1));
        assert_eq!(config.session.idle_timeout_secs, 604_800);
        assert_eq!(config.session.max_sessions, 10_000);
        assert_eq!(config.database.port, 5432);
        assert_eq!(config.database.max_connections, 5);
        assert!(config.database.run_migrations);
        assert_eq!(config.logging.format, LogFormat::Pretty);
    }

    #[test]
    fn structured_env_overrides_defaults() {
        let config = AppConfig::from_sources(&vars(&[
            ("TRAVEL__SERVER__PORT", "8080"),
            ("TRAVEL__SESSION__MODE", "cookie"),
            ("TRAVEL__LOGGING__FORMAT", "json"),
        ]))
        .unwrap();
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.session.mode, SessionMode::Cookie);
        assert_eq!(config.logging.format, LogFormat::Json);
    }

    #[test]
    fn db_variables_map_onto_database_section() {
        let config = AppConfig::from_sources(&vars(&[
            ("DB_USER", "tracker"),
            ("DB_HOST", "db.internal"),
            ("DB_NAME", "travel"),
            ("DB_PASSWORD", "hunter2"),
            ("DB_PORT", "6543"),
        ]))
        .unwrap();
        assert_eq!(config.database.user, "tracker");
        assert_eq!(config.database.host, "db.internal");
        assert_eq!(config.database.name, "travel");
        assert_eq!(config.database.password, "hunter2");
        assert_eq!(config.database.port, 6543);
    }

    #[test]
    fn db_variables_win_over_structured_env() {
        let config = AppConfig::from_sources(&vars(&[
            ("TRAVEL__DATABASE__HOST", "from-structured"),
            ("DB_HOST", "from-db-var"),
        ]))
        .unwrap();
        assert_eq!(config.database.host, "from-db-var");
    }

    #[test]
    fn explicit_file_is_read() {
        let path = temp_file(
            "explicit.toml",
            "[server]\nport = 4000\ntemplates_dir = \"pages\"\n\n[database]\nmax_connections = 2\n",
        );
        let config =
            AppConfig::from_sources(&vars(&[(CONFIG_PATH_ENV, path.to_str().unwrap())])).unwrap();
        assert_eq!(config.server.port, 4000);
        assert_eq!(config.server.templates_dir, Some(PathBuf::from("pages")));
        assert_eq!(config.database.max_connections, 2);
        assert_eq!(config.database.port, 5432);
        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn env_overrides_file() {
        let path = temp_file("layered.toml", "[server]\nport = 4000\n");
        let config = AppConfig::from_sources(&vars(&[
            (CONFIG_PATH_ENV, path.to_str().unwrap()),
            ("TRAVEL__SERVER__PORT", "5000"),
        ]))
        .unwrap();
        assert_eq!(config.server.port, 5000);
        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn missing_explicit_file_is_an_error() {
        let result = AppConfig::from_sources(&vars(&[(
            CONFIG_PATH_ENV,
            "/nonexistent/travel-tracker.toml",
        )]));
        assert!(matches!(result, Err(ConfigError::Load { .. })));
    }

    #[rstest]
    #[case::empty_pool("TRAVEL__DATABASE__MAX_CONNECTIONS", "0", "database.max_connections")]
    #[case::zero_user("TRAVEL__SESSION__DEFAULT_USER_ID", "0", "session.default_user_id")]
    #[case::no_sessions("TRAVEL__SESSION__MAX_SESSIONS", "0", "session.max_sessions")]
    fn out_of_range_values_are_rejected(
        #[case] var: &str,
        #[case] value: &str,
        #[case] expected: &str,
    ) {
        match AppConfig::from_sources(&vars(&[(var, value)])) {
            Err(ConfigError::Invalid { field, .. }) => assert_eq!(field, expected),
            other => panic!("expected invalid {expected}, got {other:?}"),
        }
    }

    #[test]
    fn debug_redacts_password() {
        let section = DatabaseSection {
            password: String::from("hunter2"),
            ..DatabaseSection::default()
        };
        let rendered = format!("{section:?}");
        assert!(!rendered.contains("hunter2"));
        assert!(rendered.contains("[REDACTED]"));
    }
}
