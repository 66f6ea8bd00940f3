//! Travel tracker server binary.
//!
//! Wires configuration, logging, the PostgreSQL store, and the HTTP
//! front end together, then serves until `Ctrl-C`.
//!
//! # Startup Sequence
//!
//! 1. Load configuration (defaults, `travel-tracker.toml`, environment)
//! 2. Initialize structured logging (tracing)
//! 3. Connect the PostgreSQL pool
//! 4. Apply embedded migrations (unless disabled)
//! 5. Load page templates
//! 6. Serve HTTP until shutdown, then close the pool

mod config;
mod error;

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use tracing::info;
use tracing_subscriber::EnvFilter;
use travel_db::{PgTravelStore, PostgresPool, TravelStore};
use travel_web::{AppState, Sessions, ViewRenderer};

use crate::config::{AppConfig, LogFormat, LoggingSection};
use crate::error::StartupError;

/// Filter used when neither `RUST_LOG` nor `logging.filter` is set.
const DEFAULT_LOG_FILTER: &str = "info";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 1. Load configuration. Logging is not up yet, so failures here are
    //    reported by anyhow on stderr.
    let config = load_config().context("loading configuration")?;

    // 2. Initialize structured logging.
    init_tracing(&config.logging);
    info!("travel-server starting");
    info!(
        host = config.server.host,
        port = config.server.port,
        session_mode = ?config.session.mode,
        database = ?config.database,
        "Configuration loaded"
    );

    run(&config).await?;

    info!("travel-server shutdown complete");
    Ok(())
}

async fn run(config: &AppConfig) -> Result<(), StartupError> {
    // 3. Connect to PostgreSQL.
    let pool = PostgresPool::connect(&config.database.pool_config()).await?;

    // 4. Migrations.
    if config.database.run_migrations {
        pool.run_migrations().await?;
    } else {
        info!("Skipping migrations (database.run_migrations = false)");
    }

    // 5. Templates.
    let views = match &config.server.templates_dir {
        Some(dir) => ViewRenderer::from_dir(dir)?,
        None => ViewRenderer::embedded()?,
    };

    let store: Arc<dyn TravelStore> = Arc::new(PgTravelStore::new(&pool));
    let sessions = Sessions::new(config.session.mode, config.session.default_user_id)
        .with_idle_timeout(Duration::from_secs(config.session.idle_timeout_secs))
        .with_max_sessions(config.session.max_sessions);
    let state = AppState::new(store, views)
        .with_sessions(sessions)
        .with_static_dir(config.server.static_dir.clone());
    info!(
        static_dir = %state.static_dir.display(),
        default_user = %config.session.default_user_id,
        "Application state assembled"
    );

    // 6. Serve.
    let served = travel_web::start_server(&config.server.listener(), Arc::new(state)).await;
    pool.close().await;
    served.map_err(StartupError::from)
}

/// Load the layered configuration from the process environment.
fn load_config() -> Result<AppConfig, StartupError> {
    Ok(AppConfig::load()?)
}

/// Install the global subscriber.
///
/// `RUST_LOG` wins over `logging.filter`; an unparsable directive set
/// falls back to [`DEFAULT_LOG_FILTER`].
fn init_tracing(logging: &LoggingSection) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(logging.filter.as_deref().unwrap_or(DEFAULT_LOG_FILTER)))
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));

    let builder = tracing_subscriber::fmt().with_env_filter(filter).with_target(true);
    match logging.format {
        LogFormat::Pretty => builder.init(),
        LogFormat::Json => builder.json().init(),
    }
}
