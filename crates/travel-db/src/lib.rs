//! Query layer for the travel tracker.
//!
//! Handlers never talk to `sqlx` directly. They go through the
//! [`TravelStore`] trait, which has a `PostgreSQL` implementation for
//! production and an in-memory one for tests and offline demos.
//!
//! # Architecture
//!
//! ```text
//! Request handler
//!     |
//!     +-- RosterCache ----------> TravelStore::list_all_users
//!     |   (invalidate on write)
//!     |
//!     +-- TravelStore
//!         |-- PgTravelStore      (PostgresPool, one statement per call)
//!         +-- MemoryTravelStore  (tables behind a tokio RwLock)
//! ```
//!
//! # Modules
//!
//! - [`store`] -- The [`TravelStore`] trait and [`InsertOutcome`]
//! - [`pg_store`] -- `PostgreSQL` implementation
//! - [`memory`] -- In-memory implementation with failure injection
//! - [`roster`] -- Generation-keyed cache of the user list
//! - [`postgres`] -- Connection pool configuration and migrations
//! - [`error`] -- Shared error types

pub mod error;
pub mod memory;
pub mod pg_store;
pub mod postgres;
pub mod roster;
pub mod store;

// Re-export primary types for convenience.
pub use error::DbError;
pub use memory::MemoryTravelStore;
pub use pg_store::PgTravelStore;
pub use postgres::{PostgresConfig, PostgresPool};
pub use roster::RosterCache;
pub use store::{InsertOutcome, TravelStore};
