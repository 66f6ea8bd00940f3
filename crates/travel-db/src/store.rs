//! The [`TravelStore`] port.
//!
//! Each method is a single statement against the store. Visited-entry
//! inserts report a uniqueness conflict as [`InsertOutcome::Duplicate`]
//! instead of checking first, so two interleaved requests cannot both
//! insert the same pair.

use async_trait::async_trait;
use travel_types::{CityName, CountryCode, CountryQuery, User, UserId, UserName};

use crate::error::DbError;

/// Result of an insert guarded by a store uniqueness constraint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertOutcome {
    /// A new row was written.
    Inserted,
    /// The pair already existed; nothing was written.
    Duplicate,
}

/// Read/write operations against the travel data store.
#[async_trait]
pub trait TravelStore: Send + Sync {
    /// Country codes the user has visited.
    async fn list_visited_country_codes(&self, user: UserId) -> Result<Vec<CountryCode>, DbError>;

    /// Every user profile, ordered by id.
    async fn list_all_users(&self) -> Result<Vec<User>, DbError>;

    /// City names the user has visited, in insertion order.
    async fn list_visited_cities(&self, user: UserId) -> Result<Vec<String>, DbError>;

    /// Resolve a lowercase country name to its code.
    async fn find_country_code_by_name(
        &self,
        name: &CountryQuery,
    ) -> Result<Option<CountryCode>, DbError>;

    /// Whether the user already has this city.
    async fn city_exists(&self, user: UserId, city: &CityName) -> Result<bool, DbError>;

    /// Record a visited country.
    async fn insert_visited_country(
        &self,
        user: UserId,
        code: &CountryCode,
    ) -> Result<InsertOutcome, DbError>;

    /// Record a visited city.
    async fn insert_visited_city(
        &self,
        user: UserId,
        city: &CityName,
    ) -> Result<InsertOutcome, DbError>;

    /// Remove a visited city. Returns the number of rows removed.
    async fn delete_visited_city(&self, user: UserId, city: &CityName) -> Result<u64, DbError>;

    /// Create a profile and return its store-assigned id.
    async fn insert_user(&self, name: &UserName, color: &str) -> Result<UserId, DbError>;
}
