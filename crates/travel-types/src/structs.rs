//! Record types mirroring the store tables.

use serde::{Deserialize, Serialize};

use crate::ids::{CountryCode, UserId};

/// A traveller profile from the `users` table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// Store-assigned identifier.
    pub id: UserId,
    /// Display name (non-empty after trimming).
    pub name: String,
    /// Free-form display colour used to paint visited countries.
    pub color: String,
}

/// A row of the read-only `countries` reference table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Country {
    /// Human-readable country name.
    pub country_name: String,
    /// ISO 3166 alpha-2 code.
    pub country_code: CountryCode,
}

/// A `(user_id, country_code)` pair from `visited_countries`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct VisitedCountry {
    /// Owner of the entry.
    pub user_id: UserId,
    /// Visited country.
    pub country_code: CountryCode,
}

/// A `(user_id, city_name)` pair from `visited_cities`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct VisitedCity {
    /// Owner of the entry.
    pub user_id: UserId,
    /// Lowercase, trimmed city name.
    pub city_name: String,
}
