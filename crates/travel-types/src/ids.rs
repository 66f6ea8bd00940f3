//! Typed identifiers.
//!
//! User ids are assigned by the store (`SERIAL`), so they wrap an `i32`
//! rather than a UUID. Country codes are the two-letter ISO 3166 codes
//! held in the `countries` reference table.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Identifier of a user profile, assigned by the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(pub i32);

impl UserId {
    /// The profile selected when nothing else has been chosen.
    pub const SEED: Self = Self(1);

    /// Return the inner store value.
    pub const fn into_inner(self) -> i32 {
        self.0
    }
}

impl Default for UserId {
    fn default() -> Self {
        Self::SEED
    }
}

impl core::fmt::Display for UserId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i32> for UserId {
    fn from(id: i32) -> Self {
        Self(id)
    }
}

impl From<UserId> for i32 {
    fn from(id: UserId) -> Self {
        id.0
    }
}

impl FromStr for UserId {
    type Err = core::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim().parse::<i32>().map(Self)
    }
}

/// ISO 3166 alpha-2 country code as stored in `countries.country_code`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CountryCode(String);

impl CountryCode {
    /// Wrap a code read from the store.
    pub fn new(code: impl Into<String>) -> Self {
        Self(code.into())
    }

    /// Borrow the code as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Return the owned code.
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl core::fmt::Display for CountryCode {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}
