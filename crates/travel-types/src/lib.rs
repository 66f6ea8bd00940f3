//! Shared type definitions for the travel tracker.
//!
//! This crate holds the domain vocabulary used by the store and the web
//! layer: typed identifiers, the user/country records, and the input
//! normalization rules applied to submitted place and user names.
//!
//! # Modules
//!
//! - [`ids`] -- Typed identifiers (`UserId`, `CountryCode`)
//! - [`structs`] -- Record types (`User`, `Country`, visited entries)
//! - [`names`] -- Normalized input values (`CityName`, `CountryQuery`, `UserName`)

pub mod ids;
pub mod names;
pub mod structs;

pub use ids::{CountryCode, UserId};
pub use names::{CityName, CountryQuery, UserName, normalize_place};
pub use structs::{Country, User, VisitedCity, VisitedCountry};
