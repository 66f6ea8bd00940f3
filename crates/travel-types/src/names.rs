//! Normalized form inputs.
//!
//! Place names are compared case-insensitively: the submitted text is
//! trimmed and lowercased before it reaches the store, and a string made
//! only of whitespace counts as empty. User names are trimmed but keep
//! their case.

use serde::Serialize;

/// Trim and lowercase a submitted place name.
///
/// Returns `None` when nothing is left after trimming.
pub fn normalize_place(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_lowercase())
    }
}

/// A city name in its stored form (trimmed, lowercase).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct CityName(String);

impl CityName {
    /// Normalize raw form input. Returns `None` for blank input.
    pub fn parse(raw: &str) -> Option<Self> {
        normalize_place(raw).map(Self)
    }

    /// Borrow the normalized name.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl core::fmt::Display for CityName {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

/// A lowercase country name to look up in the reference table.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CountryQuery(String);

impl CountryQuery {
    /// Normalize raw form input. Returns `None` for blank input.
    pub fn parse(raw: &str) -> Option<Self> {
        normalize_place(raw).map(Self)
    }

    /// Borrow the normalized query.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// A non-empty, trimmed display name for a new profile.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct UserName(String);

impl UserName {
    /// Trim raw form input. Returns `None` for blank input.
    pub fn parse(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        (!trimmed.is_empty()).then(|| Self(trimmed.to_owned()))
    }

    /// Borrow the trimmed name.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case("Paris", Some("paris"))]
    #[case("  PARIS  ", Some("paris"))]
    #[case("São Paulo", Some("são paulo"))]
    #[case("", None)]
    #[case("   ", None)]
    #[case("\t\n", None)]
    fn place_names_are_trimmed_and_lowercased(
        #[case] raw: &str,
        #[case] expected: Option<&str>,
    ) {
        assert_eq!(normalize_place(raw).as_deref(), expected);
    }

    #[test]
    fn city_names_compare_case_insensitively() {
        assert_eq!(CityName::parse("Paris"), CityName::parse("PARIS"));
        assert_eq!(
            CityName::parse(" paris ").map(|c| c.to_string()),
            Some(String::from("paris"))
        );
    }

    #[test]
    fn country_query_is_lowercase() {
        let query = CountryQuery::parse(" France ");
        assert_eq!(query.as_ref().map(CountryQuery::as_str), Some("france"));
        assert!(CountryQuery::parse("   ").is_none());
    }

    #[test]
    fn user_names_keep_their_case() {
        assert_eq!(UserName::parse("  Sam ").as_ref().map(UserName::as_str), Some("Sam"));
        assert!(UserName::parse(" ").is_none());
    }
}
