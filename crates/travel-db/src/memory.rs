//! In-memory implementation of [`TravelStore`].
//!
//! Mirrors the `PostgreSQL` schema closely enough to exercise handler
//! logic without a database: ids are assigned sequentially, country
//! names are matched on their lowercase form, and the visited tables
//! enforce the same `(user_id, ...)` uniqueness as the real constraints.
//! [`MemoryTravelStore::set_unavailable`] makes every call fail with
//! [`DbError::Unavailable`] to simulate a lost connection, and
//! [`MemoryTravelStore::set_writes_failing`] fails only the writes.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;
use tokio::sync::RwLock;
use travel_types::{
    CityName, Country, CountryCode, CountryQuery, User, UserId, UserName, VisitedCity,
    VisitedCountry,
};

use crate::error::DbError;
use crate::store::{InsertOutcome, TravelStore};

#[derive(Debug, Default)]
struct Tables {
    users: Vec<User>,
    countries: Vec<Country>,
    visited_countries: Vec<VisitedCountry>,
    visited_cities: Vec<VisitedCity>,
}

impl Tables {
    fn next_user_id(&self) -> Result<UserId, DbError> {
        let last = self.users.iter().map(|u| u.id.into_inner()).max().unwrap_or(0);
        last.checked_add(1)
            .map(UserId)
            .ok_or_else(|| DbError::Unavailable(String::from("user id sequence exhausted")))
    }
}

/// Store holding all tables in process memory.
#[derive(Debug, Default)]
pub struct MemoryTravelStore {
    tables: RwLock<Tables>,
    unavailable: AtomicBool,
    writes_failing: AtomicBool,
    roster_queries: AtomicUsize,
}

impl MemoryTravelStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store with the two default profiles and a small country list.
    pub fn seeded() -> Self {
        Self::new()
            .with_user("Angela", "teal")
            .with_user("Jack", "powderblue")
            .with_country("France", "FR")
            .with_country("Germany", "DE")
            .with_country("Japan", "JP")
            .with_country("United Kingdom", "GB")
            .with_country("United States of America", "US")
            .with_country("Brazil", "BR")
    }

    /// Add a profile; its id follows the highest existing id.
    #[must_use]
    pub fn with_user(mut self, name: &str, color: &str) -> Self {
        let tables = self.tables.get_mut();
        if let Ok(id) = tables.next_user_id() {
            tables.users.push(User {
                id,
                name: name.to_owned(),
                color: color.to_owned(),
            });
        }
        self
    }

    /// Add a row to the country reference table.
    #[must_use]
    pub fn with_country(mut self, name: &str, code: &str) -> Self {
        self.tables.get_mut().countries.push(Country {
            country_name: name.to_owned(),
            country_code: CountryCode::new(code),
        });
        self
    }

    /// Make every subsequent call fail (or succeed again).
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    /// Make every subsequent write fail while reads keep working.
    pub fn set_writes_failing(&self, failing: bool) {
        self.writes_failing.store(failing, Ordering::SeqCst);
    }

    /// Number of times the user list has been read.
    pub fn roster_queries(&self) -> usize {
        self.roster_queries.load(Ordering::SeqCst)
    }

    fn check_available(&self) -> Result<(), DbError> {
        if self.unavailable.load(Ordering::SeqCst) {
            Err(DbError::Unavailable(String::from("connection refused")))
        } else {
            Ok(())
        }
    }

    fn check_writable(&self) -> Result<(), DbError> {
        self.check_available()?;
        if self.writes_failing.load(Ordering::SeqCst) {
            Err(DbError::Unavailable(String::from("write rejected")))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl TravelStore for MemoryTravelStore {
    async fn list_visited_country_codes(&self, user: UserId) -> Result<Vec<CountryCode>, DbError> {
        self.check_available()?;
        let tables = self.tables.read().await;
        Ok(tables
            .visited_countries
            .iter()
            .filter(|v| v.user_id == user)
            .map(|v| v.country_code.clone())
            .collect())
    }

    async fn list_all_users(&self) -> Result<Vec<User>, DbError> {
        self.check_available()?;
        self.roster_queries.fetch_add(1, Ordering::SeqCst);
        let tables = self.tables.read().await;
        let mut users = tables.users.clone();
        users.sort_by_key(|u| u.id);
        Ok(users)
    }

    async fn list_visited_cities(&self, user: UserId) -> Result<Vec<String>, DbError> {
        self.check_available()?;
        let tables = self.tables.read().await;
        Ok(tables
            .visited_cities
            .iter()
            .filter(|v| v.user_id == user)
            .map(|v| v.city_name.clone())
            .collect())
    }

    async fn find_country_code_by_name(
        &self,
        name: &CountryQuery,
    ) -> Result<Option<CountryCode>, DbError> {
        self.check_available()?;
        let tables = self.tables.read().await;
        Ok(tables
            .countries
            .iter()
            .find(|c| c.country_name.to_lowercase() == name.as_str())
            .map(|c| c.country_code.clone()))
    }

    async fn city_exists(&self, user: UserId, city: &CityName) -> Result<bool, DbError> {
        self.check_available()?;
        let tables = self.tables.read().await;
        Ok(tables
            .visited_cities
            .iter()
            .any(|v| v.user_id == user && v.city_name == city.as_str()))
    }

    async fn insert_visited_country(
        &self,
        user: UserId,
        code: &CountryCode,
    ) -> Result<InsertOutcome, DbError> {
        self.check_writable()?;
        let mut tables = self.tables.write().await;
        let entry = VisitedCountry {
            user_id: user,
            country_code: code.clone(),
        };
        if tables.visited_countries.contains(&entry) {
            return Ok(InsertOutcome::Duplicate);
        }
        tables.visited_countries.push(entry);
        Ok(InsertOutcome::Inserted)
    }

    async fn insert_visited_city(
        &self,
        user: UserId,
        city: &CityName,
    ) -> Result<InsertOutcome, DbError> {
        self.check_writable()?;
        let mut tables = self.tables.write().await;
        let entry = VisitedCity {
            user_id: user,
            city_name: city.as_str().to_owned(),
        };
        if tables.visited_cities.contains(&entry) {
            return Ok(InsertOutcome::Duplicate);
        }
        tables.visited_cities.push(entry);
        Ok(InsertOutcome::Inserted)
    }

    async fn delete_visited_city(&self, user: UserId, city: &CityName) -> Result<u64, DbError> {
        self.check_writable()?;
        let mut tables = self.tables.write().await;
        let before = tables.visited_cities.len();
        tables
            .visited_cities
            .retain(|v| !(v.user_id == user && v.city_name == city.as_str()));
        let removed = before.saturating_sub(tables.visited_cities.len());
        Ok(u64::try_from(removed).unwrap_or(u64::MAX))
    }

    async fn insert_user(&self, name: &UserName, color: &str) -> Result<UserId, DbError> {
        self.check_writable()?;
        let mut tables = self.tables.write().await;
        let id = tables.next_user_id()?;
        tables.users.push(User {
            id,
            name: name.as_str().to_owned(),
            color: color.to_owned(),
        });
        Ok(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn city(raw: &str) -> CityName {
        CityName::parse(raw).unwrap_or_else(|| panic!("blank city in test: {raw:?}"))
    }

    fn country(raw: &str) -> CountryQuery {
        CountryQuery::parse(raw).unwrap_or_else(|| panic!("blank country in test: {raw:?}"))
    }

    #[tokio::test]
    async fn seeded_store_has_default_profiles() {
        let store = MemoryTravelStore::seeded();
        let users = store.list_all_users().await.ok().unwrap_or_default();
        assert_eq!(users.len(), 2);
        assert_eq!(users.first().map(|u| u.id), Some(UserId(1)));
        assert_eq!(users.first().map(|u| u.color.as_str()), Some("teal"));
    }

    #[tokio::test]
    async fn country_lookup_ignores_case_of_stored_name() {
        let store = MemoryTravelStore::seeded();
        let code = store.find_country_code_by_name(&country("FRANCE")).await.ok().flatten();
        assert_eq!(code, Some(CountryCode::new("FR")));

        let missing = store
            .find_country_code_by_name(&country("Nonexististan"))
            .await
            .ok()
            .flatten();
        assert!(missing.is_none());
    }

    #[tokio::test]
    async fn visited_pairs_are_unique_per_user() {
        let store = MemoryTravelStore::seeded();
        let fr = CountryCode::new("FR");

        let first = store.insert_visited_country(UserId(1), &fr).await.ok();
        let second = store.insert_visited_country(UserId(1), &fr).await.ok();
        let other_user = store.insert_visited_country(UserId(2), &fr).await.ok();

        assert_eq!(first, Some(InsertOutcome::Inserted));
        assert_eq!(second, Some(InsertOutcome::Duplicate));
        assert_eq!(other_user, Some(InsertOutcome::Inserted));
        let codes = store.list_visited_country_codes(UserId(1)).await.ok().unwrap_or_default();
        assert_eq!(codes, vec![fr]);
    }

    #[tokio::test]
    async fn city_insert_exists_and_delete() {
        let store = MemoryTravelStore::seeded();
        let paris = city("Paris");

        assert_eq!(
            store.insert_visited_city(UserId(1), &paris).await.ok(),
            Some(InsertOutcome::Inserted)
        );
        assert_eq!(store.city_exists(UserId(1), &city("PARIS")).await.ok(), Some(true));
        assert_eq!(store.city_exists(UserId(2), &paris).await.ok(), Some(false));
        assert_eq!(
            store.insert_visited_city(UserId(1), &city(" paris ")).await.ok(),
            Some(InsertOutcome::Duplicate)
        );

        assert_eq!(store.delete_visited_city(UserId(1), &paris).await.ok(), Some(1));
        assert_eq!(store.delete_visited_city(UserId(1), &paris).await.ok(), Some(0));
        assert_eq!(store.city_exists(UserId(1), &paris).await.ok(), Some(false));
    }

    #[tokio::test]
    async fn new_users_get_the_next_id() {
        let store = MemoryTravelStore::seeded();
        let name = UserName::parse("Sam").unwrap_or_else(|| panic!("blank name"));
        let id = store.insert_user(&name, "red").await.ok();
        assert_eq!(id, Some(UserId(3)));
    }

    #[tokio::test]
    async fn unavailable_store_fails_every_call() {
        let store = MemoryTravelStore::seeded();
        store.set_unavailable(true);
        assert!(matches!(
            store.list_all_users().await,
            Err(DbError::Unavailable(_))
        ));
        assert!(store.delete_visited_city(UserId(1), &city("Paris")).await.is_err());

        store.set_unavailable(false);
        assert!(store.list_all_users().await.is_ok());
    }

    #[tokio::test]
    async fn failing_writes_leave_reads_working() {
        let store = MemoryTravelStore::seeded();
        store.set_writes_failing(true);
        assert!(store.insert_visited_city(UserId(1), &city("Rome")).await.is_err());
        assert!(store.list_visited_cities(UserId(1)).await.is_ok());
        assert_eq!(store.city_exists(UserId(1), &city("Rome")).await.ok(), Some(false));
    }
}
