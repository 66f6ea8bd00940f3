//! Integration tests for the `travel-db` query layer.
//!
//! These tests require a live `PostgreSQL` instance. Connection parts are
//! read from `DB_HOST`, `DB_PORT`, `DB_USER`, `DB_PASSWORD` and
//! `DB_NAME`, falling back to a local development database. Run with:
//!
//! ```bash
//! cargo test -p travel-db -- --ignored
//! ```
//!
//! All tests are marked `#[ignore]` so they are skipped during normal
//! `cargo test` runs.

#![allow(
    clippy::expect_used,
    clippy::unwrap_used,
    clippy::missing_panics_doc,
    clippy::indexing_slicing
)]

use travel_db::{InsertOutcome, PgTravelStore, PostgresConfig, PostgresPool, RosterCache, TravelStore};
use travel_types::{CityName, CountryCode, CountryQuery, UserId, UserName};

fn env_or(name: &str, default: &str) -> String {
    std::env::var(name).unwrap_or_else(|_| default.to_owned())
}

async fn setup() -> PgTravelStore {
    let port = env_or("DB_PORT", "5432").parse().expect("DB_PORT must be a port");
    let config = PostgresConfig::new(
        &env_or("DB_HOST", "localhost"),
        port,
        &env_or("DB_USER", "postgres"),
        &env_or("DB_PASSWORD", "postgres"),
        &env_or("DB_NAME", "world"),
    );
    let pool = PostgresPool::connect(&config)
        .await
        .expect("Failed to connect to PostgreSQL -- is it running?");
    pool.run_migrations().await.expect("Failed to run migrations");
    PgTravelStore::new(&pool)
}

/// Create a throwaway profile so tests do not disturb each other.
async fn fresh_user(store: &PgTravelStore) -> UserId {
    let name = UserName::parse("integration").expect("non-blank");
    store.insert_user(&name, "grey").await.expect("insert user")
}

#[tokio::test]
#[ignore = "requires live PostgreSQL instance"]
async fn seeded_users_are_present() {
    let store = setup().await;
    let users = store.list_all_users().await.expect("list users");
    assert!(users.iter().any(|u| u.id == UserId(1)));
}

#[tokio::test]
#[ignore = "requires live PostgreSQL instance"]
async fn country_lookup_is_case_insensitive() {
    let store = setup().await;
    let query = CountryQuery::parse("FrAnCe").expect("non-blank");
    let code = store.find_country_code_by_name(&query).await.expect("lookup");
    assert_eq!(code, Some(CountryCode::new("FR")));

    let unknown = CountryQuery::parse("Nonexististan").expect("non-blank");
    assert!(store.find_country_code_by_name(&unknown).await.expect("lookup").is_none());
}

#[tokio::test]
#[ignore = "requires live PostgreSQL instance"]
async fn visited_country_conflict_is_reported_as_duplicate() {
    let store = setup().await;
    let user = fresh_user(&store).await;
    let code = CountryCode::new("JP");

    let first = store.insert_visited_country(user, &code).await.expect("insert");
    let second = store.insert_visited_country(user, &code).await.expect("insert");

    assert_eq!(first, InsertOutcome::Inserted);
    assert_eq!(second, InsertOutcome::Duplicate);
    let codes = store.list_visited_country_codes(user).await.expect("list");
    assert_eq!(codes, vec![code]);
}

#[tokio::test]
#[ignore = "requires live PostgreSQL instance"]
async fn city_lifecycle() {
    let store = setup().await;
    let user = fresh_user(&store).await;
    let lisbon = CityName::parse("Lisbon").expect("non-blank");

    assert_eq!(
        store.insert_visited_city(user, &lisbon).await.expect("insert"),
        InsertOutcome::Inserted
    );
    assert!(store.city_exists(user, &lisbon).await.expect("exists"));
    assert_eq!(
        store.list_visited_cities(user).await.expect("list"),
        vec![String::from("lisbon")]
    );

    assert_eq!(store.delete_visited_city(user, &lisbon).await.expect("delete"), 1);
    assert_eq!(store.delete_visited_city(user, &lisbon).await.expect("delete"), 0);
    assert!(!store.city_exists(user, &lisbon).await.expect("exists"));
}

#[tokio::test]
#[ignore = "requires live PostgreSQL instance"]
async fn roster_cache_sees_new_users_after_invalidation() {
    let store = setup().await;
    let roster = RosterCache::new();
    let before = roster.users(&store).await.expect("roster").len();

    let id = fresh_user(&store).await;
    roster.invalidate();

    let user = roster.find_user(&store, id).await.expect("roster");
    assert!(user.is_some());
    assert!(roster.users(&store).await.expect("roster").len() > before);
}
