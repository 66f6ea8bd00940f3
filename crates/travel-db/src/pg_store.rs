//! `PostgreSQL` implementation of [`TravelStore`].
//!
//! Uses runtime query construction (not compile-time checked) so builds
//! do not need a live database. Every input is a bound parameter.

use async_trait::async_trait;
use sqlx::PgPool;
use travel_types::{CityName, CountryCode, CountryQuery, User, UserId, UserName};

use crate::error::DbError;
use crate::postgres::PostgresPool;
use crate::store::{InsertOutcome, TravelStore};

/// Store backed by a [`PostgresPool`].
#[derive(Clone)]
pub struct PgTravelStore {
    pool: PgPool,
}

impl PgTravelStore {
    /// Create a store over an open pool.
    pub fn new(pool: &PostgresPool) -> Self {
        Self {
            pool: pool.pool().clone(),
        }
    }
}

/// A row from the `users` table.
#[derive(Debug, Clone, sqlx::FromRow)]
struct UserRow {
    id: i32,
    name: String,
    color: String,
}

impl From<UserRow> for User {
    fn from(row: UserRow) -> Self {
        Self {
            id: UserId(row.id),
            name: row.name,
            color: row.color,
        }
    }
}

const fn outcome(rows_affected: u64) -> InsertOutcome {
    if rows_affected == 0 {
        InsertOutcome::Duplicate
    } else {
        InsertOutcome::Inserted
    }
}

#[async_trait]
impl TravelStore for PgTravelStore {
    async fn list_visited_country_codes(&self, user: UserId) -> Result<Vec<CountryCode>, DbError> {
        let codes = sqlx::query_scalar::<_, String>(
            r"SELECT country_code FROM visited_countries
              WHERE user_id = $1
              ORDER BY id",
        )
        .bind(user.into_inner())
        .fetch_all(&self.pool)
        .await?;

        Ok(codes.into_iter().map(CountryCode::new).collect())
    }

    async fn list_all_users(&self) -> Result<Vec<User>, DbError> {
        let rows = sqlx::query_as::<_, UserRow>(r"SELECT id, name, color FROM users ORDER BY id")
            .fetch_all(&self.pool)
            .await?;

        tracing::debug!(count = rows.len(), "Loaded user roster");
        Ok(rows.into_iter().map(User::from).collect())
    }

    async fn list_visited_cities(&self, user: UserId) -> Result<Vec<String>, DbError> {
        let cities = sqlx::query_scalar::<_, String>(
            r"SELECT city_name FROM visited_cities
              WHERE user_id = $1
              ORDER BY id",
        )
        .bind(user.into_inner())
        .fetch_all(&self.pool)
        .await?;

        Ok(cities)
    }

    async fn find_country_code_by_name(
        &self,
        name: &CountryQuery,
    ) -> Result<Option<CountryCode>, DbError> {
        let code = sqlx::query_scalar::<_, String>(
            r"SELECT country_code FROM countries
              WHERE LOWER(country_name) = $1
              LIMIT 1",
        )
        .bind(name.as_str())
        .fetch_optional(&self.pool)
        .await?;

        Ok(code.map(CountryCode::new))
    }

    async fn city_exists(&self, user: UserId, city: &CityName) -> Result<bool, DbError> {
        let exists = sqlx::query_scalar::<_, bool>(
            r"SELECT EXISTS (
                SELECT 1 FROM visited_cities WHERE city_name = $1 AND user_id = $2
              )",
        )
        .bind(city.as_str())
        .bind(user.into_inner())
        .fetch_one(&self.pool)
        .await?;

        Ok(exists)
    }

    async fn insert_visited_country(
        &self,
        user: UserId,
        code: &CountryCode,
    ) -> Result<InsertOutcome, DbError> {
        let result = sqlx::query(
            r"INSERT INTO visited_countries (country_code, user_id)
              VALUES ($1, $2)
              ON CONFLICT (user_id, country_code) DO NOTHING",
        )
        .bind(code.as_str())
        .bind(user.into_inner())
        .execute(&self.pool)
        .await?;

        tracing::debug!(%user, %code, rows = result.rows_affected(), "Insert visited country");
        Ok(outcome(result.rows_affected()))
    }

    async fn insert_visited_city(
        &self,
        user: UserId,
        city: &CityName,
    ) -> Result<InsertOutcome, DbError> {
        let result = sqlx::query(
            r"INSERT INTO visited_cities (city_name, user_id)
              VALUES ($1, $2)
              ON CONFLICT (user_id, city_name) DO NOTHING",
        )
        .bind(city.as_str())
        .bind(user.into_inner())
        .execute(&self.pool)
        .await?;

        tracing::debug!(%user, %city, rows = result.rows_affected(), "Insert visited city");
        Ok(outcome(result.rows_affected()))
    }

    async fn delete_visited_city(&self, user: UserId, city: &CityName) -> Result<u64, DbError> {
        let result =
            sqlx::query(r"DELETE FROM visited_cities WHERE city_name = $1 AND user_id = $2")
                .bind(city.as_str())
                .bind(user.into_inner())
                .execute(&self.pool)
                .await?;

        Ok(result.rows_affected())
    }

    async fn insert_user(&self, name: &UserName, color: &str) -> Result<UserId, DbError> {
        let id = sqlx::query_scalar::<_, i32>(
            r"INSERT INTO users (name, color) VALUES ($1, $2) RETURNING id",
        )
        .bind(name.as_str())
        .bind(color)
        .fetch_one(&self.pool)
        .await?;

        tracing::info!(id, name = name.as_str(), "Created user");
        Ok(UserId(id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_rows_means_duplicate() {
        assert_eq!(outcome(0), InsertOutcome::Duplicate);
        assert_eq!(outcome(1), InsertOutcome::Inserted);
    }

    #[test]
    fn user_rows_map_to_users() {
        let user = User::from(UserRow {
            id: 3,
            name: String::from("Sam"),
            color: String::from("red"),
        });
        assert_eq!(user.id, UserId(3));
        assert_eq!(user.color, "red");
    }
}
