//! Generation-keyed cache of the user roster.
//!
//! Nearly every page shows the user switcher and the current user's
//! colour, so the full user list is read on almost every request. The
//! cache keeps the last list together with the generation it was read
//! at; [`RosterCache::invalidate`] bumps the generation after a write so
//! the next read goes back to the store.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use tokio::sync::RwLock;
use travel_types::{User, UserId};

use crate::error::DbError;
use crate::store::TravelStore;

#[derive(Debug)]
struct CachedRoster {
    generation: u64,
    users: Arc<Vec<User>>,
}

/// Cached copy of `users`, invalidated on write.
#[derive(Debug, Default)]
pub struct RosterCache {
    generation: AtomicU64,
    cached: RwLock<Option<CachedRoster>>,
}

impl RosterCache {
    /// Create an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Current generation. Increases on every invalidation.
    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::Acquire)
    }

    /// Mark the cached roster stale.
    pub fn invalidate(&self) {
        let previous = self.generation.fetch_add(1, Ordering::AcqRel);
        tracing::debug!(generation = previous.wrapping_add(1), "Roster cache invalidated");
    }

    /// Return the roster, reading the store only when the cache is stale.
    ///
    /// # Errors
    ///
    /// Returns the store error if a refresh was needed and failed.
    pub async fn users(&self, store: &dyn TravelStore) -> Result<Arc<Vec<User>>, DbError> {
        let generation = self.generation();
        {
            let cached = self.cached.read().await;
            if let Some(entry) = cached.as_ref()
                && entry.generation == generation
            {
                return Ok(Arc::clone(&entry.users));
            }
        }
        self.load(store, generation).await
    }

    /// Re-read the roster from the store regardless of cache state.
    ///
    /// # Errors
    ///
    /// Returns the store error if the read fails.
    pub async fn refresh(&self, store: &dyn TravelStore) -> Result<Arc<Vec<User>>, DbError> {
        let generation = self.generation();
        self.load(store, generation).await
    }

    /// Look a user up in the (possibly cached) roster.
    ///
    /// # Errors
    ///
    /// Returns the store error if a refresh was needed and failed.
    pub async fn find_user(
        &self,
        store: &dyn TravelStore,
        id: UserId,
    ) -> Result<Option<User>, DbError> {
        let users = self.users(store).await?;
        Ok(users.iter().find(|u| u.id == id).cloned())
    }

    async fn load(
        &self,
        store: &dyn TravelStore,
        generation: u64,
    ) -> Result<Arc<Vec<User>>, DbError> {
        let users = Arc::new(store.list_all_users().await?);
        // Tagged with the generation observed before the read, so an
        // invalidation that lands mid-query leaves this entry stale.
        *self.cached.write().await = Some(CachedRoster {
            generation,
            users: Arc::clone(&users),
        });
        Ok(users)
    }
}
