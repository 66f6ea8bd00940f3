//! Tracking which profile is active.
//!
//! In [`SessionMode::Shared`] there is a single current-user pointer for
//! the whole process: a switch made by one browser is what every other
//! browser sees on its next request. [`SessionMode::Cookie`] gives each
//! browser its own pointer through `tower-sessions`: the user id lives in
//! the session record under [`SESSION_USER_ID_KEY`], and the record id
//! travels in the [`SESSION_COOKIE`] cookie.
//!
//! Cookie-mode records are held in a [`SessionTable`], which drops
//! records once they expire and evicts the one closest to expiry when
//! it is full.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;
use time::{Duration, OffsetDateTime};
use tokio::sync::{Mutex, RwLock};
use tower_sessions::cookie::SameSite;
use tower_sessions::session::{Id, Record};
use tower_sessions::{Expiry, Session, SessionManagerLayer, SessionStore, session_store};
use travel_types::UserId;

/// Name of the cookie carrying the session id in cookie mode.
pub const SESSION_COOKIE: &str = "travel_session";

/// Session key holding the current [`UserId`].
pub const SESSION_USER_ID_KEY: &str = "user_id";

/// Default inactivity period after which a browser session is forgotten.
pub const DEFAULT_IDLE_TIMEOUT: Duration = Duration::days(7);

/// Default upper bound on live browser sessions.
pub const DEFAULT_MAX_SESSIONS: usize = 10_000;

/// How the current user is scoped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionMode {
    /// One current user for every caller.
    #[default]
    Shared,
    /// One current user per browser, keyed by cookie.
    Cookie,
}

// ---------------------------------------------------------------------------
// Session store
// ---------------------------------------------------------------------------

/// In-process session store with expiry and a size bound.
#[derive(Debug, Clone)]
pub struct SessionTable {
    records: Arc<Mutex<HashMap<Id, Record>>>,
    capacity: usize,
}

impl SessionTable {
    /// Create a table holding at most `capacity` sessions (minimum 1).
    pub fn new(capacity: usize) -> Self {
        Self {
            records: Arc::new(Mutex::new(HashMap::new())),
            capacity: capacity.max(1),
        }
    }

    /// Number of stored sessions, expired ones included until the next write.
    pub async fn len(&self) -> usize {
        self.records.lock().await.len()
    }

    /// Whether no session is stored.
    pub async fn is_empty(&self) -> bool {
        self.records.lock().await.is_empty()
    }

    fn insert(&self, records: &mut HashMap<Id, Record>, record: &Record) {
        let now = OffsetDateTime::now_utc();
        records.retain(|_, r| r.expiry_date > now);

        if !records.contains_key(&record.id) && records.len() >= self.capacity {
            let oldest = records
                .values()
                .min_by_key(|r| r.expiry_date)
                .map(|r| r.id);
            if let Some(id) = oldest {
                records.remove(&id);
                tracing::debug!(capacity = self.capacity, "Session table full, evicted oldest");
            }
        }
        records.insert(record.id, record.clone());
    }
}

impl Default for SessionTable {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_SESSIONS)
    }
}

#[async_trait]
impl SessionStore for SessionTable {
    async fn create(&self, record: &mut Record) -> session_store::Result<()> {
        let mut records = self.records.lock().await;
        while records.contains_key(&record.id) {
            record.id = Id::default();
        }
        self.insert(&mut records, record);
        Ok(())
    }

    async fn save(&self, record: &Record) -> session_store::Result<()> {
        let mut records = self.records.lock().await;
        self.insert(&mut records, record);
        Ok(())
    }

    async fn load(&self, id: &Id) -> session_store::Result<Option<Record>> {
        let mut records = self.records.lock().await;
        match records.get(id) {
            Some(record) if record.expiry_date > OffsetDateTime::now_utc() => Ok(Some(record.clone())),
            Some(_) => {
                records.remove(id);
                Ok(None)
            }
            None => Ok(None),
        }
    }

    async fn delete(&self, id: &Id) -> session_store::Result<()> {
        self.records.lock().await.remove(id);
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Current user
// ---------------------------------------------------------------------------

/// Current-user bookkeeping for all callers.
#[derive(Debug)]
pub struct Sessions {
    mode: SessionMode,
    default_user: UserId,
    shared: RwLock<UserId>,
    table: SessionTable,
    idle_timeout: Duration,
}

impl Sessions {
    /// Create session state that starts every caller on `default_user`.
    pub fn new(mode: SessionMode, default_user: UserId) -> Self {
        Self {
            mode,
            default_user,
            shared: RwLock::new(default_user),
            table: SessionTable::default(),
            idle_timeout: DEFAULT_IDLE_TIMEOUT,
        }
    }

    /// Forget a browser session after `timeout` without requests.
    #[must_use]
    pub fn with_idle_timeout(mut self, timeout: std::time::Duration) -> Self {
        self.idle_timeout = Duration::try_from(timeout).unwrap_or(DEFAULT_IDLE_TIMEOUT);
        self
    }

    /// Keep at most `max` browser sessions.
    #[must_use]
    pub fn with_max_sessions(mut self, max: usize) -> Self {
        self.table = SessionTable::new(max);
        self
    }

    /// The configured scoping mode.
    pub const fn mode(&self) -> SessionMode {
        self.mode
    }

    /// Backing store of cookie-mode sessions.
    pub const fn table(&self) -> &SessionTable {
        &self.table
    }

    /// Layer that loads and persists cookie-mode sessions.
    ///
    /// In shared mode handlers never write to the session, so no cookie
    /// is issued.
    pub fn layer(&self) -> SessionManagerLayer<SessionTable> {
        SessionManagerLayer::new(self.table.clone())
            .with_name(SESSION_COOKIE)
            .with_secure(false)
            .with_same_site(SameSite::Lax)
            .with_expiry(Expiry::OnInactivity(self.idle_timeout))
    }

    /// The user the caller owning `session` is acting as.
    pub async fn current(&self, session: &Session) -> UserId {
        match self.mode {
            SessionMode::Shared => *self.shared.read().await,
            SessionMode::Cookie => match session.get::<UserId>(SESSION_USER_ID_KEY).await {
                Ok(Some(user)) => user,
                Ok(None) => self.default_user,
                Err(e) => {
                    tracing::warn!(error = %e, "Failed to read session, using default user");
                    self.default_user
                }
            },
        }
    }

    /// Make `user` current for the caller owning `session`.
    ///
    /// # Errors
    ///
    /// Returns the session error if the cookie-mode record cannot be
    /// written.
    pub async fn switch(
        &self,
        session: &Session,
        user: UserId,
    ) -> Result<(), tower_sessions::session::Error> {
        match self.mode {
            SessionMode::Shared => {
                *self.shared.write().await = user;
                tracing::info!(%user, "Switched current user");
            }
            SessionMode::Cookie => {
                session.insert(SESSION_USER_ID_KEY, user).await?;
                tracing::info!(%user, "Switched current user for session");
            }
        }
        Ok(())
    }
}

impl Default for Sessions {
    fn default() -> Self {
        Self::new(SessionMode::Shared, UserId::SEED)
    }
}
