use std::{collections::HashMap, path::Path, sync::Arc};

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use tokio::sync::Mutex;
use tracing::debug;

use super::table::JsonTable;
use crate::{clock::Clock, error::AuthError, types::AuthorizationState, utils};

/// Lifetime of an authorization state value, in seconds.
pub const STATE_LIFETIME_SECS: i64 = 5 * 60;

/// Short-lived, single-use anti-forgery values bound to a user.
#[async_trait]
pub trait StateStore: Send + Sync {
    /// Stores a fresh state value for `user_id` and returns it.
    async fn create_state(&self, user_id: &str) -> Result<String, AuthError>;

    /// Deletes the state and returns its user.
    ///
    /// Concurrent calls with the same value: at most one succeeds, the others
    /// see `StateNotFound`. An expired value is deleted and reported as
    /// `StateExpired`.
    async fn verify_and_consume(&self, value: &str) -> Result<String, AuthError>;

    /// Drops every expired row. Returns how many were removed.
    async fn purge_expired(&self) -> Result<usize, AuthError>;
}

fn new_state(user_id: &str, now: DateTime<Utc>, lifetime: Duration) -> AuthorizationState {
    AuthorizationState {
        value: utils::generate_state_value(),
        user_id: user_id.to_string(),
        expires_at: now + lifetime,
    }
}

fn consume(
    rows: &mut HashMap<String, AuthorizationState>,
    value: &str,
    now: DateTime<Utc>,
) -> Result<String, AuthError> {
    let state = rows.remove(value).ok_or(AuthError::StateNotFound)?;
    if now > state.expires_at {
        debug!(user_id = %state.user_id, "authorization state expired");
        return Err(AuthError::StateExpired);
    }
    Ok(state.user_id)
}

/// Removes rows that expired before `cutoff`. Creation purges with a cutoff
/// one lifetime in the past so a just-expired value still reports
/// `StateExpired` rather than `StateNotFound`.
fn purge(rows: &mut HashMap<String, AuthorizationState>, cutoff: DateTime<Utc>) -> usize {
    let before = rows.len();
    rows.retain(|_, s| s.expires_at >= cutoff);
    before - rows.len()
}

pub struct MemoryStateStore {
    rows: Mutex<HashMap<String, AuthorizationState>>,
    clock: Arc<dyn Clock>,
    lifetime: Duration,
}

impl MemoryStateStore {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            rows: Mutex::new(HashMap::new()),
            clock,
            lifetime: Duration::seconds(STATE_LIFETIME_SECS),
        }
    }

    pub async fn len(&self) -> usize {
        self.rows.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.rows.lock().await.is_empty()
    }
}

#[async_trait]
impl StateStore for MemoryStateStore {
    async fn create_state(&self, user_id: &str) -> Result<String, AuthError> {
        let now = self.clock.now();
        let state = new_state(user_id, now, self.lifetime);
        let value = state.value.clone();

        let mut rows = self.rows.lock().await;
        purge(&mut rows, now - self.lifetime);
        rows.insert(value.clone(), state);
        Ok(value)
    }

    async fn verify_and_consume(&self, value: &str) -> Result<String, AuthError> {
        let now = self.clock.now();
        consume(&mut *self.rows.lock().await, value, now)
    }

    async fn purge_expired(&self) -> Result<usize, AuthError> {
        let now = self.clock.now();
        Ok(purge(&mut *self.rows.lock().await, now))
    }
}

/// State table persisted as `states.json` in the data directory.
pub struct FileStateStore {
    table: JsonTable,
    lock: Mutex<()>,
    clock: Arc<dyn Clock>,
    lifetime: Duration,
}

impl FileStateStore {
    pub fn new(data_dir: &Path, clock: Arc<dyn Clock>) -> Self {
        Self {
            table: JsonTable::new(data_dir.join("states.json")),
            lock: Mutex::new(()),
            clock,
            lifetime: Duration::seconds(STATE_LIFETIME_SECS),
        }
    }
}

#[async_trait]
impl StateStore for FileStateStore {
    async fn create_state(&self, user_id: &str) -> Result<String, AuthError> {
        let _guard = self.lock.lock().await;
        let now = self.clock.now();

        let mut rows: HashMap<String, AuthorizationState> = self.table.load().await?;
        purge(&mut rows, now - self.lifetime);

        let state = new_state(user_id, now, self.lifetime);
        let value = state.value.clone();
        rows.insert(value.clone(), state);
        self.table.persist(&rows).await?;
        Ok(value)
    }

    async fn verify_and_consume(&self, value: &str) -> Result<String, AuthError> {
        let _guard = self.lock.lock().await;
        let now = self.clock.now();

        let mut rows: HashMap<String, AuthorizationState> = self.table.load().await?;
        let result = consume(&mut rows, value, now);
        if !matches!(result, Err(AuthError::StateNotFound)) {
            self.table.persist(&rows).await?;
        }
        result
    }

    async fn purge_expired(&self) -> Result<usize, AuthError> {
        let _guard = self.lock.lock().await;
        let mut rows: HashMap<String, AuthorizationState> = self.table.load().await?;
        let removed = purge(&mut rows, self.clock.now());
        if removed > 0 {
            self.table.persist(&rows).await?;
        }
        Ok(removed)
    }
}
