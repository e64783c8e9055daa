use std::{collections::HashMap, path::Path, sync::Arc};

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use tokio::sync::Mutex;

use super::table::JsonTable;
use crate::{
    clock::Clock,
    error::AuthError,
    types::{TokenGrant, TokenRecord},
};

/// Long-lived OAuth token records keyed by user id.
#[async_trait]
pub trait TokenStore: Send + Sync {
    /// Upserts the record for `user_id` with `expires_at = now + expires_in`.
    async fn save(&self, user_id: &str, grant: &TokenGrant) -> Result<TokenRecord, AuthError>;

    /// `Ok(None)` when the user has never been authorized.
    async fn get(&self, user_id: &str) -> Result<Option<TokenRecord>, AuthError>;
}

/// Upper bound on a provider-reported `expires_in`, one year.
const MAX_EXPIRES_IN_SECS: u64 = 365 * 24 * 60 * 60;

fn new_record(user_id: &str, grant: &TokenGrant, now: DateTime<Utc>) -> TokenRecord {
    TokenRecord {
        user_id: user_id.to_string(),
        access_token: grant.access_token.clone(),
        refresh_token: grant.refresh_token.clone(),
        scope: grant.scope.clone(),
        expires_at: now + Duration::seconds(grant.expires_in.min(MAX_EXPIRES_IN_SECS) as i64),
    }
}

pub struct MemoryTokenStore {
    rows: Mutex<HashMap<String, TokenRecord>>,
    clock: Arc<dyn Clock>,
}

impl MemoryTokenStore {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            rows: Mutex::new(HashMap::new()),
            clock,
        }
    }

    /// Writes a record as-is, bypassing expiry computation.
    pub async fn insert(&self, record: TokenRecord) {
        self.rows
            .lock()
            .await
            .insert(record.user_id.clone(), record);
    }

    pub async fn len(&self) -> usize {
        self.rows.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.rows.lock().await.is_empty()
    }
}

#[async_trait]
impl TokenStore for MemoryTokenStore {
    async fn save(&self, user_id: &str, grant: &TokenGrant) -> Result<TokenRecord, AuthError> {
        let record = new_record(user_id, grant, self.clock.now());
        self.rows
            .lock()
            .await
            .insert(user_id.to_string(), record.clone());
        Ok(record)
    }

    async fn get(&self, user_id: &str) -> Result<Option<TokenRecord>, AuthError> {
        Ok(self.rows.lock().await.get(user_id).cloned())
    }
}

/// Token table persisted as `tokens.json` in the data directory.
pub struct FileTokenStore {
    table: JsonTable,
    lock: Mutex<()>,
    clock: Arc<dyn Clock>,
}

impl FileTokenStore {
    pub fn new(data_dir: &Path, clock: Arc<dyn Clock>) -> Self {
        Self {
            table: JsonTable::new(data_dir.join("tokens.json")),
            lock: Mutex::new(()),
            clock,
        }
    }
}

#[async_trait]
impl TokenStore for FileTokenStore {
    async fn save(&self, user_id: &str, grant: &TokenGrant) -> Result<TokenRecord, AuthError> {
        let _guard = self.lock.lock().await;

        let mut rows: HashMap<String, TokenRecord> = self.table.load().await?;
        let record = new_record(user_id, grant, self.clock.now());
        rows.insert(user_id.to_string(), record.clone());
        self.table.persist(&rows).await?;
        Ok(record)
    }

    async fn get(&self, user_id: &str) -> Result<Option<TokenRecord>, AuthError> {
        let _guard = self.lock.lock().await;
        let mut rows: HashMap<String, TokenRecord> = self.table.load().await?;
        Ok(rows.remove(user_id))
    }
}
