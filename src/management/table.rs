use std::{collections::HashMap, io::ErrorKind, path::PathBuf};

use serde::{Serialize, de::DeserializeOwned};

use crate::error::AuthError;

/// A JSON object on disk mapping string keys to rows.
///
/// Callers serialize access through their own lock; the table itself only
/// knows how to load and replace the whole file.
pub struct JsonTable {
    path: PathBuf,
}

impl JsonTable {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    /// Reads all rows. A missing file is an empty table.
    pub async fn load<V: DeserializeOwned>(&self) -> Result<HashMap<String, V>, AuthError> {
        let json = match async_fs::read_to_string(&self.path).await {
            Ok(json) => json,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(HashMap::new()),
            Err(e) => return Err(e.into()),
        };

        if json.trim().is_empty() {
            return Ok(HashMap::new());
        }

        Ok(serde_json::from_str(&json)?)
    }

    /// Replaces the file with `rows`, writing to a sibling temp file first.
    pub async fn persist<V: Serialize>(&self, rows: &HashMap<String, V>) -> Result<(), AuthError> {
        if let Some(parent) = self.path.parent() {
            async_fs::create_dir_all(parent).await?;
        }

        let json = serde_json::to_string_pretty(rows)?;
        let tmp = self.path.with_extension("json.tmp");
        async_fs::write(&tmp, json).await?;
        async_fs::rename(&tmp, &self.path).await?;
        Ok(())
    }
}
