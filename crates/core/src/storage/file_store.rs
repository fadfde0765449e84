//! File-based key-value storage implementation
//!
//! Stores each key as a JSON file in a data directory.

use async_trait::async_trait;
use serde_json::Value;
use std::path::{Path, PathBuf};
use tracing::debug;

use super::kv::KeyValueStore;
use crate::{Error, Result};

/// File-based key-value store, one `<key>.json` file per key
pub struct FileKeyValueStore {
    /// Directory holding the key files
    dir: PathBuf,
}

impl FileKeyValueStore {
    /// Create a new FileKeyValueStore
    ///
    /// The directory is created on first write.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Directory holding the key files
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn key_path(&self, key: &str) -> Result<PathBuf> {
        if !is_valid_key(key) {
            return Err(Error::InvalidInput(format!("Invalid storage key: {:?}", key)));
        }
        Ok(self.dir.join(format!("{}.json", key)))
    }
}

fn is_valid_key(key: &str) -> bool {
    !key.is_empty()
        && !key.starts_with('.')
        && key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'))
}

#[async_trait]
impl KeyValueStore for FileKeyValueStore {
    async fn get(&self, key: &str) -> Result<Option<Value>> {
        let path = self.key_path(key)?;
        if !path.exists() {
            return Ok(None);
        }

        let content = tokio::fs::read_to_string(&path).await.map_err(|e| {
            Error::Storage(format!("Failed to read {}: {}", path.display(), e))
        })?;
        let value = serde_json::from_str(&content).map_err(|e| {
            Error::Storage(format!("Failed to parse {}: {}", path.display(), e))
        })?;

        debug!("Read key {} from {}", key, path.display());
        Ok(Some(value))
    }

    async fn set(&self, key: &str, value: Value) -> Result<()> {
        let path = self.key_path(key)?;
        let content = serde_json::to_string_pretty(&value)?;

        // Ensure the data directory exists
        tokio::fs::create_dir_all(&self.dir).await.map_err(|e| {
            Error::Storage(format!("Failed to create directory: {}", e))
        })?;

        tokio::fs::write(&path, content).await.map_err(|e| {
            Error::Storage(format!("Failed to write {}: {}", path.display(), e))
        })?;

        debug!("Wrote key {} to {}", key, path.display());
        Ok(())
    }
}
