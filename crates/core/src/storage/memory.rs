//! In-process key-value storage
//!
//! The browser-style local storage variant: string keys mapping to serialized
//! JSON text, accessible synchronously.

use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Mutex;

use super::kv::KeyValueStore;
use crate::{Error, Result};

/// Same-process string-keyed store
#[derive(Default)]
pub struct MemoryKeyValueStore {
    items: Mutex<HashMap<String, String>>,
}

impl MemoryKeyValueStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Raw text stored under `key`
    pub fn get_item(&self, key: &str) -> Option<String> {
        self.lock().get(key).cloned()
    }

    /// Store raw text under `key`
    pub fn set_item(&self, key: &str, value: impl Into<String>) {
        self.lock().insert(key.to_string(), value.into());
    }

    pub fn remove_item(&self, key: &str) -> Option<String> {
        self.lock().remove(key)
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<String, String>> {
        // Entries are replaced whole, so a poisoned map is still consistent.
        self.items.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[async_trait]
impl KeyValueStore for MemoryKeyValueStore {
    async fn get(&self, key: &str) -> Result<Option<Value>> {
        let Some(raw) = self.get_item(key) else {
            return Ok(None);
        };

        serde_json::from_str(&raw)
            .map(Some)
            .map_err(|e| Error::Storage(format!("Failed to parse item {}: {}", key, e)))
    }

    async fn set(&self, key: &str, value: Value) -> Result<()> {
        let raw = serde_json::to_string(&value)?;
        self.set_item(key, raw);
        Ok(())
    }
}
