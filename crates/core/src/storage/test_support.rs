use std::collections::HashSet;
use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::Value;

use super::{KeyValueStore, MemoryKeyValueStore};
use crate::{Error, Result};

/// Memory store whose writes to selected keys fail
#[derive(Default)]
pub(crate) struct FlakyStore {
    inner: MemoryKeyValueStore,
    failing_keys: Mutex<HashSet<String>>,
}

impl FlakyStore {
    pub(crate) fn fail_writes_to(&self, key: &str) {
        self.failing_keys.lock().unwrap().insert(key.to_string());
    }
}

#[async_trait]
impl KeyValueStore for FlakyStore {
    async fn get(&self, key: &str) -> Result<Option<Value>> {
        self.inner.get(key).await
    }

    async fn set(&self, key: &str, value: Value) -> Result<()> {
        if self.failing_keys.lock().unwrap().contains(key) {
            return Err(Error::Storage(format!("disk full writing {}", key)));
        }
        self.inner.set(key, value).await
    }
}
