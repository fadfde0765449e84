//! Key-value store trait
//!
//! Defines the interface of the embedded store the repositories sit on.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use crate::Result;

/// Embedded key-value store holding JSON values
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Read the value stored under `key`, `None` if nothing was ever set
    async fn get(&self, key: &str) -> Result<Option<Value>>;

    /// Replace the value stored under `key`
    async fn set(&self, key: &str, value: Value) -> Result<()>;
}

/// Store handle shared by the repositories
pub type SharedStore = Arc<dyn KeyValueStore>;
