//! Whole-collection persistence
//!
//! A collection is one JSON array stored under one key. Callers read the whole
//! array, change it in memory and write the whole array back.

use std::marker::PhantomData;

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, warn};

use super::kv::SharedStore;
use crate::{Error, Result};

/// Typed view of the JSON array stored under one key
pub struct JsonCollection<T> {
    store: SharedStore,
    key: &'static str,
    _records: PhantomData<fn() -> T>,
}

impl<T> Clone for JsonCollection<T> {
    fn clone(&self) -> Self {
        Self {
            store: self.store.clone(),
            key: self.key,
            _records: PhantomData,
        }
    }
}

impl<T: Serialize + DeserializeOwned> JsonCollection<T> {
    pub fn new(store: SharedStore, key: &'static str) -> Self {
        Self {
            store,
            key,
            _records: PhantomData,
        }
    }

    /// Load every record
    ///
    /// Missing or unreadable data reads as an empty collection. Records that
    /// do not parse are skipped; the rest are returned.
    pub async fn load(&self) -> Vec<T> {
        let values = match self.stored_values().await {
            Ok(values) => values,
            Err(e) => {
                warn!("Failed to read collection {}, treating as empty: {}", self.key, e);
                return Vec::new();
            }
        };

        let mut records = Vec::with_capacity(values.len());
        for (index, value) in values.into_iter().enumerate() {
            match serde_json::from_value::<T>(value) {
                Ok(record) => records.push(record),
                Err(e) => warn!("Skipping malformed record {} in {}: {}", index, self.key, e),
            }
        }

        debug!("Loaded {} records from {}", records.len(), self.key);
        records
    }

    /// Replace the stored collection with `records`
    ///
    /// Stored records that do not parse are kept, after `records`.
    pub async fn save(&self, records: &[T]) -> Result<()> {
        let mut values = records
            .iter()
            .map(serde_json::to_value)
            .collect::<std::result::Result<Vec<_>, _>>()?;

        let unparsed = self.unparsed_values().await;
        if !unparsed.is_empty() {
            debug!("Keeping {} malformed records in {}", unparsed.len(), self.key);
            values.extend(unparsed);
        }

        self.write(values).await?;
        debug!("Saved {} records to {}", records.len(), self.key);
        Ok(())
    }

    /// Replace the stored collection with an empty array
    pub async fn clear(&self) -> Result<()> {
        self.write(Vec::new()).await
    }

    /// Seed an empty array when nothing is stored yet
    ///
    /// Returns whether the key was seeded. Unreadable data is left untouched.
    pub async fn ensure_initialized(&self) -> Result<bool> {
        match self.store.get(self.key).await {
            Ok(None) | Ok(Some(Value::Null)) => {
                self.clear().await?;
                Ok(true)
            }
            Ok(Some(_)) => Ok(false),
            Err(e) => {
                warn!("Not seeding unreadable collection {}: {}", self.key, e);
                Ok(false)
            }
        }
    }

    async fn stored_values(&self) -> Result<Vec<Value>> {
        match self.store.get(self.key).await? {
            None | Some(Value::Null) => Ok(Vec::new()),
            Some(Value::Array(values)) => Ok(values),
            Some(other) => Err(Error::Storage(format!(
                "expected a JSON array under {}, got: {}",
                self.key, other
            ))),
        }
    }

    async fn unparsed_values(&self) -> Vec<Value> {
        self.stored_values()
            .await
            .unwrap_or_default()
            .into_iter()
            .filter(|value| serde_json::from_value::<T>(value.clone()).is_err())
            .collect()
    }

    async fn write(&self, values: Vec<Value>) -> Result<()> {
        if let Err(e) = self.store.set(self.key, Value::Array(values)).await {
            warn!("Failed to write collection {}: {}", self.key, e);
            return Err(e);
        }
        Ok(())
    }
}
