//! Remote configuration sources

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;

use crate::Result;

/// Raw key/value pairs returned by a remote configuration fetch
pub type RemoteValues = HashMap<String, Value>;

/// Client settings for remote configuration fetches
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RemoteConfigSettings {
    /// Results younger than this are served without a new request (0 = always fetch)
    pub minimum_fetch_interval: Duration,
    pub fetch_timeout: Duration,
}

impl Default for RemoteConfigSettings {
    fn default() -> Self {
        Self {
            minimum_fetch_interval: Duration::ZERO,
            fetch_timeout: Duration::from_secs(60),
        }
    }
}

/// A managed remote-configuration backend
#[async_trait]
pub trait RemoteConfigSource: Send + Sync {
    async fn fetch(&self) -> Result<RemoteValues>;
}

/// Source with fixed values
#[derive(Debug, Clone, Default)]
pub struct StaticRemoteConfig {
    values: RemoteValues,
}

impl StaticRemoteConfig {
    pub fn new(values: RemoteValues) -> Self {
        Self { values }
    }
}

#[async_trait]
impl RemoteConfigSource for StaticRemoteConfig {
    async fn fetch(&self) -> Result<RemoteValues> {
        Ok(self.values.clone())
    }
}

/// Parse a boolean word such as `true`, `off` or `1`
pub fn parse_bool_str(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// Interpret a remote value as a boolean
///
/// Remote-config backends often deliver every value as a string.
pub fn parse_bool(value: &Value) -> Option<bool> {
    match value {
        Value::Bool(b) => Some(*b),
        Value::String(s) => parse_bool_str(s),
        Value::Number(n) => match n.as_i64() {
            Some(1) => Some(true),
            Some(0) => Some(false),
            _ => None,
        },
        _ => None,
    }
}
