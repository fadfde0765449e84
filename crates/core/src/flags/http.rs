//! HTTP remote configuration client

use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use tokio::sync::Mutex;
use tracing::{debug, info};

use super::source::{RemoteConfigSettings, RemoteConfigSource, RemoteValues};
use crate::{Error, Result};

/// Fetches flag values from a JSON endpoint
///
/// The body is either a flat object (`{"enable_categories": false}`) or
/// carries the values under `entries` (`{"entries": {"enable_categories": "false"}}`).
pub struct HttpRemoteConfig {
    client: Client,
    url: String,
    minimum_fetch_interval: Duration,
    /// Last successful fetch
    last_fetch: Mutex<Option<(Instant, RemoteValues)>>,
}

impl HttpRemoteConfig {
    pub fn new(url: impl Into<String>, settings: RemoteConfigSettings) -> Result<Self> {
        let client = Client::builder()
            .timeout(settings.fetch_timeout)
            .build()
            .map_err(|e| Error::RemoteConfig(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            url: url.into(),
            minimum_fetch_interval: settings.minimum_fetch_interval,
            last_fetch: Mutex::new(None),
        })
    }
}

fn parse_remote_values(body: Value) -> Result<RemoteValues> {
    let map = match body {
        Value::Object(map) => map,
        other => {
            return Err(Error::RemoteConfig(format!(
                "Expected a JSON object, got: {}",
                other
            )))
        }
    };

    if let Some(Value::Object(entries)) = map.get("entries") {
        return Ok(entries.clone().into_iter().collect());
    }
    Ok(map.into_iter().collect())
}

#[async_trait]
impl RemoteConfigSource for HttpRemoteConfig {
    async fn fetch(&self) -> Result<RemoteValues> {
        let mut last_fetch = self.last_fetch.lock().await;

        if let Some((fetched_at, values)) = last_fetch.as_ref() {
            if fetched_at.elapsed() < self.minimum_fetch_interval {
                debug!("Serving remote config fetched {:?} ago", fetched_at.elapsed());
                return Ok(values.clone());
            }
        }

        info!("Fetching remote config from {}", self.url);

        let response = self
            .client
            .get(&self.url)
            .send()
            .await
            .map_err(|e| Error::RemoteConfig(format!("Failed to reach {}: {}", self.url, e)))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(Error::RemoteConfig(format!(
                "{} returned {}: {}",
                self.url, status, error_text
            )));
        }

        let body: Value = response
            .json()
            .await
            .map_err(|e| Error::RemoteConfig(format!("Invalid response body: {}", e)))?;
        let values = parse_remote_values(body)?;

        *last_fetch = Some((Instant::now(), values.clone()));
        Ok(values)
    }
}
