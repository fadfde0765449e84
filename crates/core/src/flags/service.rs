//! Feature flag bootstrap
//!
//! Flags start at their local defaults. One remote fetch per service lifetime
//! may overwrite them; a failed fetch keeps the defaults. Either way the
//! service ends up `Loaded` and never fetches again.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use tokio::sync::{watch, RwLock};
use tokio::task::JoinHandle;
use tracing::{info, warn};

use super::source::{parse_bool, RemoteConfigSource, RemoteValues};
use crate::{Error, Result};

/// Remote key of the categories flag
pub const ENABLE_CATEGORIES: &str = "enable_categories";

/// Flag values the UI reads
///
/// The built-in default enables categories. Deployments may start from other
/// defaults (see `Settings::default_flags`); those are what a failed fetch keeps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FeatureFlags {
    pub enable_categories: bool,
}

impl Default for FeatureFlags {
    fn default() -> Self {
        Self {
            enable_categories: true,
        }
    }
}

impl FeatureFlags {
    /// Overlay remote values on top of these flags
    fn with_remote(mut self, values: &RemoteValues) -> Result<Self> {
        if let Some(raw) = values.get(ENABLE_CATEGORIES) {
            self.enable_categories = parse_bool(raw).ok_or_else(|| {
                Error::RemoteConfig(format!("{} is not a boolean: {}", ENABLE_CATEGORIES, raw))
            })?;
        }
        Ok(self)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LoadState {
    NotLoaded,
    Loaded,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FeatureFlagsSnapshot {
    pub flags: FeatureFlags,
    pub state: LoadState,
}

/// How the bootstrap ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BootstrapOutcome {
    /// Remote values were applied
    Fetched,
    /// Nothing was fetched, or the fetch failed; the defaults stay in effect
    DefaultsRetained,
}

/// Owns the process' feature flag values
pub struct FeatureFlagService {
    source: Option<Arc<dyn RemoteConfigSource>>,
    fetch_timeout: Duration,
    current: RwLock<FeatureFlagsSnapshot>,
    started: AtomicBool,
    outcome: watch::Sender<Option<BootstrapOutcome>>,
}

impl FeatureFlagService {
    pub fn new(
        source: Arc<dyn RemoteConfigSource>,
        defaults: FeatureFlags,
        fetch_timeout: Duration,
    ) -> Self {
        Self::with_source(Some(source), defaults, fetch_timeout)
    }

    /// Service with no remote endpoint; bootstrap keeps `defaults`
    pub fn local(defaults: FeatureFlags) -> Self {
        Self::with_source(None, defaults, Duration::ZERO)
    }

    fn with_source(
        source: Option<Arc<dyn RemoteConfigSource>>,
        defaults: FeatureFlags,
        fetch_timeout: Duration,
    ) -> Self {
        let (outcome, _) = watch::channel(None);
        Self {
            source,
            fetch_timeout,
            current: RwLock::new(FeatureFlagsSnapshot {
                flags: defaults,
                state: LoadState::NotLoaded,
            }),
            started: AtomicBool::new(false),
            outcome,
        }
    }

    /// Fetch remote flags once
    ///
    /// The first call starts the fetch on its own task, so it runs to
    /// completion even if that caller stops waiting. Every call, later and
    /// concurrent ones included, waits for and returns that one outcome.
    pub async fn bootstrap(self: &Arc<Self>) -> BootstrapOutcome {
        let mut outcome = self.outcome.subscribe();

        if !self.started.swap(true, Ordering::SeqCst) {
            let service = Arc::clone(self);
            tokio::spawn(async move {
                let result = service.load().await;
                service.outcome.send_replace(Some(result));
            });
        }

        // The sender lives in `self`, so the channel cannot close while we wait.
        let result = match outcome.wait_for(Option::is_some).await {
            Ok(ready) => *ready,
            Err(_) => None,
        };
        result.unwrap_or(BootstrapOutcome::DefaultsRetained)
    }

    /// Run [`bootstrap`](Self::bootstrap) in the background
    pub fn spawn_bootstrap(self: &Arc<Self>) -> JoinHandle<BootstrapOutcome> {
        let service = Arc::clone(self);
        tokio::spawn(async move { service.bootstrap().await })
    }

    pub async fn enable_categories(&self) -> bool {
        self.current.read().await.flags.enable_categories
    }

    pub async fn snapshot(&self) -> FeatureFlagsSnapshot {
        *self.current.read().await
    }

    pub async fn is_loaded(&self) -> bool {
        self.current.read().await.state == LoadState::Loaded
    }

    async fn fetch_with_timeout(&self, source: &dyn RemoteConfigSource) -> Result<RemoteValues> {
        match tokio::time::timeout(self.fetch_timeout, source.fetch()).await {
            Ok(result) => result,
            Err(_) => Err(Error::Timeout {
                millis: self.fetch_timeout.as_millis() as u64,
            }),
        }
    }

    async fn load(&self) -> BootstrapOutcome {
        let Some(source) = self.source.as_deref() else {
            self.current.write().await.state = LoadState::Loaded;
            info!("No remote config source, feature flags keep their defaults");
            return BootstrapOutcome::DefaultsRetained;
        };
        let fetched = self.fetch_with_timeout(source).await;

        let mut current = self.current.write().await;
        let outcome = match fetched.and_then(|values| current.flags.with_remote(&values)) {
            Ok(flags) => {
                current.flags = flags;
                info!("Remote feature flags loaded: {:?}", flags);
                BootstrapOutcome::Fetched
            }
            Err(e) => {
                warn!("Failed to load remote feature flags, keeping defaults: {}", e);
                BootstrapOutcome::DefaultsRetained
            }
        };
        current.state = LoadState::Loaded;

        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::flags::StaticRemoteConfig;
    use async_trait::async_trait;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct FailingSource;

    #[async_trait]
    impl RemoteConfigSource for FailingSource {
        async fn fetch(&self) -> Result<RemoteValues> {
            Err(Error::RemoteConfig("network unreachable".into()))
        }
    }

    struct HangingSource;

    #[async_trait]
    impl RemoteConfigSource for HangingSource {
        async fn fetch(&self) -> Result<RemoteValues> {
            tokio::time::sleep(Duration::from_secs(30)).await;
            Ok(RemoteValues::new())
        }
    }

    /// Counts fetches and answers after a short delay
    struct CountingSource {
        fetches: AtomicUsize,
        values: RemoteValues,
    }

    #[async_trait]
    impl RemoteConfigSource for CountingSource {
        async fn fetch(&self) -> Result<RemoteValues> {
            self.fetches.fetch_add(1, Ordering::SeqCst);
            tokio::time::sleep(Duration::from_millis(20)).await;
            Ok(self.values.clone())
        }
    }

    fn values(raw: serde_json::Value) -> RemoteValues {
        RemoteValues::from([(ENABLE_CATEGORIES.to_string(), raw)])
    }

    fn service(source: impl RemoteConfigSource + 'static) -> Arc<FeatureFlagService> {
        Arc::new(FeatureFlagService::new(
            Arc::new(source),
            FeatureFlags::default(),
            Duration::from_secs(5),
        ))
    }

    #[tokio::test]
    async fn test_defaults_before_bootstrap() {
        let service = service(FailingSource);

        assert!(service.enable_categories().await);
        assert!(!service.is_loaded().await);
        assert_eq!(service.snapshot().await.state, LoadState::NotLoaded);
    }

    #[tokio::test]
    async fn test_failed_fetch_keeps_default() {
        let service = service(FailingSource);

        assert_eq!(service.bootstrap().await, BootstrapOutcome::DefaultsRetained);
        assert!(service.enable_categories().await);
        assert!(service.is_loaded().await);
    }

    #[tokio::test]
    async fn test_fetch_overrides_default() {
        let service = service(StaticRemoteConfig::new(values(json!("false"))));

        assert_eq!(service.bootstrap().await, BootstrapOutcome::Fetched);
        assert!(!service.enable_categories().await);
        assert_eq!(
            service.snapshot().await,
            FeatureFlagsSnapshot {
                flags: FeatureFlags {
                    enable_categories: false
                },
                state: LoadState::Loaded,
            }
        );
    }

    #[tokio::test]
    async fn test_missing_key_keeps_default() {
        let service = service(StaticRemoteConfig::default());

        assert_eq!(service.bootstrap().await, BootstrapOutcome::Fetched);
        assert!(service.enable_categories().await);
    }

    #[tokio::test]
    async fn test_unparsable_value_keeps_default() {
        let service = service(CountingSource {
            fetches: AtomicUsize::new(0),
            values: values(json!("sometimes")),
        });

        assert_eq!(service.bootstrap().await, BootstrapOutcome::DefaultsRetained);
        assert!(service.enable_categories().await);
        assert!(service.is_loaded().await);
    }

    #[tokio::test]
    async fn test_timeout_keeps_default() {
        let service = Arc::new(FeatureFlagService::new(
            Arc::new(HangingSource),
            FeatureFlags::default(),
            Duration::from_millis(50),
        ));

        assert_eq!(service.bootstrap().await, BootstrapOutcome::DefaultsRetained);
        assert!(service.enable_categories().await);
        assert!(service.is_loaded().await);
    }

    #[tokio::test]
    async fn test_bootstrap_fetches_once() {
        let source = Arc::new(CountingSource {
            fetches: AtomicUsize::new(0),
            values: values(json!(false)),
        });
        let service = Arc::new(FeatureFlagService::new(
            source.clone(),
            FeatureFlags::default(),
            Duration::from_secs(5),
        ));

        let handles: Vec<_> = (0..8).map(|_| service.spawn_bootstrap()).collect();
        for handle in handles {
            assert_eq!(handle.await.unwrap(), BootstrapOutcome::Fetched);
        }
        assert_eq!(service.bootstrap().await, BootstrapOutcome::Fetched);

        assert_eq!(source.fetches.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_failed_bootstrap_is_not_retried() {
        let source = Arc::new(CountingSource {
            fetches: AtomicUsize::new(0),
            values: values(json!(42)),
        });
        let service = Arc::new(FeatureFlagService::new(
            source.clone(),
            FeatureFlags::default(),
            Duration::from_secs(5),
        ));

        assert_eq!(service.bootstrap().await, BootstrapOutcome::DefaultsRetained);
        assert_eq!(service.bootstrap().await, BootstrapOutcome::DefaultsRetained);
        assert_eq!(source.fetches.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_abandoned_bootstrap_still_completes_once() {
        let source = Arc::new(CountingSource {
            fetches: AtomicUsize::new(0),
            values: values(json!(false)),
        });
        let service = Arc::new(FeatureFlagService::new(
            source.clone(),
            FeatureFlags::default(),
            Duration::from_secs(5),
        ));

        let first = tokio::time::timeout(Duration::from_millis(5), service.bootstrap()).await;
        assert!(first.is_err());

        // The fetch keeps running without a waiting caller
        tokio::time::sleep(Duration::from_millis(100)).await;
        assert!(service.is_loaded().await);
        assert!(!service.enable_categories().await);

        assert_eq!(service.bootstrap().await, BootstrapOutcome::Fetched);
        assert_eq!(source.fetches.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_local_service_keeps_defaults() {
        let service = Arc::new(FeatureFlagService::local(FeatureFlags {
            enable_categories: false,
        }));

        assert_eq!(service.bootstrap().await, BootstrapOutcome::DefaultsRetained);
        assert!(!service.enable_categories().await);
        assert!(service.is_loaded().await);
    }
}
