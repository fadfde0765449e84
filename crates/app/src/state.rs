//! Application state
//!
//! Built once at start-up; every component is owned here and shared by handle.

use std::path::PathBuf;
use std::sync::Arc;

use serde::Serialize;
use taskbox_core::category::{CategoryRepository, KvCategoryStore};
use taskbox_core::config::{Settings, StorageBackend};
use taskbox_core::flags::{FeatureFlagService, FeatureFlagsSnapshot, HttpRemoteConfig};
use taskbox_core::storage::{FileKeyValueStore, MemoryKeyValueStore, SharedStore};
use taskbox_core::task::{KvTaskStore, TaskFilter, TaskRepository};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    settings: Settings,
    tasks: Arc<KvTaskStore>,
    categories: Arc<KvCategoryStore>,
    flags: Arc<FeatureFlagService>,
}

/// What the application found at start-up
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StartupSummary {
    pub version: String,
    pub data_dir: Option<PathBuf>,
    pub tasks: usize,
    pub completed_tasks: usize,
    /// Includes tasks pointing at deleted categories
    pub uncategorized_tasks: usize,
    pub categories: usize,
    pub feature_flags: FeatureFlagsSnapshot,
}

impl AppState {
    /// Create a new AppState from settings
    pub async fn new(settings: Settings) -> taskbox_core::Result<Self> {
        let store: SharedStore = match settings.storage {
            StorageBackend::File => Arc::new(FileKeyValueStore::new(settings.data_dir.clone())),
            StorageBackend::Memory => Arc::new(MemoryKeyValueStore::new()),
        };

        let tasks = Arc::new(KvTaskStore::new(store.clone()));
        let categories = Arc::new(KvCategoryStore::new(store, tasks.clone()));
        tasks.ensure_initialized().await?;
        categories.ensure_initialized().await?;

        let flags = match &settings.remote_config_url {
            Some(url) => FeatureFlagService::new(
                Arc::new(HttpRemoteConfig::new(url.clone(), settings.remote_config)?),
                settings.default_flags,
                settings.remote_config.fetch_timeout,
            ),
            None => {
                tracing::info!("No remote config URL set, feature flags keep their defaults");
                FeatureFlagService::local(settings.default_flags)
            }
        };
        let flags = Arc::new(flags);

        Ok(Self {
            inner: Arc::new(AppStateInner {
                settings,
                tasks,
                categories,
                flags,
            }),
        })
    }

    pub fn settings(&self) -> &Settings {
        &self.inner.settings
    }

    /// Get reference to the task repository
    pub fn tasks(&self) -> &dyn TaskRepository {
        self.inner.tasks.as_ref()
    }

    /// Get reference to the category repository
    pub fn categories(&self) -> &dyn CategoryRepository {
        self.inner.categories.as_ref()
    }

    pub fn flags(&self) -> &Arc<FeatureFlagService> {
        &self.inner.flags
    }

    pub async fn summary(&self) -> taskbox_core::Result<StartupSummary> {
        let tasks = self.tasks().get_tasks().await?;
        let categories = self.categories().get_categories().await?;
        let uncategorized = TaskFilter::Uncategorized.apply(&tasks, &categories);

        let data_dir = match self.settings().storage {
            StorageBackend::File => Some(self.settings().data_dir.clone()),
            StorageBackend::Memory => None,
        };

        Ok(StartupSummary {
            version: env!("CARGO_PKG_VERSION").to_string(),
            data_dir,
            tasks: tasks.len(),
            completed_tasks: tasks.iter().filter(|t| t.completed).count(),
            uncategorized_tasks: uncategorized.len(),
            categories: categories.len(),
            feature_flags: self.flags().snapshot().await,
        })
    }
}
