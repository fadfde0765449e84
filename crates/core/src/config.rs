//! Settings
//!
//! Read from `TASKBOX_*` environment variables at application start.

use std::path::PathBuf;
use std::time::Duration;

use crate::flags::{parse_bool_str, FeatureFlags, RemoteConfigSettings};
use crate::{Error, Result};

pub const DATA_DIR_VAR: &str = "TASKBOX_DATA_DIR";
pub const STORAGE_VAR: &str = "TASKBOX_STORAGE";
pub const REMOTE_CONFIG_URL_VAR: &str = "TASKBOX_REMOTE_CONFIG_URL";
pub const FETCH_TIMEOUT_VAR: &str = "TASKBOX_FETCH_TIMEOUT_MS";
pub const MIN_FETCH_INTERVAL_VAR: &str = "TASKBOX_MIN_FETCH_INTERVAL_MS";
/// Overrides the built-in `enable_categories = true` default. A failed remote
/// fetch keeps whichever default is in effect.
pub const ENABLE_CATEGORIES_VAR: &str = "TASKBOX_ENABLE_CATEGORIES";

const DEFAULT_DATA_DIR: &str = ".taskbox-data";

/// Which key-value store backs the repositories
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StorageBackend {
    /// JSON files in the data directory
    #[default]
    File,
    /// Process-local storage, lost on exit
    Memory,
}

impl std::str::FromStr for StorageBackend {
    type Err = Error;

    fn from_str(raw: &str) -> Result<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "file" => Ok(Self::File),
            "memory" => Ok(Self::Memory),
            other => Err(Error::InvalidInput(format!(
                "Unknown storage backend: {}",
                other
            ))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub data_dir: PathBuf,
    pub storage: StorageBackend,
    /// Remote flag endpoint; flags keep their defaults without one
    pub remote_config_url: Option<String>,
    pub remote_config: RemoteConfigSettings,
    /// Flag values before, or instead of, the remote fetch
    pub default_flags: FeatureFlags,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from(DEFAULT_DATA_DIR),
            storage: StorageBackend::default(),
            remote_config_url: None,
            remote_config: RemoteConfigSettings::default(),
            default_flags: FeatureFlags::default(),
        }
    }
}

impl Settings {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build settings from a variable lookup, unset or blank variables keep defaults
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let var = |name: &str| {
            lookup(name)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        let mut settings = Self::default();

        if let Some(dir) = var(DATA_DIR_VAR) {
            settings.data_dir = PathBuf::from(dir);
        }
        if let Some(storage) = var(STORAGE_VAR) {
            settings.storage = storage.parse()?;
        }
        settings.remote_config_url = var(REMOTE_CONFIG_URL_VAR);

        if let Some(raw) = var(FETCH_TIMEOUT_VAR) {
            settings.remote_config.fetch_timeout = parse_millis(FETCH_TIMEOUT_VAR, &raw)?;
        }
        if let Some(raw) = var(MIN_FETCH_INTERVAL_VAR) {
            settings.remote_config.minimum_fetch_interval =
                parse_millis(MIN_FETCH_INTERVAL_VAR, &raw)?;
        }
        if let Some(raw) = var(ENABLE_CATEGORIES_VAR) {
            settings.default_flags.enable_categories = parse_bool_str(&raw).ok_or_else(|| {
                Error::InvalidInput(format!("{} is not a boolean: {}", ENABLE_CATEGORIES_VAR, raw))
            })?;
        }

        Ok(settings)
    }
}

fn parse_millis(name: &str, raw: &str) -> Result<Duration> {
    raw.parse::<u64>()
        .map(Duration::from_millis)
        .map_err(|e| Error::InvalidInput(format!("{} must be milliseconds: {}", name, e)))
}
