//! # Store Configuration
//!
//! Where file-backed storage lives.
//!
//! ```text
//! 1. EKAKSHA_STORAGE_DIR                  (highest priority)
//! 2. explicit StoreConfig::with_dir(..)
//! 3. platform data dir
//!      ~/.local/share/ekaksha-storefront/storage            (Linux)
//!      ~/Library/Application Support/in.ekaksha.storefront  (macOS)
//! ```

use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::{StoreError, StoreResult};
use crate::storage::FileStorage;

/// Environment variable overriding the storage directory.
pub const STORAGE_DIR_ENV: &str = "EKAKSHA_STORAGE_DIR";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreConfig {
    pub storage_dir: PathBuf,
}

impl StoreConfig {
    /// Uses `dir` unless the environment overrides it.
    pub fn with_dir(dir: impl Into<PathBuf>) -> Self {
        let mut config = StoreConfig {
            storage_dir: dir.into(),
        };
        config.apply_env_overrides();
        config
    }

    /// Platform data directory, overridable from the environment.
    pub fn load() -> StoreResult<Self> {
        if let Some(dir) = env_dir() {
            return Ok(StoreConfig { storage_dir: dir });
        }
        let dir = Self::default_dir().ok_or_else(|| {
            StoreError::Config("no home directory to place storage in".to_string())
        })?;
        Ok(StoreConfig { storage_dir: dir })
    }

    fn apply_env_overrides(&mut self) {
        if let Some(dir) = env_dir() {
            debug!(dir = %dir.display(), "Overriding storage dir from environment");
            self.storage_dir = dir;
        }
    }

    fn default_dir() -> Option<PathBuf> {
        directories::ProjectDirs::from("in", "ekaksha", "storefront")
            .map(|dirs| dirs.data_dir().join("storage"))
    }

    pub fn storage_dir(&self) -> &Path {
        &self.storage_dir
    }

    /// Opens file storage in the configured directory.
    pub fn open_file_storage(&self) -> StoreResult<FileStorage> {
        FileStorage::open(&self.storage_dir)
    }
}

fn env_dir() -> Option<PathBuf> {
    std::env::var_os(STORAGE_DIR_ENV)
        .filter(|v| !v.is_empty())
        .map(PathBuf::from)
}
