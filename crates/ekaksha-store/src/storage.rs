//! # Key-Value Storage
//!
//! The durable string store behind the cart and the admin session.
//!
//! ## Backends
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  MemoryStorage                       FileStorage                        │
//! │  ─────────────                       ───────────                        │
//! │  HashMap behind Arc<Mutex>           <dir>/<key>.json                   │
//! │  clones share the same map           write: .<key>.<uuid>.tmp           │
//! │  optional byte quota                        fsync                       │
//! │  can be switched off                        rename → <key>.json         │
//! │  (tests, embedded use)               (server, one dir per shopper)      │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Every call is atomic: a reader sees either the previous value or the new
//! one, never a partial write.

use std::collections::HashMap;
use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};

use tracing::debug;

use crate::error::{StoreError, StoreResult};

/// A string key-value store.
pub trait KeyValueStorage: Send + Sync {
    /// Returns the value under `key`, or `None` if the key was never set.
    fn get(&self, key: &str) -> StoreResult<Option<String>>;

    /// Replaces the value under `key`.
    fn set(&self, key: &str, value: &str) -> StoreResult<()>;

    /// Deletes `key`. Removing an absent key succeeds.
    fn remove(&self, key: &str) -> StoreResult<()>;
}

// =============================================================================
// Memory Storage
// =============================================================================

#[derive(Debug, Default)]
struct MemoryInner {
    entries: HashMap<String, String>,
    quota_bytes: Option<usize>,
    disabled: bool,
}

impl MemoryInner {
    fn used_bytes(&self) -> usize {
        self.entries.iter().map(|(k, v)| k.len() + v.len()).sum()
    }
}

/// In-process storage. Clones share the same entries, like tabs sharing
/// one origin's storage.
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    inner: Arc<Mutex<MemoryInner>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Storage that rejects writes once keys plus values exceed `bytes`.
    pub fn with_quota(bytes: usize) -> Self {
        let storage = Self::new();
        storage.lock().quota_bytes = Some(bytes);
        storage
    }

    /// Switches the storage off (every call fails) or back on.
    pub fn set_disabled(&self, disabled: bool) {
        self.lock().disabled = disabled;
    }

    /// Bytes currently used by keys and values.
    pub fn used_bytes(&self) -> usize {
        self.lock().used_bytes()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, MemoryInner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl KeyValueStorage for MemoryStorage {
    fn get(&self, key: &str) -> StoreResult<Option<String>> {
        let inner = self.lock();
        if inner.disabled {
            return Err(StoreError::persistence(key, "storage is disabled"));
        }
        Ok(inner.entries.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> StoreResult<()> {
        let mut inner = self.lock();
        if inner.disabled {
            return Err(StoreError::persistence(key, "storage is disabled"));
        }

        if let Some(quota) = inner.quota_bytes {
            let previous = inner
                .entries
                .get(key)
                .map(|v| key.len() + v.len())
                .unwrap_or(0);
            let after = inner.used_bytes() - previous + key.len() + value.len();
            if after > quota {
                return Err(StoreError::persistence(
                    key,
                    format!("quota exceeded ({} of {} bytes)", after, quota),
                ));
            }
        }

        inner.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> StoreResult<()> {
        let mut inner = self.lock();
        if inner.disabled {
            return Err(StoreError::persistence(key, "storage is disabled"));
        }
        inner.entries.remove(key);
        Ok(())
    }
}

// =============================================================================
// File Storage
// =============================================================================

/// One JSON file per key inside a directory.
#[derive(Debug, Clone)]
pub struct FileStorage {
    dir: PathBuf,
}

impl FileStorage {
    /// Opens (and creates if needed) a storage directory.
    pub fn open(dir: impl Into<PathBuf>) -> StoreResult<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir)
            .map_err(|e| StoreError::persistence(dir.display().to_string(), e))?;
        debug!(dir = %dir.display(), "Opened file storage");
        Ok(FileStorage { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> StoreResult<PathBuf> {
        let valid = !key.is_empty()
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
        if !valid {
            return Err(StoreError::persistence(key, "invalid storage key"));
        }
        Ok(self.dir.join(format!("{}.json", key)))
    }
}

impl KeyValueStorage for FileStorage {
    fn get(&self, key: &str) -> StoreResult<Option<String>> {
        let path = self.path_for(key)?;
        match fs::read_to_string(&path) {
            Ok(value) => Ok(Some(value)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(StoreError::persistence(key, e)),
        }
    }

    fn set(&self, key: &str, value: &str) -> StoreResult<()> {
        let path = self.path_for(key)?;
        let tmp = self
            .dir
            .join(format!(".{}.{}.tmp", key, uuid::Uuid::new_v4().simple()));

        let write = || -> std::io::Result<()> {
            let mut file = fs::File::create(&tmp)?;
            file.write_all(value.as_bytes())?;
            file.sync_all()?;
            fs::rename(&tmp, &path)
        };

        write().map_err(|e| {
            let _ = fs::remove_file(&tmp);
            StoreError::persistence(key, e)
        })
    }

    fn remove(&self, key: &str) -> StoreResult<()> {
        let path = self.path_for(key)?;
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(StoreError::persistence(key, e)),
        }
    }
}
