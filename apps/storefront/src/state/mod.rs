//! # State Module
//!
//! Separate state types, one per concern, bundled into a cheap-to-clone
//! [`AppState`] for the axum router. Commands take only the parts they use.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    State Architecture                                   │
//! │                                                                         │
//! │  AppState (Clone, every field behind an Arc)                            │
//! │          │                                                              │
//! │   ┌──────┼─────────────┬──────────────┬───────────────┬────────────┐    │
//! │   ▼      ▼             ▼              ▼               ▼            ▼    │
//! │ DbState ObjectState  CartState     SessionState   Storefront   ChangeBus│
//! │ SQLite  image bucket CartStore +   SessionStore   Config       events   │
//! │ pool    + base URL   coupon        (gate)         (read-only)  for ws   │
//! │                                                                         │
//! │  THREAD SAFETY:                                                         │
//! │  • DbState: pool is thread-safe                                         │
//! │  • CartState: CartStore and the coupon each guard their own Mutex       │
//! │  • SessionState: storage is the source of truth, no in-memory copy      │
//! │  • StorefrontConfig: read-only after startup                            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

mod cart;
mod config;
mod db;
mod session;

pub use cart::CartState;
pub use config::{StorefrontConfig, CONFIG_PATH_ENV};
pub use db::{DbState, ObjectState};
pub use session::SessionState;

use std::sync::Arc;

use ekaksha_db::{Database, DbConfig, ObjectStore};
use ekaksha_store::{CartStore, ChangeBus, ChangeNotifier, KeyValueStorage, SessionStore, StoreConfig};
use tracing::info;

use crate::error::StartupError;

#[derive(Debug, Clone)]
pub struct AppState {
    pub db: Arc<DbState>,
    pub objects: Arc<ObjectState>,
    pub cart: Arc<CartState>,
    pub session: Arc<SessionState>,
    pub config: Arc<StorefrontConfig>,
    pub bus: ChangeBus,
}

impl AppState {
    /// Wires state over an already-open database and storage.
    pub fn new(
        config: StorefrontConfig,
        db: Database,
        storage: Arc<dyn KeyValueStorage>,
        bus: ChangeBus,
    ) -> Self {
        let notifier: Arc<dyn ChangeNotifier> = Arc::new(bus.clone());
        let objects = ObjectStore::new(&config.objects_dir, config.public_base_url.as_str());

        AppState {
            db: Arc::new(DbState::new(db)),
            objects: Arc::new(ObjectState::new(objects, config.image_bucket.as_str())),
            cart: Arc::new(CartState::new(CartStore::open(
                Arc::clone(&storage),
                Arc::clone(&notifier),
            ))),
            session: Arc::new(SessionState::new(SessionStore::new(storage, notifier))),
            config: Arc::new(config),
            bus,
        }
    }

    /// Opens the database and file storage named in `config`.
    pub async fn open(config: StorefrontConfig) -> Result<Self, StartupError> {
        if let Some(parent) = config.database_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let db = Database::new(DbConfig::new(&config.database_path)).await?;
        info!(path = %config.database_path.display(), "Database connected and migrations applied");

        let storage = StoreConfig::with_dir(&config.storage_dir).open_file_storage()?;
        info!(dir = %storage.dir().display(), "Cart storage opened");

        Ok(AppState::new(config, db, Arc::new(storage), ChangeBus::new()))
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use ekaksha_store::MemoryStorage;

    /// In-memory database and storage, objects under a fresh temp dir.
    pub(crate) async fn test_state() -> (AppState, Arc<MemoryStorage>, tempfile::TempDir) {
        let objects_dir = tempfile::tempdir().unwrap();
        let config = StorefrontConfig {
            objects_dir: objects_dir.path().to_path_buf(),
            public_base_url: "http://shop.test".to_string(),
            ..StorefrontConfig::default()
        };
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let storage = Arc::new(MemoryStorage::new());
        let state = AppState::new(config, db, storage.clone(), ChangeBus::new());
        (state, storage, objects_dir)
    }
}
