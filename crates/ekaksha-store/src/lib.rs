//! # ekaksha-store: Persisted Cart and Admin Session
//!
//! Explicitly scoped stores over a key-value storage, kept in step across
//! every context that shares that storage.
//!
//! ## Architecture
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │   ┌──────────────┐   ┌──────────────┐        ┌─────────────────────┐    │
//! │   │ CartStore    │   │ CartStore    │  ...   │ SessionStore        │    │
//! │   │ (context A)  │   │ (context B)  │        │ (SessionGate)       │    │
//! │   └──────┬───────┘   └──────┬───────┘        └──────────┬──────────┘    │
//! │          │ persist / reload │                           │               │
//! │   ┌──────▼──────────────────▼───────────────────────────▼──────────┐    │
//! │   │ KeyValueStorage   "cart" → [CartLine, ...]                     │    │
//! │   │                   "adminSession" → AdminSession                │    │
//! │   └────────────────────────────────────────────────────────────────┘    │
//! │          │ publish(key)                                                 │
//! │   ┌──────▼─────────────────────────────────────────────────────────┐    │
//! │   │ ChangeNotifier    handlers + broadcast::Receiver<ChangeEvent>  │    │
//! │   └────────────────────────────────────────────────────────────────┘    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//! - [`storage`] - `KeyValueStorage` with memory and file backends
//! - [`notify`] - `ChangeNotifier` and the in-process `ChangeBus`
//! - [`cart_store`] - the persisted cart
//! - [`session`] - the admin session gate
//! - [`config`] - storage directory resolution
//! - [`error`] - `StoreError`

pub mod cart_store;
pub mod config;
pub mod error;
pub mod notify;
pub mod session;
pub mod storage;

pub use cart_store::{CartStore, CART_KEY};
pub use config::StoreConfig;
pub use error::{StoreError, StoreResult};
pub use notify::{ChangeBus, ChangeEvent, ChangeHandler, ChangeNotifier, SubscriptionId};
pub use session::{SessionGate, SessionStore, SESSION_KEY};
pub use storage::{FileStorage, KeyValueStorage, MemoryStorage};
