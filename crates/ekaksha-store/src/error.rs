//! # Store Error Types
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Store Error Categories                            │
//! │                                                                         │
//! │  Persistence     storage write/read failed (quota, disabled, I/O)      │
//! │                  → recoverable, the in-memory cart is still valid       │
//! │                                                                         │
//! │  MalformedState  persisted value unreadable                            │
//! │                  → recovered by the stores (empty cart / logged out)    │
//! │                                                                         │
//! │  Cart            rule violation from ekaksha-core (LineNotFound, ...)  │
//! │                  → nothing was changed                                  │
//! │                                                                         │
//! │  Serialization / Config                                                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use ekaksha_core::CoreError;
use thiserror::Error;

/// Result type alias for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

#[derive(Debug, Error)]
pub enum StoreError {
    /// The storage rejected a read or write.
    #[error("Storage failed for key '{key}': {reason}")]
    Persistence { key: String, reason: String },

    /// The value under `key` could not be decoded.
    #[error("Malformed value under key '{key}': {reason}")]
    MalformedState { key: String, reason: String },

    #[error("Serialization failed: {0}")]
    Serialization(String),

    #[error(transparent)]
    Cart(#[from] CoreError),

    #[error("Invalid store configuration: {0}")]
    Config(String),
}

impl StoreError {
    pub fn persistence(key: impl Into<String>, reason: impl ToString) -> Self {
        StoreError::Persistence {
            key: key.into(),
            reason: reason.to_string(),
        }
    }

    pub fn malformed(key: impl Into<String>, reason: impl ToString) -> Self {
        StoreError::MalformedState {
            key: key.into(),
            reason: reason.to_string(),
        }
    }

    /// Whether the error is a storage failure the caller can recover from.
    pub fn is_persistence(&self) -> bool {
        matches!(self, StoreError::Persistence { .. })
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(err: serde_json::Error) -> Self {
        StoreError::Serialization(err.to_string())
    }
}
