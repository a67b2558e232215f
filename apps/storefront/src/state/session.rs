//! # Session State
//!
//! Admin handlers call [`SessionState::require_admin`] first; everything
//! else about the session lives in `ekaksha-store`.

use ekaksha_core::AdminSession;
use ekaksha_store::{SessionGate, SessionStore};
use tracing::debug;

use crate::error::{ApiError, ApiResult};

#[derive(Debug)]
pub struct SessionState {
    store: SessionStore,
}

impl SessionState {
    pub fn new(store: SessionStore) -> Self {
        SessionState { store }
    }

    pub fn store(&self) -> &SessionStore {
        &self.store
    }

    /// The signed-in admin, or `UNAUTHORIZED`.
    pub fn require_admin(&self) -> ApiResult<AdminSession> {
        match self.store.current() {
            Some(session) => Ok(session),
            None => {
                debug!("Admin route without a session");
                Err(ApiError::unauthorized())
            }
        }
    }
}
