//! # Admin Session
//!
//! Keeps the logged-in admin under the `adminSession` storage key.
//!
//! Storage is the source of truth: every check re-reads it, so a logout in
//! one tab is seen by all the others on their next request. Logout also
//! publishes on the notifier so open admin screens can leave immediately.
//!
//! The gate only answers "is someone logged in"; checking credentials is the
//! admin directory's job.

use std::sync::Arc;

use ekaksha_core::AdminSession;
use tracing::{info, warn};

use crate::error::StoreResult;
use crate::notify::ChangeNotifier;
use crate::storage::KeyValueStorage;

/// Storage key holding the serialized admin session.
pub const SESSION_KEY: &str = "adminSession";

/// Whether an admin is signed in.
pub trait SessionGate: Send + Sync {
    fn current(&self) -> Option<AdminSession>;

    fn is_authenticated(&self) -> bool {
        self.current().is_some()
    }
}

/// Persisted admin session.
#[derive(Clone)]
pub struct SessionStore {
    storage: Arc<dyn KeyValueStorage>,
    notifier: Arc<dyn ChangeNotifier>,
}

impl SessionStore {
    pub fn new(storage: Arc<dyn KeyValueStorage>, notifier: Arc<dyn ChangeNotifier>) -> Self {
        SessionStore { storage, notifier }
    }

    /// Stores `session` and tells every context about it.
    pub fn login(&self, session: AdminSession) -> StoreResult<()> {
        let json = serde_json::to_string(&session)?;
        self.storage.set(SESSION_KEY, &json)?;
        info!(email = %session.email, "Admin logged in");
        self.notifier.publish(SESSION_KEY);
        Ok(())
    }

    /// Drops the session and fires the cross-tab signal.
    pub fn logout(&self) -> StoreResult<()> {
        self.storage.remove(SESSION_KEY)?;
        info!("Admin logged out");
        self.notifier.publish(SESSION_KEY);
        Ok(())
    }
}

impl SessionGate for SessionStore {
    fn current(&self) -> Option<AdminSession> {
        let raw = match self.storage.get(SESSION_KEY) {
            Ok(Some(raw)) => raw,
            Ok(None) => return None,
            Err(e) => {
                warn!(error = %e, "Session storage unreadable, treating as logged out");
                return None;
            }
        };

        match serde_json::from_str(&raw) {
            Ok(session) => Some(session),
            Err(e) => {
                warn!(error = %e, "Discarding malformed admin session");
                None
            }
        }
    }
}

impl std::fmt::Debug for SessionStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionStore")
            .field("authenticated", &self.is_authenticated())
            .finish()
    }
}
