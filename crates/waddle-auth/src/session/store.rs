//! In-memory session records keyed by identity.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use waddle_core::types::Identity;

/// The credential pair currently on record for one identity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionRecord {
    /// Current access token.
    pub access_token: String,
    /// Current refresh token.
    pub refresh_token: String,
}

/// Mutex-guarded map from identity to its session record.
///
/// Every method holds the lock for a single map operation; no token
/// parsing or signing happens while it is held.
#[derive(Debug, Default)]
pub struct SessionStore {
    records: Mutex<HashMap<Identity, SessionRecord>>,
}

impl SessionStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<Identity, SessionRecord>> {
        // A panic elsewhere cannot leave a half-written record; keep serving.
        self.records.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Replaces the record for `identity`, returning the previous one.
    pub fn put(&self, identity: Identity, record: SessionRecord) -> Option<SessionRecord> {
        self.lock().insert(identity, record)
    }

    /// Removes the record for `identity`.
    pub fn remove(&self, identity: &Identity) -> Option<SessionRecord> {
        self.lock().remove(identity)
    }

    /// Returns a copy of the record for `identity`.
    pub fn get(&self, identity: &Identity) -> Option<SessionRecord> {
        self.lock().get(identity).cloned()
    }

    /// Whether `token` is the access token on record for `identity`.
    pub fn is_current_access(&self, identity: &Identity, token: &str) -> bool {
        self.lock()
            .get(identity)
            .is_some_and(|r| r.access_token == token)
    }

    /// Whether `token` is the refresh token on record for `identity`.
    pub fn is_current_refresh(&self, identity: &Identity, token: &str) -> bool {
        self.lock()
            .get(identity)
            .is_some_and(|r| r.refresh_token == token)
    }

    /// Swaps in `access_token` if `refresh_token` is still the one on record.
    pub fn replace_access(
        &self,
        identity: &Identity,
        refresh_token: &str,
        access_token: String,
    ) -> bool {
        match self.lock().get_mut(identity) {
            Some(record) if record.refresh_token == refresh_token => {
                record.access_token = access_token;
                true
            }
            _ => false,
        }
    }

    /// Number of identities with a stored session.
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// Whether no sessions are stored.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
