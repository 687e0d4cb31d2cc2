//! Per-visitor session storage

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

/// Session key holding the encoded `TemporaryCredentials`
pub const TEMPORARY_CREDENTIALS_KEY: &str = "temporary_credentials";

/// Key-value storage scoped to one visitor
pub trait SessionStore: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;

    /// Insert or overwrite a value
    fn put(&self, key: &str, value: String);

    /// Remove a value, returning it if it was present
    fn remove(&self, key: &str) -> Option<String>;
}

/// In-memory session loaded for the duration of one request
///
/// Tracks whether it was modified so the caller only writes it back when
/// needed.
#[derive(Debug, Default)]
pub struct VisitorSession {
    state: Mutex<SessionState>,
}

#[derive(Debug, Default)]
struct SessionState {
    values: HashMap<String, String>,
    changed: bool,
}

impl VisitorSession {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn from_values(values: HashMap<String, String>) -> Self {
        Self {
            state: Mutex::new(SessionState {
                values,
                changed: false,
            }),
        }
    }

    #[must_use]
    pub fn is_changed(&self) -> bool {
        self.lock().changed
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lock().values.is_empty()
    }

    /// Copy of the current values
    #[must_use]
    pub fn values(&self) -> HashMap<String, String> {
        self.lock().values.clone()
    }

    fn lock(&self) -> MutexGuard<'_, SessionState> {
        // A panic while holding the lock cannot leave the map half-written
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl SessionStore for VisitorSession {
    fn get(&self, key: &str) -> Option<String> {
        self.lock().values.get(key).cloned()
    }

    fn put(&self, key: &str, value: String) {
        let mut state = self.lock();
        state.values.insert(key.to_string(), value);
        state.changed = true;
    }

    fn remove(&self, key: &str) -> Option<String> {
        let mut state = self.lock();
        let removed = state.values.remove(key);
        if removed.is_some() {
            state.changed = true;
        }
        removed
    }
}
