//! Durable client-side key-value storage.
//!
//! The browser build persists through `window.localStorage`; tests and the
//! server render use [`MemoryStorage`]. Access is synchronous and there is
//! no cross-tab coordination: the last write wins.

use crate::error::StorageError;
use medicare_core::Result;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

/// Key holding the canonical session document.
pub const AUTH_KEY: &str = "medicare_auth";

/// Key holding the email remembered by the login form.
pub const REMEMBER_KEY: &str = "medicare_remember";

/// Keys written by the superseded split-key session scheme.
///
/// They are never read; rehydration and logout remove them.
pub const LEGACY_KEYS: [&str; 3] = ["medicare_user", "medicare_role", "medicare_token"];

/// Synchronous string key-value storage that survives a reload.
pub trait DurableStorage {
    /// Returns the value stored under `key`, if any.
    fn get(&self, key: &str) -> Option<String>;

    /// Stores `value` under `key`, replacing any previous value.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying storage rejects the write.
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Removes `key`. Removing a missing key is not an error.
    fn remove(&self, key: &str);
}

/// In-process storage backed by a shared map.
///
/// Clones share the same map, which lets tests observe what a store wrote.
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    entries: Arc<RwLock<HashMap<String, String>>>,
}

impl MemoryStorage {
    /// Creates an empty storage area.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true if `key` currently holds a value.
    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.get(key).is_some()
    }
}

impl DurableStorage for MemoryStorage {
    fn get(&self, key: &str) -> Option<String> {
        let entries = self.entries.read().ok()?;
        entries.get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let mut entries = self.entries.write().map_err(|e| StorageError::WriteFailed {
            key: key.to_string(),
            reason: e.to_string(),
        })?;
        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) {
        if let Ok(mut entries) = self.entries.write() {
            entries.remove(key);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_then_get() {
        let storage = MemoryStorage::new();
        storage.set(AUTH_KEY, "{}").expect("write");
        assert_eq!(storage.get(AUTH_KEY).as_deref(), Some("{}"));
    }

    #[test]
    fn clones_share_entries() {
        let storage = MemoryStorage::new();
        let view = storage.clone();
        storage.set(REMEMBER_KEY, "a@b.c").expect("write");
        assert!(view.contains(REMEMBER_KEY));
    }

    #[test]
    fn remove_missing_key_is_noop() {
        let storage = MemoryStorage::new();
        storage.remove("nothing-here");
        assert!(storage.get("nothing-here").is_none());
    }
}
