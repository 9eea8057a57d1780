//! Persisted key-value storage, the local-storage equivalent for the stores.
//!
//! DESIGN
//! ======
//! Stores talk to `dyn KeyValueStore` so the same session and favorites logic
//! runs over an in-memory map (tests, embedding) or a JSON file on disk.
//! Values are plain strings; structured values are serialized by the caller.
//!
//! ERROR HANDLING
//! ==============
//! Backends return [`StorageError`]. The stores log and swallow these: a
//! broken storage file degrades to "nothing persisted", never to a crash.

mod file;

use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};

pub use file::FileStore;

/// Key holding the bearer token of the current session.
pub const AUTH_TOKEN_KEY: &str = "authToken";
/// Key holding the id of the signed-in user.
pub const USER_ID_KEY: &str = "userId";
/// Key holding the JSON array of favorited products.
pub const FAVORITES_KEY: &str = "canteen-favorites";

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("storage io failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("storage contents are corrupt: {0}")]
    Corrupt(String),
    #[error("storage serialize failed: {0}")]
    Serialize(String),
}

/// Synchronous string key-value store.
pub trait KeyValueStore: Send + Sync {
    /// Read a key. Absent keys are `Ok(None)`.
    ///
    /// # Errors
    ///
    /// Returns a [`StorageError`] if the backend cannot be read.
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Write a key, replacing any previous value.
    ///
    /// # Errors
    ///
    /// Returns a [`StorageError`] if the backend cannot be written.
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Delete a key. Deleting an absent key succeeds.
    ///
    /// # Errors
    ///
    /// Returns a [`StorageError`] if the backend cannot be written.
    fn remove(&self, key: &str) -> Result<(), StorageError>;
}

/// Process-local store backed by a `HashMap`.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of keys currently held.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(entries.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        entries.insert(key.to_owned(), value.to_owned());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        entries.remove(key);
        Ok(())
    }
}

#[cfg(test)]
#[path = "mod_test.rs"]
mod tests;
