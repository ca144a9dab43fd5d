//! The authoritative in-memory key-value mapping.
//!
//! The map is owned by [`KeyValueStore`] and never exposed directly;
//! collaborators go through `put`/`get`/`delete`, each of which holds the
//! store's lock for the duration of the operation. No I/O happens under the
//! lock, so contention is limited to the map access itself.

use std::collections::HashMap;
use std::sync::Mutex;

use crate::errors::StoreError;

#[derive(Debug, Default)]
pub struct KeyValueStore {
    inner: Mutex<HashMap<String, String>>,
}

impl KeyValueStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or overwrite `key`.
    pub fn put(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let mut map = self.inner.lock().map_err(|_| StoreError::Internal)?;
        map.insert(key.to_string(), value.to_string());
        Ok(())
    }

    /// Current value for `key`, or [`StoreError::NoSuchKey`] if absent.
    pub fn get(&self, key: &str) -> Result<String, StoreError> {
        let map = self.inner.lock().map_err(|_| StoreError::Internal)?;
        map.get(key).cloned().ok_or(StoreError::NoSuchKey)
    }

    /// Remove `key` if present. Removing an absent key is not an error.
    pub fn delete(&self, key: &str) -> Result<(), StoreError> {
        let mut map = self.inner.lock().map_err(|_| StoreError::Internal)?;
        map.remove(key);
        Ok(())
    }

    /// Number of keys currently held.
    pub fn key_count(&self) -> usize {
        self.inner.lock().map(|map| map.len()).unwrap_or(0)
    }
}
