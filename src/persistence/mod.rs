//! Durable key-value storage
//!
//! Features:
//! - Synchronous string store (`get` / `set` / `remove`)
//! - Shared in-memory store for tests and headless runs
//! - Directory-backed store on native, LocalStorage on web
//!
//! Callers treat every failure as recoverable: log it, keep the value in
//! memory, carry on.

#[cfg(not(target_arch = "wasm32"))]
mod file;
#[cfg(target_arch = "wasm32")]
mod local_storage;

#[cfg(not(target_arch = "wasm32"))]
pub use file::FileStore;
#[cfg(target_arch = "wasm32")]
pub use local_storage::LocalStorage;

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use thiserror::Error;

/// Failure of a storage backend
#[derive(Debug, Error)]
pub enum StorageError {
    /// Storage disabled or not present on this platform
    #[error("storage unavailable: {0}")]
    Unavailable(String),
    /// Backend rejected a write (quota, private mode)
    #[error("write rejected for key `{key}`: {reason}")]
    WriteRejected { key: String, reason: String },
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Synchronous string key-value store
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;
    fn remove(&self, key: &str) -> Result<(), StorageError>;
}

/// In-memory store. Clones share the same map.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: Rc<RefCell<HashMap<String, String>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.entries.borrow().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.entries
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        self.entries.borrow_mut().remove(key);
        Ok(())
    }
}

/// Load a JSON value, falling back to `T::default()` on any failure
pub fn load_json<T>(store: &dyn KeyValueStore, key: &str) -> T
where
    T: serde::de::DeserializeOwned + Default,
{
    match store.get(key) {
        Ok(Some(json)) => match serde_json::from_str(&json) {
            Ok(value) => value,
            Err(e) => {
                log::warn!("Ignoring corrupt `{}` entry: {}", key, e);
                T::default()
            }
        },
        Ok(None) => T::default(),
        Err(e) => {
            log::warn!("Could not read `{}`: {}", key, e);
            T::default()
        }
    }
}

/// Store a value as JSON. Failures are logged and reported as `false`.
pub fn save_json<T: serde::Serialize>(store: &dyn KeyValueStore, key: &str, value: &T) -> bool {
    let result = serde_json::to_string(value)
        .map_err(StorageError::from)
        .and_then(|json| store.set(key, &json));
    match result {
        Ok(()) => true,
        Err(e) => {
            log::warn!("Could not save `{}`: {}", key, e);
            false
        }
    }
}

/// Store that fails every operation
#[cfg(test)]
#[derive(Debug, Clone, Copy, Default)]
pub struct BrokenStore;

#[cfg(test)]
impl KeyValueStore for BrokenStore {
    fn get(&self, _key: &str) -> Result<Option<String>, StorageError> {
        Err(StorageError::Unavailable("disabled".into()))
    }

    fn set(&self, key: &str, _value: &str) -> Result<(), StorageError> {
        Err(StorageError::WriteRejected {
            key: key.to_string(),
            reason: "quota exceeded".into(),
        })
    }

    fn remove(&self, _key: &str) -> Result<(), StorageError> {
        Err(StorageError::Unavailable("disabled".into()))
    }
}
