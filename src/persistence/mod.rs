//! Key-value persistence
//!
//! Best scores, achievement progress and settings are stored as JSON values
//! under fixed string keys. Engines read once at construction and push
//! updates as they happen. Storage failures are logged and never reach
//! simulation state.

mod file;

pub use file::FileStore;

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::fmt;
use std::rc::Rc;

use serde::Serialize;
use serde::de::DeserializeOwned;

/// Storage failure
#[derive(Debug)]
pub enum StoreError {
    /// Reading or writing the backing file failed
    Io(std::io::Error),
    /// A value could not be encoded or decoded
    Json(serde_json::Error),
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreError::Io(err) => write!(f, "storage i/o error: {err}"),
            StoreError::Json(err) => write!(f, "storage encoding error: {err}"),
        }
    }
}

impl std::error::Error for StoreError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            StoreError::Io(err) => Some(err),
            StoreError::Json(err) => Some(err),
        }
    }
}

impl From<std::io::Error> for StoreError {
    fn from(err: std::io::Error) -> Self {
        StoreError::Io(err)
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(err: serde_json::Error) -> Self {
        StoreError::Json(err)
    }
}

/// Raw string key-value backend
pub trait KeyValueStore: fmt::Debug {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&mut self, key: &str, value: String) -> Result<(), StoreError>;
    fn remove(&mut self, key: &str) -> Result<(), StoreError>;
}

/// Volatile backend (tests, sessions without a save file)
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: BTreeMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: String) -> Result<(), StoreError> {
        self.entries.insert(key.to_string(), value);
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), StoreError> {
        self.entries.remove(key);
        Ok(())
    }
}

/// Shared handle to the store, cheap to clone into every engine
#[derive(Debug, Clone)]
pub struct Storage {
    inner: Rc<RefCell<dyn KeyValueStore>>,
}

impl Default for Storage {
    fn default() -> Self {
        Self::in_memory()
    }
}

impl Storage {
    pub fn new<S: KeyValueStore + 'static>(store: S) -> Self {
        let inner: Rc<RefCell<dyn KeyValueStore>> = Rc::new(RefCell::new(store));
        Self { inner }
    }

    pub fn in_memory() -> Self {
        Self::new(MemoryStore::new())
    }

    /// Decode the value under `key`. Missing or unreadable values yield `None`.
    pub fn load<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let raw = self.inner.try_borrow().ok()?.get(key)?;
        match serde_json::from_str(&raw) {
            Ok(value) => Some(value),
            Err(err) => {
                log::warn!("Ignoring unreadable value for '{key}': {err}");
                None
            }
        }
    }

    pub fn save<T: Serialize>(&self, key: &str, value: &T) -> Result<(), StoreError> {
        let json = serde_json::to_string(value)?;
        match self.inner.try_borrow_mut() {
            Ok(mut store) => store.set(key, json),
            Err(_) => {
                log::warn!("Store busy, dropped write to '{key}'");
                Ok(())
            }
        }
    }

    /// `save`, logging instead of returning failures
    pub fn persist<T: Serialize>(&self, key: &str, value: &T) {
        if let Err(err) = self.save(key, value) {
            log::warn!("Failed to persist '{key}': {err}");
        }
    }

    pub fn remove(&self, key: &str) -> Result<(), StoreError> {
        match self.inner.try_borrow_mut() {
            Ok(mut store) => store.remove(key),
            Err(_) => Ok(()),
        }
    }

    pub fn contains(&self, key: &str) -> bool {
        self.inner
            .try_borrow()
            .map(|store| store.get(key).is_some())
            .unwrap_or(false)
    }
}
