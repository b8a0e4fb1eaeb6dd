//! KeyValueStore trait abstraction for the host's persistent storage.
//!
//! Implementations:
//! - `InMemoryStore` - For testing
//! - `JsStorageBridge` (in canvasly-wasm) - Uses `localStorage` via JS callbacks
//! - `JsonFileStore` (in canvasly-cli) - One JSON object on disk
//!
//! Uses `target_arch = "wasm32"` for conditional compilation instead of feature flags
//! to avoid Cargo's feature unification issues when building the workspace.

use std::collections::HashMap;
use std::sync::RwLock;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Storage unavailable: {0}")]
    Unavailable(String),

    #[error("Quota exceeded writing {0}")]
    QuotaExceeded(String),

    #[error("IO error: {0}")]
    Io(String),

    #[error("Encoding error: {0}")]
    Encoding(String),
}

pub type Result<T> = std::result::Result<T, StorageError>;

/// Host key-value storage (string keys, string values).
///
/// Deleting a key that does not exist succeeds.
///
/// On native platforms, implementations must be `Send + Sync`.
/// On WASM (wasm32), these bounds are relaxed since WASM is single-threaded.
#[cfg(not(target_arch = "wasm32"))]
pub trait KeyValueStore: Send + Sync {
    /// Read the value stored under `key`, `None` if absent
    fn get(&self, key: &str) -> Result<Option<String>>;

    /// Store `value` under `key`, replacing any prior value
    fn set(&self, key: &str, value: &str) -> Result<()>;

    /// Remove `key`
    fn delete(&self, key: &str) -> Result<()>;
}

/// Host key-value storage (WASM version without Send + Sync).
#[cfg(target_arch = "wasm32")]
pub trait KeyValueStore {
    /// Read the value stored under `key`, `None` if absent
    fn get(&self, key: &str) -> Result<Option<String>>;

    /// Store `value` under `key`, replacing any prior value
    fn set(&self, key: &str, value: &str) -> Result<()>;

    /// Remove `key`
    fn delete(&self, key: &str) -> Result<()>;
}

/// In-memory key-value store for testing
#[derive(Default)]
pub struct InMemoryStore {
    entries: RwLock<HashMap<String, String>>,
    /// Keys whose writes are rejected, to exercise quota failures
    read_only: RwLock<Vec<String>>,
    /// Keys whose reads fail, to exercise unavailable storage
    unreadable: RwLock<Vec<String>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reject every subsequent `set` of `key` with `QuotaExceeded`
    pub fn reject_writes(&self, key: &str) {
        self.read_only
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .push(key.to_string());
    }

    /// Accept writes to every key again
    pub fn accept_writes(&self) {
        self.read_only
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .clear();
    }

    /// Fail every subsequent `get` of `key` with `Unavailable`
    pub fn reject_reads(&self, key: &str) {
        self.unreadable
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .push(key.to_string());
    }

    /// Whether `key` currently holds a value
    pub fn contains(&self, key: &str) -> bool {
        self.entries
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .contains_key(key)
    }

    /// Raw value under `key`, bypassing the trait
    pub fn raw(&self, key: &str) -> Option<String> {
        self.entries
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .get(key)
            .cloned()
    }
}

impl KeyValueStore for InMemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let rejected = self
            .unreadable
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .iter()
            .any(|k| k == key);
        if rejected {
            return Err(StorageError::Unavailable(key.to_string()));
        }
        Ok(self.raw(key))
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let rejected = self
            .read_only
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .iter()
            .any(|k| k == key);
        if rejected {
            return Err(StorageError::QuotaExceeded(key.to_string()));
        }

        self.entries
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn delete(&self, key: &str) -> Result<()> {
        self.entries
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .remove(key);
        Ok(())
    }
}

// Implement KeyValueStore for Arc<T> where T: KeyValueStore
// This allows sharing one store between multiple sessions in tests
#[cfg(not(target_arch = "wasm32"))]
impl<T: KeyValueStore> KeyValueStore for std::sync::Arc<T> {
    fn get(&self, key: &str) -> Result<Option<String>> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        (**self).set(key, value)
    }

    fn delete(&self, key: &str) -> Result<()> {
        (**self).delete(key)
    }
}

#[cfg(target_arch = "wasm32")]
impl<T: KeyValueStore> KeyValueStore for std::rc::Rc<T> {
    fn get(&self, key: &str) -> Result<Option<String>> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        (**self).set(key, value)
    }

    fn delete(&self, key: &str) -> Result<()> {
        (**self).delete(key)
    }
}
