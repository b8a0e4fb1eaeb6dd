//! JavaScript storage bridge for WASM.
//!
//! Implements `KeyValueStore` by calling synchronous JavaScript callbacks,
//! normally thin wrappers around `window.localStorage`.

use canvasly_core::storage::{KeyValueStore, Result, StorageError};
use wasm_bindgen::prelude::*;

/// JavaScript key-value storage bridge.
///
/// # Example (TypeScript side)
///
/// ```typescript
/// const storage = new JsStorageBridge(
///   (key) => localStorage.getItem(key),
///   (key, value) => localStorage.setItem(key, value),
///   (key) => localStorage.removeItem(key),
/// );
/// ```
#[wasm_bindgen]
pub struct JsStorageBridge {
    get_fn: js_sys::Function,
    set_fn: js_sys::Function,
    remove_fn: js_sys::Function,
}

#[wasm_bindgen]
impl JsStorageBridge {
    /// Create a bridge from `get(key) -> string | null`, `set(key, value)` and
    /// `remove(key)`. Callbacks must be synchronous and may throw.
    #[wasm_bindgen(constructor)]
    pub fn new(
        get_fn: js_sys::Function,
        set_fn: js_sys::Function,
        remove_fn: js_sys::Function,
    ) -> Self {
        Self {
            get_fn,
            set_fn,
            remove_fn,
        }
    }
}

/// Map a thrown JS value to a storage error.
///
/// Browsers throw a `DOMException` named `QuotaExceededError` when
/// `localStorage` is full and `SecurityError` when it is blocked.
fn js_err_to_storage_err(err: JsValue) -> StorageError {
    let name = js_sys::Reflect::get(&err, &"name".into())
        .ok()
        .and_then(|v| v.as_string())
        .unwrap_or_default();
    let msg = err
        .as_string()
        .or_else(|| {
            js_sys::Reflect::get(&err, &"message".into())
                .ok()
                .and_then(|v| v.as_string())
        })
        .unwrap_or_else(|| format!("{:?}", err));

    match name.as_str() {
        "QuotaExceededError" | "NS_ERROR_DOM_QUOTA_REACHED" => StorageError::QuotaExceeded(msg),
        "SecurityError" => StorageError::Unavailable(msg),
        _ => StorageError::Io(msg),
    }
}

impl KeyValueStore for JsStorageBridge {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let value = self
            .get_fn
            .call1(&JsValue::NULL, &key.into())
            .map_err(js_err_to_storage_err)?;

        if value.is_null() || value.is_undefined() {
            return Ok(None);
        }
        value
            .as_string()
            .map(Some)
            .ok_or_else(|| StorageError::Encoding(format!("Value under {} is not a string", key)))
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        self.set_fn
            .call2(&JsValue::NULL, &key.into(), &value.into())
            .map_err(js_err_to_storage_err)?;
        Ok(())
    }

    fn delete(&self, key: &str) -> Result<()> {
        self.remove_fn
            .call1(&JsValue::NULL, &key.into())
            .map_err(js_err_to_storage_err)?;
        Ok(())
    }
}
