//! Browser-side tests for the storage bridge and workbench bindings.
//!
//! Run with `wasm-pack test --headless --chrome crates/canvasly-wasm`.

#![cfg(target_arch = "wasm32")]

use canvasly_core::KeyValueStore;
use canvasly_core::storage::StorageError;
use canvasly_wasm::{JsStorageBridge, WasmWorkbench};
use wasm_bindgen::JsValue;
use wasm_bindgen_test::*;

wasm_bindgen_test_configure!(run_in_browser);

/// A `Map`-backed store plus its `get`/`set`/`remove` callbacks
fn map_store(quota: Option<usize>) -> JsStorageBridge {
    let factory = js_sys::Function::new_with_args(
        "quota",
        r#"
        const entries = new Map();
        return {
            get: (key) => entries.has(key) ? entries.get(key) : null,
            set: (key, value) => {
                if (quota !== null && value.length > quota) {
                    const err = new Error("storage full");
                    err.name = "QuotaExceededError";
                    throw err;
                }
                entries.set(key, value);
            },
            remove: (key) => { entries.delete(key); },
        };
        "#,
    );
    let quota = quota.map_or(JsValue::NULL, |q| JsValue::from(q as f64));
    let callbacks = factory.call1(&JsValue::NULL, &quota).unwrap();
    let callback = |name: &str| -> js_sys::Function {
        js_sys::Reflect::get(&callbacks, &name.into()).unwrap().into()
    };
    JsStorageBridge::new(callback("get"), callback("set"), callback("remove"))
}

#[wasm_bindgen_test]
fn bridge_round_trips_values() {
    let store = map_store(None);

    assert_eq!(store.get("k").unwrap(), None);
    store.set("k", "v").unwrap();
    assert_eq!(store.get("k").unwrap().as_deref(), Some("v"));
    store.delete("k").unwrap();
    assert_eq!(store.get("k").unwrap(), None);
}

#[wasm_bindgen_test]
fn bridge_maps_quota_errors() {
    let store = map_store(Some(4));

    assert!(matches!(
        store.set("k", "too long"),
        Err(StorageError::QuotaExceeded(_))
    ));
}

#[wasm_bindgen_test]
fn workbench_edits_through_js_storage() {
    let mut workbench = WasmWorkbench::new(map_store(None), "fpr").unwrap();

    assert!(!workbench.is_pending());
    workbench
        .mutate("problemName", JsValue::from_str("Why churn?"))
        .unwrap();
    assert_eq!(workbench.active_title(), "Why churn?");

    let exported = workbench.export_json().unwrap();
    assert!(exported.contains("\"problemName\": \"Why churn?\""));
    assert_eq!(workbench.export_file_name(), "first-principle-reasoning.json");
}

#[wasm_bindgen_test]
fn invalid_import_throws_and_keeps_document() {
    let mut workbench = WasmWorkbench::new(map_store(None), "bmc").unwrap();
    workbench.mutate("title", JsValue::from_str("Keep")).unwrap();

    assert!(workbench.import_json("{ nope").is_err());
    assert_eq!(workbench.active_title(), "Keep");
}

#[wasm_bindgen_test]
fn unknown_template_is_rejected() {
    assert!(WasmWorkbench::new(map_store(None), "swot").is_err());
}
