//! WASM bindings for canvasly-core.
//!
//! Provides the bridge between the browser app and the Rust document
//! lifecycle.
//!
//! # Architecture
//!
//! The page creates a `JsStorageBridge` with callbacks over `localStorage`.
//! The bridge implements `KeyValueStore`, so a `Workbench` can persist
//! documents through JavaScript.
//!
//! ```text
//! JavaScript                    WASM (Rust)
//! ──────────                    ───────────
//! localStorage ──callbacks──> JsStorageBridge
//!                                   │
//!                                   ▼
//!                           impl KeyValueStore
//!                                   │
//!                                   ▼
//!                         Workbench<JsStorageBridge>
//!                                   │
//!                                   ▼
//!                          WasmWorkbench (exposed to JS)
//! ```
//!
//! **Note**: This crate only compiles for `wasm32` targets. When building for native
//! targets (e.g., during `cargo check --workspace`), this crate provides no exports.

#[cfg(target_arch = "wasm32")]
mod logging;
#[cfg(target_arch = "wasm32")]
mod storage_bridge;

#[cfg(target_arch = "wasm32")]
pub use storage_bridge::JsStorageBridge;

#[cfg(target_arch = "wasm32")]
pub use wasm_impl::*;

#[cfg(target_arch = "wasm32")]
mod wasm_impl {
    use crate::{JsStorageBridge, logging};
    use canvasly_core::{FieldValue, MigrationOutcome, Snapshot, TemplateKind, Workbench};
    use serde::Serialize;
    use wasm_bindgen::prelude::*;

    /// Initialize the WASM module (panic hook and tracing).
    ///
    /// - `init()` - console-only logging
    /// - `init({ logger: (event) => {...} })` - callback + console logging
    ///
    /// The logger callback receives events with: `{ level, target, message, timestamp }`
    #[wasm_bindgen]
    pub fn init(config: Option<js_sys::Object>) {
        console_error_panic_hook::set_once();

        let logger = config
            .as_ref()
            .and_then(|cfg| js_sys::Reflect::get(cfg, &"logger".into()).ok())
            .and_then(|v| v.dyn_into::<js_sys::Function>().ok());
        logging::install(logger);

        tracing::info!("canvasly-wasm {} initialized", env!("CARGO_PKG_VERSION"));
    }

    /// Get version string
    #[wasm_bindgen]
    pub fn version() -> String {
        env!("CARGO_PKG_VERSION").to_string()
    }

    fn js_err(e: impl std::fmt::Display) -> JsError {
        JsError::new(&e.to_string())
    }

    /// Plain JS objects rather than `Map`s for snapshots and listings
    fn to_js<T: Serialize + ?Sized>(value: &T) -> Result<JsValue, JsError> {
        value
            .serialize(&serde_wasm_bindgen::Serializer::json_compatible())
            .map_err(js_err)
    }

    #[derive(Serialize)]
    #[serde(rename_all = "camelCase")]
    struct StartupJs {
        migration: &'static str,
        migrated_id: Option<String>,
        documents_found: usize,
    }

    /// One template's editing session exposed to JavaScript.
    ///
    /// Every editing call writes through to storage unless the restore
    /// decision is still pending. Calls that fail to write still keep the
    /// change in memory and throw.
    #[wasm_bindgen]
    pub struct WasmWorkbench {
        inner: Workbench<JsStorageBridge>,
    }

    #[wasm_bindgen]
    impl WasmWorkbench {
        /// Open the workbench for `template` ("bmc" or "fpr").
        ///
        /// Migrates legacy data, loads saved documents and decides whether a
        /// restore decision is pending.
        #[wasm_bindgen(constructor)]
        pub fn new(storage: JsStorageBridge, template: &str) -> Result<WasmWorkbench, JsError> {
            let kind: TemplateKind = template.parse().map_err(js_err)?;
            Ok(WasmWorkbench {
                inner: Workbench::open(storage, kind),
            })
        }

        // ========== State ==========

        /// "bmc" or "fpr"
        #[wasm_bindgen(getter)]
        pub fn template(&self) -> String {
            self.inner.template().kind.slug().to_string()
        }

        /// `{ migration, migratedId, documentsFound }` from opening
        pub fn startup(&self) -> Result<JsValue, JsError> {
            let report = self.inner.startup();
            let (migration, migrated_id) = match &report.migration {
                MigrationOutcome::NotNeeded => ("notNeeded", None),
                MigrationOutcome::Migrated(id) => ("migrated", Some(id.to_string())),
                MigrationOutcome::Discarded => ("discarded", None),
                MigrationOutcome::Deferred => ("deferred", None),
            };
            to_js(&StartupJs {
                migration,
                migrated_id,
                documents_found: report.documents_found,
            })
        }

        /// "pending", "restored" or "fresh"
        #[wasm_bindgen(js_name = restoreState)]
        pub fn restore_state(&self) -> Result<JsValue, JsError> {
            to_js(&self.inner.restore_state())
        }

        #[wasm_bindgen(js_name = isPending)]
        pub fn is_pending(&self) -> bool {
            self.inner.is_pending()
        }

        #[wasm_bindgen(js_name = activeId)]
        pub fn active_id(&self) -> String {
            self.inner.active_id().to_string()
        }

        #[wasm_bindgen(js_name = activeTitle)]
        pub fn active_title(&self) -> String {
            self.inner.active_title().to_string()
        }

        /// The active field map
        pub fn snapshot(&self) -> Result<JsValue, JsError> {
            to_js(self.inner.snapshot())
        }

        /// `[{ id, title, updatedAt, active }]`, most recent first
        pub fn documents(&self) -> Result<JsValue, JsError> {
            to_js(&self.inner.documents())
        }

        #[wasm_bindgen(js_name = pendingDocuments)]
        pub fn pending_documents(&self) -> Result<JsValue, JsError> {
            to_js(&self.inner.pending_documents())
        }

        // ========== Restore decision ==========

        #[wasm_bindgen(js_name = restoreDocument)]
        pub fn restore_document(&mut self, id: &str) -> bool {
            self.inner.restore_document(id)
        }

        #[wasm_bindgen(js_name = startFresh)]
        pub fn start_fresh(&mut self) -> bool {
            self.inner.start_fresh()
        }

        #[wasm_bindgen(js_name = discardAll)]
        pub fn discard_all(&mut self) -> Result<bool, JsError> {
            self.inner.discard_all().map_err(js_err)
        }

        // ========== Editing ==========

        /// Set one field to a string, an array of strings, or any JSON value.
        pub fn mutate(&mut self, key: &str, value: JsValue) -> Result<(), JsError> {
            let value: FieldValue = serde_wasm_bindgen::from_value(value).map_err(js_err)?;
            self.inner.mutate(key, value).map_err(js_err)
        }

        #[wasm_bindgen(js_name = replaceSnapshot)]
        pub fn replace_snapshot(&mut self, snapshot: JsValue) -> Result<(), JsError> {
            let snapshot: Snapshot = serde_wasm_bindgen::from_value(snapshot).map_err(js_err)?;
            self.inner.replace_snapshot(snapshot).map_err(js_err)
        }

        #[wasm_bindgen(js_name = loadExample)]
        pub fn load_example(&mut self) -> Result<(), JsError> {
            self.inner.load_example().map_err(js_err)
        }

        pub fn clear(&mut self) -> Result<(), JsError> {
            self.inner.clear().map_err(js_err)
        }

        #[wasm_bindgen(js_name = addItem)]
        pub fn add_item(&mut self, key: &str) -> Result<bool, JsError> {
            self.inner.add_item(key).map_err(js_err)
        }

        #[wasm_bindgen(js_name = setItem)]
        pub fn set_item(&mut self, key: &str, index: usize, text: &str) -> Result<bool, JsError> {
            self.inner.set_item(key, index, text).map_err(js_err)
        }

        #[wasm_bindgen(js_name = removeItem)]
        pub fn remove_item(&mut self, key: &str, index: usize) -> Result<bool, JsError> {
            self.inner.remove_item(key, index).map_err(js_err)
        }

        // ========== Documents ==========

        #[wasm_bindgen(js_name = switchTo)]
        pub fn switch_to(&mut self, id: &str) -> bool {
            self.inner.switch_to(id)
        }

        /// Start a new empty document and return its id
        #[wasm_bindgen(js_name = createNew)]
        pub fn create_new(&mut self) -> String {
            self.inner.create_new().to_string()
        }

        pub fn delete(&mut self, id: &str) -> Result<bool, JsError> {
            self.inner.delete(id).map_err(js_err)
        }

        #[wasm_bindgen(js_name = deleteAll)]
        pub fn delete_all(&mut self) -> Result<bool, JsError> {
            self.inner.delete_all().map_err(js_err)
        }

        // ========== Import / export / print ==========

        #[wasm_bindgen(js_name = exportJson)]
        pub fn export_json(&self) -> Result<String, JsError> {
            self.inner.export_json().map_err(js_err)
        }

        /// Suggested download name for `exportJson`
        #[wasm_bindgen(js_name = exportFileName)]
        pub fn export_file_name(&self) -> String {
            self.inner.template().export_file_name.to_string()
        }

        /// Replace the active document with file contents.
        ///
        /// Throws "Invalid JSON file: ..." and leaves the document untouched
        /// when the text is not a JSON object.
        #[wasm_bindgen(js_name = importJson)]
        pub fn import_json(&mut self, text: &str) -> Result<(), JsError> {
            self.inner.import_json(text).map_err(js_err)
        }

        /// Plain-text rendering for printing
        pub fn printable(&self) -> String {
            self.inner.printable()
        }
    }
}
