//! JSON import/export of a single snapshot.
//!
//! Export writes exactly the active field map: no id, no timestamp, no
//! wrapping. Import reads a field map and lays it over the template defaults,
//! so missing fields are filled in and unknown fields are kept.

use crate::snapshot::Snapshot;
use crate::storage::{KeyValueStore, StorageError};
use crate::template::Template;
use crate::workbench::Workbench;
use thiserror::Error;
use tracing::{info, warn};

#[derive(Debug, Error)]
pub enum ImportError {
    #[error("Invalid JSON file: {0}")]
    InvalidJson(#[from] serde_json::Error),

    #[error("Expected a JSON object of fields, found {0}")]
    NotAnObject(&'static str),

    #[error("Imported, but saving failed: {0}")]
    Storage(#[from] StorageError),
}

pub type Result<T> = std::result::Result<T, ImportError>;

/// Pretty-printed JSON of a field map.
pub fn export_snapshot(snapshot: &Snapshot) -> serde_json::Result<String> {
    serde_json::to_string_pretty(snapshot)
}

/// Parse an exported file into a full snapshot for `template`.
pub fn parse_import(template: &Template, text: &str) -> Result<Snapshot> {
    let value: serde_json::Value = serde_json::from_str(text)?;
    let map = match value {
        serde_json::Value::Object(map) => map,
        serde_json::Value::Array(_) => return Err(ImportError::NotAnObject("an array")),
        serde_json::Value::String(_) => return Err(ImportError::NotAnObject("a string")),
        serde_json::Value::Number(_) => return Err(ImportError::NotAnObject("a number")),
        serde_json::Value::Bool(_) => return Err(ImportError::NotAnObject("a boolean")),
        serde_json::Value::Null => return Err(ImportError::NotAnObject("null")),
    };
    Ok(template.with_defaults(&Snapshot::from_json_map(map)))
}

impl<S: KeyValueStore> Workbench<S> {
    /// The active document as an export file
    pub fn export_json(&self) -> serde_json::Result<String> {
        export_snapshot(&self.snapshot)
    }

    /// Replace the active snapshot with an imported file.
    ///
    /// On a parse error the active snapshot is left untouched.
    pub fn import_json(&mut self, text: &str) -> Result<()> {
        let snapshot = match parse_import(self.template, text) {
            Ok(snapshot) => snapshot,
            Err(e) => {
                warn!("Rejected import: {}", e);
                return Err(e);
            }
        };
        self.replace_snapshot(snapshot)?;
        info!("Imported snapshot into {}", self.active_id);
        Ok(())
    }
}
