//! DocumentStore: the persisted form of one template's document set.
//!
//! The whole set lives in a single JSON blob under the template's storage key:
//!
//! ```json
//! { "<id>": { "snapshot": { "title": "Acme", ... }, "updatedAt": 1718000000000 } }
//! ```
//!
//! Reading is lenient. A blob that is not a JSON object is treated as absent,
//! entries that are not objects are skipped, and missing fields are defaulted.

use crate::document::{Document, DocumentId, DocumentSet};
use crate::snapshot::Snapshot;
use crate::storage::{KeyValueStore, Result, StorageError};
use tracing::{debug, warn};

/// Reads and writes one template's document set through a `KeyValueStore`.
pub struct DocumentStore<S: KeyValueStore> {
    backend: S,
    key: &'static str,
}

impl<S: KeyValueStore> DocumentStore<S> {
    pub fn new(backend: S, key: &'static str) -> Self {
        Self { backend, key }
    }

    pub fn key(&self) -> &'static str {
        self.key
    }

    pub fn backend(&self) -> &S {
        &self.backend
    }

    /// Load the persisted set.
    ///
    /// Returns `None` when the key is absent, unreadable, unparseable, or holds
    /// no documents. Never fails.
    pub fn load(&self) -> Option<DocumentSet> {
        let raw = match self.backend.get(self.key) {
            Ok(Some(raw)) => raw,
            Ok(None) => return None,
            Err(e) => {
                warn!("Failed to read {}: {}", self.key, e);
                return None;
            }
        };

        let documents = parse_document_set(&raw);
        match documents {
            Some(set) if !set.is_empty() => {
                debug!("Loaded {} document(s) from {}", set.len(), self.key);
                Some(set)
            }
            Some(_) => None,
            None => {
                warn!("Ignoring corrupt data under {}", self.key);
                None
            }
        }
    }

    /// Replace the persisted blob with `documents`.
    pub fn persist(&self, documents: &DocumentSet) -> Result<()> {
        let json = serde_json::to_string(documents)
            .map_err(|e| StorageError::Encoding(e.to_string()))?;
        self.backend.set(self.key, &json)?;
        debug!("Persisted {} document(s) to {}", documents.len(), self.key);
        Ok(())
    }

    /// Delete the persisted blob. Idempotent.
    pub fn clear(&self) -> Result<()> {
        self.backend.delete(self.key)?;
        debug!("Cleared {}", self.key);
        Ok(())
    }
}

/// Parse a persisted blob. `None` only when it is not a JSON object.
pub fn parse_document_set(raw: &str) -> Option<DocumentSet> {
    let value: serde_json::Value = serde_json::from_str(raw).ok()?;
    let serde_json::Value::Object(entries) = value else {
        return None;
    };

    let mut documents = DocumentSet::new();
    for (id, entry) in entries {
        match parse_document(entry) {
            Some(document) => {
                documents.insert(DocumentId::from(id), document);
            }
            None => debug!("Skipping malformed document entry {}", id),
        }
    }
    Some(documents)
}

fn parse_document(entry: serde_json::Value) -> Option<Document> {
    let serde_json::Value::Object(mut fields) = entry else {
        return None;
    };

    // Older web builds stored the field map under "data"
    let snapshot = fields
        .remove("snapshot")
        .or_else(|| fields.remove("data"));
    let snapshot = match snapshot {
        Some(serde_json::Value::Object(map)) => Snapshot::from_json_map(map),
        _ => Snapshot::new(),
    };

    let updated_at = fields
        .get("updatedAt")
        .and_then(|v| v.as_u64().or_else(|| v.as_f64().map(|f| f.max(0.0) as u64)))
        .unwrap_or(0);

    Some(Document::new(snapshot, updated_at))
}
