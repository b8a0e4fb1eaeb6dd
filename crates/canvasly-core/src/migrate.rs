//! One-time upgrade from the single-document storage format.
//!
//! Earlier builds kept exactly one bare snapshot under a legacy key. On first
//! load it becomes one document of the multi-document set and the legacy key
//! is removed. Running the migration again finds no legacy key and does
//! nothing.

use crate::clock::Clock;
use crate::document::{Document, DocumentId, DocumentSet, IdGenerator};
use crate::snapshot::Snapshot;
use crate::storage::KeyValueStore;
use crate::store::DocumentStore;
use tracing::{info, warn};

/// What the legacy migration did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MigrationOutcome {
    /// No legacy data was present
    NotNeeded,
    /// Legacy snapshot became this document
    Migrated(DocumentId),
    /// Legacy data was unparseable and has been removed
    Discarded,
    /// Legacy data could not be read, or the new set could not be written.
    /// The legacy key is kept and the next start tries again.
    Deferred,
}

/// Move the legacy single snapshot (if any) into the document set.
///
/// Existing documents under the current key are kept; the migrated document
/// is added next to them.
pub fn migrate_legacy<S: KeyValueStore>(
    store: &DocumentStore<S>,
    legacy_key: &str,
    clock: &dyn Clock,
    ids: &dyn IdGenerator,
) -> MigrationOutcome {
    let raw = match store.backend().get(legacy_key) {
        Ok(Some(raw)) => raw,
        Ok(None) => return MigrationOutcome::NotNeeded,
        // Unread data is never deleted
        Err(e) => {
            warn!("Failed to read legacy key {}, keeping it: {}", legacy_key, e);
            return MigrationOutcome::Deferred;
        }
    };

    let Some(snapshot) = parse_legacy(&raw) else {
        warn!("Discarding unparseable legacy data under {}", legacy_key);
        remove_legacy(store, legacy_key);
        return MigrationOutcome::Discarded;
    };

    let mut documents = store.load().unwrap_or_else(DocumentSet::new);
    let id = ids.generate();
    documents.insert(id.clone(), Document::new(snapshot, clock.now_millis()));

    if let Err(e) = store.persist(&documents) {
        warn!("Failed to write migrated document, keeping {}: {}", legacy_key, e);
        return MigrationOutcome::Deferred;
    }

    remove_legacy(store, legacy_key);
    info!("Migrated legacy document from {} as {}", legacy_key, id);
    MigrationOutcome::Migrated(id)
}

fn parse_legacy(raw: &str) -> Option<Snapshot> {
    let value: serde_json::Value = serde_json::from_str(raw).ok()?;
    match value {
        serde_json::Value::Object(map) => Some(Snapshot::from_json_map(map)),
        _ => None,
    }
}

fn remove_legacy<S: KeyValueStore>(store: &DocumentStore<S>, legacy_key: &str) {
    if let Err(e) = store.backend().delete(legacy_key) {
        warn!("Failed to remove legacy key {}: {}", legacy_key, e);
    }
}
