//! Workbench: one template's editing session over its persisted documents.
//!
//! A workbench ties together the document store, the restore decision, the
//! active document and the list of saved documents. It is only obtainable
//! through [`Workbench::open`], which migrates legacy data and loads the store
//! in that order before anything else can look at storage.
//!
//! Edits write through on every call: the active snapshot is put into the
//! document set with a fresh timestamp and the whole set is persisted. While
//! the restore decision is pending, edits stay in memory only.
//!
//! # Sharing
//!
//! Two workbenches opened on the same storage write the same key without
//! coordination. Each write replaces the blob with that workbench's whole
//! set, so the last writer wins and documents only the other session knew
//! about are dropped from storage. There is no merge and no version check.

use crate::clock::{Clock, SystemClock};
use crate::document::{Document, DocumentId, DocumentSet, IdGenerator, UuidGenerator};
use crate::migrate::{MigrationOutcome, migrate_legacy};
use crate::restore::{RestoreCoordinator, RestoreState};
use crate::snapshot::Snapshot;
use crate::storage::{self, KeyValueStore};
use crate::store::DocumentStore;
use crate::template::{Template, TemplateKind};
use serde::Serialize;
use tracing::{debug, info};

/// What happened while opening a workbench.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StartupReport {
    pub migration: MigrationOutcome,
    /// Documents found in storage after migration
    pub documents_found: usize,
}

/// One entry of a document listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentSummary {
    pub id: DocumentId,
    pub title: String,
    pub updated_at: u64,
    pub active: bool,
}

/// Editing session for one template kind.
pub struct Workbench<S: KeyValueStore> {
    pub(crate) template: &'static Template,
    pub(crate) store: DocumentStore<S>,
    pub(crate) clock: Box<dyn Clock>,
    pub(crate) ids: Box<dyn IdGenerator>,
    /// Live documents; empty while the restore decision is pending
    pub(crate) documents: DocumentSet,
    pub(crate) restore: RestoreCoordinator,
    pub(crate) active_id: DocumentId,
    pub(crate) snapshot: Snapshot,
    startup: StartupReport,
}

impl<S: KeyValueStore> Workbench<S> {
    /// Open a workbench with the system clock and UUID ids.
    pub fn open(backend: S, kind: TemplateKind) -> Self {
        Self::open_with(backend, kind, Box::new(SystemClock), Box::new(UuidGenerator))
    }

    /// Open a workbench with an explicit clock and id source.
    ///
    /// Runs the legacy migration, then loads the store. Saved documents put
    /// the workbench in [`RestoreState::Pending`]; otherwise it starts resolved
    /// on a fresh document.
    pub fn open_with(
        backend: S,
        kind: TemplateKind,
        clock: Box<dyn Clock>,
        ids: Box<dyn IdGenerator>,
    ) -> Self {
        let template = kind.template();
        let store = DocumentStore::new(backend, template.storage_key);

        let migration = match template.legacy_key {
            Some(legacy_key) => migrate_legacy(&store, legacy_key, clock.as_ref(), ids.as_ref()),
            None => MigrationOutcome::NotNeeded,
        };

        let loaded = store.load();
        let documents_found = loaded.as_ref().map_or(0, DocumentSet::len);
        let restore = RestoreCoordinator::begin(loaded);

        let active_id = ids.generate();
        info!(
            "Opened {} workbench: {} saved document(s), restore {:?}",
            kind,
            documents_found,
            restore.state()
        );

        Self {
            template,
            store,
            clock,
            ids,
            documents: DocumentSet::new(),
            restore,
            active_id,
            snapshot: template.default_snapshot(),
            startup: StartupReport {
                migration,
                documents_found,
            },
        }
    }

    pub fn template(&self) -> &'static Template {
        self.template
    }

    pub fn startup(&self) -> &StartupReport {
        &self.startup
    }

    pub fn restore_state(&self) -> RestoreState {
        self.restore.state()
    }

    pub fn is_pending(&self) -> bool {
        self.restore.is_pending()
    }

    pub fn active_id(&self) -> &DocumentId {
        &self.active_id
    }

    /// Live snapshot of the active document
    pub fn snapshot(&self) -> &Snapshot {
        &self.snapshot
    }

    pub fn active_title(&self) -> &str {
        self.template.document_title(&self.snapshot)
    }

    /// Live document set (empty while pending)
    pub fn document_set(&self) -> &DocumentSet {
        &self.documents
    }

    /// Live documents, most recently updated first.
    pub fn documents(&self) -> Vec<DocumentSummary> {
        self.summarize(&self.documents)
    }

    /// Documents awaiting the restore decision, most recently updated first.
    pub fn pending_documents(&self) -> Vec<DocumentSummary> {
        self.summarize(self.restore.pending())
    }

    fn summarize(&self, set: &DocumentSet) -> Vec<DocumentSummary> {
        set.by_recency()
            .into_iter()
            .map(|(id, doc)| DocumentSummary {
                id: id.clone(),
                title: self.template.document_title(&doc.snapshot).to_string(),
                updated_at: doc.updated_at,
                active: *id == self.active_id,
            })
            .collect()
    }

    // ========== Restore decision ==========

    /// Make the saved documents live and continue editing `id`.
    ///
    /// Returns `false` without changing anything when not pending or `id` is
    /// not among the saved documents.
    pub fn restore_document(&mut self, id: &str) -> bool {
        let Some(documents) = self.restore.restore(id) else {
            debug!("Ignoring restore of {}: not pending or unknown", id);
            return false;
        };

        self.documents = documents;
        if let Some(doc) = self.documents.get(id) {
            self.snapshot = self.template.with_defaults(&doc.snapshot);
        }
        self.active_id = DocumentId::from(id);
        info!("Restored {} of {} document(s)", id, self.documents.len());
        true
    }

    /// Make the saved documents live but start editing a new empty document.
    ///
    /// Nothing is written until the new document is first edited.
    pub fn start_fresh(&mut self) -> bool {
        let Some(documents) = self.restore.start_fresh() else {
            return false;
        };

        self.documents = documents;
        self.create_new();
        info!("Started fresh, keeping {} document(s)", self.documents.len());
        true
    }

    /// Drop the saved documents from storage and memory and start empty.
    ///
    /// When clearing storage fails the decision stays pending.
    pub fn discard_all(&mut self) -> storage::Result<bool> {
        if !self.restore.is_pending() {
            return Ok(false);
        }

        self.store.clear()?;
        self.restore.discard();
        self.documents.clear();
        self.create_new();
        info!("Discarded saved documents");
        Ok(true)
    }

    // ========== Write-through ==========

    /// Put the live snapshot into the set and persist the set.
    pub(crate) fn write_through(&mut self) -> storage::Result<()> {
        if self.restore.is_pending() {
            debug!("Restore pending, keeping edit of {} in memory", self.active_id);
            return Ok(());
        }

        let document = Document::new(self.snapshot.clone(), self.clock.now_millis());
        self.documents.insert(self.active_id.clone(), document);
        self.store.persist(&self.documents)
    }
}
