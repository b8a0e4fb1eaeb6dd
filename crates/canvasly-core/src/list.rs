//! Structural operations over the document set: new, delete, delete all.

use crate::document::DocumentId;
use crate::storage::{self, KeyValueStore};
use crate::workbench::Workbench;
use tracing::{debug, info};

impl<S: KeyValueStore> Workbench<S> {
    /// Start editing a new empty document.
    ///
    /// The document joins the set (and storage) on its first edit.
    pub fn create_new(&mut self) -> DocumentId {
        self.active_id = self.ids.generate();
        self.snapshot = self.template.default_snapshot();
        debug!("Created new document {}", self.active_id);
        self.active_id.clone()
    }

    /// Delete a saved document.
    ///
    /// Storage is cleared when the set becomes empty, otherwise rewritten.
    /// Deleting the active document moves to the most recently updated
    /// remaining one, or to a new empty document. Unknown ids and calls while
    /// the restore decision is pending do nothing and return `Ok(false)`.
    pub fn delete(&mut self, id: &str) -> storage::Result<bool> {
        if self.restore.is_pending() {
            debug!("Ignoring delete of {} while restore is pending", id);
            return Ok(false);
        }
        if self.documents.remove(id).is_none() {
            debug!("Ignoring delete of unknown document {}", id);
            return Ok(false);
        }

        let written = if self.documents.is_empty() {
            self.store.clear()
        } else {
            self.store.persist(&self.documents)
        };

        if self.active_id.as_str() == id {
            self.promote_most_recent();
        }
        info!("Deleted {} ({} left)", id, self.documents.len());
        written.map(|_| true)
    }

    /// Delete every saved document and start a new empty one.
    ///
    /// Does nothing while the restore decision is pending.
    pub fn delete_all(&mut self) -> storage::Result<bool> {
        if self.restore.is_pending() {
            debug!("Ignoring delete-all while restore is pending");
            return Ok(false);
        }

        let cleared = self.store.clear();
        let count = self.documents.len();
        self.documents.clear();
        self.create_new();
        info!("Deleted all {} document(s)", count);
        cleared.map(|_| true)
    }

    fn promote_most_recent(&mut self) {
        let next = self
            .documents
            .most_recent()
            .map(|(id, doc)| (id.clone(), self.template.with_defaults(&doc.snapshot)));

        match next {
            Some((id, snapshot)) => {
                debug!("Promoted {} to active", id);
                self.active_id = id;
                self.snapshot = snapshot;
            }
            None => {
                self.create_new();
            }
        }
    }
}
