//! Editing operations on the active document.
//!
//! Every operation that changes the live snapshot is one write-through: the
//! document set gets the new snapshot with a refreshed timestamp and the whole
//! set is persisted. There is no debounce or batching.

use crate::snapshot::{FieldValue, Snapshot};
use crate::storage::{self, KeyValueStore};
use crate::workbench::Workbench;
use tracing::debug;

impl<S: KeyValueStore> Workbench<S> {
    /// Set one field of the active document.
    pub fn mutate(&mut self, key: &str, value: impl Into<FieldValue>) -> storage::Result<()> {
        self.snapshot.set(key, value);
        self.write_through()
    }

    /// Replace the whole snapshot of the active document in one step.
    pub fn replace_snapshot(&mut self, snapshot: Snapshot) -> storage::Result<()> {
        self.snapshot = snapshot;
        self.write_through()
    }

    /// Fill the active document with the template's example content
    pub fn load_example(&mut self) -> storage::Result<()> {
        self.replace_snapshot(self.template.example_snapshot())
    }

    /// Reset the active document to empty fields
    pub fn clear(&mut self) -> storage::Result<()> {
        self.replace_snapshot(self.template.default_snapshot())
    }

    /// Continue editing another saved document.
    ///
    /// Returns `false` without changing anything when `id` is already active
    /// or not in the live set. Does not write.
    pub fn switch_to(&mut self, id: &str) -> bool {
        if self.active_id.as_str() == id {
            return false;
        }
        let Some(document) = self.documents.get(id) else {
            debug!("Ignoring switch to unknown document {}", id);
            return false;
        };

        self.snapshot = self.template.with_defaults(&document.snapshot);
        self.active_id = id.into();
        debug!("Switched to {}", id);
        true
    }

    // ========== List fields ==========

    /// Append an empty item to a list field.
    ///
    /// A text value becomes the first item. Returns `false` for values of
    /// unknown shape.
    pub fn add_item(&mut self, key: &str) -> storage::Result<bool> {
        let Some(mut items) = self.list_items(key) else {
            return Ok(false);
        };
        items.push(String::new());
        self.mutate(key, items)?;
        Ok(true)
    }

    /// Overwrite item `index` of a list field. Out-of-range is a no-op.
    pub fn set_item(&mut self, key: &str, index: usize, text: &str) -> storage::Result<bool> {
        let Some(mut items) = self.list_items(key) else {
            return Ok(false);
        };
        let Some(item) = items.get_mut(index) else {
            return Ok(false);
        };
        *item = text.to_string();
        self.mutate(key, items)?;
        Ok(true)
    }

    /// Remove item `index` of a list field.
    ///
    /// A list never becomes empty: removing the last item leaves one empty
    /// item. Out-of-range is a no-op.
    pub fn remove_item(&mut self, key: &str, index: usize) -> storage::Result<bool> {
        let Some(mut items) = self.list_items(key) else {
            return Ok(false);
        };
        if index >= items.len() {
            return Ok(false);
        }
        items.remove(index);
        if items.is_empty() {
            items.push(String::new());
        }
        self.mutate(key, items)?;
        Ok(true)
    }

    fn list_items(&self, key: &str) -> Option<Vec<String>> {
        match self.snapshot.get(key) {
            Some(FieldValue::List(items)) => Some(items.clone()),
            Some(FieldValue::Text(text)) => Some(vec![text.clone()]),
            Some(FieldValue::Other(_)) => None,
            None => Some(vec![String::new()]),
        }
    }
}
