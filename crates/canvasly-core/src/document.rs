//! Documents and the document set of one template kind.

use crate::snapshot::Snapshot;
use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::collections::HashMap;
use std::fmt::{self, Display, Formatter};
use std::sync::atomic::{AtomicU64, Ordering};

/// Opaque document identifier.
///
/// Generated ids are UUID v4 strings, but ids read back from storage are
/// accepted as-is.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DocumentId(String);

impl DocumentId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for DocumentId {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for DocumentId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for DocumentId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl Borrow<str> for DocumentId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

/// Source of fresh, never reused document ids.
pub trait IdGenerator {
    fn generate(&self) -> DocumentId;
}

/// Random UUID v4 ids.
#[derive(Debug, Default, Clone, Copy)]
pub struct UuidGenerator;

impl IdGenerator for UuidGenerator {
    fn generate(&self) -> DocumentId {
        DocumentId(uuid::Uuid::new_v4().to_string())
    }
}

/// Predictable ids (`doc-1`, `doc-2`, ...) for tests.
#[derive(Debug)]
pub struct SequentialIds {
    prefix: String,
    next: AtomicU64,
}

impl SequentialIds {
    pub fn new(prefix: &str) -> Self {
        Self {
            prefix: prefix.to_string(),
            next: AtomicU64::new(1),
        }
    }
}

impl Default for SequentialIds {
    fn default() -> Self {
        Self::new("doc")
    }
}

impl IdGenerator for SequentialIds {
    fn generate(&self) -> DocumentId {
        let n = self.next.fetch_add(1, Ordering::Relaxed);
        DocumentId(format!("{}-{}", self.prefix, n))
    }
}

/// One saved template instance.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Document {
    pub snapshot: Snapshot,
    /// Milliseconds since Unix epoch of the last snapshot change
    #[serde(rename = "updatedAt")]
    pub updated_at: u64,
}

impl Document {
    pub fn new(snapshot: Snapshot, updated_at: u64) -> Self {
        Self {
            snapshot,
            updated_at,
        }
    }
}

/// All documents of one template kind, keyed by id.
///
/// The map itself is unordered; `by_recency` gives the listing order.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct DocumentSet {
    documents: HashMap<DocumentId, Document>,
}

impl DocumentSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, id: &str) -> Option<&Document> {
        self.documents.get(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.documents.contains_key(id)
    }

    pub fn insert(&mut self, id: DocumentId, document: Document) -> Option<Document> {
        self.documents.insert(id, document)
    }

    pub fn remove(&mut self, id: &str) -> Option<Document> {
        self.documents.remove(id)
    }

    pub fn clear(&mut self) {
        self.documents.clear();
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    /// Most recently updated first; equal timestamps ordered by id.
    pub fn by_recency(&self) -> Vec<(&DocumentId, &Document)> {
        let mut entries: Vec<_> = self.documents.iter().collect();
        entries.sort_by(|(id_a, a), (id_b, b)| {
            b.updated_at.cmp(&a.updated_at).then_with(|| id_a.cmp(id_b))
        });
        entries
    }

    /// The document that would head a listing
    pub fn most_recent(&self) -> Option<(&DocumentId, &Document)> {
        self.by_recency().into_iter().next()
    }
}

impl FromIterator<(DocumentId, Document)> for DocumentSet {
    fn from_iter<T: IntoIterator<Item = (DocumentId, Document)>>(iter: T) -> Self {
        Self {
            documents: iter.into_iter().collect(),
        }
    }
}
