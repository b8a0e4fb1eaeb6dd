//! Restore decision for documents found in storage at startup.
//!
//! Documents loaded at startup are held aside until the user picks one to
//! restore, starts fresh (keeping them), or discards them all. Until then they
//! are not live: nothing edits them and nothing is written over them.
//!
//! ```text
//!            restore(id) / start_fresh
//! Pending ─────────────────────────────▶ Restored
//!    │
//!    └──────── discard ───────────────▶ Fresh
//! ```
//!
//! Resolution happens at most once per session.

use crate::document::DocumentSet;
use serde::Serialize;

/// Where the restore decision stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum RestoreState {
    /// Saved documents are waiting for the user's decision
    Pending,
    /// Saved documents (if any) are live
    Restored,
    /// Saved documents were discarded
    Fresh,
}

impl RestoreState {
    pub fn is_resolved(&self) -> bool {
        !matches!(self, RestoreState::Pending)
    }
}

/// Holds the pending set and enforces the one-way transitions.
#[derive(Debug)]
pub(crate) struct RestoreCoordinator {
    state: RestoreState,
    pending: DocumentSet,
}

impl RestoreCoordinator {
    /// Pending iff `loaded` is a non-empty set.
    pub(crate) fn begin(loaded: Option<DocumentSet>) -> Self {
        match loaded {
            Some(set) if !set.is_empty() => Self {
                state: RestoreState::Pending,
                pending: set,
            },
            _ => Self {
                state: RestoreState::Restored,
                pending: DocumentSet::new(),
            },
        }
    }

    pub(crate) fn state(&self) -> RestoreState {
        self.state
    }

    pub(crate) fn is_pending(&self) -> bool {
        self.state == RestoreState::Pending
    }

    /// The set awaiting a decision (empty once resolved)
    pub(crate) fn pending(&self) -> &DocumentSet {
        &self.pending
    }

    /// Resolve to `Restored` around document `id`, handing over the whole set.
    ///
    /// `None` (and no transition) when not pending or `id` is not in the set.
    pub(crate) fn restore(&mut self, id: &str) -> Option<DocumentSet> {
        if !self.is_pending() || !self.pending.contains(id) {
            return None;
        }
        self.state = RestoreState::Restored;
        Some(std::mem::take(&mut self.pending))
    }

    /// Resolve to `Restored` without choosing a document, handing over the set.
    pub(crate) fn start_fresh(&mut self) -> Option<DocumentSet> {
        if !self.is_pending() {
            return None;
        }
        self.state = RestoreState::Restored;
        Some(std::mem::take(&mut self.pending))
    }

    /// Resolve to `Fresh`, dropping the set. Returns whether a transition happened.
    pub(crate) fn discard(&mut self) -> bool {
        if !self.is_pending() {
            return false;
        }
        self.state = RestoreState::Fresh;
        self.pending.clear();
        true
    }
}
