//! canvasly-core: Document persistence and lifecycle for Canvasly templates.
//!
//! This crate provides:
//! - Template definitions (Business Model Canvas, First Principle Reasoning)
//! - The `KeyValueStore` abstraction over the host's persistent storage
//! - Multi-document storage with legacy single-document migration
//! - The restore-or-discard decision for documents found at startup
//! - Editing, listing and deletion through `Workbench`
//! - JSON import/export and printable rendering

pub mod clock;
pub mod document;
pub mod list;
pub mod migrate;
pub mod print;
pub mod restore;
pub mod session;
pub mod snapshot;
pub mod storage;
pub mod store;
pub mod template;
pub mod transfer;
pub mod workbench;

pub use clock::{Clock, ManualClock, SystemClock};
pub use document::{Document, DocumentId, DocumentSet, IdGenerator, SequentialIds, UuidGenerator};
pub use migrate::MigrationOutcome;
pub use print::render_printable;
pub use restore::RestoreState;
pub use snapshot::{FieldValue, Snapshot};
pub use storage::{InMemoryStore, KeyValueStore, StorageError};
pub use store::DocumentStore;
pub use template::{FieldShape, FieldSpec, Template, TemplateError, TemplateKind};
pub use transfer::ImportError;
pub use workbench::{DocumentSummary, StartupReport, Workbench};
