//! End-to-end document lifecycle tests.
//!
//! Drives `Workbench` through startup, restore, editing and deletion against a
//! shared in-memory store, checking what ends up persisted.

use std::sync::Arc;

use canvasly_core::store::parse_document_set;
use canvasly_core::{
    DocumentSet, FieldValue, InMemoryStore, KeyValueStore, ManualClock, MigrationOutcome,
    RestoreState, SequentialIds, TemplateKind, Workbench,
};

const BMC_KEY: &str = "canvasly-bmc-documents";
const BMC_LEGACY_KEY: &str = "canvasly-bmc-data";
const FPR_KEY: &str = "canvasly-fpr-documents";

fn open(
    backend: &Arc<InMemoryStore>,
    kind: TemplateKind,
    clock: &ManualClock,
    prefix: &str,
) -> Workbench<Arc<InMemoryStore>> {
    Workbench::open_with(
        backend.clone(),
        kind,
        Box::new(clock.clone()),
        Box::new(SequentialIds::new(prefix)),
    )
}

fn persisted(backend: &InMemoryStore, key: &str) -> Option<DocumentSet> {
    backend.raw(key).and_then(|raw| parse_document_set(&raw))
}

#[test]
fn fresh_storage_first_edit_persists_one_document() {
    let backend = Arc::new(InMemoryStore::new());
    let clock = ManualClock::new(1_000);
    let mut workbench = open(&backend, TemplateKind::BusinessModelCanvas, &clock, "doc");
    assert_eq!(workbench.restore_state(), RestoreState::Restored);

    let id = workbench.create_new();
    workbench.mutate("title", "Acme").unwrap();

    let stored = persisted(&backend, BMC_KEY).unwrap();
    assert_eq!(stored.len(), 1);
    assert_eq!(stored.get(id.as_str()).unwrap().snapshot.text("title"), "Acme");
}

#[test]
fn write_through_keeps_store_equal_to_memory() {
    let backend = Arc::new(InMemoryStore::new());
    let clock = ManualClock::new(1_000);
    let mut workbench = open(&backend, TemplateKind::FirstPrincipleReasoning, &clock, "doc");

    let edits = [
        ("problemName", "Why churn?"),
        ("clarification", "Monthly plans"),
        ("implications", "Revenue dips"),
    ];
    for (i, (key, value)) in edits.iter().enumerate() {
        clock.advance(3);
        workbench.mutate(key, *value).unwrap();
        if i == 1 {
            workbench.create_new();
        }
        assert_eq!(persisted(&backend, FPR_KEY).as_ref(), Some(workbench.document_set()));
    }

    workbench.clear().unwrap();
    assert_eq!(persisted(&backend, FPR_KEY).as_ref(), Some(workbench.document_set()));
    assert_eq!(workbench.document_set().len(), 2);
}

#[test]
fn list_edits_write_through() {
    let backend = Arc::new(InMemoryStore::new());
    let clock = ManualClock::new(1_000);
    let mut workbench = open(&backend, TemplateKind::BusinessModelCanvas, &clock, "doc");

    assert!(workbench.set_item("channels", 0, "Web").unwrap());
    assert!(workbench.add_item("channels").unwrap());
    assert!(workbench.set_item("channels", 1, "Retail").unwrap());
    assert!(workbench.remove_item("channels", 0).unwrap());
    assert!(!workbench.set_item("channels", 5, "nowhere").unwrap());

    let stored = persisted(&backend, BMC_KEY).unwrap();
    let channels = stored
        .get(workbench.active_id().as_str())
        .unwrap()
        .snapshot
        .get("channels")
        .cloned();
    assert_eq!(channels, Some(FieldValue::list(["Retail"])));
}

#[test]
fn restore_adopts_whole_set_and_resumes_persisting() {
    let backend = Arc::new(InMemoryStore::new());
    backend
        .set(
            BMC_KEY,
            r#"{
                "A": {"snapshot": {"title": "Newer"}, "updatedAt": 2000},
                "B": {"snapshot": {"title": "Older"}, "updatedAt": 1000}
            }"#,
        )
        .unwrap();
    let clock = ManualClock::new(5_000);
    let mut workbench = open(&backend, TemplateKind::BusinessModelCanvas, &clock, "doc");

    assert!(workbench.is_pending());
    let pending: Vec<String> = workbench
        .pending_documents()
        .into_iter()
        .map(|s| s.id.to_string())
        .collect();
    assert_eq!(pending, ["A", "B"]);

    assert!(workbench.restore_document("B"));
    assert_eq!(workbench.active_id().as_str(), "B");
    assert_eq!(workbench.document_set().len(), 2);
    assert!(workbench.document_set().contains("A"));

    workbench.mutate("title", "Older, edited").unwrap();
    let stored = persisted(&backend, BMC_KEY).unwrap();
    assert_eq!(stored.len(), 2);
    assert_eq!(stored.get("B").unwrap().updated_at, 5_000);
    assert_eq!(stored.get("A").unwrap().snapshot.text("title"), "Newer");
}

#[test]
fn pending_edits_never_reach_storage() {
    let backend = Arc::new(InMemoryStore::new());
    backend
        .set(FPR_KEY, r#"{"A": {"snapshot": {"problemName": "Saved"}, "updatedAt": 1}}"#)
        .unwrap();
    let before = backend.raw(FPR_KEY);
    let clock = ManualClock::new(10);
    let mut workbench = open(&backend, TemplateKind::FirstPrincipleReasoning, &clock, "doc");

    workbench.mutate("problemName", "Typed before deciding").unwrap();
    workbench.load_example().unwrap();
    workbench.import_json(r#"{"problemName": "Imported"}"#).unwrap();
    assert!(!workbench.delete("A").unwrap());
    assert!(!workbench.delete_all().unwrap());

    assert_eq!(backend.raw(FPR_KEY), before);
    assert!(workbench.document_set().is_empty());
    assert!(workbench.documents().is_empty());
    assert_eq!(workbench.snapshot().text("problemName"), "Imported");
}

#[test]
fn start_fresh_persists_kept_documents_on_first_edit() {
    let backend = Arc::new(InMemoryStore::new());
    backend
        .set(FPR_KEY, r#"{"A": {"snapshot": {"problemName": "Saved"}, "updatedAt": 1}}"#)
        .unwrap();
    let clock = ManualClock::new(10);
    let mut workbench = open(&backend, TemplateKind::FirstPrincipleReasoning, &clock, "doc");

    assert!(workbench.start_fresh());
    assert_eq!(workbench.restore_state(), RestoreState::Restored);
    workbench.mutate("problemName", "New thought").unwrap();

    let stored = persisted(&backend, FPR_KEY).unwrap();
    assert_eq!(stored.len(), 2);
    assert!(stored.contains("A"));
    assert!(stored.contains(workbench.active_id().as_str()));
}

#[test]
fn discard_all_wipes_and_starts_one_empty_document() {
    let backend = Arc::new(InMemoryStore::new());
    backend
        .set(FPR_KEY, r#"{"A": {"snapshot": {"problemName": "Saved"}, "updatedAt": 1}}"#)
        .unwrap();
    let clock = ManualClock::new(10);
    let mut workbench = open(&backend, TemplateKind::FirstPrincipleReasoning, &clock, "doc");

    assert!(workbench.discard_all().unwrap());
    assert_eq!(workbench.restore_state(), RestoreState::Fresh);
    assert!(!backend.contains(FPR_KEY));

    workbench.mutate("problemName", "Clean slate").unwrap();
    let stored = persisted(&backend, FPR_KEY).unwrap();
    assert_eq!(stored.len(), 1);
    assert!(!stored.contains("A"));
}

#[test]
fn deleting_only_document_clears_store_and_leaves_fresh_active() {
    let backend = Arc::new(InMemoryStore::new());
    let clock = ManualClock::new(10);
    let mut workbench = open(&backend, TemplateKind::BusinessModelCanvas, &clock, "doc");
    workbench.mutate("title", "Only").unwrap();
    let only = workbench.active_id().clone();

    assert!(workbench.delete(only.as_str()).unwrap());

    assert!(!backend.contains(BMC_KEY));
    assert_ne!(workbench.active_id(), &only);
    assert_eq!(workbench.snapshot(), &workbench.template().default_snapshot());
    assert!(workbench.documents().is_empty());
}

#[test]
fn import_preserves_unknown_fields() {
    let backend = Arc::new(InMemoryStore::new());
    let clock = ManualClock::new(10);
    let mut workbench = open(&backend, TemplateKind::BusinessModelCanvas, &clock, "doc");

    workbench.import_json(r#"{"title":"X","extra":"Y"}"#).unwrap();

    let snapshot = workbench.snapshot();
    assert_eq!(snapshot.text("title"), "X");
    assert_eq!(snapshot.text("extra"), "Y");
    assert_eq!(snapshot.get("keyPartners"), Some(&FieldValue::list([""])));
    assert_eq!(snapshot.get("revenueStreams"), Some(&FieldValue::list([""])));
}

#[test]
fn corrupt_import_leaves_snapshot_untouched() {
    let backend = Arc::new(InMemoryStore::new());
    let clock = ManualClock::new(10);
    let mut workbench = open(&backend, TemplateKind::BusinessModelCanvas, &clock, "doc");
    workbench.mutate("title", "Keep me").unwrap();
    let before = backend.raw(BMC_KEY);

    assert!(workbench.import_json("{ definitely not json").is_err());

    assert_eq!(workbench.snapshot().text("title"), "Keep me");
    assert_eq!(backend.raw(BMC_KEY), before);
}

#[test]
fn legacy_blob_is_migrated_once() {
    let backend = Arc::new(InMemoryStore::new());
    backend.set(BMC_LEGACY_KEY, r#"{"title":"Old"}"#).unwrap();
    let clock = ManualClock::new(10);

    let first = open(&backend, TemplateKind::BusinessModelCanvas, &clock, "first");
    let MigrationOutcome::Migrated(migrated) = first.startup().migration.clone() else {
        panic!("expected migration, got {:?}", first.startup().migration);
    };
    assert!(!backend.contains(BMC_LEGACY_KEY));
    let after_first = backend.raw(BMC_KEY);

    let stored = persisted(&backend, BMC_KEY).unwrap();
    assert_eq!(stored.len(), 1);
    assert_eq!(stored.get(migrated.as_str()).unwrap().snapshot.text("title"), "Old");

    let second = open(&backend, TemplateKind::BusinessModelCanvas, &clock, "second");
    assert_eq!(second.startup().migration, MigrationOutcome::NotNeeded);
    assert_eq!(backend.raw(BMC_KEY), after_first);
    assert!(!backend.contains(BMC_LEGACY_KEY));
}

#[test]
fn templates_use_independent_keys() {
    let backend = Arc::new(InMemoryStore::new());
    let clock = ManualClock::new(10);
    let mut bmc = open(&backend, TemplateKind::BusinessModelCanvas, &clock, "bmc");
    let mut fpr = open(&backend, TemplateKind::FirstPrincipleReasoning, &clock, "fpr");

    bmc.mutate("title", "Canvas").unwrap();
    fpr.mutate("problemName", "Question").unwrap();
    bmc.delete_all().unwrap();

    assert!(!backend.contains(BMC_KEY));
    assert_eq!(persisted(&backend, FPR_KEY).unwrap().len(), 1);
}

#[test]
fn concurrent_sessions_last_write_wins() {
    let backend = Arc::new(InMemoryStore::new());
    let clock = ManualClock::new(10);
    let mut tab_one = open(&backend, TemplateKind::FirstPrincipleReasoning, &clock, "one");
    let mut tab_two = open(&backend, TemplateKind::FirstPrincipleReasoning, &clock, "two");

    tab_one.mutate("problemName", "From tab one").unwrap();
    clock.advance(1);
    tab_two.mutate("problemName", "From tab two").unwrap();

    // Tab two never saw tab one's document, so its write drops it
    let stored = persisted(&backend, FPR_KEY).unwrap();
    assert_eq!(stored.len(), 1);
    assert!(stored.contains(tab_two.active_id().as_str()));
    assert!(!stored.contains(tab_one.active_id().as_str()));

    clock.advance(1);
    tab_one.mutate("clarification", "Again").unwrap();
    let stored = persisted(&backend, FPR_KEY).unwrap();
    assert_eq!(stored.len(), 1);
    assert!(stored.contains(tab_one.active_id().as_str()));
}

#[test]
fn storage_written_by_web_build_is_readable() {
    let backend = Arc::new(InMemoryStore::new());
    backend
        .set(
            FPR_KEY,
            r#"{"0b5e": {"data": {"problemName": "From the browser"}, "updatedAt": 1718000000000}}"#,
        )
        .unwrap();
    let clock = ManualClock::new(10);
    let mut workbench = open(&backend, TemplateKind::FirstPrincipleReasoning, &clock, "doc");

    assert!(workbench.restore_document("0b5e"));
    assert_eq!(workbench.snapshot().text("problemName"), "From the browser");
    assert_eq!(workbench.snapshot().text("clarification"), "");
}
