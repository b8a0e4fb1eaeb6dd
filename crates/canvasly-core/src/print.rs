//! Plain-text rendering of a document for the host's print facility.

use crate::snapshot::{FieldValue, Snapshot};
use crate::storage::KeyValueStore;
use crate::template::Template;
use crate::workbench::Workbench;
use std::fmt::Write;

/// Render `snapshot` as printable text laid out by `template`.
///
/// Only the template's fields are printed, in template order.
pub fn render_printable(template: &Template, snapshot: &Snapshot) -> String {
    let mut out = String::new();
    let title = template.document_title(snapshot);

    let _ = writeln!(out, "{}", template.label.to_uppercase());
    let _ = writeln!(out, "{}", title);
    let _ = writeln!(out, "{}", "=".repeat(title.chars().count().max(8)));

    for field in template.blocks() {
        let _ = writeln!(out);
        let _ = writeln!(out, "{}", field.label);
        let _ = writeln!(out, "  ({})", field.prompt);

        match snapshot.get(field.key) {
            Some(FieldValue::Text(text)) => write_text(&mut out, text),
            Some(FieldValue::List(items)) => {
                for item in items.iter().filter(|s| !s.trim().is_empty()) {
                    let _ = writeln!(out, "  - {}", item.trim());
                }
            }
            Some(FieldValue::Other(value)) => {
                let _ = writeln!(out, "  {}", value);
            }
            None => {}
        }
    }

    let _ = writeln!(out);
    let _ = writeln!(out, "{}", template.tagline);
    out
}

fn write_text(out: &mut String, text: &str) {
    for line in text.lines() {
        let _ = writeln!(out, "  {}", line);
    }
}

impl<S: KeyValueStore> Workbench<S> {
    /// The active document as printable text
    pub fn printable(&self) -> String {
        render_printable(self.template, &self.snapshot)
    }
}
