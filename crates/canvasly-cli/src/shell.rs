//! Line-oriented command shell over a `Workbench`.
//!
//! One command per line. Parsing is separate from execution so commands can be
//! checked without a store.

use anyhow::{Context, Result, bail};
use canvasly_core::{FieldShape, FieldSpec, FieldValue, KeyValueStore, Workbench};
use std::fs;
use std::io::Write;
use std::path::PathBuf;
use thiserror::Error;
use tracing::{debug, info};

pub const HELP: &str = "\
Restore decision (when saved documents were found):
  pending                     list saved documents awaiting a decision
  restore <id>                restore all saved documents and edit <id>
  fresh                       keep saved documents, start a new one
  discard                     delete saved documents and start empty

Documents:
  list                        saved documents, most recent first
  new                         start a new empty document
  select <id>                 edit another saved document
  delete <id>                 delete a saved document
  delete-all                  delete every saved document

Editing the active document:
  show                        print every field
  set <field> <text>          set a field
  add <field>                 append an empty item to a list field
  item <field> <index> <text> set one item of a list field
  remove <field> <index>      remove one item of a list field
  example                     fill with example content
  clear                       reset every field

Files:
  export [path]               write the document as JSON (stdout if no path)
  import <path>               replace the document with a JSON file
  print [path]                write a printable rendering

  help                        this text
  quit                        exit
";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CommandError {
    #[error("Unknown command: {0} (try `help`)")]
    Unknown(String),

    #[error("`{command}` needs {argument}")]
    MissingArgument {
        command: &'static str,
        argument: &'static str,
    },

    #[error("Not an item index: {0}")]
    InvalidIndex(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    List,
    Pending,
    Restore(String),
    Fresh,
    Discard,
    New,
    Select(String),
    Delete(String),
    DeleteAll,
    Show,
    Set { field: String, text: String },
    Add { field: String },
    Item { field: String, index: usize, text: String },
    Remove { field: String, index: usize },
    Example,
    Clear,
    Export(Option<PathBuf>),
    Import(PathBuf),
    Print(Option<PathBuf>),
    Help,
    Quit,
}

impl Command {
    /// Parse one input line. Blank lines and `#` comments yield `None`.
    pub fn parse(line: &str) -> Result<Option<Command>, CommandError> {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            return Ok(None);
        }

        let (name, rest) = split_word(line);
        let command = match name {
            "list" | "ls" => Command::List,
            "pending" => Command::Pending,
            "restore" => Command::Restore(required(rest, "restore", "a document id")?),
            "fresh" => Command::Fresh,
            "discard" => Command::Discard,
            "new" => Command::New,
            "select" => Command::Select(required(rest, "select", "a document id")?),
            "delete" | "rm" => Command::Delete(required(rest, "delete", "a document id")?),
            "delete-all" => Command::DeleteAll,
            "show" => Command::Show,
            "set" => {
                let (field, text) = split_word(rest);
                Command::Set {
                    field: required(field, "set", "a field name")?,
                    text: text.to_string(),
                }
            }
            "add" => Command::Add {
                field: required(rest, "add", "a field name")?,
            },
            "item" => {
                let (field, rest) = split_word(rest);
                let (index, text) = split_word(rest);
                Command::Item {
                    field: required(field, "item", "a field name")?,
                    index: parse_index(index, "item")?,
                    text: text.to_string(),
                }
            }
            "remove" => {
                let (field, index) = split_word(rest);
                Command::Remove {
                    field: required(field, "remove", "a field name")?,
                    index: parse_index(index, "remove")?,
                }
            }
            "example" => Command::Example,
            "clear" => Command::Clear,
            "export" => Command::Export(optional_path(rest)),
            "import" => Command::Import(PathBuf::from(required_rest(rest, "import", "a file path")?)),
            "print" => Command::Print(optional_path(rest)),
            "help" | "?" => Command::Help,
            "quit" | "exit" => Command::Quit,
            other => return Err(CommandError::Unknown(other.to_string())),
        };
        Ok(Some(command))
    }
}

/// First whitespace-separated word and the trimmed remainder
fn split_word(s: &str) -> (&str, &str) {
    let s = s.trim_start();
    match s.split_once(char::is_whitespace) {
        Some((word, rest)) => (word, rest.trim_start()),
        None => (s, ""),
    }
}

fn required(s: &str, command: &'static str, argument: &'static str) -> Result<String, CommandError> {
    let (word, _) = split_word(s);
    if word.is_empty() {
        return Err(CommandError::MissingArgument { command, argument });
    }
    Ok(word.to_string())
}

fn required_rest(s: &str, command: &'static str, argument: &'static str) -> Result<String, CommandError> {
    let s = s.trim();
    if s.is_empty() {
        return Err(CommandError::MissingArgument { command, argument });
    }
    Ok(s.to_string())
}

fn optional_path(s: &str) -> Option<PathBuf> {
    let s = s.trim();
    (!s.is_empty()).then(|| PathBuf::from(s))
}

fn parse_index(s: &str, command: &'static str) -> Result<usize, CommandError> {
    if s.is_empty() {
        return Err(CommandError::MissingArgument {
            command,
            argument: "an item index",
        });
    }
    s.parse().map_err(|_| CommandError::InvalidIndex(s.to_string()))
}

/// Whether the shell should keep reading input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

pub struct Shell<S: KeyValueStore> {
    workbench: Workbench<S>,
}

impl<S: KeyValueStore> Shell<S> {
    pub fn new(workbench: Workbench<S>) -> Self {
        Self { workbench }
    }

    pub fn workbench(&self) -> &Workbench<S> {
        &self.workbench
    }

    /// Startup banner: the template and, when pending, the saved documents.
    pub fn greet(&self, out: &mut impl Write) -> Result<()> {
        writeln!(out, "{}", self.workbench.template().label)?;
        if self.workbench.is_pending() {
            writeln!(
                out,
                "Found {} saved document(s):",
                self.workbench.startup().documents_found
            )?;
            self.write_pending(out)?;
            writeln!(out, "Use `restore <id>`, `fresh` or `discard`.")?;
        } else {
            writeln!(out, "Editing a new document. Type `help` for commands.")?;
        }
        Ok(())
    }

    /// Parse and run one line. Parse errors are reported to `out`.
    pub fn run_line(&mut self, line: &str, out: &mut impl Write) -> Result<Flow> {
        match Command::parse(line) {
            Ok(Some(command)) => self.execute(command, out),
            Ok(None) => Ok(Flow::Continue),
            Err(e) => {
                writeln!(out, "{}", e)?;
                Ok(Flow::Continue)
            }
        }
    }

    pub fn execute(&mut self, command: Command, out: &mut impl Write) -> Result<Flow> {
        debug!("Executing {:?}", command);
        match command {
            Command::List => self.write_list(out)?,
            Command::Pending => {
                if self.workbench.is_pending() {
                    self.write_pending(out)?;
                } else {
                    writeln!(out, "No restore decision pending")?;
                }
            }
            Command::Restore(id) => {
                if self.workbench.restore_document(&id) {
                    writeln!(out, "Restored {} ({})", id, self.workbench.active_title())?;
                } else {
                    writeln!(out, "Nothing to restore with id {}", id)?;
                }
            }
            Command::Fresh => {
                if self.workbench.start_fresh() {
                    writeln!(out, "Started {}; saved documents kept", self.workbench.active_id())?;
                } else {
                    writeln!(out, "No restore decision pending")?;
                }
            }
            Command::Discard => {
                if self.workbench.discard_all()? {
                    writeln!(out, "Discarded saved documents")?;
                } else {
                    writeln!(out, "No restore decision pending")?;
                }
            }
            Command::New => {
                let id = self.workbench.create_new();
                writeln!(out, "New document {}", id)?;
            }
            Command::Select(id) => {
                if self.workbench.switch_to(&id) {
                    writeln!(out, "Editing {} ({})", id, self.workbench.active_title())?;
                } else if self.workbench.active_id().as_str() == id {
                    writeln!(out, "Already editing {}", id)?;
                } else {
                    writeln!(out, "No saved document {}", id)?;
                }
            }
            Command::Delete(id) => {
                if self.workbench.delete(&id)? {
                    writeln!(out, "Deleted {}", id)?;
                } else if self.workbench.is_pending() {
                    writeln!(out, "Decide on the saved documents first")?;
                } else {
                    writeln!(out, "No saved document {}", id)?;
                }
            }
            Command::DeleteAll => {
                if self.workbench.delete_all()? {
                    writeln!(out, "Deleted every document; editing {}", self.workbench.active_id())?;
                } else {
                    writeln!(out, "Decide on the saved documents first")?;
                }
            }
            Command::Show => self.write_snapshot(out)?,
            Command::Set { field, text } => {
                let spec = self.field(&field)?;
                match spec.shape {
                    FieldShape::Text => self.workbench.mutate(spec.key, text)?,
                    FieldShape::List => self.workbench.mutate(spec.key, FieldValue::list([text]))?,
                }
                self.write_saved(out)?;
            }
            Command::Add { field } => {
                let spec = self.list_field(&field)?;
                if self.workbench.add_item(spec.key)? {
                    self.write_saved(out)?;
                } else {
                    writeln!(out, "{} does not hold a list", spec.label)?;
                }
            }
            Command::Item { field, index, text } => {
                let spec = self.list_field(&field)?;
                if self.workbench.set_item(spec.key, index, &text)? {
                    self.write_saved(out)?;
                } else {
                    writeln!(out, "{} has no item {}", spec.label, index)?;
                }
            }
            Command::Remove { field, index } => {
                let spec = self.list_field(&field)?;
                if self.workbench.remove_item(spec.key, index)? {
                    self.write_saved(out)?;
                } else {
                    writeln!(out, "{} has no item {}", spec.label, index)?;
                }
            }
            Command::Example => {
                self.workbench.load_example()?;
                self.write_saved(out)?;
            }
            Command::Clear => {
                self.workbench.clear()?;
                self.write_saved(out)?;
            }
            Command::Export(path) => {
                let json = self.workbench.export_json()?;
                match path {
                    Some(path) => {
                        fs::write(&path, json)
                            .with_context(|| format!("Failed to write {}", path.display()))?;
                        info!("Exported {} to {}", self.workbench.active_id(), path.display());
                        writeln!(out, "Exported to {}", path.display())?;
                    }
                    None => writeln!(out, "{}", json)?,
                }
            }
            Command::Import(path) => {
                let text = fs::read_to_string(&path)
                    .with_context(|| format!("Failed to read {}", path.display()))?;
                self.workbench.import_json(&text)?;
                writeln!(out, "Imported {}", path.display())?;
                self.write_saved(out)?;
            }
            Command::Print(path) => {
                let text = self.workbench.printable();
                match path {
                    Some(path) => {
                        fs::write(&path, text)
                            .with_context(|| format!("Failed to write {}", path.display()))?;
                        writeln!(out, "Printed to {}", path.display())?;
                    }
                    None => write!(out, "{}", text)?,
                }
            }
            Command::Help => write!(out, "{}", HELP)?,
            Command::Quit => return Ok(Flow::Quit),
        }
        Ok(Flow::Continue)
    }

    fn field(&self, key: &str) -> Result<&'static FieldSpec> {
        let template = self.workbench.template();
        match template.field(key) {
            Some(spec) => Ok(spec),
            None => {
                let known: Vec<&str> = template.fields.iter().map(|f| f.key).collect();
                bail!("Unknown field {} (fields: {})", key, known.join(", "))
            }
        }
    }

    fn list_field(&self, key: &str) -> Result<&'static FieldSpec> {
        let spec = self.field(key)?;
        if spec.shape != FieldShape::List {
            bail!("{} is a text field; use `set`", spec.key);
        }
        Ok(spec)
    }

    fn write_saved(&self, out: &mut impl Write) -> Result<()> {
        if self.workbench.is_pending() {
            writeln!(out, "Not saved until you restore, start fresh or discard")?;
        }
        Ok(())
    }

    fn write_list(&self, out: &mut impl Write) -> Result<()> {
        if self.workbench.is_pending() {
            writeln!(out, "Restore pending; see `pending`")?;
            return Ok(());
        }
        let documents = self.workbench.documents();
        if documents.is_empty() {
            writeln!(out, "No saved documents")?;
        }
        for doc in documents {
            let marker = if doc.active { '*' } else { ' ' };
            writeln!(out, "{} {}  {}  (updated {})", marker, doc.id, doc.title, doc.updated_at)?;
        }
        Ok(())
    }

    fn write_pending(&self, out: &mut impl Write) -> Result<()> {
        for doc in self.workbench.pending_documents() {
            writeln!(out, "  {}  {}  (updated {})", doc.id, doc.title, doc.updated_at)?;
        }
        Ok(())
    }

    fn write_snapshot(&self, out: &mut impl Write) -> Result<()> {
        let workbench = &self.workbench;
        let saved = workbench.document_set().contains(workbench.active_id().as_str());
        writeln!(
            out,
            "{} [{}]{}",
            workbench.active_title(),
            workbench.active_id(),
            if saved { "" } else { " (unsaved)" }
        )?;

        let snapshot = workbench.snapshot();
        for spec in workbench.template().fields {
            writeln!(out, "{} ({}):", spec.label, spec.key)?;
            match snapshot.get(spec.key) {
                Some(FieldValue::Text(text)) => {
                    for line in text.lines() {
                        writeln!(out, "  {}", line)?;
                    }
                }
                Some(FieldValue::List(items)) => {
                    for (i, item) in items.iter().enumerate() {
                        writeln!(out, "  [{}] {}", i, item)?;
                    }
                }
                Some(FieldValue::Other(value)) => writeln!(out, "  {}", value)?,
                None => {}
            }
        }
        Ok(())
    }
}
