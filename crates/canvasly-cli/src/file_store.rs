//! JSON-file key-value store for the terminal host.
//!
//! Every key lives in one JSON object on disk (`{"<key>": "<value>", ...}`),
//! mirroring how the browser host keeps strings in `localStorage`. The file
//! is the only copy: reads go to disk, and each change re-reads the file,
//! applies its one key and rewrites it. Several sessions, one per template,
//! can share a file without erasing each other's keys.

use canvasly_core::storage::{KeyValueStore, Result, StorageError};
use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::RwLock;
use tracing::debug;

type Entries = BTreeMap<String, String>;

pub struct JsonFileStore {
    path: PathBuf,
    /// Serializes read-modify-write cycles within this process
    lock: RwLock<()>,
}

impl JsonFileStore {
    /// Open the store at `path`. A missing file is an empty store; an
    /// unparseable one is an error.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let store = Self {
            path: path.into(),
            lock: RwLock::new(()),
        };
        let entries = store.read_entries()?;
        debug!("Opened {} with {} key(s)", store.path.display(), entries.len());
        Ok(store)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Current contents of the file
    fn read_entries(&self) -> Result<Entries> {
        let contents = match fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Entries::new()),
            Err(e) => return Err(io_err(e)),
        };
        if contents.trim().is_empty() {
            return Ok(Entries::new());
        }
        serde_json::from_str(&contents)
            .map_err(|e| StorageError::Encoding(format!("{}: {}", self.path.display(), e)))
    }

    /// Write `entries` to a sibling temp file, then rename it over the store.
    fn flush(&self, entries: &Entries) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(io_err)?;
        }

        let contents = serde_json::to_string_pretty(entries)
            .map_err(|e| StorageError::Encoding(e.to_string()))?;
        let tmp = self.path.with_extension("tmp");
        fs::write(&tmp, contents).map_err(|e| {
            let _ = fs::remove_file(&tmp);
            io_err(e)
        })?;
        fs::rename(&tmp, &self.path).map_err(|e| {
            let _ = fs::remove_file(&tmp);
            io_err(e)
        })
    }

    /// Re-read the file, apply `change` and write it back. Nothing is written
    /// when `change` reports no difference.
    fn update(&self, change: impl FnOnce(&mut Entries) -> bool) -> Result<()> {
        let _guard = self.lock.write().unwrap_or_else(|e| e.into_inner());
        let mut entries = self.read_entries()?;
        if !change(&mut entries) {
            return Ok(());
        }
        self.flush(&entries)
    }
}

impl KeyValueStore for JsonFileStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let _guard = self.lock.read().unwrap_or_else(|e| e.into_inner());
        Ok(self.read_entries()?.remove(key))
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        self.update(|entries| {
            entries.insert(key.to_string(), value.to_string());
            true
        })
    }

    fn delete(&self, key: &str) -> Result<()> {
        self.update(|entries| entries.remove(key).is_some())
    }
}

fn io_err(e: io::Error) -> StorageError {
    match e.kind() {
        io::ErrorKind::StorageFull => StorageError::QuotaExceeded(e.to_string()),
        _ => StorageError::Io(e.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_missing_file_is_empty() {
        let dir = TempDir::new().unwrap();
        let store = JsonFileStore::open(dir.path().join("store.json")).unwrap();

        assert_eq!(store.get("anything").unwrap(), None);
        assert!(!store.path().exists());
    }

    #[test]
    fn test_values_survive_reopen() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested/store.json");

        {
            let store = JsonFileStore::open(&path).unwrap();
            store.set("a", "{\"x\":1}").unwrap();
            store.set("b", "plain").unwrap();
            store.delete("b").unwrap();
        }

        let store = JsonFileStore::open(&path).unwrap();
        assert_eq!(store.get("a").unwrap().as_deref(), Some("{\"x\":1}"));
        assert_eq!(store.get("b").unwrap(), None);

        let on_disk: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(on_disk, serde_json::json!({"a": "{\"x\":1}"}));
    }

    #[test]
    fn test_delete_missing_key_does_not_create_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("store.json");
        let store = JsonFileStore::open(&path).unwrap();

        store.delete("nothing").unwrap();
        assert!(!path.exists());
    }

    #[test]
    fn test_corrupt_file_is_an_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("store.json");
        fs::write(&path, "not json").unwrap();

        assert!(matches!(
            JsonFileStore::open(&path),
            Err(StorageError::Encoding(_))
        ));
    }

    #[test]
    fn test_failed_write_keeps_previous_value() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("store.json");
        let store = JsonFileStore::open(&path).unwrap();
        store.set("k", "before").unwrap();

        // A directory where the temp file goes makes the write fail
        fs::create_dir(dir.path().join("store.tmp")).unwrap();
        assert!(store.set("k", "after").is_err());
        assert_eq!(store.get("k").unwrap().as_deref(), Some("before"));
    }

    #[test]
    fn test_failed_rename_removes_temp_file() {
        let dir = TempDir::new().unwrap();
        // A directory where the store file should be makes the rename fail
        let path = dir.path().join("store.json");
        fs::create_dir(&path).unwrap();
        fs::write(path.join("occupied"), "").unwrap();
        let store = JsonFileStore {
            path: path.clone(),
            lock: RwLock::new(()),
        };

        let entries = Entries::from([("k".to_string(), "v".to_string())]);
        assert!(store.flush(&entries).is_err());

        let mut names: Vec<_> = fs::read_dir(dir.path())
            .unwrap()
            .map(|entry| entry.unwrap().file_name().into_string().unwrap())
            .collect();
        names.sort();
        assert_eq!(names, ["store.json"]);
    }

    #[test]
    fn test_handles_on_one_file_keep_each_others_keys() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("store.json");
        let first = JsonFileStore::open(&path).unwrap();
        let second = JsonFileStore::open(&path).unwrap();

        first.set("canvasly-bmc-documents", "bmc").unwrap();
        second.set("canvasly-fpr-documents", "fpr").unwrap();
        assert_eq!(
            first.get("canvasly-fpr-documents").unwrap().as_deref(),
            Some("fpr")
        );

        first.delete("canvasly-bmc-documents").unwrap();
        second.set("canvasly-bmc-documents", "bmc again").unwrap();
        first.set("canvasly-fpr-documents", "fpr again").unwrap();

        let reopened = JsonFileStore::open(&path).unwrap();
        assert_eq!(
            reopened.get("canvasly-bmc-documents").unwrap().as_deref(),
            Some("bmc again")
        );
        assert_eq!(
            reopened.get("canvasly-fpr-documents").unwrap().as_deref(),
            Some("fpr again")
        );
    }
}
