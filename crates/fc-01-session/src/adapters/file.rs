//! File-backed client storage.
//!
//! Values live in one JSON object on disk. The file is re-read on every
//! access so a logout performed by another process is observed immediately.
//!
//! Writes go to a temporary file in the same directory which is synced and
//! then renamed over the store, so a concurrent reader sees either the old or
//! the new contents, never a truncated file.

use crate::ports::ClientStorage;
use parking_lot::Mutex;
use std::collections::BTreeMap;
use std::fs;
use std::io::{self, ErrorKind, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::{debug, warn};

/// File name used inside a data directory.
pub const STORAGE_FILE_NAME: &str = "client-storage.json";

/// Client storage persisted as a JSON file.
#[derive(Debug)]
pub struct FileClientStorage {
    path: PathBuf,
    /// Serializes read-modify-write cycles within this process.
    write_lock: Mutex<()>,
}

impl FileClientStorage {
    /// Store values in the file at `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    /// Store values in [`STORAGE_FILE_NAME`] under `data_dir`.
    pub fn in_dir(data_dir: impl AsRef<Path>) -> Self {
        Self::new(data_dir.as_ref().join(STORAGE_FILE_NAME))
    }

    /// Path of the backing file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load(&self) -> BTreeMap<String, String> {
        let text = match fs::read_to_string(&self.path) {
            Ok(text) => text,
            Err(e) if e.kind() == ErrorKind::NotFound => return BTreeMap::new(),
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "Client storage unreadable, treating as empty");
                return BTreeMap::new();
            }
        };

        match serde_json::from_str(&text) {
            Ok(items) => items,
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "Client storage corrupt, treating as empty");
                BTreeMap::new()
            }
        }
    }

    fn save(&self, items: &BTreeMap<String, String>) {
        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        if let Err(e) = fs::create_dir_all(dir) {
            warn!(path = %dir.display(), error = %e, "Failed to create storage directory");
            return;
        }

        let text = match serde_json::to_string_pretty(items) {
            Ok(text) => text,
            Err(e) => {
                warn!(error = %e, "Failed to serialize client storage");
                return;
            }
        };

        if let Err(e) = self.replace_atomically(dir, text.as_bytes()) {
            warn!(path = %self.path.display(), error = %e, "Failed to write client storage");
        }
    }

    fn replace_atomically(&self, dir: &Path, bytes: &[u8]) -> io::Result<()> {
        let mut temp = NamedTempFile::new_in(dir)?;
        temp.write_all(bytes)?;
        temp.as_file().sync_all()?;
        temp.persist(&self.path).map_err(|e| e.error)?;
        Ok(())
    }
}

impl ClientStorage for FileClientStorage {
    fn get_item(&self, key: &str) -> Option<String> {
        self.load().remove(key)
    }

    fn set_item(&self, key: &str, value: &str) {
        let _guard = self.write_lock.lock();
        let mut items = self.load();
        items.insert(key.to_string(), value.to_string());
        self.save(&items);
    }

    fn remove_item(&self, key: &str) {
        let _guard = self.write_lock.lock();
        let mut items = self.load();
        if items.remove(key).is_some() {
            self.save(&items);
        }
    }

    fn clear(&self) {
        let _guard = self.write_lock.lock();
        match fs::remove_file(&self.path) {
            Ok(()) => debug!(path = %self.path.display(), "Client storage cleared"),
            Err(e) if e.kind() == ErrorKind::NotFound => {}
            Err(e) => warn!(path = %self.path.display(), error = %e, "Failed to clear client storage"),
        }
    }
}
