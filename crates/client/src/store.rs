//! Key-value persistence for POS settings.
//!
//! The only durable setting is the configured product feed URL, stored
//! under [`PRODUCT_URL_KEY`]. The catalog itself is not persisted; it is
//! re-fetched on demand after a restart.

use std::collections::BTreeMap;
use std::fs;
use std::io::ErrorKind;
use std::path::PathBuf;

use parking_lot::Mutex;

use crate::error::StoreError;

/// Store key holding the configured product feed URL.
pub const PRODUCT_URL_KEY: &str = "productUrl";

/// Durable string-to-string settings storage.
pub trait KeyValueStore {
    /// Read the value stored under `key`, if any.
    ///
    /// # Errors
    ///
    /// Returns a [`StoreError`] if the backing storage cannot be read.
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;

    /// Store `value` under `key`, replacing any previous value.
    ///
    /// # Errors
    ///
    /// Returns a [`StoreError`] if the backing storage cannot be written.
    fn set(&self, key: &str, value: &str) -> Result<(), StoreError>;
}

/// File-backed [`KeyValueStore`]: one JSON object on disk.
///
/// Writes go through a temp file followed by a rename, so a crash mid-write
/// leaves the previous state file intact.
#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl JsonFileStore {
    /// Create a store backed by the JSON file at `path`.
    ///
    /// The file (and its parent directory) is created on first write; a
    /// missing file reads as empty.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    fn read_entries(&self) -> Result<BTreeMap<String, String>, StoreError> {
        match fs::read_to_string(&self.path) {
            Ok(contents) => Ok(serde_json::from_str(&contents)?),
            Err(error) if error.kind() == ErrorKind::NotFound => Ok(BTreeMap::new()),
            Err(error) => Err(error.into()),
        }
    }
}

impl KeyValueStore for JsonFileStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let _guard = self.write_lock.lock();
        let mut entries = self.read_entries()?;
        Ok(entries.remove(key))
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let _guard = self.write_lock.lock();
        let mut entries = self.read_entries()?;
        entries.insert(key.to_owned(), value.to_owned());
        let json = serde_json::to_string_pretty(&entries)?;

        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent)?;
        }
        let tmp = self.path.with_extension("tmp");
        fs::write(&tmp, json)?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}

/// In-memory [`KeyValueStore`] for tests and ephemeral hosts.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<BTreeMap<String, String>>,
}

impl MemoryStore {
    /// Create an empty in-memory store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store pre-populated with one entry.
    #[must_use]
    pub fn with_entry(key: &str, value: &str) -> Self {
        let store = Self::new();
        store
            .entries
            .lock()
            .insert(key.to_owned(), value.to_owned());
        store
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.entries.lock().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        self.entries.lock().insert(key.to_owned(), value.to_owned());
        Ok(())
    }
}
