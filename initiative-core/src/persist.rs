//! Durable key/value storage for the tracker and the creature catalog.
//!
//! Each entry is a pretty-printed JSON document stored under a short key.
//! The file backend keeps one `<key>.json` per entry in a data directory;
//! the memory backend is used by tests and throwaway sessions.

use serde::de::DeserializeOwned;
use serde::Serialize;
use std::cell::RefCell;
use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info};

/// Storage key for the persisted agent list.
pub const AGENTS_KEY: &str = "agents";

/// Storage key for the persisted creature catalog.
pub const CREATURES_KEY: &str = "creatures";

/// Errors from persistence operations.
#[derive(Debug, Error)]
pub enum PersistError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid storage key: {0:?}")]
    InvalidKey(String),
}

/// A place to keep named text entries between runs.
pub trait Storage {
    /// Read the entry stored under `key`, if any.
    fn read(&self, key: &str) -> Result<Option<String>, PersistError>;

    /// Store `value` under `key`, replacing any previous entry.
    fn write(&self, key: &str, value: &str) -> Result<(), PersistError>;
}

/// Serialize `data` and store it under `key`, overwriting.
pub fn save<T: Serialize + ?Sized>(
    storage: &dyn Storage,
    key: &str,
    data: &T,
) -> Result<(), PersistError> {
    let content = serde_json::to_string_pretty(data)?;
    storage.write(key, &content)?;
    info!(key, bytes = content.len(), "saved entry");
    Ok(())
}

/// Read and deserialize the entry under `key`.
///
/// Returns `Ok(None)` when nothing has been stored yet.
pub fn load<T: DeserializeOwned>(storage: &dyn Storage, key: &str) -> Result<Option<T>, PersistError> {
    match storage.read(key)? {
        Some(content) => {
            let value = serde_json::from_str(&content)?;
            info!(key, "loaded entry");
            Ok(Some(value))
        }
        None => {
            debug!(key, "no stored entry");
            Ok(None)
        }
    }
}

/// Like [`load`], but falls back to `T::default()` when nothing is stored.
pub fn load_or_default<T: DeserializeOwned + Default>(
    storage: &dyn Storage,
    key: &str,
) -> Result<T, PersistError> {
    Ok(load(storage, key)?.unwrap_or_default())
}

fn validate_key(key: &str) -> Result<(), PersistError> {
    let valid = !key.is_empty()
        && key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
    if valid {
        Ok(())
    } else {
        Err(PersistError::InvalidKey(key.to_string()))
    }
}

/// Stores each entry as `<dir>/<key>.json`.
#[derive(Debug, Clone)]
pub struct FileStorage {
    dir: PathBuf,
}

impl FileStorage {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Directory used when none is configured: the platform's local data
    /// directory, or `./initiative-data` if that cannot be determined.
    pub fn default_dir() -> PathBuf {
        dirs::data_local_dir()
            .map(|p| p.join("initiative"))
            .unwrap_or_else(|| PathBuf::from("initiative-data"))
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of the file backing `key`.
    pub fn path_for(&self, key: &str) -> Result<PathBuf, PersistError> {
        validate_key(key)?;
        Ok(self.dir.join(format!("{key}.json")))
    }
}

impl Storage for FileStorage {
    fn read(&self, key: &str) -> Result<Option<String>, PersistError> {
        let path = self.path_for(key)?;
        match fs::read_to_string(&path) {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn write(&self, key: &str, value: &str) -> Result<(), PersistError> {
        let path = self.path_for(key)?;
        fs::create_dir_all(&self.dir)?;
        fs::write(&path, value)?;
        debug!(path = %path.display(), "wrote storage file");
        Ok(())
    }
}

/// Keeps entries in memory for the lifetime of the value.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    entries: RefCell<HashMap<String, String>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether anything is stored under `key`.
    pub fn contains(&self, key: &str) -> bool {
        self.entries.borrow().contains_key(key)
    }
}

impl Storage for MemoryStorage {
    fn read(&self, key: &str) -> Result<Option<String>, PersistError> {
        validate_key(key)?;
        Ok(self.entries.borrow().get(key).cloned())
    }

    fn write(&self, key: &str, value: &str) -> Result<(), PersistError> {
        validate_key(key)?;
        self.entries
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }
}
