//! Key-value storage capability behind position persistence.
//!
//! Mirrors the `localStorage` surface the panel needs: string keys, string
//! values, last writer wins.

use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};

/// Failure inside a storage backend.
#[derive(Debug, Clone)]
pub struct StorageError {
    pub message: String,
}

impl std::fmt::Display for StorageError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for StorageError {}

pub trait KeyValueStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError>;
    fn set_item(&mut self, key: &str, value: &str) -> Result<(), StorageError>;
    fn remove_item(&mut self, key: &str) -> Result<(), StorageError>;
}

/// Process-local storage. Nothing survives the process.
#[derive(Debug, Default, Clone)]
pub struct MemoryStorage {
    items: HashMap<String, String>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStorage for MemoryStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.items.get(key).cloned())
    }

    fn set_item(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        self.items.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove_item(&mut self, key: &str) -> Result<(), StorageError> {
        self.items.remove(key);
        Ok(())
    }
}

/// All keys in one JSON object file, re-read on every access so that
/// several processes sharing the file see each other's last write.
#[derive(Debug, Clone)]
pub struct FileStorage {
    path: PathBuf,
}

impl FileStorage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// File contents, `None` when the file does not exist yet.
    fn read_raw(&self) -> Result<Option<String>, StorageError> {
        match std::fs::read_to_string(&self.path) {
            Ok(raw) => Ok(Some(raw)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(StorageError {
                message: format!("read {}: {}", self.path.display(), e),
            }),
        }
    }

    fn decode(&self, raw: &str) -> Result<BTreeMap<String, String>, StorageError> {
        serde_json::from_str(raw).map_err(|e| StorageError {
            message: format!("decode {}: {}", self.path.display(), e),
        })
    }

    fn read_all(&self) -> Result<BTreeMap<String, String>, StorageError> {
        match self.read_raw()? {
            Some(raw) => self.decode(&raw),
            None => Ok(BTreeMap::new()),
        }
    }

    fn write_all(&self, items: &BTreeMap<String, String>) -> Result<(), StorageError> {
        let raw = serde_json::to_string_pretty(items).map_err(|e| StorageError {
            message: format!("encode: {}", e),
        })?;
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| StorageError {
                message: format!("create {}: {}", parent.display(), e),
            })?;
        }
        std::fs::write(&self.path, raw).map_err(|e| StorageError {
            message: format!("write {}: {}", self.path.display(), e),
        })
    }
}

impl KeyValueStorage for FileStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.read_all()?.remove(key))
    }

    fn set_item(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        // Undecodable contents are replaced; a failed read is not.
        let mut items = match self.read_raw()? {
            Some(raw) => self.decode(&raw).unwrap_or_else(|e| {
                log::warn!("Replacing unreadable storage: {}", e);
                BTreeMap::new()
            }),
            None => BTreeMap::new(),
        };
        items.insert(key.to_string(), value.to_string());
        self.write_all(&items)
    }

    fn remove_item(&mut self, key: &str) -> Result<(), StorageError> {
        let mut items = self.read_all()?;
        if items.remove(key).is_some() {
            self.write_all(&items)?;
        }
        Ok(())
    }
}
