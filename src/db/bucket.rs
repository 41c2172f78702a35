//! Key-value bucket standing in for browser local storage.
//!
//! Values are JSON strings keyed by fixed bucket keys. Nothing here is
//! authenticated or encrypted: any holder of the bucket can read or
//! rewrite every record.

use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};

use super::DatabaseError;
use crate::config::{self, Settings, StorageBackend};

/// String-to-string storage with local-storage semantics.
pub trait KeyValueStore: Send + Sync {
    fn get_item(&self, key: &str) -> Result<Option<String>, DatabaseError>;
    fn set_item(&self, key: &str, value: &str) -> Result<(), DatabaseError>;
    fn remove_item(&self, key: &str) -> Result<(), DatabaseError>;
}

// ═══════════════════════════════════════════════════════════
// In-memory bucket
// ═══════════════════════════════════════════════════════════

/// Process-local bucket. Contents vanish on restart.
#[derive(Default)]
pub struct MemoryBucket {
    items: RwLock<HashMap<String, String>>,
}

impl MemoryBucket {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryBucket {
    fn get_item(&self, key: &str) -> Result<Option<String>, DatabaseError> {
        let items = self.items.read().map_err(|_| DatabaseError::LockPoisoned)?;
        Ok(items.get(key).cloned())
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), DatabaseError> {
        let mut items = self.items.write().map_err(|_| DatabaseError::LockPoisoned)?;
        items.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove_item(&self, key: &str) -> Result<(), DatabaseError> {
        let mut items = self.items.write().map_err(|_| DatabaseError::LockPoisoned)?;
        items.remove(key);
        Ok(())
    }
}

// ═══════════════════════════════════════════════════════════
// File bucket
// ═══════════════════════════════════════════════════════════

/// Bucket mirrored to a single JSON object on disk.
///
/// The whole map is rewritten on every change. There is no locking
/// across processes and no crash-safety beyond write-then-rename.
pub struct FileBucket {
    path: PathBuf,
    items: RwLock<BTreeMap<String, String>>,
}

impl FileBucket {
    /// Open the bucket at `path`, creating parent directories as needed.
    /// A missing file starts an empty bucket.
    pub fn open(path: &Path) -> Result<Self, DatabaseError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let items = if path.exists() {
            let raw = std::fs::read_to_string(path)?;
            if raw.trim().is_empty() {
                BTreeMap::new()
            } else {
                serde_json::from_str(&raw)?
            }
        } else {
            BTreeMap::new()
        };

        tracing::info!(path = %path.display(), keys = items.len(), "Opened storage bucket");

        Ok(Self {
            path: path.to_path_buf(),
            items: RwLock::new(items),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn flush(&self, items: &BTreeMap<String, String>) -> Result<(), DatabaseError> {
        let json = serde_json::to_string_pretty(items)?;
        let tmp = self.path.with_extension("json.tmp");
        std::fs::write(&tmp, json)?;
        std::fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}

impl KeyValueStore for FileBucket {
    fn get_item(&self, key: &str) -> Result<Option<String>, DatabaseError> {
        let items = self.items.read().map_err(|_| DatabaseError::LockPoisoned)?;
        Ok(items.get(key).cloned())
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), DatabaseError> {
        let mut items = self.items.write().map_err(|_| DatabaseError::LockPoisoned)?;
        items.insert(key.to_string(), value.to_string());
        self.flush(&items)
    }

    fn remove_item(&self, key: &str) -> Result<(), DatabaseError> {
        let mut items = self.items.write().map_err(|_| DatabaseError::LockPoisoned)?;
        if items.remove(key).is_some() {
            self.flush(&items)?;
        }
        Ok(())
    }
}

/// Open the bucket selected by the settings.
pub fn open_bucket(settings: &Settings) -> Result<Arc<dyn KeyValueStore>, DatabaseError> {
    match settings.storage {
        StorageBackend::Memory => {
            tracing::warn!("Using in-memory storage; data is lost on restart");
            Ok(Arc::new(MemoryBucket::new()))
        }
        StorageBackend::File => Ok(Arc::new(FileBucket::open(&config::bucket_file(
            &settings.data_dir,
        ))?)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_bucket_get_set_remove() {
        let bucket = MemoryBucket::new();
        assert_eq!(bucket.get_item("k").unwrap(), None);

        bucket.set_item("k", "[1,2]").unwrap();
        assert_eq!(bucket.get_item("k").unwrap().as_deref(), Some("[1,2]"));

        bucket.remove_item("k").unwrap();
        assert_eq!(bucket.get_item("k").unwrap(), None);
    }

    #[test]
    fn removing_missing_key_is_noop() {
        let bucket = MemoryBucket::new();
        bucket.remove_item("absent").unwrap();
    }

    #[test]
    fn file_bucket_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("storage.json");

        {
            let bucket = FileBucket::open(&path).unwrap();
            bucket.set_item("users", "[]").unwrap();
            bucket.set_item("session", "null").unwrap();
            bucket.remove_item("session").unwrap();
        }

        let reopened = FileBucket::open(&path).unwrap();
        assert_eq!(reopened.get_item("users").unwrap().as_deref(), Some("[]"));
        assert_eq!(reopened.get_item("session").unwrap(), None);
        assert_eq!(reopened.path(), path.as_path());
    }

    #[test]
    fn file_bucket_rejects_corrupt_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("storage.json");
        std::fs::write(&path, "not json").unwrap();

        let result = FileBucket::open(&path);
        assert!(matches!(result, Err(DatabaseError::Serialization(_))));
    }

    #[test]
    fn file_bucket_treats_empty_file_as_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("storage.json");
        std::fs::write(&path, "").unwrap();

        let bucket = FileBucket::open(&path).unwrap();
        assert_eq!(bucket.get_item("anything").unwrap(), None);
    }
}
