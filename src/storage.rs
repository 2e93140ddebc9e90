//!
//! custodia storage module
//! -----------------------
//! Key-value boundary between the authentication core and whatever medium
//! actually holds credential and session records. The core never opens a
//! backing file itself: the credential store and session manager receive a
//! `SharedStore` handle at construction, so the medium is pluggable per
//! deployment (in-memory for tests, a single JSON file for embedded use, or
//! a caller-provided implementation over an external database).
//!
//! Key responsibilities:
//! - `KeyValueStore`: the minimal get/put/delete contract.
//! - `MemoryStore`: ephemeral map behind a `parking_lot::RwLock`.
//! - `FileStore`: write-through single-file JSON store persisted via a
//!   temp-file rename so readers never observe a torn write.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use parking_lot::RwLock;
use tracing::debug;

/// Thread-safe handle shared by the credential store and session manager.
pub type SharedStore = Arc<dyn KeyValueStore>;

/// Minimal storage contract. `delete` reports whether a value was present so
/// callers can decide between success and `NotFound` in their own taxonomy.
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>>;
    fn put(&self, key: &str, value: &[u8]) -> Result<()>;
    fn delete(&self, key: &str) -> Result<bool>;
}

/// Ephemeral in-memory store. Reads run concurrently; writes are exclusive,
/// so a reader never sees a partially written record.
#[derive(Default)]
pub struct MemoryStore {
    map: RwLock<HashMap<String, Vec<u8>>>,
}

impl MemoryStore {
    pub fn new() -> Self { Self::default() }

    pub fn shared() -> SharedStore { Arc::new(Self::new()) }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        Ok(self.map.read().get(key).cloned())
    }

    fn put(&self, key: &str, value: &[u8]) -> Result<()> {
        self.map.write().insert(key.to_string(), value.to_vec());
        Ok(())
    }

    fn delete(&self, key: &str) -> Result<bool> {
        Ok(self.map.write().remove(key).is_some())
    }
}

/// Write-through single-file JSON store.
///
/// The whole keyspace lives in one file that is rewritten on every mutation.
/// Persistence happens under the write lock, which also serializes mutations
/// from concurrent callers.
pub struct FileStore {
    path: PathBuf,
    map: RwLock<HashMap<String, Vec<u8>>>,
}

impl FileStore {
    /// Open (or lazily create on first write) the store file at `path`.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let map = if path.exists() {
            let raw = fs::read(&path)
                .with_context(|| format!("read store file '{}'", path.display()))?;
            if raw.is_empty() {
                HashMap::new()
            } else {
                serde_json::from_slice(&raw)
                    .with_context(|| format!("parse store file '{}'", path.display()))?
            }
        } else {
            HashMap::new()
        };
        Ok(Self { path, map: RwLock::new(map) })
    }

    pub fn shared<P: AsRef<Path>>(path: P) -> Result<SharedStore> {
        Ok(Arc::new(Self::open(path)?))
    }

    pub fn path(&self) -> &PathBuf { &self.path }

    fn persist(&self, map: &HashMap<String, Vec<u8>>) -> Result<()> {
        if let Some(dir) = self.path.parent() {
            fs::create_dir_all(dir).ok();
        }
        let tmp = self.path.with_extension("tmp");
        let body = serde_json::to_vec(map).context("serialize store")?;
        fs::write(&tmp, body)
            .with_context(|| format!("write store file '{}'", tmp.display()))?;
        fs::rename(&tmp, &self.path)
            .with_context(|| format!("replace store file '{}'", self.path.display()))?;
        debug!(target: "custodia::storage", "persisted {} keys to '{}'", map.len(), self.path.display());
        Ok(())
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        Ok(self.map.read().get(key).cloned())
    }

    fn put(&self, key: &str, value: &[u8]) -> Result<()> {
        // Persist a staged copy first: a record only becomes visible to
        // readers once it is on disk, so a failed write leaves no phantom.
        let mut map = self.map.write();
        let mut staged = map.clone();
        staged.insert(key.to_string(), value.to_vec());
        self.persist(&staged)?;
        *map = staged;
        Ok(())
    }

    fn delete(&self, key: &str) -> Result<bool> {
        let mut map = self.map.write();
        if !map.contains_key(key) {
            return Ok(false);
        }
        let mut staged = map.clone();
        staged.remove(key);
        self.persist(&staged)?;
        *map = staged;
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_store_roundtrip() {
        let store = MemoryStore::new();
        assert!(store.get("k").unwrap().is_none());
        store.put("k", b"v").unwrap();
        assert_eq!(store.get("k").unwrap().as_deref(), Some(&b"v"[..]));
        assert!(store.delete("k").unwrap());
        assert!(!store.delete("k").unwrap());
        assert!(store.get("k").unwrap().is_none());
    }

    #[test]
    fn file_store_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("auth.json");
        {
            let store = FileStore::open(&path).unwrap();
            store.put("cred/alice", b"{}").unwrap();
        }
        let store = FileStore::open(&path).unwrap();
        assert_eq!(store.get("cred/alice").unwrap().as_deref(), Some(&b"{}"[..]));
    }

    #[test]
    fn failed_persist_leaves_no_phantom_record() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("auth.json");
        let store = FileStore::open(&path).unwrap();
        store.put("cred/alice", b"{}").unwrap();

        // Occupy the temp path with a directory so the next persist fails
        fs::create_dir(path.with_extension("tmp")).unwrap();

        // A failed put must not leave the record observable to readers
        assert!(store.put("cred/bob", b"{}").is_err());
        assert!(store.get("cred/bob").unwrap().is_none());

        // A failed delete must keep the record observable
        assert!(store.delete("cred/alice").is_err());
        assert_eq!(store.get("cred/alice").unwrap().as_deref(), Some(&b"{}"[..]));
    }

    #[test]
    fn file_store_delete_persists() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("auth.json");
        {
            let store = FileStore::open(&path).unwrap();
            store.put("sess/a", b"1").unwrap();
            assert!(store.delete("sess/a").unwrap());
        }
        let store = FileStore::open(&path).unwrap();
        assert!(store.get("sess/a").unwrap().is_none());
    }
}
