//! Key-value backends for session persistence.
//!
//! The store only needs string get/set/del per key; `MemoryKv` backs
//! tests and `FileKv` persists the map as a JSON file under the
//! configured state path, written through on every mutation.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use parking_lot::RwLock;

use tb_domain::error::{Error, Result};

/// Minimal per-key string storage.  Each key belongs to exactly one
/// session, so no cross-key atomicity is offered.
pub trait KvStore: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&self, key: &str, value: &str) -> Result<()>;
    fn del(&self, key: &str) -> Result<()>;
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// In-memory backend
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// HashMap-backed store for tests and ephemeral runs.
#[derive(Default)]
pub struct MemoryKv {
    map: RwLock<HashMap<String, String>>,
}

impl MemoryKv {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KvStore for MemoryKv {
    fn get(&self, key: &str) -> Option<String> {
        self.map.read().get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        self.map.write().insert(key.to_owned(), value.to_owned());
        Ok(())
    }

    fn del(&self, key: &str) -> Result<()> {
        self.map.write().remove(key);
        Ok(())
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// File-backed backend
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// JSON-file-backed store at `state_path/sessions/kv.json`.
///
/// The whole map lives in memory behind a lock; mutations rewrite the
/// file before releasing it.  Durability is whatever the filesystem
/// gives us; the store contract promises nothing stronger.
#[derive(Debug)]
pub struct FileKv {
    path: PathBuf,
    map: RwLock<HashMap<String, String>>,
}

impl FileKv {
    /// Load or create the store at `state_path/sessions/kv.json`.
    pub fn new(state_path: &Path) -> Result<Self> {
        let dir = state_path.join("sessions");
        std::fs::create_dir_all(&dir).map_err(|e| storage_err(&dir, e))?;

        let path = dir.join("kv.json");
        let map = if path.exists() {
            let raw = std::fs::read_to_string(&path).map_err(|e| storage_err(&path, e))?;
            // A corrupt file must not kill startup; start empty and warn.
            serde_json::from_str(&raw).unwrap_or_else(|e| {
                tracing::warn!(path = %path.display(), error = %e, "kv file corrupt, starting empty");
                HashMap::new()
            })
        } else {
            HashMap::new()
        };

        tracing::info!(keys = map.len(), path = %path.display(), "session kv loaded");

        Ok(Self {
            path,
            map: RwLock::new(map),
        })
    }

    fn persist(&self, map: &HashMap<String, String>) -> Result<()> {
        let json = serde_json::to_string_pretty(map)?;
        std::fs::write(&self.path, json).map_err(|e| storage_err(&self.path, e))
    }
}

impl KvStore for FileKv {
    fn get(&self, key: &str) -> Option<String> {
        self.map.read().get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let mut map = self.map.write();
        map.insert(key.to_owned(), value.to_owned());
        self.persist(&map)
    }

    fn del(&self, key: &str) -> Result<()> {
        let mut map = self.map.write();
        if map.remove(key).is_some() {
            self.persist(&map)?;
        }
        Ok(())
    }
}

fn storage_err(path: &Path, e: std::io::Error) -> Error {
    Error::Storage(format!("{}: {e}", path.display()))
}
