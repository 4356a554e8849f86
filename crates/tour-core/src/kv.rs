use crate::error::{Result, TourError};
use crate::io::atomic_write;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// Durable string key-value storage. Values are opaque strings; the typed
/// layout lives in [`crate::persist`].
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>>;
    fn set(&self, key: &str, value: &str) -> Result<()>;
    fn remove(&self, key: &str) -> Result<()>;
    fn keys(&self) -> Result<Vec<String>>;
}

// ---------------------------------------------------------------------------
// MemoryStore
// ---------------------------------------------------------------------------

#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<BTreeMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn entries(&self) -> Result<std::sync::MutexGuard<'_, BTreeMap<String, String>>> {
        self.entries
            .lock()
            .map_err(|_| TourError::Store("memory store lock poisoned".to_string()))
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.entries()?.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        self.entries()?.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        self.entries()?.remove(key);
        Ok(())
    }

    fn keys(&self) -> Result<Vec<String>> {
        Ok(self.entries()?.keys().cloned().collect())
    }
}

// ---------------------------------------------------------------------------
// FileStore
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
struct StoreFile {
    #[serde(default)]
    entries: BTreeMap<String, String>,
    #[serde(default = "Utc::now")]
    last_updated: DateTime<Utc>,
}

/// YAML-file backed store. Every `set`/`remove` rewrites the whole file
/// atomically. Last writer wins; two processes sharing a file will clobber
/// each other's changes.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read(&self) -> Result<BTreeMap<String, String>> {
        let Some(data) = crate::io::read_if_exists(&self.path)? else {
            return Ok(BTreeMap::new());
        };
        if data.trim().is_empty() {
            return Ok(BTreeMap::new());
        }
        let file: StoreFile = serde_yaml::from_str(&data)?;
        Ok(file.entries)
    }

    /// Entries to build the next write from. A file that no longer parses is
    /// replaced rather than blocking every later write.
    fn read_for_write(&self) -> Result<BTreeMap<String, String>> {
        match self.read() {
            Err(TourError::Yaml(e)) => {
                tracing::warn!(path = %self.path.display(), error = %e, "tour store unreadable, starting fresh");
                Ok(BTreeMap::new())
            }
            other => other,
        }
    }

    fn write(&self, entries: BTreeMap<String, String>) -> Result<()> {
        let file = StoreFile {
            entries,
            last_updated: Utc::now(),
        };
        let data = serde_yaml::to_string(&file)?;
        atomic_write(&self.path, data.as_bytes())
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.read()?.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let mut entries = self.read_for_write()?;
        entries.insert(key.to_string(), value.to_string());
        self.write(entries)
    }

    fn remove(&self, key: &str) -> Result<()> {
        let mut entries = self.read_for_write()?;
        if entries.remove(key).is_some() {
            self.write(entries)?;
        }
        Ok(())
    }

    fn keys(&self) -> Result<Vec<String>> {
        Ok(self.read()?.into_keys().collect())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
