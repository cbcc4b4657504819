//! Local store adapter - typed access over a persistent key-value mapping.
//!
//! The underlying store is the localStorage-shaped seam the hosting
//! application provides: string keys to JSON strings. [`CategoryStore`] puts
//! the category namespacing, the tolerant decoding, and the watermark keys
//! on top. Reads fail open: absent or malformed values are "no data", never
//! an error.

use crate::error::Result;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tillsync_engine::{records_from_value, records_to_value, Category, Record, Timestamp};

/// A persistent string key → JSON string mapping.
///
/// Mirrors the platform storage primitive: reads are infallible (absent on
/// any problem), writes can fail (quota, IO).
pub trait LocalStore: Send + Sync {
    fn get_item(&self, key: &str) -> Option<String>;
    fn set_item(&self, key: &str, value: &str) -> Result<()>;
    fn remove_item(&self, key: &str);
}

/// In-memory store for tests and short-lived embeddings.
#[derive(Debug, Default)]
pub struct MemoryStore {
    items: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<String, String>> {
        self.items.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl LocalStore for MemoryStore {
    fn get_item(&self, key: &str) -> Option<String> {
        self.lock().get(key).cloned()
    }

    fn set_item(&self, key: &str, value: &str) -> Result<()> {
        self.lock().insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove_item(&self, key: &str) {
        self.lock().remove(key);
    }
}

/// File-backed store: one file per key under a directory.
///
/// Writes go through a temp file and rename, so a crash mid-write leaves the
/// previous value intact. This is what makes queues and watermarks durable
/// across process restarts.
#[derive(Debug)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    /// Open (creating if needed) a store rooted at `dir`.
    pub fn open(dir: impl AsRef<Path>) -> Result<Self> {
        let dir = dir.as_ref().to_path_buf();
        std::fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    fn path_for(&self, key: &str) -> PathBuf {
        // Keys are storage-key shaped, but sanitize anyway so a hostile key
        // cannot escape the directory.
        let safe: String = key
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() || c == '_' || c == '-' {
                c
            } else {
                '_'
            })
            .collect();
        self.dir.join(format!("{safe}.json"))
    }
}

impl LocalStore for FileStore {
    fn get_item(&self, key: &str) -> Option<String> {
        std::fs::read_to_string(self.path_for(key)).ok()
    }

    fn set_item(&self, key: &str, value: &str) -> Result<()> {
        let path = self.path_for(key);
        let tmp = path.with_extension("json.tmp");
        std::fs::write(&tmp, value)?;
        std::fs::rename(&tmp, &path)?;
        Ok(())
    }

    fn remove_item(&self, key: &str) {
        let _ = std::fs::remove_file(self.path_for(key));
    }
}

/// Category-namespaced view over a [`LocalStore`].
#[derive(Clone)]
pub struct CategoryStore {
    inner: Arc<dyn LocalStore>,
}

impl CategoryStore {
    pub fn new(inner: Arc<dyn LocalStore>) -> Self {
        Self { inner }
    }

    /// Read the category's snapshot, failing open.
    ///
    /// Absent keys, unparseable JSON, and non-record shapes all come back as
    /// an empty snapshot.
    pub fn read(&self, category: Category) -> Vec<Record> {
        let Some(raw) = self.inner.get_item(category.storage_key()) else {
            return Vec::new();
        };
        match serde_json::from_str::<serde_json::Value>(&raw) {
            Ok(value) => records_from_value(value),
            Err(e) => {
                tracing::debug!(%category, error = %e, "malformed local snapshot, treating as empty");
                Vec::new()
            }
        }
    }

    /// Persist the category's snapshot in its stored shape (bare object for
    /// the config singleton, array otherwise).
    pub fn write(&self, category: Category, records: Vec<Record>) -> Result<()> {
        let value = records_to_value(category, records);
        self.inner.set_item(category.storage_key(), &value.to_string())
    }

    /// Insert or replace one record by the category's identity field.
    pub fn upsert(&self, category: Category, record: Record) -> Result<()> {
        let mut records = self.read(category);
        match records
            .iter_mut()
            .find(|existing| existing.same_identity(&record, category))
        {
            Some(existing) => *existing = record,
            None => records.push(record),
        }
        self.write(category, records)
    }

    /// Remove records whose identity field equals `identity`.
    pub fn remove(&self, category: Category, identity: &serde_json::Value) -> Result<()> {
        let mut records = self.read(category);
        records.retain(|record| record.identity(category) != Some(identity));
        self.write(category, records)
    }

    /// Last-confirmed-sync watermark for the category.
    pub fn watermark(&self, category: Category) -> Option<Timestamp> {
        self.inner
            .get_item(&category.watermark_key())?
            .parse()
            .ok()
    }

    /// Advance the category's watermark.
    pub fn set_watermark(&self, category: Category, timestamp: Timestamp) -> Result<()> {
        self.inner
            .set_item(&category.watermark_key(), &timestamp.to_string())
    }

    /// Drop the category's snapshot and watermark.
    pub fn clear(&self, category: Category) {
        self.inner.remove_item(category.storage_key());
        self.inner.remove_item(&category.watermark_key());
    }
}
