//! Attempt record persistence.
//!
//! # Responsibilities
//! - Hold one `AttemptRecord` per storage key
//! - Survive process restarts (file backend) or not (memory backend)
//!
//! # Design Decisions
//! - Keyed per storage scope, not per identity: throttles a device, not a person
//! - No schema version in the stored JSON; an unreadable record is an error the
//!   rate limiter degrades on
//! - Reads and writes are independent, not a transaction

use std::collections::HashMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Attempt counter inside the current window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttemptRecord {
    pub count: u32,
    /// Window start, milliseconds since the Unix epoch.
    pub window_start: u64,
}

impl AttemptRecord {
    /// A fresh, empty window opened at `now_ms`.
    pub fn fresh(now_ms: u64) -> Self {
        Self {
            count: 0,
            window_start: now_ms,
        }
    }
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("attempt store I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("stored attempt record is malformed: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error("attempt store lock poisoned")]
    Poisoned,
}

/// Keyed persistence backend for attempt records.
pub trait AttemptStore: Send + Sync {
    /// `Ok(None)` when nothing has been stored under `key` yet.
    fn load(&self, key: &str) -> Result<Option<AttemptRecord>, StoreError>;

    fn save(&self, key: &str, record: &AttemptRecord) -> Result<(), StoreError>;
}

/// Process-local store.
#[derive(Debug, Default)]
pub struct MemoryAttemptStore {
    records: Mutex<HashMap<String, AttemptRecord>>,
}

impl MemoryAttemptStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl AttemptStore for MemoryAttemptStore {
    fn load(&self, key: &str) -> Result<Option<AttemptRecord>, StoreError> {
        let records = self.records.lock().map_err(|_| StoreError::Poisoned)?;
        Ok(records.get(key).copied())
    }

    fn save(&self, key: &str, record: &AttemptRecord) -> Result<(), StoreError> {
        let mut records = self.records.lock().map_err(|_| StoreError::Poisoned)?;
        records.insert(key.to_string(), *record);
        Ok(())
    }
}

/// One JSON file per key under a directory.
#[derive(Debug, Clone)]
pub struct FileAttemptStore {
    dir: PathBuf,
}

impl FileAttemptStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }
}

impl AttemptStore for FileAttemptStore {
    fn load(&self, key: &str) -> Result<Option<AttemptRecord>, StoreError> {
        match fs::read(self.path_for(key)) {
            Ok(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn save(&self, key: &str, record: &AttemptRecord) -> Result<(), StoreError> {
        fs::create_dir_all(&self.dir)?;
        fs::write(self.path_for(key), serde_json::to_vec(record)?)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_store_roundtrip_per_key() {
        let store = MemoryAttemptStore::new();
        assert!(store.load("a").unwrap().is_none());

        store.save("a", &AttemptRecord { count: 2, window_start: 10 }).unwrap();
        assert_eq!(store.load("a").unwrap(), Some(AttemptRecord { count: 2, window_start: 10 }));
        assert!(store.load("b").unwrap().is_none());
    }

    #[test]
    fn test_file_store_uses_camel_case_json() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileAttemptStore::new(dir.path().join("state"));

        store.save("formRateLimit", &AttemptRecord { count: 1, window_start: 42 }).unwrap();

        let raw = fs::read_to_string(dir.path().join("state/formRateLimit.json")).unwrap();
        assert_eq!(raw, r#"{"count":1,"windowStart":42}"#);
        assert_eq!(store.load("formRateLimit").unwrap().unwrap().count, 1);
    }

    #[test]
    fn test_file_store_reports_malformed_record() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("k.json"), r#"{"attempts":1}"#).unwrap();

        let store = FileAttemptStore::new(dir.path());
        assert!(matches!(store.load("k"), Err(StoreError::Malformed(_))));
    }
}
