//! Dumb key-value persistence for the step record.
//!
//! The store knows nothing about step semantics: it reads and writes
//! one record wholesale. No partial updates, no locking — within one
//! page lifetime there is a single writer doing read-then-overwrite.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use parking_lot::Mutex;
use tracing::debug;

use crate::errors::StateError;
use crate::record::StepRecord;

#[async_trait]
pub trait StateStore: Send + Sync {
    /// The persisted record, if any. A corrupt record reads as absent:
    /// losing stale progress is recoverable, refusing to start is not.
    async fn load(&self) -> Result<Option<StepRecord>, StateError>;
    async fn save(&self, record: &StepRecord) -> Result<(), StateError>;
    async fn clear(&self) -> Result<(), StateError>;
}

/// JSON file store, one record per file.
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
}

#[async_trait]
impl StateStore for FileStore {
    async fn load(&self) -> Result<Option<StepRecord>, StateError> {
        let bytes = match tokio::fs::read(&self.path).await {
            Ok(bytes) => bytes,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(err.into()),
        };
        match serde_json::from_slice::<StepRecord>(&bytes) {
            Ok(record) => Ok(Some(record)),
            Err(err) => {
                debug!(error = %err, path = %self.path.display(), "discarding corrupt state record");
                Ok(None)
            }
        }
    }

    async fn save(&self, record: &StepRecord) -> Result<(), StateError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }
        let body = serde_json::to_vec_pretty(record)?;
        tokio::fs::write(&self.path, body).await?;
        debug!(path = %self.path.display(), step = record.stage.step_number(), "state saved");
        Ok(())
    }

    async fn clear(&self) -> Result<(), StateError> {
        match tokio::fs::remove_file(&self.path).await {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(err.into()),
        }
    }
}

/// In-memory store for tests and ephemeral runs.
#[derive(Default)]
pub struct MemoryStore {
    record: Mutex<Option<StepRecord>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_record(record: StepRecord) -> Self {
        Self {
            record: Mutex::new(Some(record)),
        }
    }
}

#[async_trait]
impl StateStore for MemoryStore {
    async fn load(&self) -> Result<Option<StepRecord>, StateError> {
        Ok(self.record.lock().clone())
    }

    async fn save(&self, record: &StepRecord) -> Result<(), StateError> {
        *self.record.lock() = Some(record.clone());
        Ok(())
    }

    async fn clear(&self) -> Result<(), StateError> {
        *self.record.lock() = None;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use tempfile::tempdir;

    #[tokio::test]
    async fn file_store_round_trips() {
        let dir = tempdir().expect("tempdir");
        let store = FileStore::new(dir.path().join("state.json"));

        assert!(store.load().await.unwrap().is_none());

        let record = StepRecord::fresh(Utc::now());
        store.save(&record).await.unwrap();
        assert_eq!(store.load().await.unwrap(), Some(record));

        store.clear().await.unwrap();
        assert!(store.load().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn corrupt_file_reads_as_absent() {
        let dir = tempdir().expect("tempdir");
        let path = dir.path().join("state.json");
        tokio::fs::write(&path, b"{not json").await.unwrap();
        let store = FileStore::new(&path);
        assert!(store.load().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn clear_is_idempotent() {
        let dir = tempdir().expect("tempdir");
        let store = FileStore::new(dir.path().join("missing.json"));
        store.clear().await.unwrap();
        store.clear().await.unwrap();
    }
}
