use async_trait::async_trait;
use chess_edu_core::model::ProgressRecord;
use std::sync::{Arc, Mutex};
use thiserror::Error;

/// Errors surfaced by storage adapters.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StorageError {
    #[error("connection error: {0}")]
    Connection(String),
}

/// Repository contract for the learner's progress record.
///
/// One repository holds exactly one record. Callers that read, modify and write
/// back are responsible for serializing those steps.
#[async_trait]
pub trait ProgressRepository: Send + Sync {
    /// Fetch the current record. A repository that was never written returns an
    /// empty record.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the record cannot be read.
    async fn load_progress(&self) -> Result<ProgressRecord, StorageError>;

    /// Replace the stored record.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the record cannot be stored.
    async fn save_progress(&self, record: &ProgressRecord) -> Result<(), StorageError>;
}

/// Process-local repository. State lives as long as the last clone.
#[derive(Clone, Default)]
pub struct InMemoryRepository {
    progress: Arc<Mutex<ProgressRecord>>,
}

impl InMemoryRepository {
    #[must_use]
    pub fn new() -> Self {
        Self {
            progress: Arc::new(Mutex::new(ProgressRecord::new())),
        }
    }

    /// Repository seeded with an existing record.
    #[must_use]
    pub fn with_progress(record: ProgressRecord) -> Self {
        Self {
            progress: Arc::new(Mutex::new(record)),
        }
    }
}

#[async_trait]
impl ProgressRepository for InMemoryRepository {
    async fn load_progress(&self) -> Result<ProgressRecord, StorageError> {
        let guard = self
            .progress
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        Ok(guard.clone())
    }

    async fn save_progress(&self, record: &ProgressRecord) -> Result<(), StorageError> {
        let mut guard = self
            .progress
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        *guard = record.clone();
        Ok(())
    }
}

/// Aggregates repositories behind trait objects for easy backend swapping.
#[derive(Clone)]
pub struct Storage {
    pub progress: Arc<dyn ProgressRepository>,
}

impl Storage {
    #[must_use]
    pub fn in_memory() -> Self {
        let progress: Arc<dyn ProgressRepository> = Arc::new(InMemoryRepository::new());
        Self { progress }
    }
}
