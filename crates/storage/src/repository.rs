use async_trait::async_trait;
use journey_core::model::{JourneyProgress, UserId};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use thiserror::Error;

/// Errors surfaced by storage adapters.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StorageError {
    #[error("not found")]
    NotFound,

    #[error("connection error: {0}")]
    Connection(String),

    #[error("serialization error: {0}")]
    Serialization(String),
}

/// Repository contract for a learner's journey progress.
#[async_trait]
pub trait JourneyRepository: Send + Sync {
    /// Fetch the stored progress for `user`.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the backend fails or the stored data cannot be
    /// turned back into a valid `JourneyProgress`.
    async fn load_progress(&self, user: UserId) -> Result<Option<JourneyProgress>, StorageError>;

    /// Persist `progress` for `user`, replacing whatever was stored before.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the progress cannot be stored.
    async fn save_progress(&self, user: UserId, progress: &JourneyProgress)
    -> Result<(), StorageError>;

    /// Remove all stored progress for `user`.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::NotFound` if nothing was stored, or other storage errors.
    async fn delete_progress(&self, user: UserId) -> Result<(), StorageError>;
}

/// Simple in-memory repository implementation for testing and prototyping.
#[derive(Clone, Default)]
pub struct InMemoryRepository {
    journeys: Arc<Mutex<HashMap<UserId, JourneyProgress>>>,
}

impl InMemoryRepository {
    #[must_use]
    pub fn new() -> Self {
        Self {
            journeys: Arc::new(Mutex::new(HashMap::new())),
        }
    }
}

#[async_trait]
impl JourneyRepository for InMemoryRepository {
    async fn load_progress(&self, user: UserId) -> Result<Option<JourneyProgress>, StorageError> {
        let guard = self
            .journeys
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        Ok(guard.get(&user).cloned())
    }

    async fn save_progress(
        &self,
        user: UserId,
        progress: &JourneyProgress,
    ) -> Result<(), StorageError> {
        let mut guard = self
            .journeys
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        guard.insert(user, progress.clone());
        Ok(())
    }

    async fn delete_progress(&self, user: UserId) -> Result<(), StorageError> {
        let mut guard = self
            .journeys
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        guard.remove(&user).map(|_| ()).ok_or(StorageError::NotFound)
    }
}

/// Repositories behind trait objects for easy backend swapping.
#[derive(Clone)]
pub struct Storage {
    pub journeys: Arc<dyn JourneyRepository>,
}

impl Storage {
    #[must_use]
    pub fn in_memory() -> Self {
        let journeys: Arc<dyn JourneyRepository> = Arc::new(InMemoryRepository::new());
        Self { journeys }
    }
}
