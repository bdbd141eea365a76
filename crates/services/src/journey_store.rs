use std::sync::Arc;

use journey_core::model::{JourneyProgress, UserId};
use storage::repository::{JourneyRepository, StorageError};
use tracing::info;

use crate::error::JourneyStoreError;
use crate::journey::JourneyHandle;

/// Loads and saves whole journeys through a repository.
#[derive(Clone)]
pub struct JourneyStore {
    repo: Arc<dyn JourneyRepository>,
}

impl JourneyStore {
    #[must_use]
    pub fn new(repo: Arc<dyn JourneyRepository>) -> Self {
        Self { repo }
    }

    /// Handle to the stored journey of `user`, or to a fresh one.
    ///
    /// # Errors
    ///
    /// Returns `JourneyStoreError` when the repository read fails.
    pub async fn open(&self, user: UserId) -> Result<JourneyHandle, JourneyStoreError> {
        let progress = self
            .repo
            .load_progress(user)
            .await?
            .unwrap_or_else(JourneyProgress::new);
        Ok(JourneyHandle::new(progress))
    }

    /// Persist the current state of `handle`.
    ///
    /// # Errors
    ///
    /// Returns `JourneyStoreError` when the repository write fails.
    pub async fn save(&self, user: UserId, handle: &JourneyHandle) -> Result<(), JourneyStoreError> {
        let progress = handle.snapshot();
        self.repo.save_progress(user, &progress).await?;
        Ok(())
    }

    /// Delete the stored journey. Returns `false` if there was none.
    ///
    /// # Errors
    ///
    /// Returns `JourneyStoreError` when the repository delete fails.
    pub async fn reset(&self, user: UserId) -> Result<bool, JourneyStoreError> {
        match self.repo.delete_progress(user).await {
            Ok(()) => {
                info!(user = user.value(), "journey reset");
                Ok(true)
            }
            Err(StorageError::NotFound) => Ok(false),
            Err(err) => Err(err.into()),
        }
    }
}
