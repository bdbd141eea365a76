//! Shared error types for the services crate.

use std::time::Duration;

use thiserror::Error;

use journey_core::model::{ProgressError, SettingsError, Stage};
use journey_core::{AnswerValidationError, CatalogError};
use storage::repository::StorageError;
use storage::sqlite::SqliteInitError;

/// Errors emitted by a `ModelGateway`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum GatewayError {
    #[error("remote model is not configured")]
    Disabled,
    #[error("remote model returned an empty response")]
    EmptyResponse,
    #[error("remote model request failed with status {0}")]
    HttpStatus(reqwest::StatusCode),
    #[error(transparent)]
    Http(#[from] reqwest::Error),
}

/// Errors emitted by a `FeedbackEvaluator`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum EvaluatorError {
    #[error(transparent)]
    Gateway(#[from] GatewayError),
    #[error("feedback reply is malformed: {0}")]
    MalformedResponse(String),
    #[error("evaluation timed out after {0:?}")]
    TimedOut(Duration),
}

/// Errors emitted by `StageProgressionController`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ProgressionError {
    #[error(transparent)]
    Validation(#[from] AnswerValidationError),
    #[error("stage {stage} is already approved or completed")]
    AlreadyCompleted { stage: Stage },
    #[error("stage {stage} has no approved feedback")]
    NotApproved { stage: Stage },
    #[error("feedback evaluation failed")]
    EvaluationFailed(#[source] EvaluatorError),
    #[error(transparent)]
    Progress(ProgressError),
}

impl From<ProgressError> for ProgressionError {
    fn from(err: ProgressError) -> Self {
        match err {
            ProgressError::Locked { stage } => Self::AlreadyCompleted { stage },
            ProgressError::NotApproved { stage } => Self::NotApproved { stage },
            other => Self::Progress(other),
        }
    }
}

/// Errors emitted by `JourneyInsightAggregator`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum InsightError {
    #[error(transparent)]
    Gateway(#[from] GatewayError),
    #[error("insight reply is malformed: {0}")]
    MalformedResponse(String),
    #[error("journey content was blocked by the safety filter")]
    ContentFiltered,
}

/// Errors emitted by `JourneyStore`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum JourneyStoreError {
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Errors emitted while bootstrapping app services.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AppServicesError {
    #[error(transparent)]
    Sqlite(#[from] SqliteInitError),
    #[error(transparent)]
    Catalog(#[from] CatalogError),
    #[error(transparent)]
    Settings(#[from] SettingsError),
}
