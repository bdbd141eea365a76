use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::Duration;

use journey_core::model::{
    AnswerSet, FeedbackId, FeedbackRecord, JourneyProgress, Stage, StageState, StageSubmission,
};
use journey_core::{Clock, ContentCatalog, prompt};
use tracing::{debug, info, warn};

use super::JourneyHandle;
use crate::error::{EvaluatorError, ProgressionError};
use crate::evaluator::{EvaluationRequest, FeedbackEvaluator};

pub const DEFAULT_EVALUATION_TIMEOUT: Duration = Duration::from_secs(60);

/// Moves a journey through its stages: answers in, feedback out, stages completed.
#[derive(Clone)]
pub struct StageProgressionController {
    catalog: Arc<ContentCatalog>,
    evaluator: Arc<dyn FeedbackEvaluator>,
    clock: Clock,
    timeout: Duration,
}

impl StageProgressionController {
    #[must_use]
    pub fn new(
        catalog: Arc<ContentCatalog>,
        evaluator: Arc<dyn FeedbackEvaluator>,
        clock: Clock,
    ) -> Self {
        Self {
            catalog,
            evaluator,
            clock,
            timeout: DEFAULT_EVALUATION_TIMEOUT,
        }
    }

    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    #[must_use]
    pub fn catalog(&self) -> &ContentCatalog {
        &self.catalog
    }

    #[must_use]
    pub fn evaluator(&self) -> &dyn FeedbackEvaluator {
        self.evaluator.as_ref()
    }

    //
    // ─── MUTATIONS ─────────────────────────────────────────────────────────────────
    //

    /// Validate `answers`, ask the evaluator for feedback and store both.
    ///
    /// Nothing is stored unless the evaluator returns in time.
    ///
    /// # Errors
    ///
    /// - `AlreadyCompleted` once the stage is approved or completed.
    /// - `Validation` when answers do not satisfy the stage's questions.
    /// - `EvaluationFailed` when the evaluator errors or times out.
    pub async fn submit_for_feedback(
        &self,
        handle: &JourneyHandle,
        stage: Stage,
        answers: AnswerSet,
    ) -> Result<FeedbackRecord, ProgressionError> {
        let _gate = handle.lock_stage(stage).await;

        if handle.read(|p| p.is_locked(stage)) {
            return Err(ProgressionError::AlreadyCompleted { stage });
        }
        self.catalog.validate_answers(stage, &answers)?;

        let request = handle.read(|progress| {
            let current = prompt::current_answers(&self.catalog, stage, &answers);
            let previous = prompt::history(&self.catalog, progress);
            EvaluationRequest {
                stage,
                prompt: prompt::feedback_prompt(stage.name(), &current, &previous),
                answers,
            }
        });
        debug!(%stage, prompt = %request.prompt, "feedback prompt");

        let draft = match tokio::time::timeout(self.timeout, self.evaluator.evaluate(&request)).await
        {
            Ok(Ok(draft)) => draft,
            Ok(Err(err)) => {
                warn!(%stage, error = %err, "evaluation failed");
                return Err(ProgressionError::EvaluationFailed(err));
            }
            Err(_) => {
                warn!(%stage, timeout = ?self.timeout, "evaluation timed out");
                return Err(ProgressionError::EvaluationFailed(EvaluatorError::TimedOut(
                    self.timeout,
                )));
            }
        };

        let record = draft.into_record(FeedbackId::generate(), self.clock.now());
        let EvaluationRequest { answers, .. } = request;
        handle.update(|p| p.record_feedback(stage, answers, record.clone()))?;

        info!(
            %stage,
            evaluator = %self.evaluator.kind(),
            approved = record.is_approved(),
            "feedback recorded"
        );
        Ok(record)
    }

    /// Store answers without asking for feedback.
    ///
    /// # Errors
    ///
    /// Returns `AlreadyCompleted` once the stage is approved or completed.
    pub async fn save_draft(
        &self,
        handle: &JourneyHandle,
        stage: Stage,
        answers: AnswerSet,
    ) -> Result<(), ProgressionError> {
        let _gate = handle.lock_stage(stage).await;
        let at = self.clock.now();
        handle.update(|p| p.record_draft(stage, answers, at))?;
        debug!(%stage, "draft saved");
        Ok(())
    }

    /// Mark `stage` completed. Returns `false` when it already was.
    ///
    /// # Errors
    ///
    /// Returns `NotApproved` when the stage has no approved feedback.
    pub fn complete_stage(
        &self,
        handle: &JourneyHandle,
        stage: Stage,
    ) -> Result<bool, ProgressionError> {
        let newly = handle.update(|p| p.mark_completed(stage))?;
        if newly {
            info!(%stage, "stage completed");
        }
        Ok(newly)
    }

    //
    // ─── QUERIES ───────────────────────────────────────────────────────────────────
    //

    #[must_use]
    pub fn completed_stages(&self, handle: &JourneyHandle) -> BTreeSet<Stage> {
        handle.read(|p| p.completed_stages().clone())
    }

    #[must_use]
    pub fn submission(&self, handle: &JourneyHandle, stage: Stage) -> Option<StageSubmission> {
        handle.read(|p| p.submission(stage).cloned())
    }

    #[must_use]
    pub fn stage_state(&self, handle: &JourneyHandle, stage: Stage) -> StageState {
        handle.read(|p| p.stage_state(stage))
    }

    #[must_use]
    pub fn next_stage(&self, handle: &JourneyHandle) -> Option<Stage> {
        handle.read(JourneyProgress::next_stage)
    }
}
