use std::collections::{BTreeMap, BTreeSet};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::{AnswerSet, FeedbackRecord, Stage, StageState, StageSubmission};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ProgressError {
    #[error("answers for stage {stage} are locked after approval")]
    Locked { stage: Stage },

    #[error("stage {stage} has no approved feedback")]
    NotApproved { stage: Stage },

    #[error("stage {stage} is marked completed without approved feedback")]
    CompletedWithoutApproval { stage: Stage },

    #[error("submission stored under {key} belongs to stage {actual}")]
    StageMismatch { key: Stage, actual: Stage },
}

/// A learner's journey: every stage submission plus the set of completed stages.
///
/// All mutation goes through methods that uphold the gating invariants, so a
/// deserialized or rehydrated value is re-checked by [`JourneyProgress::from_parts`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "ProgressRepr", into = "ProgressRepr")]
pub struct JourneyProgress {
    completed: BTreeSet<Stage>,
    submissions: BTreeMap<Stage, StageSubmission>,
}

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ProgressRepr {
    #[serde(default)]
    completed_stages: Vec<Stage>,
    #[serde(default)]
    submissions: BTreeMap<Stage, StageSubmission>,
}

impl TryFrom<ProgressRepr> for JourneyProgress {
    type Error = ProgressError;

    fn try_from(repr: ProgressRepr) -> Result<Self, Self::Error> {
        Self::from_parts(repr.completed_stages, repr.submissions)
    }
}

impl From<JourneyProgress> for ProgressRepr {
    fn from(progress: JourneyProgress) -> Self {
        Self {
            completed_stages: progress.completed.into_iter().collect(),
            submissions: progress.submissions,
        }
    }
}

impl JourneyProgress {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Rehydrate progress from storage.
    ///
    /// # Errors
    ///
    /// Returns `ProgressError::StageMismatch` if a submission is keyed under the wrong stage,
    /// or `ProgressError::CompletedWithoutApproval` if a completed stage lacks approved feedback.
    pub fn from_parts(
        completed: impl IntoIterator<Item = Stage>,
        submissions: BTreeMap<Stage, StageSubmission>,
    ) -> Result<Self, ProgressError> {
        for (key, submission) in &submissions {
            if submission.stage() != *key {
                return Err(ProgressError::StageMismatch {
                    key: *key,
                    actual: submission.stage(),
                });
            }
        }

        let completed: BTreeSet<Stage> = completed.into_iter().collect();
        for stage in &completed {
            let approved = submissions
                .get(stage)
                .is_some_and(StageSubmission::is_approved);
            if !approved {
                return Err(ProgressError::CompletedWithoutApproval { stage: *stage });
            }
        }

        Ok(Self {
            completed,
            submissions,
        })
    }

    #[must_use]
    pub fn completed_stages(&self) -> &BTreeSet<Stage> {
        &self.completed
    }

    #[must_use]
    pub fn completed_count(&self) -> usize {
        self.completed.len()
    }

    #[must_use]
    pub fn is_completed(&self, stage: Stage) -> bool {
        self.completed.contains(&stage)
    }

    #[must_use]
    pub fn submission(&self, stage: Stage) -> Option<&StageSubmission> {
        self.submissions.get(&stage)
    }

    pub fn submissions(&self) -> impl Iterator<Item = &StageSubmission> {
        self.submissions.values()
    }

    #[must_use]
    pub fn stage_state(&self, stage: Stage) -> StageState {
        StageState::of(self.submission(stage), self.is_completed(stage))
    }

    /// First stage, in methodology order, that is not completed yet.
    #[must_use]
    pub fn next_stage(&self) -> Option<Stage> {
        Stage::ALL.into_iter().find(|stage| !self.is_completed(*stage))
    }

    /// True when the answers for `stage` can no longer change.
    #[must_use]
    pub fn is_locked(&self, stage: Stage) -> bool {
        self.is_completed(stage)
            || self
                .submission(stage)
                .is_some_and(StageSubmission::is_approved)
    }

    /// Store answers without feedback, replacing any earlier unapproved submission.
    ///
    /// # Errors
    ///
    /// Returns `ProgressError::Locked` once the stage is approved or completed.
    pub fn record_draft(
        &mut self,
        stage: Stage,
        answers: AnswerSet,
        at: DateTime<Utc>,
    ) -> Result<(), ProgressError> {
        if self.is_locked(stage) {
            return Err(ProgressError::Locked { stage });
        }
        self.submissions
            .insert(stage, StageSubmission::draft(stage, answers, at));
        Ok(())
    }

    /// Store evaluated answers, superseding any earlier unapproved submission.
    ///
    /// # Errors
    ///
    /// Returns `ProgressError::Locked` once the stage is approved or completed.
    pub fn record_feedback(
        &mut self,
        stage: Stage,
        answers: AnswerSet,
        feedback: FeedbackRecord,
    ) -> Result<(), ProgressError> {
        if self.is_locked(stage) {
            return Err(ProgressError::Locked { stage });
        }
        self.submissions
            .insert(stage, StageSubmission::evaluated(stage, answers, feedback));
        Ok(())
    }

    /// Mark `stage` completed. Returns `false` if it already was.
    ///
    /// # Errors
    ///
    /// Returns `ProgressError::NotApproved` if the stage has no approved feedback.
    pub fn mark_completed(&mut self, stage: Stage) -> Result<bool, ProgressError> {
        let approved = self
            .submission(stage)
            .is_some_and(StageSubmission::is_approved);
        if !approved {
            return Err(ProgressError::NotApproved { stage });
        }
        Ok(self.completed.insert(stage))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{FeedbackDraft, FeedbackId};
    use crate::time::fixed_now;

    fn feedback(approved: bool) -> FeedbackRecord {
        FeedbackDraft {
            positive_feedback: "Thoughtful answers".into(),
            constructive_feedback: "Add detail".into(),
            suggestions: Vec::new(),
            approved,
        }
        .into_record(FeedbackId::generate(), fixed_now())
    }

    fn answers(text: &str) -> AnswerSet {
        AnswerSet::new().with("understand-q1", text)
    }

    #[test]
    fn completing_requires_approved_feedback() {
        let mut progress = JourneyProgress::new();
        assert_eq!(
            progress.mark_completed(Stage::Understand),
            Err(ProgressError::NotApproved {
                stage: Stage::Understand
            })
        );

        progress
            .record_feedback(Stage::Understand, answers("first"), feedback(false))
            .unwrap();
        assert!(progress.mark_completed(Stage::Understand).is_err());

        progress
            .record_feedback(Stage::Understand, answers("second"), feedback(true))
            .unwrap();
        assert_eq!(progress.mark_completed(Stage::Understand), Ok(true));
        assert_eq!(progress.mark_completed(Stage::Understand), Ok(false));
        assert_eq!(progress.completed_count(), 1);
        assert_eq!(progress.next_stage(), Some(Stage::Observe));
    }

    #[test]
    fn approved_answers_are_locked() {
        let mut progress = JourneyProgress::new();
        progress
            .record_feedback(Stage::Observe, answers("ok"), feedback(true))
            .unwrap();

        let err = progress
            .record_draft(Stage::Observe, answers("edit"), fixed_now())
            .unwrap_err();
        assert_eq!(err, ProgressError::Locked { stage: Stage::Observe });
        assert_eq!(
            progress.submission(Stage::Observe).unwrap().answers(),
            &answers("ok")
        );
    }

    #[test]
    fn json_roundtrip_preserves_completed_and_answers() {
        let mut progress = JourneyProgress::new();
        progress
            .record_feedback(Stage::Understand, answers("done"), feedback(true))
            .unwrap();
        progress.mark_completed(Stage::Understand).unwrap();
        progress
            .record_draft(Stage::Observe, answers("draft"), fixed_now())
            .unwrap();

        let json = serde_json::to_string(&progress).unwrap();
        assert!(json.contains("\"completedStages\":[\"understand\"]"));

        let back: JourneyProgress = serde_json::from_str(&json).unwrap();
        assert_eq!(back.completed_stages(), progress.completed_stages());
        assert_eq!(
            back.submission(Stage::Observe).unwrap().answers(),
            &answers("draft")
        );
        assert_eq!(back, progress);
    }

    #[test]
    fn rehydration_rejects_completed_stage_without_approval() {
        let json = r#"{"completedStages":["define"],"submissions":{}}"#;
        let err = serde_json::from_str::<JourneyProgress>(json).unwrap_err();
        assert!(err.to_string().contains("without approved feedback"));
    }
}
