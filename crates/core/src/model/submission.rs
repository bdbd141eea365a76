use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::model::{AnswerSet, FeedbackRecord, Stage};

/// Answers for a stage plus the feedback they received, if any.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StageSubmission {
    stage: Stage,
    answers: AnswerSet,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    feedback: Option<FeedbackRecord>,
    updated_at: DateTime<Utc>,
}

impl StageSubmission {
    /// A submission that has answers but no feedback yet.
    #[must_use]
    pub fn draft(stage: Stage, answers: AnswerSet, updated_at: DateTime<Utc>) -> Self {
        Self {
            stage,
            answers,
            feedback: None,
            updated_at,
        }
    }

    /// A submission whose answers have been evaluated.
    #[must_use]
    pub fn evaluated(stage: Stage, answers: AnswerSet, feedback: FeedbackRecord) -> Self {
        let updated_at = feedback.created_at();
        Self {
            stage,
            answers,
            feedback: Some(feedback),
            updated_at,
        }
    }

    #[must_use]
    pub fn stage(&self) -> Stage {
        self.stage
    }

    #[must_use]
    pub fn answers(&self) -> &AnswerSet {
        &self.answers
    }

    #[must_use]
    pub fn feedback(&self) -> Option<&FeedbackRecord> {
        self.feedback.as_ref()
    }

    #[must_use]
    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// True once the stored feedback approves the answers.
    #[must_use]
    pub fn is_approved(&self) -> bool {
        self.feedback.as_ref().is_some_and(FeedbackRecord::is_approved)
    }
}

/// Where a stage sits in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "state")]
pub enum StageState {
    Untouched,
    AwaitingFeedback,
    FeedbackReceived { approved: bool },
    Completed,
}

impl StageState {
    #[must_use]
    pub fn of(submission: Option<&StageSubmission>, completed: bool) -> Self {
        if completed {
            return Self::Completed;
        }
        match submission {
            None => Self::Untouched,
            Some(sub) => match sub.feedback() {
                None => Self::AwaitingFeedback,
                Some(feedback) => Self::FeedbackReceived {
                    approved: feedback.is_approved(),
                },
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{FeedbackDraft, FeedbackId};
    use crate::time::fixed_now;

    fn feedback(approved: bool) -> FeedbackRecord {
        FeedbackDraft {
            positive_feedback: "ok".into(),
            constructive_feedback: String::new(),
            suggestions: Vec::new(),
            approved,
        }
        .into_record(FeedbackId::generate(), fixed_now())
    }

    #[test]
    fn state_follows_feedback() {
        let draft = StageSubmission::draft(Stage::Observe, AnswerSet::new(), fixed_now());
        assert_eq!(StageState::of(None, false), StageState::Untouched);
        assert_eq!(StageState::of(Some(&draft), false), StageState::AwaitingFeedback);

        let rejected = StageSubmission::evaluated(Stage::Observe, AnswerSet::new(), feedback(false));
        assert_eq!(
            StageState::of(Some(&rejected), false),
            StageState::FeedbackReceived { approved: false }
        );
        assert!(!rejected.is_approved());

        let approved = StageSubmission::evaluated(Stage::Observe, AnswerSet::new(), feedback(true));
        assert!(approved.is_approved());
        assert_eq!(StageState::of(Some(&approved), true), StageState::Completed);
    }
}
