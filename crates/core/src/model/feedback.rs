use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::model::ids::FeedbackId;

/// Pointer to supplementary material attached to a piece of feedback.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Suggestion {
    pub id: String,
    pub title: String,
    pub description: String,
    #[serde(alias = "url")]
    pub link: String,
}

impl Suggestion {
    #[must_use]
    pub fn new(
        id: impl Into<String>,
        title: impl Into<String>,
        description: impl Into<String>,
        link: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            description: description.into(),
            link: link.into(),
        }
    }
}

/// Evaluator output before it is stamped with an id and timestamp.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedbackDraft {
    pub positive_feedback: String,
    pub constructive_feedback: String,
    pub suggestions: Vec<Suggestion>,
    pub approved: bool,
}

impl FeedbackDraft {
    /// Freeze the draft into an immutable record.
    #[must_use]
    pub fn into_record(self, id: FeedbackId, created_at: DateTime<Utc>) -> FeedbackRecord {
        FeedbackRecord {
            id,
            created_at,
            positive_feedback: self.positive_feedback,
            constructive_feedback: self.constructive_feedback,
            suggestions: self.suggestions,
            approved: self.approved,
        }
    }
}

/// Structured feedback for one stage submission.
///
/// Fields are private: a record is never edited after it is created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedbackRecord {
    id: FeedbackId,
    created_at: DateTime<Utc>,
    positive_feedback: String,
    constructive_feedback: String,
    #[serde(default)]
    suggestions: Vec<Suggestion>,
    approved: bool,
}

impl FeedbackRecord {
    #[must_use]
    pub fn id(&self) -> FeedbackId {
        self.id
    }

    #[must_use]
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    #[must_use]
    pub fn positive_feedback(&self) -> &str {
        &self.positive_feedback
    }

    #[must_use]
    pub fn constructive_feedback(&self) -> &str {
        &self.constructive_feedback
    }

    #[must_use]
    pub fn suggestions(&self) -> &[Suggestion] {
        &self.suggestions
    }

    #[must_use]
    pub fn is_approved(&self) -> bool {
        self.approved
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time::fixed_now;

    #[test]
    fn record_serializes_with_camel_case_keys() {
        let record = FeedbackDraft {
            positive_feedback: "Clear user".into(),
            constructive_feedback: "Name the barrier".into(),
            suggestions: vec![Suggestion::new("hmw-guide", "HMW", "Reframe", "#hmw")],
            approved: true,
        }
        .into_record(FeedbackId::generate(), fixed_now());

        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["positiveFeedback"], "Clear user");
        assert_eq!(json["constructiveFeedback"], "Name the barrier");
        assert_eq!(json["suggestions"][0]["link"], "#hmw");
        assert_eq!(json["approved"], true);

        let back: FeedbackRecord = serde_json::from_value(json).unwrap();
        assert_eq!(back, record);
    }

    #[test]
    fn suggestion_accepts_legacy_url_key() {
        let suggestion: Suggestion = serde_json::from_str(
            r##"{"id":"nabc-guide","title":"NABC","description":"Deep dive","url":"#nabc"}"##,
        )
        .unwrap();
        assert_eq!(suggestion.link, "#nabc");
    }
}
