use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

//
// ─── IDEAS ─────────────────────────────────────────────────────────────────────
//

/// One solution idea captured during Ideate.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct IdeaRecord {
    pub title: String,
    pub benefit: String,
    pub uniqueness: String,
    pub risk: String,
}

impl IdeaRecord {
    #[must_use]
    pub fn new(
        title: impl Into<String>,
        benefit: impl Into<String>,
        uniqueness: impl Into<String>,
        risk: impl Into<String>,
    ) -> Self {
        Self {
            title: title.into(),
            benefit: benefit.into(),
            uniqueness: uniqueness.into(),
            risk: risk.into(),
        }
    }

    fn is_blank(&self) -> bool {
        [&self.title, &self.benefit, &self.uniqueness, &self.risk]
            .iter()
            .all(|field| field.trim().is_empty())
    }
}

//
// ─── ANSWER VALUE ──────────────────────────────────────────────────────────────
//

/// A single answer: free text, or the structured idea list used by Ideate.
///
/// Serialized untagged so stored journeys keep the plain
/// `{ "questionId": "text" | [ideas] }` shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AnswerValue {
    Text(String),
    Ideas(Vec<IdeaRecord>),
}

impl AnswerValue {
    #[must_use]
    pub fn text(value: impl Into<String>) -> Self {
        Self::Text(value.into())
    }

    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            AnswerValue::Text(text) => Some(text),
            AnswerValue::Ideas(_) => None,
        }
    }

    #[must_use]
    pub fn as_ideas(&self) -> Option<&[IdeaRecord]> {
        match self {
            AnswerValue::Ideas(ideas) => Some(ideas),
            AnswerValue::Text(_) => None,
        }
    }

    /// True when the answer carries no usable content.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        match self {
            AnswerValue::Text(text) => text.trim().is_empty(),
            AnswerValue::Ideas(ideas) => ideas.iter().all(IdeaRecord::is_blank),
        }
    }

    /// Renders the answer the way it is quoted inside model prompts.
    #[must_use]
    pub fn to_prompt_text(&self) -> String {
        match self {
            AnswerValue::Text(text) => text.trim().to_string(),
            AnswerValue::Ideas(ideas) => ideas
                .iter()
                .enumerate()
                .map(|(idx, idea)| {
                    format!(
                        "Idea {}: {} (benefit: {}; uniqueness: {}; risk: {})",
                        idx + 1,
                        idea.title.trim(),
                        idea.benefit.trim(),
                        idea.uniqueness.trim(),
                        idea.risk.trim()
                    )
                })
                .collect::<Vec<_>>()
                .join("; "),
        }
    }
}

impl From<&str> for AnswerValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for AnswerValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<Vec<IdeaRecord>> for AnswerValue {
    fn from(value: Vec<IdeaRecord>) -> Self {
        Self::Ideas(value)
    }
}

//
// ─── ANSWER SET ────────────────────────────────────────────────────────────────
//

/// Answers for one stage keyed by question id.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AnswerSet(BTreeMap<String, AnswerValue>);

impl AnswerSet {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    #[must_use]
    pub fn with(mut self, question_id: impl Into<String>, value: impl Into<AnswerValue>) -> Self {
        self.insert(question_id, value);
        self
    }

    pub fn insert(&mut self, question_id: impl Into<String>, value: impl Into<AnswerValue>) {
        self.0.insert(question_id.into(), value.into());
    }

    #[must_use]
    pub fn get(&self, question_id: &str) -> Option<&AnswerValue> {
        self.0.get(question_id)
    }

    /// Text answer for `question_id`, or `None` if absent or not text.
    #[must_use]
    pub fn text(&self, question_id: &str) -> Option<&str> {
        self.get(question_id).and_then(AnswerValue::as_text)
    }

    /// True if the question has a non-blank answer.
    #[must_use]
    pub fn is_answered(&self, question_id: &str) -> bool {
        self.get(question_id).is_some_and(|value| !value.is_empty())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &AnswerValue)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<K: Into<String>, V: Into<AnswerValue>> FromIterator<(K, V)> for AnswerSet {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}
