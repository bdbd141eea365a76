use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::{AnswerSet, AnswerValue, Stage};

const BUILTIN_CATALOG: &str = include_str!("../catalog/stages.json");

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum CatalogError {
    #[error("catalog JSON is invalid: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("catalog has no content for stage {0}")]
    MissingStage(Stage),

    #[error("catalog lists stage {0} more than once")]
    DuplicateStage(Stage),

    #[error("stage {stage} declares question {question_id} more than once")]
    DuplicateQuestion { stage: Stage, question_id: String },

    #[error("single-choice question {question_id} in stage {stage} has no options")]
    EmptyOptions { stage: Stage, question_id: String },
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum AnswerValidationError {
    #[error("stage {stage} is missing required answers: {}", .question_ids.join(", "))]
    MissingRequired {
        stage: Stage,
        question_ids: Vec<String>,
    },

    #[error("answer to {question_id} must be {expected}")]
    KindMismatch {
        question_id: String,
        expected: &'static str,
    },

    #[error("{value:?} is not an option for {question_id}")]
    InvalidChoice { question_id: String, value: String },
}

//
// ─── CONTENT TYPES ─────────────────────────────────────────────────────────────
//

/// Input shape a question expects.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum QuestionKind {
    Text,
    LongText,
    SingleChoice { options: Vec<String> },
    IdeaList,
}

impl QuestionKind {
    fn expects_text(&self) -> bool {
        !matches!(self, QuestionKind::IdeaList)
    }

    fn describe(&self) -> &'static str {
        match self {
            QuestionKind::IdeaList => "a list of ideas",
            _ => "text",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    pub id: String,
    pub question: String,
    #[serde(default)]
    pub placeholder: String,
    #[serde(default)]
    pub required: bool,
    #[serde(flatten)]
    pub kind: QuestionKind,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceKind {
    Article,
    Pdf,
    Template,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Resource {
    pub id: String,
    pub title: String,
    pub description: String,
    pub url: String,
    #[serde(rename = "type")]
    pub kind: ResourceKind,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub id: String,
    pub title: String,
    pub description: String,
    #[serde(default)]
    pub required: bool,
}

/// Everything shown to the learner for one stage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StageContent {
    pub stage: Stage,
    pub title: String,
    pub description: String,
    pub video_url: String,
    #[serde(default)]
    pub articles: Vec<Resource>,
    pub questions: Vec<Question>,
    #[serde(default)]
    pub tasks: Vec<Task>,
}

impl StageContent {
    #[must_use]
    pub fn question(&self, question_id: &str) -> Option<&Question> {
        self.questions.iter().find(|q| q.id == question_id)
    }
}

#[derive(Deserialize)]
struct CatalogDocument {
    stages: Vec<StageContent>,
}

//
// ─── CATALOG ───────────────────────────────────────────────────────────────────
//

/// Static per-stage content: questions, tasks and reading material.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentCatalog {
    stages: BTreeMap<Stage, StageContent>,
}

impl ContentCatalog {
    /// The catalog compiled into the binary.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError` if the embedded document fails validation.
    pub fn builtin() -> Result<Self, CatalogError> {
        Self::from_json(BUILTIN_CATALOG)
    }

    /// Parse and validate a catalog document.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError` if the JSON is malformed, a stage is missing or
    /// repeated, question ids repeat within a stage, or a single-choice
    /// question has no options.
    pub fn from_json(raw: &str) -> Result<Self, CatalogError> {
        let doc: CatalogDocument = serde_json::from_str(raw)?;

        let mut stages = BTreeMap::new();
        for content in doc.stages {
            validate_stage(&content)?;
            let stage = content.stage;
            if stages.insert(stage, content).is_some() {
                return Err(CatalogError::DuplicateStage(stage));
            }
        }

        if let Some(missing) = Stage::ALL.into_iter().find(|s| !stages.contains_key(s)) {
            return Err(CatalogError::MissingStage(missing));
        }

        Ok(Self { stages })
    }

    /// Content for `stage`. Every stage is present after validation.
    #[must_use]
    pub fn stage(&self, stage: Stage) -> &StageContent {
        &self.stages[&stage]
    }

    pub fn stages(&self) -> impl Iterator<Item = &StageContent> {
        self.stages.values()
    }

    /// Question text for `question_id`, falling back to the id itself.
    #[must_use]
    pub fn question_text<'a>(&'a self, stage: Stage, question_id: &'a str) -> &'a str {
        self.stage(stage)
            .question(question_id)
            .map_or(question_id, |q| q.question.as_str())
    }

    #[must_use]
    pub fn required_question_ids(&self, stage: Stage) -> Vec<&str> {
        self.stage(stage)
            .questions
            .iter()
            .filter(|q| q.required)
            .map(|q| q.id.as_str())
            .collect()
    }

    /// Check `answers` against the question definitions for `stage`.
    ///
    /// Answers to ids the catalog does not know are left alone.
    ///
    /// # Errors
    ///
    /// Returns `AnswerValidationError` for unanswered required questions, an
    /// answer of the wrong kind, or a single-choice value outside its options.
    pub fn validate_answers(
        &self,
        stage: Stage,
        answers: &AnswerSet,
    ) -> Result<(), AnswerValidationError> {
        let content = self.stage(stage);

        let missing: Vec<String> = content
            .questions
            .iter()
            .filter(|q| q.required && !answers.is_answered(&q.id))
            .map(|q| q.id.clone())
            .collect();
        if !missing.is_empty() {
            return Err(AnswerValidationError::MissingRequired {
                stage,
                question_ids: missing,
            });
        }

        for question in &content.questions {
            let Some(value) = answers.get(&question.id) else {
                continue;
            };

            let is_text = matches!(value, AnswerValue::Text(_));
            if question.kind.expects_text() != is_text {
                return Err(AnswerValidationError::KindMismatch {
                    question_id: question.id.clone(),
                    expected: question.kind.describe(),
                });
            }

            if let (QuestionKind::SingleChoice { options }, AnswerValue::Text(text)) =
                (&question.kind, value)
            {
                let choice = text.trim();
                if !choice.is_empty() && !options.iter().any(|opt| opt == choice) {
                    return Err(AnswerValidationError::InvalidChoice {
                        question_id: question.id.clone(),
                        value: choice.to_string(),
                    });
                }
            }
        }

        Ok(())
    }
}

fn validate_stage(content: &StageContent) -> Result<(), CatalogError> {
    let mut seen = BTreeSet::new();
    for question in &content.questions {
        if !seen.insert(question.id.as_str()) {
            return Err(CatalogError::DuplicateQuestion {
                stage: content.stage,
                question_id: question.id.clone(),
            });
        }
        if let QuestionKind::SingleChoice { options } = &question.kind {
            if options.is_empty() {
                return Err(CatalogError::EmptyOptions {
                    stage: content.stage,
                    question_id: question.id.clone(),
                });
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::IdeaRecord;

    fn catalog() -> ContentCatalog {
        ContentCatalog::builtin().unwrap()
    }

    #[test]
    fn builtin_catalog_covers_every_stage() {
        let catalog = catalog();
        assert_eq!(catalog.stages().count(), Stage::ALL.len());
        assert_eq!(catalog.stage(Stage::Define).title, "Define Point of View");
        assert_eq!(
            catalog.required_question_ids(Stage::Define),
            vec!["targetUser", "userNeed", "barrier", "povStatement"]
        );
        assert_eq!(
            catalog.stage(Stage::Ideate).question("ideas").unwrap().kind,
            QuestionKind::IdeaList
        );
    }

    #[test]
    fn question_text_falls_back_to_id() {
        let catalog = catalog();
        assert_eq!(
            catalog.question_text(Stage::Test, "test-q1"),
            "How did you test your prototype and with whom?"
        );
        assert_eq!(catalog.question_text(Stage::Test, "extra-note"), "extra-note");
    }

    #[test]
    fn rejects_catalog_missing_a_stage() {
        let mut doc: serde_json::Value = serde_json::from_str(BUILTIN_CATALOG).unwrap();
        doc["stages"].as_array_mut().unwrap().pop();
        let err = ContentCatalog::from_json(&doc.to_string()).unwrap_err();
        assert!(matches!(err, CatalogError::MissingStage(Stage::Reflect)));
    }

    #[test]
    fn rejects_duplicate_question_ids() {
        let mut doc: serde_json::Value = serde_json::from_str(BUILTIN_CATALOG).unwrap();
        let questions = doc["stages"][0]["questions"].as_array_mut().unwrap();
        let first = questions[0].clone();
        questions.push(first);
        let err = ContentCatalog::from_json(&doc.to_string()).unwrap_err();
        assert!(matches!(err, CatalogError::DuplicateQuestion { .. }));
    }

    #[test]
    fn validation_reports_all_missing_required_answers() {
        let answers = AnswerSet::new()
            .with("targetUser", "A busy working parent")
            .with("barrier", "  ");
        let err = catalog()
            .validate_answers(Stage::Define, &answers)
            .unwrap_err();
        assert_eq!(
            err,
            AnswerValidationError::MissingRequired {
                stage: Stage::Define,
                question_ids: vec![
                    "userNeed".into(),
                    "barrier".into(),
                    "povStatement".into()
                ],
            }
        );
    }

    #[test]
    fn validation_checks_answer_kinds_and_choices() {
        let catalog = catalog();

        let ideas_as_text = AnswerSet::new()
            .with("ideationMethods", "Brainstorming")
            .with("selectionRationale", "Impact and effort")
            .with("ideas", "just one idea");
        assert!(matches!(
            catalog.validate_answers(Stage::Ideate, &ideas_as_text),
            Err(AnswerValidationError::KindMismatch { .. })
        ));

        let ideas = AnswerSet::new()
            .with("ideationMethods", "Brainstorming")
            .with("selectionRationale", "Impact and effort")
            .with("ideas", vec![IdeaRecord::new("Meal kit", "", "", "")]);
        assert!(catalog.validate_answers(Stage::Ideate, &ideas).is_ok());

        let mut prototype: AnswerSet = ["prototype-q1", "prototype-q2", "prototype-q3"]
            .into_iter()
            .map(|id| (id, "Paper sketches"))
            .collect();
        prototype.insert("prototype-fidelity", "Sculpture");
        assert!(matches!(
            catalog.validate_answers(Stage::Prototype, &prototype),
            Err(AnswerValidationError::InvalidChoice { .. })
        ));

        prototype.insert("prototype-fidelity", "Low-fidelity (paper, sketches)");
        assert!(catalog.validate_answers(Stage::Prototype, &prototype).is_ok());
    }
}
