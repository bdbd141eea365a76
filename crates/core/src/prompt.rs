//! Prompt text sent to the remote model.

use std::fmt::Write as _;

use crate::catalog::{ContentCatalog, StageContent};
use crate::model::{AnswerSet, AnswerValue, JourneyProgress, Stage};

pub const FEEDBACK_SYSTEM_PROMPT: &str = "You are a helpful feedback assistant.";
pub const INSIGHT_SYSTEM_PROMPT: &str = "You are a helpful AI journey summarizer.";

pub const NO_ANSWER: &str = "No answer provided.";
pub const NO_HISTORY: &str = "No prior stages completed yet.";

/// A question of the stage being reviewed with the learner's answer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuestionAnswer {
    pub question: String,
    pub answer: String,
}

/// An answer from an earlier, completed stage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryEntry {
    pub stage: Stage,
    pub question: String,
    pub answer: String,
}

/// An answer plus the feedback it received, for journey summaries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InsightEntry {
    pub stage: Stage,
    pub question: String,
    pub answer: String,
    pub ai_feedback: Option<String>,
}

//
// ─── INPUT ASSEMBLY ────────────────────────────────────────────────────────────
//

/// Every catalog question of `stage` in order, with blank or missing answers
/// replaced by [`NO_ANSWER`].
#[must_use]
pub fn current_answers(
    catalog: &ContentCatalog,
    stage: Stage,
    answers: &AnswerSet,
) -> Vec<QuestionAnswer> {
    catalog
        .stage(stage)
        .questions
        .iter()
        .map(|q| QuestionAnswer {
            question: q.question.clone(),
            answer: answers
                .get(&q.id)
                .filter(|value| !value.is_empty())
                .map_or_else(|| NO_ANSWER.to_string(), AnswerValue::to_prompt_text),
        })
        .collect()
}

/// Answers of all completed stages, in methodology order.
#[must_use]
pub fn history(catalog: &ContentCatalog, progress: &JourneyProgress) -> Vec<HistoryEntry> {
    insight_entries(catalog, progress)
        .into_iter()
        .map(|entry| HistoryEntry {
            stage: entry.stage,
            question: entry.question,
            answer: entry.answer,
        })
        .collect()
}

/// Answers of all completed stages with the positive feedback each stage received.
#[must_use]
pub fn insight_entries(catalog: &ContentCatalog, progress: &JourneyProgress) -> Vec<InsightEntry> {
    let mut entries = Vec::new();
    for stage in progress.completed_stages() {
        let Some(submission) = progress.submission(*stage) else {
            continue;
        };
        let feedback = submission
            .feedback()
            .map(|f| f.positive_feedback().to_string());
        let content = catalog.stage(*stage);

        for (question_id, value) in ordered_answers(content, submission.answers()) {
            entries.push(InsightEntry {
                stage: *stage,
                question: catalog.question_text(*stage, question_id).to_string(),
                answer: value.to_prompt_text(),
                ai_feedback: feedback.clone(),
            });
        }
    }
    entries
}

/// Answers in catalog question order, then any extra ids in key order.
fn ordered_answers<'a>(
    content: &'a StageContent,
    answers: &'a AnswerSet,
) -> Vec<(&'a str, &'a AnswerValue)> {
    let mut ordered: Vec<(&str, &AnswerValue)> = content
        .questions
        .iter()
        .filter_map(|q| answers.get(&q.id).map(|value| (q.id.as_str(), value)))
        .collect();
    ordered.extend(
        answers
            .iter()
            .filter(|(id, _)| content.question(id).is_none()),
    );
    ordered
}

//
// ─── TEMPLATES ─────────────────────────────────────────────────────────────────
//

/// Prompt asking for feedback on the current stage, given earlier progress.
#[must_use]
pub fn feedback_prompt(
    stage_name: &str,
    current: &[QuestionAnswer],
    previous: &[HistoryEntry],
) -> String {
    let previous_formatted = if previous.is_empty() {
        NO_HISTORY.to_string()
    } else {
        previous
            .iter()
            .enumerate()
            .map(|(idx, qa)| {
                format!(
                    "{}. [{}] Question: {}\n   Answer: {}",
                    idx + 1,
                    qa.stage.key(),
                    qa.question,
                    qa.answer
                )
            })
            .collect::<Vec<_>>()
            .join("\n\n")
    };

    let current_formatted = current
        .iter()
        .enumerate()
        .map(|(idx, qa)| format!("{}. Question: {}\n   Answer: {}", idx + 1, qa.question, qa.answer))
        .collect::<Vec<_>>()
        .join("\n\n");

    format!(
        r#"
You are reviewing a user's responses for the "{stage_name}" Stage of a design thinking entrepreneurship platform.

Project Context:
This platform is an AI-powered entrepreneurship development environment designed to help users systematically refine, validate, and scale their business ideas.

The platform is built around the Design Thinking methodology and is structured into seven key stages: Understand, Observe, Define Point of View, Ideate, Prototype, Test, and Reflect.

Each stage is supported by a modular learning architecture combined with real-time feedback mechanisms powered by large language models (LLMs). Users are guided through rigorous conceptual design, user observation, synthesis, prototyping, and testing phases, ensuring iterative validation of assumptions and market needs.

The platform promotes hypothesis-driven innovation, encourages empirical learning, and provides structured evaluation frameworks to systematically reduce uncertainty and build scalable, sustainable business models.

Below is a summary of the user's previous progress across earlier stages:
{previous_formatted}

Now, here are the user's responses for the current "{stage_name}" stage:
{current_formatted}

Your job is to give feedback considering the current stage while also ensuring continuity, logical consistency, and strategic progression from earlier stages.

If the answer is irrelevant to the questions write:
"Please ensure to provide more detailed and insightful analysis for the questions." in both positiveFeedback and constructiveFeedback.

Respond in STRICT JSON format like this:
{{
  "positiveFeedback": "...",
  "constructiveFeedback": "..."
}}
"#
    )
}

/// Prompt asking for a three-section summary of the whole journey.
#[must_use]
pub fn insight_prompt(entries: &[InsightEntry]) -> String {
    let mut lines = String::new();
    for (idx, entry) in entries.iter().enumerate() {
        if idx > 0 {
            lines.push_str("\n\n");
        }
        let _ = write!(
            lines,
            "{}. [{}] Question: {}\n   Answer: {}\n   AI Feedback: {}",
            idx + 1,
            entry.stage.key(),
            entry.question,
            entry.answer,
            entry.ai_feedback.as_deref().unwrap_or("N/A")
        );
    }

    format!(
        r#"
You are a design-thinking coach analyzing a user's full 7-stage innovation journey on an entrepreneurship development platform.
Each stage corresponds to a core phase in the design thinking methodology:
**Understand, Observe, Define Point of View, Ideate, Prototype, Test, and Reflect.**

Below are the user's full Q&A submissions and the AI feedback they received for each stage:

{lines}

Now, your task is to analyze these submissions and produce a JSON object in the **exact structure and wording** below. However, the content should be **fully personalized and synthesized** based on the actual journey of the user. Use natural, mid-length summaries that reflect how the idea matured through the 7 stages.

## INSTRUCTIONS:

1. In **initialUnderstanding.summary**, describe the user’s original business idea, its focus, scope, and overall structure when first introduced in stages 1–2 (Understand, Observe). Highlight key traits and gaps.

2. In **solutionProgress.summary**, discuss how the idea was refined, what gaps or weak points were improved through Define → Prototype stages, and how feedback contributed to clarity, feasibility, and impact.

3. In **finalJourney.overall**, summarize the end result: how the concept evolved into a mature and well-rounded solution. Mention what the final direction looks like, how well it fits the target users, and its innovation value.

4. The **patterns**, **evolution**, and **achievements** should be detailed and match insights extracted from actual Q&A+feedback history.

## Output Format (DO NOT change structure or key names):

{{
  "initialUnderstanding": {{
    "summary": "<Describe the original idea, intent, and insights from stages 1-2>",
    "patterns": [
      "<List key observations about stakeholder focus, need clarity, etc.>",
      "<Another pattern from early stages>",
      "<Another early-stage insight>"
    ],
    "evolution": "<Explain how the problem space or user understanding matured between Understand and Observe>"
  }},
  "solutionProgress": {{
    "summary": "<Describe how the idea evolved through Define to Prototype, with mention of changes, challenges, and improvements>",
    "patterns": [
      "<Pattern observed during mid-stage ideation>",
      "<Pattern regarding feasibility or feedback incorporation>",
      "<Pattern about user alignment or solution direction>"
    ],
    "evolution": "<Summarize how the scattered ideas became a focused solution>"
  }},
  "finalJourney": {{
    "achievements": [
      "<List major milestones: tested solution, validated assumption, etc.>",
      "<Mention final clarity, impact, or innovation points>"
    ],
    "overall": "<Provide a coherent overview of the final solution and its maturity after all 7 stages>"
  }}
}}

Respond only in **valid JSON** format. Do not include any extra commentary or explanation.
"#
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{FeedbackDraft, FeedbackId, IdeaRecord};
    use crate::time::fixed_now;

    fn catalog() -> ContentCatalog {
        ContentCatalog::builtin().unwrap()
    }

    #[test]
    fn feedback_prompt_without_history_says_so() {
        let current = vec![
            QuestionAnswer {
                question: "Who is your user?".into(),
                answer: "Commuting nurses".into(),
            },
            QuestionAnswer {
                question: "What do they need?".into(),
                answer: NO_ANSWER.into(),
            },
        ];
        let prompt = feedback_prompt("Define Point of View", &current, &[]);

        assert!(prompt.contains("for the \"Define Point of View\" Stage"));
        assert!(prompt.contains("earlier stages:\nNo prior stages completed yet.\n"));
        assert!(prompt.contains("1. Question: Who is your user?\n   Answer: Commuting nurses"));
        assert!(prompt.contains("\n\n2. Question: What do they need?\n   Answer: No answer provided."));
        assert!(prompt.contains("\"positiveFeedback\": \"...\""));
    }

    #[test]
    fn feedback_prompt_numbers_history_with_stage_keys() {
        let previous = vec![
            HistoryEntry {
                stage: Stage::Understand,
                question: "Problem?".into(),
                answer: "Meal planning".into(),
            },
            HistoryEntry {
                stage: Stage::Observe,
                question: "Patterns?".into(),
                answer: "Late dinners".into(),
            },
        ];
        let prompt = feedback_prompt("Ideate", &[], &previous);
        assert!(prompt.contains(
            "1. [understand] Question: Problem?\n   Answer: Meal planning\n\n2. [observe] Question: Patterns?"
        ));
        assert!(!prompt.contains(NO_HISTORY));
    }

    #[test]
    fn current_answers_follow_catalog_order_and_fill_gaps() {
        let answers = AnswerSet::new()
            .with("povStatement", "A parent needs time")
            .with("targetUser", "  ");
        let qa = current_answers(&catalog(), Stage::Define, &answers);

        assert_eq!(qa.len(), 4);
        assert_eq!(qa[0].question, "Describe your target user in one clear sentence");
        assert_eq!(qa[0].answer, NO_ANSWER);
        assert_eq!(qa[3].answer, "A parent needs time");
    }

    #[test]
    fn insight_entries_cover_completed_stages_only() {
        let catalog = catalog();
        let mut progress = JourneyProgress::new();
        let feedback = FeedbackDraft {
            positive_feedback: "Clear framing".into(),
            constructive_feedback: String::new(),
            suggestions: Vec::new(),
            approved: true,
        };
        progress
            .record_feedback(
                Stage::Ideate,
                AnswerSet::new()
                    .with("ideas", vec![IdeaRecord::new("Meal kit", "Time", "Local", "Cost")])
                    .with("notes", "extra"),
                feedback.into_record(FeedbackId::generate(), fixed_now()),
            )
            .unwrap();
        progress.mark_completed(Stage::Ideate).unwrap();
        progress
            .record_draft(
                Stage::Test,
                AnswerSet::new().with("test-q1", "Five parents"),
                fixed_now(),
            )
            .unwrap();

        let entries = insight_entries(&catalog, &progress);
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].question, "Present your top 3 solution ideas.");
        assert!(entries[0].answer.starts_with("Idea 1: Meal kit"));
        assert_eq!(entries[0].ai_feedback.as_deref(), Some("Clear framing"));
        assert_eq!(entries[1].question, "notes");

        let prompt = insight_prompt(&entries);
        assert!(prompt.contains("2. [ideate] Question: notes\n   Answer: extra\n   AI Feedback: Clear framing"));
        assert!(prompt.contains("(DO NOT change structure or key names)"));
    }

    #[test]
    fn insight_prompt_marks_missing_feedback() {
        let entries = vec![InsightEntry {
            stage: Stage::Test,
            question: "How did you test?".into(),
            answer: "Hallway sessions".into(),
            ai_feedback: None,
        }];
        assert!(insight_prompt(&entries).contains("AI Feedback: N/A"));
    }
}
