//! Feedback strategies: the local rubric and the remote model.

use std::sync::Arc;

use async_trait::async_trait;
use journey_core::model::{AnswerSet, EvaluatorKind, EvaluatorSettings, FeedbackDraft, Stage};
use journey_core::prompt::FEEDBACK_SYSTEM_PROMPT;
use journey_core::rubric;
use serde::Deserialize;
use tracing::{info, warn};

use crate::error::EvaluatorError;
use crate::gateway::ModelGateway;

/// Everything an evaluator may look at for one submission.
#[derive(Debug, Clone)]
pub struct EvaluationRequest {
    pub stage: Stage,
    pub answers: AnswerSet,
    /// Fully synthesized feedback prompt, including earlier stages.
    pub prompt: String,
}

#[async_trait]
pub trait FeedbackEvaluator: Send + Sync {
    fn kind(&self) -> EvaluatorKind;

    /// Judge one submission.
    ///
    /// # Errors
    ///
    /// Returns `EvaluatorError` when the remote call fails or its reply does
    /// not match the feedback shape.
    async fn evaluate(&self, request: &EvaluationRequest) -> Result<FeedbackDraft, EvaluatorError>;
}

/// Deterministic keyword and length scoring.
#[derive(Debug, Clone, Copy, Default)]
pub struct RubricEvaluator;

#[async_trait]
impl FeedbackEvaluator for RubricEvaluator {
    fn kind(&self) -> EvaluatorKind {
        EvaluatorKind::Rubric
    }

    async fn evaluate(&self, request: &EvaluationRequest) -> Result<FeedbackDraft, EvaluatorError> {
        Ok(rubric::evaluate(request.stage, &request.answers))
    }
}

/// Feedback written by the remote model.
#[derive(Clone)]
pub struct RemoteEvaluator {
    gateway: Arc<dyn ModelGateway>,
}

impl RemoteEvaluator {
    #[must_use]
    pub fn new(gateway: Arc<dyn ModelGateway>) -> Self {
        Self { gateway }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
struct FeedbackReply {
    positive_feedback: String,
    constructive_feedback: String,
}

#[async_trait]
impl FeedbackEvaluator for RemoteEvaluator {
    fn kind(&self) -> EvaluatorKind {
        EvaluatorKind::Remote
    }

    async fn evaluate(&self, request: &EvaluationRequest) -> Result<FeedbackDraft, EvaluatorError> {
        let completion = self
            .gateway
            .complete(FEEDBACK_SYSTEM_PROMPT, &request.prompt)
            .await?;

        let reply: FeedbackReply = serde_json::from_str(&completion.text).map_err(|e| {
            warn!(stage = %request.stage, error = %e, "malformed feedback reply");
            EvaluatorError::MalformedResponse(e.to_string())
        })?;
        if completion.filtered {
            info!(stage = %request.stage, "safe-harbor feedback returned");
        }

        // A safe-harbor reply is a normal answer, not a rejection.
        Ok(FeedbackDraft {
            positive_feedback: reply.positive_feedback,
            constructive_feedback: reply.constructive_feedback,
            suggestions: Vec::new(),
            approved: true,
        })
    }
}

/// Evaluator for the configured strategy.
#[must_use]
pub fn build_evaluator(
    settings: &EvaluatorSettings,
    gateway: Arc<dyn ModelGateway>,
) -> Arc<dyn FeedbackEvaluator> {
    match settings.kind() {
        EvaluatorKind::Rubric => Arc::new(RubricEvaluator),
        EvaluatorKind::Remote => Arc::new(RemoteEvaluator::new(gateway)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::GatewayError;
    use crate::gateway::{Completion, SafetyFilteredGateway};
    use journey_core::safety::{SAFE_HARBOR_CONSTRUCTIVE, SAFE_HARBOR_POSITIVE};

    struct FixedGateway(&'static str);

    #[async_trait]
    impl ModelGateway for FixedGateway {
        async fn complete(&self, system: &str, _user: &str) -> Result<Completion, GatewayError> {
            assert_eq!(system, FEEDBACK_SYSTEM_PROMPT);
            Ok(Completion::model(self.0))
        }
    }

    fn request(prompt: &str) -> EvaluationRequest {
        EvaluationRequest {
            stage: Stage::Observe,
            answers: AnswerSet::new().with("observe-q1", "Queues at the pharmacy"),
            prompt: prompt.to_string(),
        }
    }

    #[tokio::test]
    async fn remote_reply_is_parsed_and_approved() {
        let evaluator = RemoteEvaluator::new(Arc::new(FixedGateway(
            r#"{"positiveFeedback":"Sharp observation","constructiveFeedback":"Talk to staff too"}"#,
        )));

        let draft = evaluator.evaluate(&request("prompt")).await.unwrap();
        assert_eq!(draft.positive_feedback, "Sharp observation");
        assert_eq!(draft.constructive_feedback, "Talk to staff too");
        assert!(draft.suggestions.is_empty());
        assert!(draft.approved);
    }

    #[tokio::test]
    async fn remote_reply_with_extra_keys_is_malformed() {
        let evaluator = RemoteEvaluator::new(Arc::new(FixedGateway(
            r#"{"positiveFeedback":"a","constructiveFeedback":"b","score":7}"#,
        )));
        let err = evaluator.evaluate(&request("prompt")).await.unwrap_err();
        assert!(matches!(err, EvaluatorError::MalformedResponse(_)));
    }

    #[tokio::test]
    async fn remote_reply_in_prose_is_malformed() {
        let evaluator = RemoteEvaluator::new(Arc::new(FixedGateway("Looks great!")));
        let err = evaluator.evaluate(&request("prompt")).await.unwrap_err();
        assert!(matches!(err, EvaluatorError::MalformedResponse(_)));
    }

    #[tokio::test]
    async fn filtered_reply_is_approved_safe_harbor() {
        let gateway = SafetyFilteredGateway::new(FixedGateway("unused"));
        let evaluator = RemoteEvaluator::new(Arc::new(gateway));

        let draft = evaluator
            .evaluate(&request("I feel worthless about this"))
            .await
            .unwrap();
        assert_eq!(draft.positive_feedback, SAFE_HARBOR_POSITIVE);
        assert_eq!(draft.constructive_feedback, SAFE_HARBOR_CONSTRUCTIVE);
        assert!(draft.approved);
    }

    #[tokio::test]
    async fn everyday_words_caught_by_the_filter_still_pass() {
        let gateway = SafetyFilteredGateway::new(FixedGateway("unused"));
        let evaluator = RemoteEvaluator::new(Arc::new(gateway));

        let draft = evaluator
            .evaluate(&request("Our target audience is commuters who studied late"))
            .await
            .unwrap();
        assert_eq!(draft.positive_feedback, SAFE_HARBOR_POSITIVE);
        assert!(draft.approved);
    }

    #[tokio::test]
    async fn settings_pick_the_strategy() {
        let gateway: Arc<dyn ModelGateway> = Arc::new(FixedGateway("unused"));
        let evaluator = build_evaluator(&EvaluatorSettings::rubric(), gateway);
        assert_eq!(evaluator.kind(), EvaluatorKind::Rubric);

        let draft = evaluator.evaluate(&request("ignored")).await.unwrap();
        assert_eq!(draft, rubric::default_feedback());
    }
}
