use std::sync::Arc;

use journey_core::model::{InsightReport, JourneyInsight, JourneyProgress, Milestone};
use journey_core::prompt::{self, INSIGHT_SYSTEM_PROMPT};
use journey_core::ContentCatalog;
use tracing::{debug, info, warn};

use super::JourneyHandle;
use crate::error::InsightError;
use crate::gateway::ModelGateway;

/// Summarizes a journey once enough stages are completed.
#[derive(Clone)]
pub struct JourneyInsightAggregator {
    catalog: Arc<ContentCatalog>,
    gateway: Arc<dyn ModelGateway>,
}

impl JourneyInsightAggregator {
    #[must_use]
    pub fn new(catalog: Arc<ContentCatalog>, gateway: Arc<dyn ModelGateway>) -> Self {
        Self { catalog, gateway }
    }

    /// Ask the model for a journey summary.
    ///
    /// Returns `None` until the first milestone is reached.
    ///
    /// # Errors
    ///
    /// Returns `InsightError` when the gateway fails, the reply does not match
    /// the insight shape, or the safety filter blocked the journey content.
    pub async fn compute_insights(
        &self,
        progress: &JourneyProgress,
    ) -> Result<Option<InsightReport>, InsightError> {
        let completed = progress.completed_count();
        if !Milestone::InitialUnderstanding.is_reached(completed) {
            return Ok(None);
        }

        let entries = prompt::insight_entries(&self.catalog, progress);
        let user_prompt = prompt::insight_prompt(&entries);
        debug!(completed, entries = entries.len(), "insight prompt");

        let completion = self
            .gateway
            .complete(INSIGHT_SYSTEM_PROMPT, &user_prompt)
            .await?;
        if completion.filtered {
            warn!(completed, "journey insight blocked by content filter");
            return Err(InsightError::ContentFiltered);
        }

        let insight: JourneyInsight = serde_json::from_str(&completion.text).map_err(|e| {
            warn!(error = %e, "malformed insight reply");
            InsightError::MalformedResponse(e.to_string())
        })?;

        info!(completed, "journey insight computed");
        Ok(Some(InsightReport::new(completed, insight)))
    }

    /// Recompute only when the completed-stage count moved since `previous`.
    ///
    /// # Errors
    ///
    /// Same as [`Self::compute_insights`].
    pub async fn refresh(
        &self,
        handle: &JourneyHandle,
        previous: Option<InsightReport>,
    ) -> Result<Option<InsightReport>, InsightError> {
        let progress = handle.snapshot();
        match previous {
            Some(report) if report.completed_count() == progress.completed_count() => {
                Ok(Some(report))
            }
            _ => self.compute_insights(&progress).await,
        }
    }
}
