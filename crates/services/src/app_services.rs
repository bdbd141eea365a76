use std::sync::Arc;

use journey_core::model::EvaluatorSettings;
use journey_core::{Clock, ContentCatalog};
use storage::repository::Storage;

use crate::error::AppServicesError;
use crate::evaluator::build_evaluator;
use crate::gateway::{ModelGateway, OpenAiGateway, SafetyFilteredGateway};
use crate::journey::{JourneyInsightAggregator, StageProgressionController};
use crate::journey_store::JourneyStore;

/// Assembles the journey services over one storage backend.
#[derive(Clone)]
pub struct AppServices {
    settings: EvaluatorSettings,
    catalog: Arc<ContentCatalog>,
    controller: Arc<StageProgressionController>,
    insights: Arc<JourneyInsightAggregator>,
    journeys: Arc<JourneyStore>,
    remote_enabled: bool,
}

impl AppServices {
    /// Build services backed by `SQLite` storage.
    ///
    /// # Errors
    ///
    /// Returns `AppServicesError` if storage initialization or catalog loading fails.
    pub async fn new_sqlite(
        db_url: &str,
        clock: Clock,
        settings: EvaluatorSettings,
    ) -> Result<Self, AppServicesError> {
        let storage = Storage::sqlite(db_url).await?;
        Self::assemble(&storage, clock, settings)
    }

    /// Build services over in-memory storage.
    ///
    /// # Errors
    ///
    /// Returns `AppServicesError` if the builtin catalog cannot be loaded.
    pub fn in_memory(clock: Clock, settings: EvaluatorSettings) -> Result<Self, AppServicesError> {
        Self::assemble(&Storage::in_memory(), clock, settings)
    }

    fn assemble(
        storage: &Storage,
        clock: Clock,
        settings: EvaluatorSettings,
    ) -> Result<Self, AppServicesError> {
        let catalog = Arc::new(ContentCatalog::builtin()?);
        let remote = OpenAiGateway::from_settings(&settings);
        let remote_enabled = remote.enabled();
        let gateway: Arc<dyn ModelGateway> = Arc::new(SafetyFilteredGateway::new(remote));

        let evaluator = build_evaluator(&settings, Arc::clone(&gateway));
        let controller = Arc::new(
            StageProgressionController::new(Arc::clone(&catalog), evaluator, clock)
                .with_timeout(settings.timeout()),
        );
        let insights = Arc::new(JourneyInsightAggregator::new(Arc::clone(&catalog), gateway));
        let journeys = Arc::new(JourneyStore::new(Arc::clone(&storage.journeys)));

        Ok(Self {
            settings,
            catalog,
            controller,
            insights,
            journeys,
            remote_enabled,
        })
    }

    #[must_use]
    pub fn settings(&self) -> &EvaluatorSettings {
        &self.settings
    }

    #[must_use]
    pub fn catalog(&self) -> Arc<ContentCatalog> {
        Arc::clone(&self.catalog)
    }

    #[must_use]
    pub fn controller(&self) -> Arc<StageProgressionController> {
        Arc::clone(&self.controller)
    }

    #[must_use]
    pub fn insights(&self) -> Arc<JourneyInsightAggregator> {
        Arc::clone(&self.insights)
    }

    #[must_use]
    pub fn journeys(&self) -> Arc<JourneyStore> {
        Arc::clone(&self.journeys)
    }

    /// True when an API key is configured, so insights can be requested.
    #[must_use]
    pub fn remote_enabled(&self) -> bool {
        self.remote_enabled
    }
}
