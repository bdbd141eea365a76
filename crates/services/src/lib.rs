#![forbid(unsafe_code)]

pub mod app_services;
pub mod config;
pub mod error;
pub mod evaluator;
pub mod gateway;
pub mod journey;
pub mod journey_store;

pub use journey_core::Clock;

pub use app_services::AppServices;
pub use error::{
    AppServicesError, EvaluatorError, GatewayError, InsightError, JourneyStoreError,
    ProgressionError,
};
pub use evaluator::{
    EvaluationRequest, FeedbackEvaluator, RemoteEvaluator, RubricEvaluator, build_evaluator,
};
pub use gateway::{Completion, ModelGateway, OpenAiConfig, OpenAiGateway, SafetyFilteredGateway};
pub use journey::{JourneyHandle, JourneyInsightAggregator, StageProgressionController};
pub use journey_store::JourneyStore;
