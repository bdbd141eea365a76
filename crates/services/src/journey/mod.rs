mod controller;
mod handle;
mod insights;

pub use controller::{DEFAULT_EVALUATION_TIMEOUT, StageProgressionController};
pub use handle::JourneyHandle;
pub use insights::JourneyInsightAggregator;
