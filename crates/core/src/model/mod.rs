mod answer;
mod feedback;
mod ids;
mod insight;
mod progress;
mod settings;
mod stage;
mod submission;

pub use answer::{AnswerSet, AnswerValue, IdeaRecord};
pub use feedback::{FeedbackDraft, FeedbackRecord, Suggestion};
pub use ids::{FeedbackId, ParseIdError, UserId};
pub use insight::{
    FinalJourney, InsightReport, InsightSection, JourneyInsight, Milestone,
};
pub use progress::{JourneyProgress, ProgressError};
pub use settings::{EvaluatorKind, EvaluatorSettings, EvaluatorSettingsDraft, SettingsError};
pub use stage::{ParseStageError, Stage};
pub use submission::{StageState, StageSubmission};
