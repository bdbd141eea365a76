use serde::{Deserialize, Serialize};

/// Completed-stage thresholds that unlock each section of the journey insight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Milestone {
    InitialUnderstanding,
    SolutionProgress,
    FinalJourney,
}

impl Milestone {
    pub const ALL: [Milestone; 3] = [
        Milestone::InitialUnderstanding,
        Milestone::SolutionProgress,
        Milestone::FinalJourney,
    ];

    /// Completed stages needed before this section may be shown.
    #[must_use]
    pub fn threshold(self) -> usize {
        match self {
            Milestone::InitialUnderstanding => 2,
            Milestone::SolutionProgress => 4,
            Milestone::FinalJourney => 6,
        }
    }

    #[must_use]
    pub fn title(self) -> &'static str {
        match self {
            Milestone::InitialUnderstanding => "Initial Problem Understanding",
            Milestone::SolutionProgress => "Solution Development Progress",
            Milestone::FinalJourney => "Final Innovation Journey",
        }
    }

    #[must_use]
    pub fn is_reached(self, completed_count: usize) -> bool {
        completed_count >= self.threshold()
    }
}

/// Summary, recurring patterns and evolution for one phase of the journey.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct InsightSection {
    pub summary: String,
    pub patterns: Vec<String>,
    pub evolution: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FinalJourney {
    pub achievements: Vec<String>,
    pub overall: String,
}

/// Cross-stage narrative synthesized by the remote model.
///
/// The JSON shape is fixed: unknown or missing keys fail deserialization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct JourneyInsight {
    pub initial_understanding: InsightSection,
    pub solution_progress: InsightSection,
    pub final_journey: FinalJourney,
}

/// A journey insight paired with the completed-stage count it was computed for.
///
/// Sections are only handed out once their milestone threshold is met, even
/// though the remote reply always carries all three.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InsightReport {
    completed_count: usize,
    insight: JourneyInsight,
}

impl InsightReport {
    #[must_use]
    pub fn new(completed_count: usize, insight: JourneyInsight) -> Self {
        Self {
            completed_count,
            insight,
        }
    }

    #[must_use]
    pub fn completed_count(&self) -> usize {
        self.completed_count
    }

    #[must_use]
    pub fn section_visible(&self, milestone: Milestone) -> bool {
        milestone.is_reached(self.completed_count)
    }

    /// Milestones whose sections may be displayed, in order.
    #[must_use]
    pub fn visible_milestones(&self) -> Vec<Milestone> {
        Milestone::ALL
            .into_iter()
            .filter(|m| self.section_visible(*m))
            .collect()
    }

    #[must_use]
    pub fn initial_understanding(&self) -> Option<&InsightSection> {
        self.section_visible(Milestone::InitialUnderstanding)
            .then_some(&self.insight.initial_understanding)
    }

    #[must_use]
    pub fn solution_progress(&self) -> Option<&InsightSection> {
        self.section_visible(Milestone::SolutionProgress)
            .then_some(&self.insight.solution_progress)
    }

    #[must_use]
    pub fn final_journey(&self) -> Option<&FinalJourney> {
        self.section_visible(Milestone::FinalJourney)
            .then_some(&self.insight.final_journey)
    }
}
