//! Deterministic feedback scoring.
//!
//! Define and Ideate are scored against a fixed rubric on a 0..=10 scale.
//! Every other stage gets the same default feedback and is always approved.

use crate::model::{AnswerSet, AnswerValue, FeedbackDraft, IdeaRecord, Stage, Suggestion};

const MAX_SCORE: f64 = 10.0;

/// Score `answers` for `stage` and produce feedback.
#[must_use]
pub fn evaluate(stage: Stage, answers: &AnswerSet) -> FeedbackDraft {
    match stage {
        Stage::Define => evaluate_define(answers),
        Stage::Ideate => evaluate_ideate(answers),
        _ => default_feedback(),
    }
}

/// Fallback feedback for stages without a dedicated rubric.
#[must_use]
pub fn default_feedback() -> FeedbackDraft {
    FeedbackDraft {
        positive_feedback: "You've made good progress in this stage. Your answers show thoughtful consideration of the key aspects required.".into(),
        constructive_feedback: "Consider revisiting some of your answers to add more specificity and detail. Concrete examples and clear articulation will strengthen your innovation process.".into(),
        suggestions: vec![Suggestion::new(
            "general-resource-1",
            "Innovation Methods Guide",
            "Explore best practices for this stage of the design thinking process",
            "#",
        )],
        approved: true,
    }
}

fn char_len(text: Option<&str>) -> usize {
    text.map_or(0, |t| t.chars().count())
}

fn contains_any(haystack: &str, needles: &[&str]) -> bool {
    needles.iter().any(|needle| haystack.contains(needle))
}

//
// ─── DEFINE ────────────────────────────────────────────────────────────────────
//

const POV_USER_WORDS: &[&str] = &["user", "parent", "person"];
const POV_NEED_WORDS: &[&str] = &["need", "wants", "requires"];
const POV_CAUSE_WORDS: &[&str] = &["because", "due to", "as a result"];
const POV_STRUCTURE_WORDS: &[&str] = &["is experiencing", "needs to", "is trying to"];

/// Breakdown of a Define score.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DefineScore {
    pub has_pov: bool,
    pub has_target_user: bool,
    pub has_user_need: bool,
    pub has_barrier: bool,
    /// One point per POV component category present, 0..=4.
    pub pov_quality: u8,
    pub total: u8,
}

impl DefineScore {
    #[must_use]
    pub fn of(answers: &AnswerSet) -> Self {
        let has_pov = char_len(answers.text("povStatement")) > 20;
        let has_target_user = char_len(answers.text("targetUser")) > 10;
        let has_user_need = char_len(answers.text("userNeed")) > 10;
        let has_barrier = char_len(answers.text("barrier")) > 10;

        let pov_quality = pov_quality(answers.text("povStatement").unwrap_or_default());

        let presence = [
            (has_pov, 4),
            (has_target_user, 2),
            (has_user_need, 2),
            (has_barrier, 2),
        ]
        .into_iter()
        .filter(|(present, _)| *present)
        .map(|(_, points)| points)
        .sum::<u8>();

        Self {
            has_pov,
            has_target_user,
            has_user_need,
            has_barrier,
            pov_quality,
            total: (presence + pov_quality).min(10),
        }
    }
}

fn pov_quality(pov: &str) -> u8 {
    let pov = pov.to_lowercase();
    [
        POV_USER_WORDS,
        POV_NEED_WORDS,
        POV_CAUSE_WORDS,
        POV_STRUCTURE_WORDS,
    ]
    .into_iter()
    .filter(|words| contains_any(&pov, words))
    .count() as u8
}

fn evaluate_define(answers: &AnswerSet) -> FeedbackDraft {
    let score = DefineScore::of(answers);
    let mut suggestions = Vec::new();

    let positive_feedback = if score.total >= 8 {
        "Your Point of View statement is well-structured and clearly articulates who your user is, what they need, and why. You've done a great job of synthesizing your research into an actionable problem statement. The clarity of your user description and their barriers will make ideation more focused."
    } else if score.total >= 5 {
        "Your Point of View has good elements that will help guide your solution development. You've identified a specific user and their core need, which provides a solid foundation for ideation."
    } else {
        "You've made a good start in defining your problem. You've begun to identify your target user and acknowledge that they have specific needs to be addressed."
    };

    let constructive_feedback = if !score.has_pov || score.pov_quality < 2 {
        suggestions.push(Suggestion::new(
            "pov-structure",
            "Point-of-View Statement Structure",
            "Learn how to format POV statements that drive innovation",
            "#pov",
        ));
        "Your POV statement could be more structured. Try using the format \"[User] is experiencing [problem] because [cause/insight]\" to make it clearer and more actionable. Make sure to connect the user directly to their specific need and the underlying reason."
    } else if !score.has_target_user || !score.has_user_need {
        suggestions.push(Suggestion::new(
            "persona-template",
            "User Persona Development",
            "Tools for creating more specific user descriptions",
            "#persona",
        ));
        "Your definition of the user or their need lacks specificity. Try to be more concrete about who exactly is experiencing the problem and what their primary goal is. Specific user needs lead to more focused solutions."
    } else if !score.has_barrier || score.pov_quality < 3 {
        suggestions.push(Suggestion::new(
            "context-mapping",
            "Context Mapping Guide",
            "Techniques to uncover deeper insights about user barriers",
            "#contextmapping",
        ));
        "The barrier or insight in your POV could be more clearly articulated. What is the root cause or insight that explains why this need isn't being met? Understanding the \"why\" behind the problem is crucial for innovative solutions."
    } else if score.total < 8 {
        suggestions.push(Suggestion::new(
            "hmw-guide",
            "How Might We Question Framing",
            "Transform your POV into actionable design questions",
            "#hmw",
        ));
        "Consider how your POV might be reframed as \"How Might We\" questions to open up more solution possibilities. HMW questions can help you explore different aspects of your problem in the ideation phase."
    } else {
        ""
    };

    if score.total < 7 {
        suggestions.push(Suggestion::new(
            "question-analysis",
            "Question Analysis Builder",
            "Break down complex problems into manageable parts",
            "#questionanalysis",
        ));
    }

    FeedbackDraft {
        positive_feedback: positive_feedback.into(),
        constructive_feedback: constructive_feedback.into(),
        suggestions,
        approved: score.total >= 6,
    }
}

//
// ─── IDEATE ────────────────────────────────────────────────────────────────────
//

const INNOVATION_WORDS: &[&str] = &[
    "novel",
    "unique",
    "innovative",
    "original",
    "creative",
    "new approach",
];
const DIFFERENTIATION_WORDS: &[&str] = &[
    "different",
    "unlike",
    "compared to",
    "versus",
    "advantage",
    "better than",
];
const NABC_MIN_CHARS: usize = 15;
const NABC_POINTS: f64 = 2.5;

/// Breakdown of an Ideate score. Sub-scores are each on a 0..=10 scale.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IdeateScore {
    pub idea_count: usize,
    pub quality: f64,
    pub innovation: f64,
    pub differentiation: f64,
    pub has_need: bool,
    pub has_approach: bool,
    pub has_benefit: bool,
    pub has_competition: bool,
    pub nabc: f64,
    pub total: f64,
}

impl IdeateScore {
    /// `None` when `ideas` is missing, not an idea list, or empty.
    #[must_use]
    pub fn of(answers: &AnswerSet) -> Option<Self> {
        let ideas = answers.get("ideas").and_then(AnswerValue::as_ideas)?;
        if ideas.is_empty() {
            return None;
        }
        let n = ideas.len() as f64;

        let quality_points: f64 = ideas.iter().map(idea_quality_points).sum();
        let innovative = ideas.iter().filter(|idea| is_innovative(idea)).count() as f64;
        let differentiated = ideas.iter().filter(|idea| is_differentiated(idea)).count() as f64;

        let quality = (quality_points / (n * 2.0) * MAX_SCORE).min(MAX_SCORE);
        let innovation = (innovative / n * MAX_SCORE).min(MAX_SCORE);
        let differentiation = (differentiated / n * MAX_SCORE).min(MAX_SCORE);

        let nabc_present = |key: &str| char_len(answers.text(key)) >= NABC_MIN_CHARS;
        let has_need = nabc_present("needStatement");
        let has_approach = nabc_present("approachStatement");
        let has_benefit = nabc_present("benefitStatement");
        let has_competition = nabc_present("competitionStatement");
        let nabc = [has_need, has_approach, has_benefit, has_competition]
            .into_iter()
            .filter(|present| *present)
            .count() as f64
            * NABC_POINTS;

        let total = (quality * 0.3 + innovation * 0.2 + differentiation * 0.2 + nabc * 0.3)
            .clamp(0.0, MAX_SCORE);

        Some(Self {
            idea_count: ideas.len(),
            quality,
            innovation,
            differentiation,
            has_need,
            has_approach,
            has_benefit,
            has_competition,
            nabc,
            total,
        })
    }

    /// First missing NABC part, in Need > Approach > Benefit > Competition order.
    #[must_use]
    pub fn weakest_nabc_part(&self) -> &'static str {
        if !self.has_need {
            "Need"
        } else if !self.has_approach {
            "Approach"
        } else if !self.has_benefit {
            "Benefit"
        } else {
            "Competition"
        }
    }

    #[must_use]
    pub fn is_approved(&self) -> bool {
        self.total >= 6.0 && self.idea_count >= 3 && self.nabc >= 5.0
    }
}

fn idea_quality_points(idea: &IdeaRecord) -> f64 {
    let checks = [
        idea.title.chars().count() > 5,
        idea.benefit.chars().count() > 10,
        idea.uniqueness.chars().count() > 10,
        idea.risk.chars().count() > 10,
    ];
    checks.into_iter().filter(|ok| *ok).count() as f64 * 0.5
}

fn is_innovative(idea: &IdeaRecord) -> bool {
    let text = format!("{}{}{}", idea.title, idea.benefit, idea.uniqueness).to_lowercase();
    contains_any(&text, INNOVATION_WORDS)
}

fn is_differentiated(idea: &IdeaRecord) -> bool {
    contains_any(&idea.uniqueness.to_lowercase(), DIFFERENTIATION_WORDS)
}

fn evaluate_ideate(answers: &AnswerSet) -> FeedbackDraft {
    let Some(score) = IdeateScore::of(answers) else {
        return default_feedback();
    };
    let mut suggestions = Vec::new();

    let positive_feedback = if score.total >= 8.0 {
        "Your ideation work is excellent! You've presented a diverse set of well-articulated ideas with clear benefits and unique value propositions. Your NABC framework effectively communicates the key aspects of your selected solution."
    } else if score.total >= 5.0 {
        "You've made good progress in generating solution ideas. Your ideas address the problem identified in your POV statement, and your NABC framework provides a solid foundation for moving forward."
    } else {
        "You've started the ideation process and generated some solution concepts. The ideas relate to your problem space and show potential."
    };

    let constructive_feedback = if score.idea_count < 3 {
        suggestions.push(Suggestion::new(
            "scamper-method",
            "SCAMPER Ideation Technique",
            "A structured approach to transform existing ideas into new concepts",
            "#scamper",
        ));
        "Consider generating more diverse solution ideas (aim for at least 3-5). Try using the SCAMPER technique.".to_string()
    } else if score.innovation < 5.0 {
        suggestions.push(Suggestion::new(
            "blue-ocean",
            "Blue Ocean Strategy Canvas",
            "Create uncontested market space by breaking the value-cost trade-off",
            "#blueocean",
        ));
        "Try to explore more innovative ideas. Think about analogies or inspiration from different industries.".to_string()
    } else if score.differentiation < 5.0 {
        suggestions.push(Suggestion::new(
            "competition-analysis",
            "Competitive Differentiation Framework",
            "Techniques for positioning your solution against alternatives",
            "#competition",
        ));
        "Clarify how your ideas are different from current solutions. Emphasize the competitive edge.".to_string()
    } else if score.nabc < 7.0 {
        suggestions.push(Suggestion::new(
            "nabc-guide",
            "NABC Framework Deep Dive",
            "How to craft compelling Need-Approach-Benefit-Competition statements",
            "#nabc",
        ));
        format!(
            "Your NABC framework could be stronger, especially the {} part. Be specific and comparative.",
            score.weakest_nabc_part()
        )
    } else if score.total < 7.0 {
        "Your ideas are taking shape. Compare them on impact and feasibility to decide which one deserves a prototype first.".to_string()
    } else {
        String::new()
    };

    if score.total < 7.0 {
        suggestions.push(Suggestion::new(
            "dot-voting",
            "2x2 Matrix for Idea Evaluation",
            "Prioritize ideas based on impact and feasibility",
            "#matrix",
        ));
    }

    FeedbackDraft {
        positive_feedback: positive_feedback.into(),
        constructive_feedback,
        suggestions,
        approved: score.is_approved(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn suggestion_ids(draft: &FeedbackDraft) -> Vec<&str> {
        draft.suggestions.iter().map(|s| s.id.as_str()).collect()
    }

    fn exemplary_define() -> AnswerSet {
        AnswerSet::new()
            .with(
                "povStatement",
                "A busy parent is experiencing difficulty cooking because they lack time",
            )
            .with("targetUser", "busy parent")
            .with("userNeed", "quick meals")
            .with("barrier", "limited time")
    }

    fn strong_idea(title: &str) -> IdeaRecord {
        IdeaRecord::new(
            title,
            "Saves every family an hour of planning each week",
            "A novel pairing of local farms, unlike grocery apps",
            "Suppliers may not scale with early demand",
        )
    }

    fn full_nabc(answers: AnswerSet) -> AnswerSet {
        answers
            .with("needStatement", "Working parents need healthy dinners fast")
            .with("approachStatement", "Weekly kits with ten-minute recipes")
            .with("benefitStatement", "Saves an hour a day for the household")
            .with("competitionStatement", "Cheaper than delivery, healthier than takeout")
    }

    #[test]
    fn exemplary_define_answers_are_approved() {
        let score = DefineScore::of(&exemplary_define());
        assert_eq!(score.pov_quality, 3);
        assert_eq!(score.total, 10);

        let draft = evaluate(Stage::Define, &exemplary_define());
        assert!(draft.approved);
        assert!(draft.positive_feedback.starts_with("Your Point of View statement is well-structured"));
        assert!(draft.suggestions.is_empty());
    }

    #[test]
    fn weak_define_pov_is_rejected_with_structure_advice() {
        let answers = AnswerSet::new().with("povStatement", "bad");
        let draft = evaluate(Stage::Define, &answers);

        assert!(!draft.approved);
        assert!(draft.constructive_feedback.contains("[User] is experiencing [problem]"));
        assert_eq!(suggestion_ids(&draft), vec!["pov-structure", "question-analysis"]);
    }

    #[test]
    fn define_score_never_drops_when_a_field_is_added() {
        let fields = [
            ("povStatement", "A busy parent is experiencing stress because of time"),
            ("targetUser", "A busy working parent"),
            ("userNeed", "Nutritious meals in minutes"),
            ("barrier", "Long commute and late meetings"),
        ];

        for mask in 0u8..16 {
            let base: AnswerSet = fields
                .iter()
                .enumerate()
                .filter(|(idx, _)| mask & (1 << *idx) != 0)
                .map(|(_, (k, v))| (*k, *v))
                .collect();
            let before = DefineScore::of(&base).total;

            for (idx, (key, value)) in fields.iter().enumerate() {
                if mask & (1 << idx) == 0 {
                    let after = DefineScore::of(&base.clone().with(*key, *value)).total;
                    assert!(after >= before, "adding {key} lowered {before} to {after}");
                }
            }
        }
    }

    #[test]
    fn define_gap_order_prefers_persona_before_barrier() {
        let answers = AnswerSet::new()
            .with(
                "povStatement",
                "A busy parent is experiencing stress because they need time",
            )
            .with("barrier", "Long commute and late meetings");
        let draft = evaluate(Stage::Define, &answers);
        assert_eq!(draft.suggestions[0].id, "persona-template");
    }

    #[test]
    fn empty_or_missing_ideas_fall_back_to_default_feedback() {
        let empty = AnswerSet::new().with("ideas", Vec::<IdeaRecord>::new());
        assert_eq!(evaluate(Stage::Ideate, &empty), default_feedback());

        let text = AnswerSet::new().with("ideas", "three ideas in prose");
        assert_eq!(evaluate(Stage::Ideate, &text), default_feedback());

        assert_eq!(evaluate(Stage::Ideate, &AnswerSet::new()), default_feedback());
        assert!(default_feedback().approved);
    }

    #[test]
    fn strong_ideation_is_approved() {
        let answers = full_nabc(AnswerSet::new().with(
            "ideas",
            vec![
                strong_idea("Meal kit club"),
                strong_idea("Recipe planner"),
                strong_idea("Shared kitchen"),
            ],
        ));
        let score = IdeateScore::of(&answers).unwrap();
        assert_eq!(score.quality, 10.0);
        assert_eq!(score.innovation, 10.0);
        assert_eq!(score.differentiation, 10.0);
        assert_eq!(score.nabc, 10.0);
        assert!((score.total - 10.0).abs() < 1e-9);

        let draft = evaluate(Stage::Ideate, &answers);
        assert!(draft.approved);
        assert!(draft.constructive_feedback.is_empty());
    }

    #[test]
    fn middling_ideation_gets_prioritization_advice() {
        let terse = |title: &str| IdeaRecord::new(title, "novel", "unlike", "");
        let answers = AnswerSet::new()
            .with("ideas", vec![terse("Kits"), terse("Plan"), terse("Cook")])
            .with("needStatement", "Working parents need healthy dinners fast")
            .with("approachStatement", "Weekly kits with ten-minute recipes")
            .with("benefitStatement", "Saves an hour a day for the household");
        let score = IdeateScore::of(&answers).unwrap();
        assert_eq!(score.quality, 0.0);
        assert_eq!(score.nabc, 7.5);
        assert!(score.total < 7.0);

        let draft = evaluate(Stage::Ideate, &answers);
        assert!(draft.constructive_feedback.starts_with("Your ideas are taking shape"));
        assert_eq!(suggestion_ids(&draft), vec!["dot-voting"]);
        assert!(draft.approved);
    }

    #[test]
    fn too_few_ideas_block_approval() {
        let answers = full_nabc(
            AnswerSet::new().with("ideas", vec![strong_idea("Meal kit club")]),
        );
        let draft = evaluate(Stage::Ideate, &answers);
        assert!(!draft.approved);
        assert_eq!(draft.suggestions[0].id, "scamper-method");
    }

    #[test]
    fn weak_nabc_names_first_missing_part() {
        let answers = AnswerSet::new()
            .with(
                "ideas",
                vec![
                    strong_idea("Meal kit club"),
                    strong_idea("Recipe planner"),
                    strong_idea("Shared kitchen"),
                ],
            )
            .with("needStatement", "Working parents need healthy dinners fast")
            .with("approachStatement", "short");
        let draft = evaluate(Stage::Ideate, &answers);

        assert!(draft.constructive_feedback.contains("especially the Approach part"));
        assert_eq!(draft.suggestions[0].id, "nabc-guide");
        assert!(!draft.approved);
    }

    #[test]
    fn nabc_statement_of_exactly_fifteen_chars_counts() {
        let answers = AnswerSet::new()
            .with("ideas", vec![strong_idea("Meal kit club")])
            .with("needStatement", "fifteen chars!!");
        assert!(IdeateScore::of(&answers).unwrap().has_need);
    }

    #[test]
    fn identical_answers_score_identically() {
        let answers = exemplary_define();
        assert_eq!(
            evaluate(Stage::Define, &answers),
            evaluate(Stage::Define, &answers)
        );
    }

    #[test]
    fn other_stages_always_approve() {
        let others = [
            Stage::Understand,
            Stage::Observe,
            Stage::Prototype,
            Stage::Test,
            Stage::Reflect,
        ];
        for stage in others {
            assert_eq!(evaluate(stage, &AnswerSet::new()), default_feedback());
        }
    }
}
