use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// One phase of the seven-step innovation methodology.
///
/// Variants are declared in methodology order, so the derived `Ord` is the
/// sequence a learner walks through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Stage {
    Understand,
    Observe,
    Define,
    Ideate,
    Prototype,
    Test,
    Reflect,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("unknown stage: {0}")]
pub struct ParseStageError(pub String);

impl Stage {
    pub const ALL: [Stage; 7] = [
        Stage::Understand,
        Stage::Observe,
        Stage::Define,
        Stage::Ideate,
        Stage::Prototype,
        Stage::Test,
        Stage::Reflect,
    ];

    /// Lower-case key used on the wire and in storage.
    #[must_use]
    pub fn key(self) -> &'static str {
        match self {
            Stage::Understand => "understand",
            Stage::Observe => "observe",
            Stage::Define => "define",
            Stage::Ideate => "ideate",
            Stage::Prototype => "prototype",
            Stage::Test => "test",
            Stage::Reflect => "reflect",
        }
    }

    /// Human-facing stage name.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Stage::Understand => "Understand",
            Stage::Observe => "Observe",
            Stage::Define => "Define Point of View",
            Stage::Ideate => "Ideate",
            Stage::Prototype => "Prototype",
            Stage::Test => "Test",
            Stage::Reflect => "Reflect",
        }
    }

    /// 1-based position in the methodology.
    #[must_use]
    pub fn position(self) -> usize {
        self as usize + 1
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for Stage {
    type Err = ParseStageError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim().to_ascii_lowercase();
        Stage::ALL
            .into_iter()
            .find(|stage| stage.key() == needle)
            .ok_or_else(|| ParseStageError(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stages_are_ordered_by_methodology() {
        let mut sorted = Stage::ALL;
        sorted.sort();
        assert_eq!(sorted, Stage::ALL);
        assert!(Stage::Understand < Stage::Reflect);
        assert!(Stage::Define < Stage::Ideate);
    }

    #[test]
    fn positions_are_one_based() {
        assert_eq!(Stage::Understand.position(), 1);
        assert_eq!(Stage::Define.position(), 3);
        assert_eq!(Stage::Reflect.position(), Stage::ALL.len());
    }

    #[test]
    fn parses_keys_case_insensitively() {
        assert_eq!("Ideate".parse::<Stage>().unwrap(), Stage::Ideate);
        assert_eq!(" test ".parse::<Stage>().unwrap(), Stage::Test);
        assert!("launch".parse::<Stage>().is_err());
    }

    #[test]
    fn serializes_as_lowercase_key() {
        let json = serde_json::to_string(&Stage::Prototype).unwrap();
        assert_eq!(json, "\"prototype\"");
        let back: Stage = serde_json::from_str(&json).unwrap();
        assert_eq!(back, Stage::Prototype);
    }
}
