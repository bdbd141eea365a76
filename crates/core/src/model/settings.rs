use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use thiserror::Error;
use url::Url;

pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_MODEL: &str = "gpt-4";
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// Which feedback strategy a journey is evaluated with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EvaluatorKind {
    #[default]
    Rubric,
    Remote,
}

impl EvaluatorKind {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            EvaluatorKind::Rubric => "rubric",
            EvaluatorKind::Remote => "remote",
        }
    }
}

impl fmt::Display for EvaluatorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EvaluatorKind {
    type Err = SettingsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "rubric" => Ok(Self::Rubric),
            "remote" | "llm" => Ok(Self::Remote),
            other => Err(SettingsError::UnknownEvaluator(other.to_string())),
        }
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum SettingsError {
    #[error("unknown evaluator: {0}")]
    UnknownEvaluator(String),
    #[error("invalid base URL")]
    InvalidBaseUrl,
    #[error("the remote evaluator needs an API key")]
    MissingApiKey,
    #[error("timeout must be > 0 seconds")]
    InvalidTimeout,
}

/// Unvalidated evaluator configuration, as read from env or CLI flags.
#[derive(Clone, Debug, Default)]
pub struct EvaluatorSettingsDraft {
    pub kind: EvaluatorKind,
    pub api_key: Option<String>,
    pub api_base_url: Option<String>,
    pub api_model: Option<String>,
    pub timeout_secs: Option<u64>,
}

impl EvaluatorSettingsDraft {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate and normalize the draft.
    ///
    /// # Errors
    ///
    /// Returns `SettingsError` if the base URL is invalid, the timeout is zero,
    /// or the remote evaluator is selected without an API key.
    pub fn validate(self) -> Result<EvaluatorSettings, SettingsError> {
        let api_key = normalize_optional(self.api_key);
        let api_base_url =
            normalize_optional(self.api_base_url).unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        let api_model =
            normalize_optional(self.api_model).unwrap_or_else(|| DEFAULT_MODEL.to_string());
        let timeout_secs = self.timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS);

        if Url::parse(&api_base_url).is_err() {
            return Err(SettingsError::InvalidBaseUrl);
        }
        if timeout_secs == 0 {
            return Err(SettingsError::InvalidTimeout);
        }
        if self.kind == EvaluatorKind::Remote && api_key.is_none() {
            return Err(SettingsError::MissingApiKey);
        }

        Ok(EvaluatorSettings {
            kind: self.kind,
            api_key,
            api_base_url,
            api_model,
            timeout: Duration::from_secs(timeout_secs),
        })
    }
}

/// Validated evaluator configuration.
#[derive(Clone, PartialEq, Eq)]
pub struct EvaluatorSettings {
    kind: EvaluatorKind,
    api_key: Option<String>,
    api_base_url: String,
    api_model: String,
    timeout: Duration,
}

impl EvaluatorSettings {
    #[must_use]
    pub fn rubric() -> Self {
        Self {
            kind: EvaluatorKind::Rubric,
            api_key: None,
            api_base_url: DEFAULT_BASE_URL.to_string(),
            api_model: DEFAULT_MODEL.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }

    #[must_use]
    pub fn kind(&self) -> EvaluatorKind {
        self.kind
    }

    #[must_use]
    pub fn api_key(&self) -> Option<&str> {
        self.api_key.as_deref()
    }

    #[must_use]
    pub fn api_base_url(&self) -> &str {
        &self.api_base_url
    }

    #[must_use]
    pub fn api_model(&self) -> &str {
        &self.api_model
    }

    #[must_use]
    pub fn timeout(&self) -> Duration {
        self.timeout
    }
}

impl Default for EvaluatorSettings {
    fn default() -> Self {
        Self::rubric()
    }
}

impl fmt::Debug for EvaluatorSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EvaluatorSettings")
            .field("kind", &self.kind)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("api_base_url", &self.api_base_url)
            .field("api_model", &self.api_model)
            .field("timeout", &self.timeout)
            .finish()
    }
}

fn normalize_optional(value: Option<String>) -> Option<String> {
    value
        .map(|val| val.trim().to_string())
        .filter(|val| !val.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_fill_in_blank_fields() {
        let settings = EvaluatorSettingsDraft {
            api_model: Some("   ".into()),
            ..EvaluatorSettingsDraft::new()
        }
        .validate()
        .unwrap();

        assert_eq!(settings.kind(), EvaluatorKind::Rubric);
        assert_eq!(settings.api_model(), DEFAULT_MODEL);
        assert_eq!(settings.api_base_url(), DEFAULT_BASE_URL);
        assert_eq!(settings.timeout(), Duration::from_secs(60));
    }

    #[test]
    fn remote_requires_api_key() {
        let err = EvaluatorSettingsDraft {
            kind: EvaluatorKind::Remote,
            ..EvaluatorSettingsDraft::new()
        }
        .validate()
        .unwrap_err();
        assert_eq!(err, SettingsError::MissingApiKey);
    }

    #[test]
    fn rejects_bad_url_and_zero_timeout() {
        let bad_url = EvaluatorSettingsDraft {
            api_base_url: Some("not a url".into()),
            ..EvaluatorSettingsDraft::new()
        };
        assert_eq!(bad_url.validate().unwrap_err(), SettingsError::InvalidBaseUrl);

        let zero = EvaluatorSettingsDraft {
            timeout_secs: Some(0),
            ..EvaluatorSettingsDraft::new()
        };
        assert_eq!(zero.validate().unwrap_err(), SettingsError::InvalidTimeout);
    }

    #[test]
    fn debug_redacts_api_key() {
        let settings = EvaluatorSettingsDraft {
            kind: EvaluatorKind::Remote,
            api_key: Some("sk-secret".into()),
            ..EvaluatorSettingsDraft::new()
        }
        .validate()
        .unwrap();
        assert!(!format!("{settings:?}").contains("sk-secret"));
    }

    #[test]
    fn parses_evaluator_kind() {
        assert_eq!("Remote".parse::<EvaluatorKind>().unwrap(), EvaluatorKind::Remote);
        assert!("magic".parse::<EvaluatorKind>().is_err());
    }
}
