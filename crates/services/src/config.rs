//! Evaluator settings from the process environment.

use std::env;

use journey_core::model::{EvaluatorKind, EvaluatorSettings, EvaluatorSettingsDraft, SettingsError};

pub const EVALUATOR_ENV: &str = "JOURNEY_EVALUATOR";
pub const API_KEY_ENV: &str = "JOURNEY_AI_API_KEY";
pub const BASE_URL_ENV: &str = "JOURNEY_AI_BASE_URL";
pub const MODEL_ENV: &str = "JOURNEY_AI_MODEL";
pub const TIMEOUT_ENV: &str = "JOURNEY_AI_TIMEOUT_SECS";
pub const DB_URL_ENV: &str = "JOURNEY_DB_URL";

/// Build an unvalidated draft from any key lookup.
///
/// # Errors
///
/// Returns `SettingsError` for an unknown evaluator name or a timeout that is
/// not a whole number of seconds.
pub fn draft_from_lookup(
    lookup: impl Fn(&str) -> Option<String>,
) -> Result<EvaluatorSettingsDraft, SettingsError> {
    let kind = match lookup(EVALUATOR_ENV) {
        Some(raw) if !raw.trim().is_empty() => raw.parse()?,
        _ => EvaluatorKind::default(),
    };
    let timeout_secs = lookup(TIMEOUT_ENV)
        .filter(|raw| !raw.trim().is_empty())
        .map(|raw| raw.trim().parse::<u64>().map_err(|_| SettingsError::InvalidTimeout))
        .transpose()?;

    Ok(EvaluatorSettingsDraft {
        kind,
        api_key: lookup(API_KEY_ENV),
        api_base_url: lookup(BASE_URL_ENV),
        api_model: lookup(MODEL_ENV),
        timeout_secs,
    })
}

/// Draft read from `JOURNEY_*` environment variables.
///
/// # Errors
///
/// See [`draft_from_lookup`].
pub fn draft_from_env() -> Result<EvaluatorSettingsDraft, SettingsError> {
    draft_from_lookup(|key| env::var(key).ok())
}

/// Validated settings read from the environment.
///
/// # Errors
///
/// Returns `SettingsError` when the environment describes an invalid setup.
pub fn settings_from_env() -> Result<EvaluatorSettings, SettingsError> {
    draft_from_env()?.validate()
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::time::Duration;

    use super::*;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn empty_environment_selects_rubric_defaults() {
        let settings = draft_from_lookup(lookup(&[])).unwrap().validate().unwrap();
        assert_eq!(settings, EvaluatorSettings::rubric());
    }

    #[test]
    fn remote_settings_are_read() {
        let settings = draft_from_lookup(lookup(&[
            (EVALUATOR_ENV, "remote"),
            (API_KEY_ENV, " sk-test "),
            (BASE_URL_ENV, "http://localhost:8080/v1"),
            (MODEL_ENV, "gpt-4o-mini"),
            (TIMEOUT_ENV, "15"),
        ]))
        .unwrap()
        .validate()
        .unwrap();

        assert_eq!(settings.kind(), EvaluatorKind::Remote);
        assert_eq!(settings.api_key(), Some("sk-test"));
        assert_eq!(settings.api_base_url(), "http://localhost:8080/v1");
        assert_eq!(settings.api_model(), "gpt-4o-mini");
        assert_eq!(settings.timeout(), Duration::from_secs(15));
    }

    #[test]
    fn bad_values_are_rejected() {
        assert!(matches!(
            draft_from_lookup(lookup(&[(EVALUATOR_ENV, "oracle")])),
            Err(SettingsError::UnknownEvaluator(_))
        ));
        assert!(matches!(
            draft_from_lookup(lookup(&[(TIMEOUT_ENV, "soon")])),
            Err(SettingsError::InvalidTimeout)
        ));
        assert!(matches!(
            draft_from_lookup(lookup(&[(EVALUATOR_ENV, "remote")]))
                .unwrap()
                .validate(),
            Err(SettingsError::MissingApiKey)
        ));
    }
}
