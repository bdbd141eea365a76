use std::time::Duration;

use async_trait::async_trait;
use journey_core::model::EvaluatorSettings;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{Completion, ModelGateway};
use crate::error::GatewayError;

#[derive(Clone, Debug)]
pub struct OpenAiConfig {
    pub base_url: String,
    pub api_key: String,
    pub model: String,
    pub timeout: Duration,
}

impl OpenAiConfig {
    /// Gateway configuration, or `None` when no API key is configured.
    ///
    /// The key alone enables the gateway, so journey insights stay available
    /// while feedback comes from the rubric.
    #[must_use]
    pub fn from_settings(settings: &EvaluatorSettings) -> Option<Self> {
        let api_key = settings.api_key()?;
        Some(Self {
            base_url: settings.api_base_url().to_string(),
            api_key: api_key.to_string(),
            model: settings.api_model().to_string(),
            timeout: settings.timeout(),
        })
    }
}

/// Chat-completions client for OpenAI-compatible endpoints.
#[derive(Clone)]
pub struct OpenAiGateway {
    client: Client,
    config: Option<OpenAiConfig>,
}

impl OpenAiGateway {
    #[must_use]
    pub fn new(config: Option<OpenAiConfig>) -> Self {
        Self {
            client: Client::new(),
            config,
        }
    }

    #[must_use]
    pub fn from_settings(settings: &EvaluatorSettings) -> Self {
        Self::new(OpenAiConfig::from_settings(settings))
    }

    #[must_use]
    pub fn enabled(&self) -> bool {
        self.config.is_some()
    }
}

#[async_trait]
impl ModelGateway for OpenAiGateway {
    async fn complete(&self, system: &str, user: &str) -> Result<Completion, GatewayError> {
        let config = self.config.as_ref().ok_or(GatewayError::Disabled)?;

        let url = format!(
            "{}/chat/completions",
            config.base_url.trim_end_matches('/')
        );
        let payload = ChatRequest {
            model: config.model.clone(),
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: system.to_string(),
                },
                ChatMessage {
                    role: "user",
                    content: user.to_string(),
                },
            ],
        };
        debug!(model = %config.model, %url, "sending chat completion");

        let response = self
            .client
            .post(url)
            .bearer_auth(&config.api_key)
            .timeout(config.timeout)
            .json(&payload)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(GatewayError::HttpStatus(response.status()));
        }

        let body: ChatResponse = response.json().await?;
        let content = body
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .filter(|content| !content.trim().is_empty())
            .ok_or(GatewayError::EmptyResponse)?;

        Ok(Completion::model(content.trim()))
    }
}

#[derive(Debug, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
}

#[derive(Debug, Serialize)]
struct ChatMessage {
    role: &'static str,
    content: String,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessageResponse,
}

#[derive(Debug, Deserialize)]
struct ChatMessageResponse {
    content: Option<String>,
}
