//! Access to the remote language model.

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::GatewayError;

mod openai;
mod safety;

pub use openai::{OpenAiConfig, OpenAiGateway};
pub use safety::SafetyFilteredGateway;

/// Raw text returned for one prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Completion {
    pub text: String,
    /// Set when the safety filter answered instead of the model.
    pub filtered: bool,
}

impl Completion {
    #[must_use]
    pub fn model(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            filtered: false,
        }
    }
}

#[async_trait]
pub trait ModelGateway: Send + Sync {
    /// Send one system and one user message and return the reply text.
    ///
    /// # Errors
    ///
    /// Returns `GatewayError` when the gateway is disabled, the request fails,
    /// or the reply carries no content.
    async fn complete(&self, system: &str, user: &str) -> Result<Completion, GatewayError>;
}

#[async_trait]
impl<G: ModelGateway + ?Sized> ModelGateway for Arc<G> {
    async fn complete(&self, system: &str, user: &str) -> Result<Completion, GatewayError> {
        (**self).complete(system, user).await
    }
}
