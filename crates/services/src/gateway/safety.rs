use async_trait::async_trait;
use journey_core::safety;
use tracing::warn;

use super::{Completion, ModelGateway};
use crate::error::GatewayError;

/// Answers with the safe-harbor reply when the user prompt contains a
/// blocklisted term; forwards everything else to `G`.
#[derive(Clone)]
pub struct SafetyFilteredGateway<G> {
    inner: G,
}

impl<G> SafetyFilteredGateway<G> {
    #[must_use]
    pub fn new(inner: G) -> Self {
        Self { inner }
    }

    #[must_use]
    pub fn inner(&self) -> &G {
        &self.inner
    }
}

#[async_trait]
impl<G: ModelGateway> ModelGateway for SafetyFilteredGateway<G> {
    async fn complete(&self, system: &str, user: &str) -> Result<Completion, GatewayError> {
        if let Some(term) = safety::first_match(user) {
            warn!(term, "prompt blocked by content filter");
            return Ok(Completion {
                text: safety::safe_harbor_reply(),
                filtered: true,
            });
        }
        self.inner.complete(system, user).await
    }
}
