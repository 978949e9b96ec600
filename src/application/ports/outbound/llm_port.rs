//! Outbound port for the text-generation service

use async_trait::async_trait;

/// Interface to a text-generation service.
///
/// Implementations send the prompt with streaming disabled and block
/// until the complete response arrives. There is no automatic retry;
/// callers decide whether a failure means skip or abort.
#[async_trait]
pub trait LlmPort: Send + Sync {
    type Error: std::error::Error + Send + Sync + 'static;

    async fn generate(&self, model: &str, prompt: &str) -> Result<String, Self::Error>;
}
