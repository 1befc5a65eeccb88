//! Generative backend abstraction
//!
//! The bot talks to exactly one backend, but the gateway and the search
//! summarizer only see this trait so tests can substitute a scripted client.

use crate::types::Result;
use async_trait::async_trait;

/// Text-in, text-out generative model.
#[async_trait]
pub trait LLMClient: Send + Sync {
    /// Generate a completion from a fully composed prompt
    ///
    /// # Errors
    ///
    /// Returns [`BotError::Backend`](crate::types::BotError::Backend) on
    /// transport, authentication, quota or empty-response failures.
    async fn generate(&self, prompt: &str) -> Result<String>;

    /// Get the model name/identifier
    fn model_name(&self) -> &str;
}
