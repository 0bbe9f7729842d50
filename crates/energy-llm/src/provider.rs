//! LLM provider trait definition

use crate::{CompletionRequest, CompletionResponse, Result};
use async_trait::async_trait;

/// Trait for LLM providers
///
/// Implementations give access to one chat-completion service. The fallback
/// chain only relies on this trait, so tests can plug in scripted providers.
#[async_trait]
pub trait LLMProvider: Send + Sync {
    /// Generate a completion from the LLM
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse>;

    /// Provider name (e.g. "piapi", "groq")
    fn name(&self) -> &str;

    /// Model used when the caller does not pick one
    fn default_model(&self) -> &str;
}
