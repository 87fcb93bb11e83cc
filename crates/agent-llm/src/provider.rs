//! LLM provider trait definition

use crate::{CompletionRequest, CompletionResponse, Result};
use async_trait::async_trait;

/// Trait for LLM providers
///
/// The supervisor and every worker share one provider instance, so
/// implementations must be safe to call from several agents in turn.
#[async_trait]
pub trait LLMProvider: Send + Sync {
    /// Generate a completion for the given conversation
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse>;

    /// Provider name (e.g. "openai")
    fn name(&self) -> &str;
}
