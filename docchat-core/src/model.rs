//! Language model trait.

use async_trait::async_trait;

use crate::error::Result;
use crate::message::PromptMessage;

/// A chat-completion backend.
///
/// Implementations are plain configuration objects (model name, endpoint)
/// handed to a [`RetrievalChain`](crate::RetrievalChain); several chains with
/// different models can run side by side over the same index.
#[async_trait]
pub trait LanguageModel: Send + Sync {
    /// Model identifier, used in logs and error messages.
    fn name(&self) -> &str;

    /// Complete a conversation and return the generated text.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::LanguageModelError`](crate::RagError::LanguageModelError)
    /// when the backend call fails. Implementations must not retry.
    async fn complete(&self, messages: &[PromptMessage]) -> Result<String>;
}
