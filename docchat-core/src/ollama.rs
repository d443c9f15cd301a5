//! Ollama embedding and chat providers using the Ollama HTTP API.
//!
//! This module is only available when the `ollama` feature is enabled.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, error};

use crate::embedding::EmbeddingProvider;
use crate::error::{RagError, Result};
use crate::message::PromptMessage;
use crate::model::LanguageModel;

/// The default Ollama server address.
pub const DEFAULT_BASE_URL: &str = "http://localhost:11434";

/// The default model for Ollama embeddings.
pub const DEFAULT_EMBEDDING_MODEL: &str = "nomic-embed-text";

/// The default chat model.
pub const DEFAULT_CHAT_MODEL: &str = "llama3";

fn endpoint(base_url: &str, path: &str) -> String {
    format!("{}/{path}", base_url.trim_end_matches('/'))
}

// ── Ollama API request/response types ──────────────────────────────

#[derive(Serialize)]
struct EmbedRequest<'a> {
    model: &'a str,
    input: &'a str,
}

#[derive(Deserialize)]
struct EmbedResponse {
    embeddings: Vec<Vec<f32>>,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatRequestMessage<'a>>,
    stream: bool,
}

#[derive(Serialize)]
struct ChatRequestMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    message: ChatResponseMessage,
}

#[derive(Deserialize)]
struct ChatResponseMessage {
    content: String,
}

#[derive(Deserialize)]
struct ErrorResponse {
    error: String,
}

/// Read an error body, preferring Ollama's `{"error": "..."}` message.
async fn error_detail(response: reqwest::Response) -> String {
    let body = response.text().await.unwrap_or_default();
    serde_json::from_str::<ErrorResponse>(&body).map(|e| e.error).unwrap_or(body)
}

// ── Embeddings ─────────────────────────────────────────────────────

/// An [`EmbeddingProvider`] backed by a local Ollama server (`/api/embed`).
///
/// # Example
///
/// ```rust,ignore
/// use docchat_core::ollama::OllamaEmbeddingProvider;
///
/// let provider = OllamaEmbeddingProvider::new().with_model("nomic-embed-text");
/// let embedding = provider.embed("hello world").await?;
/// ```
#[derive(Debug, Clone)]
pub struct OllamaEmbeddingProvider {
    client: reqwest::Client,
    base_url: String,
    model: String,
}

impl Default for OllamaEmbeddingProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl OllamaEmbeddingProvider {
    /// Create a provider for `nomic-embed-text` on the default local server.
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: DEFAULT_BASE_URL.into(),
            model: DEFAULT_EMBEDDING_MODEL.into(),
        }
    }

    /// Set the model name.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Set the server address, e.g. `http://gpu-box:11434`.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    fn failure(&self, message: String) -> RagError {
        RagError::EmbeddingError { provider: format!("Ollama/{}", self.model), message }
    }
}

#[async_trait]
impl EmbeddingProvider for OllamaEmbeddingProvider {
    fn name(&self) -> &str {
        &self.model
    }

    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        debug!(provider = "Ollama", model = %self.model, text_len = text.len(), "embedding text");

        let response = self
            .client
            .post(endpoint(&self.base_url, "api/embed"))
            .json(&EmbedRequest { model: &self.model, input: text })
            .send()
            .await
            .map_err(|e| {
                error!(provider = "Ollama", error = %e, "request failed");
                self.failure(format!("request failed: {e}"))
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let detail = error_detail(response).await;
            error!(provider = "Ollama", %status, "API error");
            return Err(self.failure(format!("API returned {status}: {detail}")));
        }

        let body: EmbedResponse = response.json().await.map_err(|e| {
            error!(provider = "Ollama", error = %e, "failed to parse response");
            self.failure(format!("failed to parse response: {e}"))
        })?;

        body.embeddings
            .into_iter()
            .next()
            .ok_or_else(|| self.failure("API returned empty response".into()))
    }
}

// ── Chat ───────────────────────────────────────────────────────────

/// A [`LanguageModel`] backed by a local Ollama server (`/api/chat`, non-streaming).
///
/// # Example
///
/// ```rust,ignore
/// use docchat_core::ollama::OllamaChatModel;
///
/// let model = OllamaChatModel::new("llama3").with_base_url("http://localhost:11434");
/// ```
#[derive(Debug, Clone)]
pub struct OllamaChatModel {
    client: reqwest::Client,
    base_url: String,
    model: String,
}

impl OllamaChatModel {
    /// Create a client for `model` on the default local server.
    pub fn new(model: impl Into<String>) -> Self {
        Self { client: reqwest::Client::new(), base_url: DEFAULT_BASE_URL.into(), model: model.into() }
    }

    /// Set the server address.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    fn failure(&self, message: String) -> RagError {
        RagError::LanguageModelError { model: self.model.clone(), message }
    }
}

#[async_trait]
impl LanguageModel for OllamaChatModel {
    fn name(&self) -> &str {
        &self.model
    }

    async fn complete(&self, messages: &[PromptMessage]) -> Result<String> {
        debug!(provider = "Ollama", model = %self.model, message_count = messages.len(), "chat request");

        let request = ChatRequest {
            model: &self.model,
            messages: messages
                .iter()
                .map(|m| ChatRequestMessage { role: m.role.as_str(), content: &m.content })
                .collect(),
            stream: false,
        };

        let response = self
            .client
            .post(endpoint(&self.base_url, "api/chat"))
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                error!(provider = "Ollama", error = %e, "request failed");
                self.failure(format!("request failed: {e}"))
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let detail = error_detail(response).await;
            error!(provider = "Ollama", %status, "API error");
            return Err(self.failure(format!("API returned {status}: {detail}")));
        }

        let body: ChatResponse = response.json().await.map_err(|e| {
            error!(provider = "Ollama", error = %e, "failed to parse response");
            self.failure(format!("failed to parse response: {e}"))
        })?;

        Ok(body.message.content)
    }
}
