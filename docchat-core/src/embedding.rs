//! Embedding provider trait for generating vector embeddings from text.

use async_trait::async_trait;
use futures::{StreamExt, TryStreamExt, stream};

use crate::error::Result;

/// A provider that generates vector embeddings from text input.
///
/// Implementations wrap specific embedding backends (Ollama, test stubs, etc.)
/// behind a unified async interface. The same provider must be used to embed
/// the corpus and the queries searched against it.
///
/// # Example
///
/// ```rust,ignore
/// use docchat_core::EmbeddingProvider;
///
/// let provider = MyEmbeddingProvider::new();
/// let embedding = provider.embed("hello world").await?;
/// ```
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    /// Short name used in logs and error messages.
    fn name(&self) -> &str;

    /// Generate an embedding vector for a single text input.
    async fn embed(&self, text: &str) -> Result<Vec<f32>>;

    /// Generate embedding vectors for a batch of text inputs.
    ///
    /// At most `max_concurrency` calls to [`embed`](EmbeddingProvider::embed)
    /// are in flight at once. Results are returned in input order regardless
    /// of completion order. The first failure aborts the batch and is returned.
    async fn embed_batch(&self, texts: &[&str], max_concurrency: usize) -> Result<Vec<Vec<f32>>> {
        let calls: Vec<_> = texts.iter().map(|text| self.embed(text)).collect();
        stream::iter(calls).buffered(max_concurrency.max(1)).try_collect().await
    }
}
