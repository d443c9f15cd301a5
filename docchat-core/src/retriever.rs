//! Retrieval of the chunks most relevant to a query string.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, error};

use crate::document::SearchResult;
use crate::embedding::EmbeddingProvider;
use crate::error::Result;
use crate::index::EmbeddingIndex;

/// Fetches the top-k chunks relevant to a text query.
#[async_trait]
pub trait Retriever: Send + Sync {
    /// Return at most `top_k` results ordered by descending relevance.
    async fn retrieve(&self, query: &str, top_k: usize) -> Result<Vec<SearchResult>>;
}

/// A [`Retriever`] over an [`EmbeddingIndex`].
///
/// Queries are embedded with the same provider that built the index, then
/// searched by cosine similarity. The index is shared read-only, so one
/// `IndexRetriever` (or many clones) can serve concurrent conversations.
#[derive(Clone)]
pub struct IndexRetriever {
    index: Arc<EmbeddingIndex>,
    embedder: Arc<dyn EmbeddingProvider>,
    similarity_threshold: Option<f32>,
}

impl IndexRetriever {
    /// `embedder` must be the provider the index was built with.
    pub fn new(index: Arc<EmbeddingIndex>, embedder: Arc<dyn EmbeddingProvider>) -> Self {
        Self { index, embedder, similarity_threshold: None }
    }

    /// Drop results scoring below `threshold`.
    pub fn with_similarity_threshold(mut self, threshold: Option<f32>) -> Self {
        self.similarity_threshold = threshold;
        self
    }
}

#[async_trait]
impl Retriever for IndexRetriever {
    async fn retrieve(&self, query: &str, top_k: usize) -> Result<Vec<SearchResult>> {
        if self.index.is_empty() {
            debug!("index is empty, skipping query embedding");
            return Ok(Vec::new());
        }

        let query_embedding = self.embedder.embed(query).await.inspect_err(|e| {
            error!(provider = self.embedder.name(), error = %e, "embedding failed during query");
        })?;

        let mut results = self.index.search(&query_embedding, top_k)?;
        if let Some(threshold) = self.similarity_threshold {
            results.retain(|r| r.score >= threshold);
        }

        debug!(result_count = results.len(), top_k, "retrieved chunks");
        Ok(results)
    }
}
