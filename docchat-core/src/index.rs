//! In-memory embedding index using cosine similarity.
//!
//! An [`EmbeddingIndex`] is built once from a set of chunks and is read-only
//! afterwards, so it can be shared behind an `Arc` by any number of
//! concurrent retrievals without locking. Adding documents means building a
//! new index.

use tracing::{debug, error, info};

use crate::chunking::Chunker;
use crate::document::{Chunk, Document, SearchResult};
use crate::embedding::EmbeddingProvider;
use crate::error::{RagError, Result};

/// A chunk paired with its embedding vector.
#[derive(Debug, Clone, PartialEq)]
pub struct IndexEntry {
    /// The indexed chunk.
    pub chunk: Chunk,
    /// The chunk's embedding.
    pub embedding: Vec<f32>,
}

/// An immutable set of embedded chunks searchable by cosine similarity.
///
/// # Example
///
/// ```rust,ignore
/// use docchat_core::{EmbeddingIndex, RecursiveChunker};
///
/// let chunks = RecursiveChunker::new(700, 100).chunk(&document)?;
/// let index = EmbeddingIndex::build(chunks, &embedder, 5).await?;
/// let results = index.search(&query_embedding, 4)?;
/// ```
#[derive(Debug, Clone, Default)]
pub struct EmbeddingIndex {
    entries: Vec<IndexEntry>,
    dimensions: usize,
}

impl EmbeddingIndex {
    /// Embed every chunk and build an index over them.
    ///
    /// At most `max_concurrency` embedding calls run at once. Embeddings are
    /// matched to chunks by position, not by completion order.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::EmbeddingError`] if any embedding call fails, if
    /// the provider returns the wrong number of vectors, or if the vectors do
    /// not all share one dimension. No index is produced in that case.
    pub async fn build(
        chunks: Vec<Chunk>,
        embedder: &dyn EmbeddingProvider,
        max_concurrency: usize,
    ) -> Result<Self> {
        if chunks.is_empty() {
            info!(chunk_count = 0, "built empty embedding index");
            return Ok(Self::default());
        }

        let texts: Vec<&str> = chunks.iter().map(|c| c.text.as_str()).collect();
        debug!(provider = embedder.name(), chunk_count = texts.len(), max_concurrency, "embedding chunks");

        let embeddings = embedder.embed_batch(&texts, max_concurrency).await.inspect_err(|e| {
            error!(provider = embedder.name(), error = %e, "embedding failed during index build");
        })?;

        if embeddings.len() != chunks.len() {
            return Err(RagError::EmbeddingError {
                provider: embedder.name().to_string(),
                message: format!(
                    "expected {} embeddings, provider returned {}",
                    chunks.len(),
                    embeddings.len()
                ),
            });
        }

        let dimensions = embeddings[0].len();
        if let Some(bad) = embeddings.iter().position(|e| e.len() != dimensions) {
            return Err(RagError::EmbeddingError {
                provider: embedder.name().to_string(),
                message: format!(
                    "chunk {bad} has {} dimensions, expected {dimensions}",
                    embeddings[bad].len()
                ),
            });
        }

        let entries: Vec<IndexEntry> = chunks
            .into_iter()
            .zip(embeddings)
            .map(|(chunk, embedding)| IndexEntry { chunk, embedding })
            .collect();

        info!(chunk_count = entries.len(), dimensions, "built embedding index");
        Ok(Self { entries, dimensions })
    }

    /// Chunk every document, then embed and index all chunks.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::ChunkingError`] if a document cannot be chunked,
    /// or any error from [`EmbeddingIndex::build`].
    pub async fn from_documents(
        documents: &[Document],
        chunker: &dyn Chunker,
        embedder: &dyn EmbeddingProvider,
        max_concurrency: usize,
    ) -> Result<Self> {
        let mut chunks = Vec::new();
        for document in documents {
            let doc_chunks = chunker.chunk(document)?;
            debug!(document.id = %document.id, chunk_count = doc_chunks.len(), "chunked document");
            chunks.extend(doc_chunks);
        }
        Self::build(chunks, embedder, max_concurrency).await
    }

    /// Return the `top_k` entries most similar to `query`, best first.
    ///
    /// Equal scores keep the original chunk order. Returns fewer than `top_k`
    /// results only when the index holds fewer entries, and an empty `Vec`
    /// for an empty index.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::EmbeddingError`] if the query dimension differs
    /// from the indexed vectors.
    pub fn search(&self, query: &[f32], top_k: usize) -> Result<Vec<SearchResult>> {
        if self.entries.is_empty() {
            return Ok(Vec::new());
        }
        if query.len() != self.dimensions {
            return Err(RagError::EmbeddingError {
                provider: "index".to_string(),
                message: format!(
                    "query has {} dimensions, index has {}",
                    query.len(),
                    self.dimensions
                ),
            });
        }

        let mut scored: Vec<SearchResult> = self
            .entries
            .iter()
            .map(|entry| SearchResult {
                chunk: entry.chunk.clone(),
                score: cosine_similarity(&entry.embedding, query),
            })
            .collect();

        // Stable sort: ties stay in chunk order.
        scored.sort_by(|a, b| b.score.total_cmp(&a.score));
        scored.truncate(top_k);
        Ok(scored)
    }

    /// Number of indexed chunks.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the index holds no chunks.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Dimensionality of the indexed vectors (zero for an empty index).
    pub fn dimensions(&self) -> usize {
        self.dimensions
    }

    /// The indexed entries in chunk order.
    pub fn entries(&self) -> &[IndexEntry] {
        &self.entries
    }
}

/// Compute cosine similarity between two vectors.
///
/// Returns 0.0 if either vector has zero magnitude, and -1.0 (the lowest
/// possible score) if either contains NaN or infinite components.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    let score = dot / (norm_a * norm_b);
    if score.is_finite() { score } else { -1.0 }
}
