//! Error types for the `docchat-core` crate.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while building an index or answering a question.
#[derive(Debug, Error)]
pub enum RagError {
    /// The document could not be split into chunks.
    #[error("Chunking error: {0}")]
    ChunkingError(String),

    /// An error occurred during embedding generation or vector comparison.
    #[error("Embedding error ({provider}): {message}")]
    EmbeddingError {
        /// The embedding provider that produced the error.
        provider: String,
        /// A description of the failure.
        message: String,
    },

    /// A contextualization or synthesis call to the language model failed.
    #[error("Language model error ({model}): {message}")]
    LanguageModelError {
        /// The model that produced the error.
        model: String,
        /// A description of the failure.
        message: String,
    },

    /// A configuration validation error.
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// A document file could not be read.
    #[error("Failed to load document '{}': {source}", path.display())]
    LoadError {
        /// Path of the document that failed to load.
        path: PathBuf,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },
}

impl RagError {
    /// Whether retrying the same call might succeed.
    ///
    /// Provider failures are usually network or backend errors. Chunking and
    /// configuration errors are deterministic and will fail again.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::EmbeddingError { .. } | Self::LanguageModelError { .. })
    }
}

/// A convenience result type for RAG operations.
pub type Result<T> = std::result::Result<T, RagError>;
