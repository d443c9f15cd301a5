//! # docchat-core
//!
//! Conversational retrieval-augmented question answering over a text corpus.
//!
//! ## Overview
//!
//! A document is split into overlapping chunks, every chunk is embedded once,
//! and the resulting in-memory [`EmbeddingIndex`] is shared read-only by any
//! number of conversations. Each user turn runs through a [`RetrievalChain`]:
//!
//! 1. [`QueryContextualizer`] rewrites a follow-up question into a standalone
//!    query (skipped when there is no history).
//! 2. A [`Retriever`] embeds that query and fetches the top-k chunks.
//! 3. [`AnswerSynthesizer`] stuffs the chunks into a [`PromptTemplate`] and
//!    calls the [`LanguageModel`] once.
//!
//! Chat history belongs to the caller: the chain reads it and returns an
//! [`Answer`]; the caller decides whether to record the turn.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use docchat_core::ollama::{OllamaChatModel, OllamaEmbeddingProvider};
//! use docchat_core::*;
//!
//! let config = RagConfig::default();
//! let document = load_text_document("documents/chatbot.txt").await?;
//! let embedder: Arc<dyn EmbeddingProvider> = Arc::new(OllamaEmbeddingProvider::new());
//! let index = EmbeddingIndex::from_documents(
//!     &[document],
//!     &RecursiveChunker::from_config(&config),
//!     embedder.as_ref(),
//!     config.embed_concurrency,
//! )
//! .await?;
//!
//! let chain = RetrievalChain::builder()
//!     .config(&config)
//!     .retriever(Arc::new(IndexRetriever::new(Arc::new(index), embedder)))
//!     .model(Arc::new(OllamaChatModel::new("llama3")))
//!     .build()?;
//!
//! let mut history = ChatHistory::new();
//! let answer = chain.invoke(history.messages(), "What is Baguio known for?").await?;
//! history.record_turn("What is Baguio known for?", &answer.answer);
//! ```
//!
//! ## Features
//!
//! - `ollama`: [`ollama::OllamaEmbeddingProvider`] and [`ollama::OllamaChatModel`]
//!   talking to a local Ollama server over HTTP.

pub mod chain;
pub mod chunking;
pub mod config;
pub mod contextualize;
pub mod document;
pub mod embedding;
pub mod error;
pub mod index;
pub mod loader;
pub mod message;
pub mod model;
#[cfg(feature = "ollama")]
pub mod ollama;
pub mod prompt;
pub mod retriever;
pub mod synthesize;

pub use chain::{Answer, RetrievalChain, RetrievalChainBuilder};
pub use chunking::{Chunker, RecursiveChunker};
pub use config::{RagConfig, RagConfigBuilder};
pub use contextualize::QueryContextualizer;
pub use document::{Chunk, Document, SearchResult};
pub use embedding::EmbeddingProvider;
pub use error::{RagError, Result};
pub use index::{EmbeddingIndex, IndexEntry, cosine_similarity};
pub use loader::load_text_document;
pub use message::{ChatHistory, ChatMessage, ChatRole, PromptMessage, PromptRole};
pub use model::LanguageModel;
pub use prompt::PromptTemplate;
pub use retriever::{IndexRetriever, Retriever};
pub use synthesize::AnswerSynthesizer;
