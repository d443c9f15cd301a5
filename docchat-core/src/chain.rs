//! Retrieval chain orchestrator.
//!
//! The [`RetrievalChain`] answers one user turn by composing a
//! [`QueryContextualizer`], a [`Retriever`] and an [`AnswerSynthesizer`]
//! around a [`LanguageModel`].
//!
//! # Example
//!
//! ```rust,ignore
//! use docchat_core::{ChatHistory, IndexRetriever, RetrievalChain};
//!
//! let chain = RetrievalChain::builder()
//!     .retriever(Arc::new(IndexRetriever::new(index, embedder)))
//!     .model(Arc::new(my_model))
//!     .top_k(4)
//!     .build()?;
//!
//! let mut history = ChatHistory::new();
//! let answer = chain.invoke(history.messages(), "What is Baguio known for?").await?;
//! history.record_turn("What is Baguio known for?", &answer.answer);
//! ```

use std::sync::Arc;

use serde::Serialize;
use tracing::{error, info};

use crate::config::RagConfig;
use crate::contextualize::QueryContextualizer;
use crate::document::SearchResult;
use crate::error::{RagError, Result};
use crate::message::ChatMessage;
use crate::model::LanguageModel;
use crate::prompt::PromptTemplate;
use crate::retriever::Retriever;
use crate::synthesize::AnswerSynthesizer;

/// The result of one chain invocation.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Answer {
    /// The synthesized answer text.
    pub answer: String,
    /// The chunks the answer was generated from, best first.
    pub source_chunks: Vec<SearchResult>,
}

/// Contextualize → retrieve → synthesize, for one question at a time.
///
/// The chain holds no per-conversation state: history is passed into every
/// [`invoke`](RetrievalChain::invoke) and never modified, so one chain can
/// serve many conversations concurrently. Construct one via
/// [`RetrievalChain::builder()`].
#[derive(Clone)]
pub struct RetrievalChain {
    retriever: Arc<dyn Retriever>,
    model: Arc<dyn LanguageModel>,
    contextualizer: QueryContextualizer,
    synthesizer: AnswerSynthesizer,
    top_k: usize,
}

impl RetrievalChain {
    /// Create a new [`RetrievalChainBuilder`].
    pub fn builder() -> RetrievalChainBuilder {
        RetrievalChainBuilder::default()
    }

    /// Return a reference to the language model.
    pub fn model(&self) -> &Arc<dyn LanguageModel> {
        &self.model
    }

    /// Number of chunks retrieved per question.
    pub fn top_k(&self) -> usize {
        self.top_k
    }

    /// A copy of this chain answering with a different model over the same retriever.
    pub fn with_model(&self, model: Arc<dyn LanguageModel>) -> Self {
        Self { model, ..self.clone() }
    }

    /// Answer `question` given the prior turns in `history`.
    ///
    /// Steps run strictly in order: the question is rewritten into a
    /// standalone query (skipped when `history` is empty), the query is used
    /// for retrieval, and the answer is synthesized from the retrieved chunks,
    /// the *original* question and `history`.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::EmbeddingError`] if the query cannot be embedded and
    /// [`RagError::LanguageModelError`] if the rewrite or answer call fails.
    /// Nothing is retried.
    pub async fn invoke(&self, history: &[ChatMessage], question: &str) -> Result<Answer> {
        let model = self.model.as_ref();

        // 1. Contextualize
        let standalone =
            self.contextualizer.rewrite(history, question, model).await.inspect_err(|e| {
                error!(model = model.name(), error = %e, "question rewrite failed");
            })?;

        // 2. Retrieve
        let source_chunks = self.retriever.retrieve(&standalone, self.top_k).await?;

        // 3. Synthesize
        let answer = self
            .synthesizer
            .synthesize(&source_chunks, question, history, model)
            .await
            .inspect_err(|e| {
                error!(model = model.name(), error = %e, "answer synthesis failed");
            })?;

        info!(
            model = model.name(),
            history_len = history.len(),
            source_count = source_chunks.len(),
            "answered question"
        );

        Ok(Answer { answer, source_chunks })
    }
}

/// Builder for constructing a [`RetrievalChain`].
///
/// `retriever` and `model` are required. Call [`build()`](RetrievalChainBuilder::build)
/// to validate and produce the chain.
pub struct RetrievalChainBuilder {
    retriever: Option<Arc<dyn Retriever>>,
    model: Option<Arc<dyn LanguageModel>>,
    contextualizer: QueryContextualizer,
    synthesizer: AnswerSynthesizer,
    top_k: usize,
}

impl Default for RetrievalChainBuilder {
    fn default() -> Self {
        Self {
            retriever: None,
            model: None,
            contextualizer: QueryContextualizer::default(),
            synthesizer: AnswerSynthesizer::default(),
            top_k: RagConfig::default().top_k,
        }
    }
}

impl RetrievalChainBuilder {
    /// Take `top_k` from a [`RagConfig`].
    pub fn config(mut self, config: &RagConfig) -> Self {
        self.top_k = config.top_k;
        self
    }

    /// Set the retriever.
    pub fn retriever(mut self, retriever: Arc<dyn Retriever>) -> Self {
        self.retriever = Some(retriever);
        self
    }

    /// Set the language model used for both rewriting and answering.
    pub fn model(mut self, model: Arc<dyn LanguageModel>) -> Self {
        self.model = Some(model);
        self
    }

    /// Replace the question contextualizer.
    pub fn contextualizer(mut self, contextualizer: QueryContextualizer) -> Self {
        self.contextualizer = contextualizer;
        self
    }

    /// Replace the answer synthesizer.
    pub fn synthesizer(mut self, synthesizer: AnswerSynthesizer) -> Self {
        self.synthesizer = synthesizer;
        self
    }

    /// Use a synthesizer with the given prompt template.
    pub fn template(mut self, template: PromptTemplate) -> Self {
        self.synthesizer = AnswerSynthesizer::new(template);
        self
    }

    /// Set the number of chunks retrieved per question.
    pub fn top_k(mut self, k: usize) -> Self {
        self.top_k = k;
        self
    }

    /// Build the [`RetrievalChain`], validating that all required fields are set.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::ConfigError`] if a required field is missing or `top_k` is zero.
    pub fn build(self) -> Result<RetrievalChain> {
        let retriever = self
            .retriever
            .ok_or_else(|| RagError::ConfigError("retriever is required".to_string()))?;
        let model =
            self.model.ok_or_else(|| RagError::ConfigError("model is required".to_string()))?;
        if self.top_k == 0 {
            return Err(RagError::ConfigError("top_k must be greater than zero".to_string()));
        }

        Ok(RetrievalChain {
            retriever,
            model,
            contextualizer: self.contextualizer,
            synthesizer: self.synthesizer,
            top_k: self.top_k,
        })
    }
}
