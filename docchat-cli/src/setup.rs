//! Loading the corpus and wiring providers into a retrieval chain.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use docchat_core::ollama::{
    DEFAULT_BASE_URL, DEFAULT_EMBEDDING_MODEL, OllamaChatModel, OllamaEmbeddingProvider,
};
use docchat_core::{
    EmbeddingIndex, EmbeddingProvider, IndexRetriever, PromptTemplate, RagConfig,
    RecursiveChunker, RetrievalChain, load_text_document,
};
use tracing::info;

/// Options shared by every command that needs an index.
#[derive(clap::Args, Debug)]
pub struct CorpusArgs {
    /// Text document to answer questions about
    #[arg(short, long)]
    pub document: PathBuf,

    /// JSON file with chunking and retrieval settings
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Override the number of chunks retrieved per question
    #[arg(long)]
    pub top_k: Option<usize>,

    /// Embedding model served by Ollama
    #[arg(long, env = "DOCCHAT_EMBEDDING_MODEL", default_value = DEFAULT_EMBEDDING_MODEL)]
    pub embedding_model: String,

    /// Ollama server address
    #[arg(long, env = "OLLAMA_HOST", default_value = DEFAULT_BASE_URL)]
    pub ollama_host: String,

    /// Answer prompt: conversational or single-turn
    #[arg(long, default_value = "conversational")]
    pub template: String,
}

/// A loaded, indexed document plus everything needed to build chains over it.
pub struct Corpus {
    pub config: RagConfig,
    pub index: Arc<EmbeddingIndex>,
    pub embedder: Arc<dyn EmbeddingProvider>,
    pub template: PromptTemplate,
    pub ollama_host: String,
}

impl CorpusArgs {
    /// Read the config and document, then build the index.
    pub async fn load(self) -> anyhow::Result<Corpus> {
        let mut config = match &self.config {
            Some(path) => RagConfig::from_json_file(path).await?,
            None => RagConfig::default(),
        };
        if let Some(top_k) = self.top_k {
            config.top_k = top_k;
            config.validate()?;
        }
        let template = PromptTemplate::preset(&self.template)?;
        let ollama_host = normalize_host(&self.ollama_host);

        let document = load_text_document(&self.document).await?;
        let embedder: Arc<dyn EmbeddingProvider> = Arc::new(
            OllamaEmbeddingProvider::new()
                .with_model(&self.embedding_model)
                .with_base_url(&ollama_host),
        );

        let index = EmbeddingIndex::from_documents(
            &[document],
            &RecursiveChunker::from_config(&config),
            embedder.as_ref(),
            config.embed_concurrency,
        )
        .await
        .with_context(|| format!("failed to index {}", self.document.display()))?;

        info!(
            chunk_count = index.len(),
            dimensions = index.dimensions(),
            document = %self.document.display(),
            "document indexed"
        );
        Ok(Corpus { config, index: Arc::new(index), embedder, template, ollama_host })
    }
}

impl Corpus {
    /// A chain answering with `model` over this corpus.
    pub fn chain(&self, model: &str) -> anyhow::Result<RetrievalChain> {
        let retriever = IndexRetriever::new(self.index.clone(), self.embedder.clone())
            .with_similarity_threshold(self.config.similarity_threshold);
        let chain = RetrievalChain::builder()
            .config(&self.config)
            .retriever(Arc::new(retriever))
            .model(Arc::new(OllamaChatModel::new(model).with_base_url(&self.ollama_host)))
            .template(self.template.clone())
            .build()?;
        Ok(chain)
    }
}

/// Accept `host:port` as well as full URLs, like the Ollama CLI does.
fn normalize_host(host: &str) -> String {
    if host.contains("://") { host.to_string() } else { format!("http://{host}") }
}
