//! Deterministic stub providers shared by the integration tests.

#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use docchat_core::{EmbeddingProvider, LanguageModel, PromptMessage, RagError, Result};

pub const DIM: usize = 256;

pub const BAGUIO: &str = "Baguio is known for its cool climate.\n\nIt has strawberry farms.";

/// Hash each lowercase word into one of `dims` buckets and count occurrences.
pub fn bag_of_words(text: &str, dims: usize) -> Vec<f32> {
    let mut vector = vec![0.0f32; dims];
    for word in text.split(|c: char| !c.is_alphanumeric()).filter(|w| !w.is_empty()) {
        let hash = word
            .to_lowercase()
            .bytes()
            .fold(0xcbf2_9ce4_8422_2325u64, |acc, b| (acc ^ b as u64).wrapping_mul(0x0100_0000_01b3));
        vector[(hash % dims as u64) as usize] += 1.0;
    }
    vector
}

/// Word-count embeddings, so texts sharing words score as similar.
#[derive(Debug, Default)]
pub struct BagOfWordsEmbedder {
    pub calls: AtomicUsize,
}

#[async_trait]
impl EmbeddingProvider for BagOfWordsEmbedder {
    fn name(&self) -> &str {
        "bag-of-words"
    }

    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(bag_of_words(text, DIM))
    }
}

/// Bag-of-words embedder whose `fail_on`-th call (1-based) fails.
#[derive(Debug)]
pub struct FailingEmbedder {
    pub fail_on: usize,
    pub calls: AtomicUsize,
}

impl FailingEmbedder {
    pub fn new(fail_on: usize) -> Self {
        Self { fail_on, calls: AtomicUsize::new(0) }
    }
}

#[async_trait]
impl EmbeddingProvider for FailingEmbedder {
    fn name(&self) -> &str {
        "failing"
    }

    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        if call == self.fail_on {
            return Err(RagError::EmbeddingError {
                provider: "failing".into(),
                message: format!("call {call} refused"),
            });
        }
        Ok(bag_of_words(text, DIM))
    }
}

/// Records how many embedding calls overlap. Longer texts take longer, so
/// calls complete out of order.
#[derive(Debug, Default)]
pub struct ConcurrencyProbe {
    in_flight: AtomicUsize,
    pub max_in_flight: AtomicUsize,
}

#[async_trait]
impl EmbeddingProvider for ConcurrencyProbe {
    fn name(&self) -> &str {
        "probe"
    }

    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);
        tokio::time::sleep(Duration::from_millis(2 + 2 * (text.len() % 7) as u64)).await;
        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        Ok(bag_of_words(text, DIM))
    }
}

/// Replies with every prompt message joined by newlines.
#[derive(Debug, Default)]
pub struct EchoModel {
    pub calls: AtomicUsize,
}

#[async_trait]
impl LanguageModel for EchoModel {
    fn name(&self) -> &str {
        "echo"
    }

    async fn complete(&self, messages: &[PromptMessage]) -> Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(messages.iter().map(|m| m.content.as_str()).collect::<Vec<_>>().join("\n"))
    }
}

/// Replies from a fixed script and records every prompt it receives.
#[derive(Debug)]
pub struct ScriptedModel {
    name: String,
    replies: Mutex<VecDeque<String>>,
    pub prompts: Mutex<Vec<Vec<PromptMessage>>>,
}

impl ScriptedModel {
    pub fn new(name: &str, replies: &[&str]) -> Self {
        Self {
            name: name.to_string(),
            replies: Mutex::new(replies.iter().map(|r| r.to_string()).collect()),
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn prompts(&self) -> Vec<Vec<PromptMessage>> {
        self.prompts.lock().unwrap().clone()
    }
}

#[async_trait]
impl LanguageModel for ScriptedModel {
    fn name(&self) -> &str {
        &self.name
    }

    async fn complete(&self, messages: &[PromptMessage]) -> Result<String> {
        self.prompts.lock().unwrap().push(messages.to_vec());
        self.replies.lock().unwrap().pop_front().ok_or_else(|| RagError::LanguageModelError {
            model: self.name.clone(),
            message: "script exhausted".into(),
        })
    }
}
