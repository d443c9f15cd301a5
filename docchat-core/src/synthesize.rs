//! Answer synthesis from retrieved chunks ("stuff" strategy).

use tracing::debug;

use crate::document::SearchResult;
use crate::error::Result;
use crate::message::ChatMessage;
use crate::model::LanguageModel;
use crate::prompt::PromptTemplate;

/// Concatenates retrieved chunks into one context block and asks the model
/// once for an answer.
#[derive(Debug, Clone)]
pub struct AnswerSynthesizer {
    template: PromptTemplate,
    document_separator: String,
}

impl Default for AnswerSynthesizer {
    fn default() -> Self {
        Self::new(PromptTemplate::default())
    }
}

impl AnswerSynthesizer {
    pub fn new(template: PromptTemplate) -> Self {
        Self { template, document_separator: "\n\n".to_string() }
    }

    /// Separator placed between chunk texts in the context block.
    pub fn with_document_separator(mut self, separator: impl Into<String>) -> Self {
        self.document_separator = separator.into();
        self
    }

    /// Join chunk texts in ranked order.
    pub fn format_context(&self, chunks: &[SearchResult]) -> String {
        chunks
            .iter()
            .map(|r| r.chunk.text.as_str())
            .collect::<Vec<_>>()
            .join(&self.document_separator)
    }

    /// Answer `question` from `chunks`.
    ///
    /// When `chunks` is empty the template's `unknown_answer` is returned
    /// without calling the model.
    ///
    /// # Errors
    ///
    /// Propagates the model's [`RagError::LanguageModelError`](crate::RagError::LanguageModelError).
    pub async fn synthesize(
        &self,
        chunks: &[SearchResult],
        question: &str,
        history: &[ChatMessage],
        llm: &dyn LanguageModel,
    ) -> Result<String> {
        if chunks.is_empty() {
            debug!("no context retrieved, answering with unknown_answer");
            return Ok(self.template.unknown_answer.clone());
        }

        let context = self.format_context(chunks);
        let messages = self.template.render(&context, question, history);
        debug!(model = llm.name(), context_len = context.len(), message_count = messages.len(), "synthesizing answer");

        let answer = llm.complete(&messages).await?;
        Ok(answer.trim().to_string())
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::Mutex;

    use async_trait::async_trait;

    use super::*;
    use crate::document::Chunk;
    use crate::message::PromptMessage;

    #[derive(Default)]
    struct Capture {
        prompts: Mutex<Vec<Vec<PromptMessage>>>,
    }

    #[async_trait]
    impl LanguageModel for Capture {
        fn name(&self) -> &str {
            "capture"
        }

        async fn complete(&self, messages: &[PromptMessage]) -> Result<String> {
            self.prompts.lock().unwrap().push(messages.to_vec());
            Ok("  Cool climate.\n".to_string())
        }
    }

    fn result(index: usize, text: &str) -> SearchResult {
        SearchResult {
            chunk: Chunk {
                id: format!("doc_{index}"),
                document_id: "doc".into(),
                index,
                text: text.into(),
                start: 0,
                end: text.len(),
                metadata: HashMap::new(),
            },
            score: 1.0,
        }
    }

    #[test]
    fn context_keeps_ranked_order() {
        let chunks = [result(3, "second-best"), result(0, "best")];
        assert_eq!(AnswerSynthesizer::default().format_context(&chunks), "second-best\n\nbest");
        let dashed = AnswerSynthesizer::default().with_document_separator("\n---\n");
        assert_eq!(dashed.format_context(&chunks), "second-best\n---\nbest");
    }

    #[tokio::test]
    async fn no_chunks_skips_the_model() {
        let model = Capture::default();
        let answer = AnswerSynthesizer::default().synthesize(&[], "Why?", &[], &model).await.unwrap();
        assert_eq!(answer, "I don't know.");
        assert!(model.prompts.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn answer_is_trimmed_and_prompt_carries_context() {
        let model = Capture::default();
        let chunks = [result(0, "Baguio is known for its cool climate.")];
        let answer =
            AnswerSynthesizer::default().synthesize(&chunks, "Why go?", &[], &model).await.unwrap();

        assert_eq!(answer, "Cool climate.");
        let prompts = model.prompts.lock().unwrap();
        assert_eq!(prompts.len(), 1);
        assert!(prompts[0][0].content.contains("cool climate"));
        assert_eq!(prompts[0].last().unwrap().content, "Why go?");
    }
}
