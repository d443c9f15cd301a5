//! Rewriting follow-up questions into standalone retrieval queries.

use tracing::debug;

use crate::error::Result;
use crate::message::{ChatMessage, PromptMessage};
use crate::model::LanguageModel;

/// Instruction used when none is configured.
pub const DEFAULT_CONTEXTUALIZE_INSTRUCTIONS: &str = "Given a chat history and the latest user \
question which might reference context in the chat history, formulate a standalone question \
which can be understood without the chat history. Do NOT answer the question, just reformulate \
it if needed and otherwise return it as is.";

/// Turns a question that may depend on earlier turns into one that does not.
///
/// The rewritten question is only used to query the index. It is never shown
/// to the user or stored in the history.
#[derive(Debug, Clone)]
pub struct QueryContextualizer {
    instructions: String,
}

impl Default for QueryContextualizer {
    fn default() -> Self {
        Self { instructions: DEFAULT_CONTEXTUALIZE_INSTRUCTIONS.to_string() }
    }
}

impl QueryContextualizer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Use a custom system instruction for the rewrite call.
    pub fn with_instructions(instructions: impl Into<String>) -> Self {
        Self { instructions: instructions.into() }
    }

    /// Produce a standalone version of `question`.
    ///
    /// With an empty history the question is returned as is and the model is
    /// not called. If the model returns only whitespace the original question
    /// is used.
    ///
    /// # Errors
    ///
    /// Propagates the model's [`RagError::LanguageModelError`](crate::RagError::LanguageModelError).
    pub async fn rewrite(
        &self,
        history: &[ChatMessage],
        question: &str,
        llm: &dyn LanguageModel,
    ) -> Result<String> {
        if history.is_empty() {
            return Ok(question.to_string());
        }

        let mut messages = Vec::with_capacity(history.len() + 2);
        messages.push(PromptMessage::system(self.instructions.as_str()));
        messages.extend(history.iter().map(PromptMessage::from));
        messages.push(PromptMessage::human(question));

        let rewritten = llm.complete(&messages).await?;
        let rewritten = rewritten.trim();
        if rewritten.is_empty() {
            debug!(model = llm.name(), "empty rewrite, using original question");
            return Ok(question.to_string());
        }

        debug!(model = llm.name(), standalone_question = rewritten, "contextualized question");
        Ok(rewritten.to_string())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use async_trait::async_trait;

    use super::*;
    use crate::message::PromptRole;

    struct Recording {
        reply: String,
        calls: Mutex<Vec<Vec<PromptMessage>>>,
    }

    impl Recording {
        fn new(reply: &str) -> Self {
            Self { reply: reply.to_string(), calls: Mutex::new(Vec::new()) }
        }
    }

    #[async_trait]
    impl LanguageModel for Recording {
        fn name(&self) -> &str {
            "recording"
        }

        async fn complete(&self, messages: &[PromptMessage]) -> Result<String> {
            self.calls.lock().unwrap().push(messages.to_vec());
            Ok(self.reply.clone())
        }
    }

    #[tokio::test]
    async fn empty_history_is_pass_through() {
        let llm = Recording::new("should not be used");
        let out = QueryContextualizer::new().rewrite(&[], "What is Baguio known for?", &llm).await.unwrap();
        assert_eq!(out, "What is Baguio known for?");
        assert!(llm.calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn history_is_sent_between_instructions_and_question() {
        let llm = Recording::new("  What problems does Baguio have?\n");
        let history = vec![
            ChatMessage::human("Does Baguio have any problems?"),
            ChatMessage::assistant("Yes!"),
        ];
        let out = QueryContextualizer::new().rewrite(&history, "What are they?", &llm).await.unwrap();
        assert_eq!(out, "What problems does Baguio have?");

        let calls = llm.calls.lock().unwrap();
        let roles: Vec<PromptRole> = calls[0].iter().map(|m| m.role).collect();
        assert_eq!(
            roles,
            vec![PromptRole::System, PromptRole::Human, PromptRole::Assistant, PromptRole::Human]
        );
        assert!(calls[0][0].content.contains("Do NOT answer"));
        assert_eq!(calls[0][3].content, "What are they?");
    }

    #[tokio::test]
    async fn blank_rewrite_falls_back_to_question() {
        let llm = Recording::new("   ");
        let history = vec![ChatMessage::human("hi"), ChatMessage::assistant("hello")];
        let out = QueryContextualizer::new().rewrite(&history, "and then?", &llm).await.unwrap();
        assert_eq!(out, "and then?");
    }
}
