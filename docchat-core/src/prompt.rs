//! Answer prompt templates.
//!
//! A [`PromptTemplate`] is configuration: it decides the wording of the
//! answer prompt and whether chat history is included, but never changes how
//! retrieval or orchestration behave.

use serde::{Deserialize, Serialize};

use crate::error::{RagError, Result};
use crate::message::{ChatMessage, PromptMessage};

/// Wording and layout of the answer prompt.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct PromptTemplate {
    /// Leading instruction, placed before the generated rules.
    pub instructions: String,
    /// What the model should say when the context does not contain the answer.
    /// Also returned directly when nothing was retrieved.
    pub unknown_answer: String,
    /// Upper bound on answer length, in sentences.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_sentences: Option<usize>,
    /// Phrase the model must end every answer with.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub closing_phrase: Option<String>,
    /// Send prior turns to the model between the instructions and the question.
    pub include_history: bool,
    /// Ask the model not to mention that it is reading from a context.
    pub hide_provenance: bool,
}

impl Default for PromptTemplate {
    fn default() -> Self {
        Self::conversational()
    }
}

impl PromptTemplate {
    /// Multi-turn prompt: system instructions with the context, then the
    /// history, then the question.
    pub fn conversational() -> Self {
        Self {
            instructions: "Use the following pieces of retrieved context to answer the question."
                .to_string(),
            unknown_answer: "I don't know.".to_string(),
            max_sentences: Some(3),
            closing_phrase: None,
            include_history: true,
            hide_provenance: true,
        }
    }

    /// Single-message prompt ending in `Helpful Answer:`, ignoring history.
    pub fn single_turn() -> Self {
        Self {
            instructions: "Use the following pieces of context to answer the question at the end."
                .to_string(),
            unknown_answer: "I don't know.".to_string(),
            max_sentences: Some(3),
            closing_phrase: Some("thanks for asking!".to_string()),
            include_history: false,
            hide_provenance: false,
        }
    }

    /// Look up a built-in template by name (`conversational` or `single-turn`).
    pub fn preset(name: &str) -> Result<Self> {
        match name {
            "conversational" => Ok(Self::conversational()),
            "single-turn" | "single_turn" => Ok(Self::single_turn()),
            other => Err(RagError::ConfigError(format!(
                "unknown prompt template '{other}' (expected 'conversational' or 'single-turn')"
            ))),
        }
    }

    /// The instruction paragraph with every configured rule spelled out.
    pub fn rules(&self) -> String {
        let mut text = self.instructions.trim().to_string();
        text.push_str(&format!(
            "\nIf you don't know the answer, just say \"{}\", don't try to make up an answer.",
            self.unknown_answer
        ));
        if let Some(n) = self.max_sentences {
            let unit = if n == 1 { "sentence" } else { "sentences" };
            text.push_str(&format!("\nUse {n} {unit} maximum and keep the answer concise."));
        }
        if self.hide_provenance {
            text.push_str("\nDon't mention that you got the answer from the context.");
        }
        if let Some(phrase) = &self.closing_phrase {
            text.push_str(&format!("\nAlways say \"{phrase}\" at the end of the answer."));
        }
        text
    }

    /// Build the messages for one answer call.
    pub fn render(
        &self,
        context: &str,
        question: &str,
        history: &[ChatMessage],
    ) -> Vec<PromptMessage> {
        let rules = self.rules();
        if !self.include_history {
            return vec![PromptMessage::human(format!(
                "{rules}\n\n{context}\n\nQuestion: {question}\n\nHelpful Answer:"
            ))];
        }

        let mut messages = Vec::with_capacity(history.len() + 2);
        messages.push(PromptMessage::system(format!("{rules}\n\n{context}")));
        messages.extend(history.iter().map(PromptMessage::from));
        messages.push(PromptMessage::human(question));
        messages
    }
}
