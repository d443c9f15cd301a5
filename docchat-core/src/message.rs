//! Chat history and prompt message types.

use serde::{Deserialize, Serialize};

/// Author of a turn in a conversation.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    /// The user asking questions.
    Human,
    /// The system answering them.
    Assistant,
}

/// One message of a conversation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub text: String,
}

impl ChatMessage {
    pub fn human(text: impl Into<String>) -> Self {
        Self { role: ChatRole::Human, text: text.into() }
    }

    pub fn assistant(text: impl Into<String>) -> Self {
        Self { role: ChatRole::Assistant, text: text.into() }
    }
}

/// An append-only conversation owned by the caller.
///
/// The retrieval chain only ever reads a history; recording a turn is the
/// caller's decision, typically after an answer succeeded.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(transparent)]
pub struct ChatHistory {
    messages: Vec<ChatMessage>,
}

impl ChatHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a completed question/answer turn.
    pub fn record_turn(&mut self, question: impl Into<String>, answer: impl Into<String>) {
        self.messages.push(ChatMessage::human(question));
        self.messages.push(ChatMessage::assistant(answer));
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}

impl From<Vec<ChatMessage>> for ChatHistory {
    fn from(messages: Vec<ChatMessage>) -> Self {
        Self { messages }
    }
}

/// Role of a message sent to a language model.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum PromptRole {
    System,
    Human,
    Assistant,
}

impl PromptRole {
    /// Role name as used by chat-completion APIs.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::System => "system",
            Self::Human => "user",
            Self::Assistant => "assistant",
        }
    }
}

/// A role-tagged message in a prompt.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PromptMessage {
    pub role: PromptRole,
    pub content: String,
}

impl PromptMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self { role: PromptRole::System, content: content.into() }
    }

    pub fn human(content: impl Into<String>) -> Self {
        Self { role: PromptRole::Human, content: content.into() }
    }
}

impl From<&ChatMessage> for PromptMessage {
    fn from(message: &ChatMessage) -> Self {
        let role = match message.role {
            ChatRole::Human => PromptRole::Human,
            ChatRole::Assistant => PromptRole::Assistant,
        };
        Self { role, content: message.text.clone() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_turn_appends_in_order() {
        let mut history = ChatHistory::new();
        history.record_turn("Does Baguio have problems?", "Yes, traffic.");
        assert_eq!(
            history.messages(),
            &[ChatMessage::human("Does Baguio have problems?"), ChatMessage::assistant("Yes, traffic.")]
        );
    }

    #[test]
    fn history_serializes_as_plain_list() {
        let history = ChatHistory::from(vec![ChatMessage::human("hi")]);
        let json = serde_json::to_string(&history).unwrap();
        assert_eq!(json, r#"[{"role":"human","text":"hi"}]"#);
    }

    #[test]
    fn chat_roles_map_to_prompt_roles() {
        let prompt = PromptMessage::from(&ChatMessage::assistant("ok"));
        assert_eq!(prompt.role, PromptRole::Assistant);
        assert_eq!(PromptRole::Human.as_str(), "user");
    }
}
