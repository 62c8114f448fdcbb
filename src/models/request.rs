use serde::{Deserialize, Serialize};

use super::message::{ChatMessage, MessageRole};

/// One text part of a history entry
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Part {
    pub text: String,
}

/// A prior conversation turn as the backend expects it
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct HistoryEntry {
    pub role: MessageRole,
    pub parts: Vec<Part>,
}

impl HistoryEntry {
    pub fn new(role: MessageRole, text: impl Into<String>) -> Self {
        Self {
            role,
            parts: vec![Part { text: text.into() }],
        }
    }
}

impl From<&ChatMessage> for HistoryEntry {
    fn from(message: &ChatMessage) -> Self {
        Self::new(message.role, message.text.clone())
    }
}

/// Body of the POST that opens one exchange
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ChatRequest {
    /// Prior turns, in order
    pub history: Vec<HistoryEntry>,
    /// The new user message
    pub message: String,
}

impl ChatRequest {
    /// Build a request from raw history entries
    pub fn new(history: Vec<HistoryEntry>, message: impl Into<String>) -> Self {
        Self {
            history,
            message: message.into(),
        }
    }

    /// Build a request from the messages of a thread. Entries map 1:1, in
    /// order; nothing is truncated here.
    pub fn from_messages(messages: &[ChatMessage], message: impl Into<String>) -> Self {
        Self::new(messages.iter().map(HistoryEntry::from).collect(), message)
    }
}
