use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Role of a message in a conversation.
///
/// The backend speaks the `user`/`model` vocabulary, so the assistant side is
/// called `Model` here as well.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    User,
    Model,
}

impl MessageRole {
    /// Wire name of the role (`"user"` or `"model"`)
    pub fn as_str(&self) -> &'static str {
        match self {
            MessageRole::User => "user",
            MessageRole::Model => "model",
        }
    }
}

/// A single message within a chat thread.
///
/// `id` stays fixed for the whole life of the message, which is what lets the
/// session controller find the in-progress model message and rewrite its text
/// while a response streams in.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ChatMessage {
    /// Opaque unique identifier
    pub id: String,
    /// Who authored the message
    pub role: MessageRole,
    /// Message text (rewritten in place while streaming)
    pub text: String,
    /// When the message was created
    pub created_at: DateTime<Utc>,
}

impl ChatMessage {
    /// Create a message with a fresh identity and the current timestamp
    pub fn new(role: MessageRole, text: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            role,
            text: text.into(),
            created_at: Utc::now(),
        }
    }

    /// Create a user message
    pub fn user(text: impl Into<String>) -> Self {
        Self::new(MessageRole::User, text)
    }

    /// Create an empty model message, used as the streaming placeholder
    pub fn placeholder() -> Self {
        Self::new(MessageRole::Model, String::new())
    }

    pub fn is_user(&self) -> bool {
        self.role == MessageRole::User
    }
}
