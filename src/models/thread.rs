use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::message::ChatMessage;

/// Title given to threads that have no derived title yet
pub const DEFAULT_THREAD_TITLE: &str = "New conversation";

/// A conversation thread.
///
/// `messages` is kept in chronological order. `updated_at` is refreshed on
/// every mutation and doubles as the sort key for thread listings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ChatThread {
    /// Opaque unique identifier
    pub id: String,
    /// Display title, derived from the first user message
    pub title: String,
    /// When the thread was created (reset by a clear)
    pub created_at: DateTime<Utc>,
    /// When the thread was last mutated
    pub updated_at: DateTime<Utc>,
    /// Messages in chronological order
    #[serde(default)]
    pub messages: Vec<ChatMessage>,
}

impl ChatThread {
    /// Create an empty thread with a fresh identity
    pub fn new(title: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4().to_string(),
            title: title.into(),
            created_at: now,
            updated_at: now,
            messages: Vec::new(),
        }
    }

    /// Whether the title is still the placeholder (or blank)
    pub fn has_default_title(&self) -> bool {
        self.title.trim().is_empty() || self.title == DEFAULT_THREAD_TITLE
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Refresh `updated_at`
    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }

    /// Find a message by id
    pub fn message(&self, id: &str) -> Option<&ChatMessage> {
        self.messages.iter().find(|m| m.id == id)
    }

    /// Overwrite the text of one message, leaving every other message alone.
    /// Returns `false` if no message has that id.
    pub fn set_message_text(&mut self, id: &str, text: &str) -> bool {
        match self.messages.iter_mut().find(|m| m.id == id) {
            Some(message) => {
                message.text.clear();
                message.text.push_str(text);
                true
            }
            None => false,
        }
    }

    /// Drop every message whose id is in `ids`
    pub fn remove_messages(&mut self, ids: &[&str]) {
        self.messages.retain(|m| !ids.contains(&m.id.as_str()));
    }
}

impl Default for ChatThread {
    fn default() -> Self {
        Self::new(DEFAULT_THREAD_TITLE)
    }
}
