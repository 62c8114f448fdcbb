//! Conversation data model: messages, threads and the request body sent to
//! the backend.

mod message;
mod request;
mod text_utils;
mod thread;

pub use message::{ChatMessage, MessageRole};
pub use request::{ChatRequest, HistoryEntry, Part};
pub use text_utils::{collapse_whitespace, derive_title, looks_like_markup, TITLE_MAX_CHARS};
pub use thread::{ChatThread, DEFAULT_THREAD_TITLE};
