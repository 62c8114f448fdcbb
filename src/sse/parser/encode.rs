//! Request body encoding.

use crate::models::{ChatMessage, ChatRequest};

/// Serialize the request body of one exchange.
///
/// `history` is sent as-is, one entry per message in order. Windowing or
/// truncation of long conversations is left to the caller.
pub fn encode_request(history: &[ChatMessage], message: &str) -> serde_json::Result<String> {
    serde_json::to_string(&ChatRequest::from_messages(history, message))
}
