//! Mock implementations and canned SSE bodies for test fixtures.

pub use colloq::adapters::mock::{InMemoryStore, MockHttpClient, MockResponse};
pub use colloq::traits::HttpError;

use bytes::Bytes;

/// One `data:` frame carrying a fragment.
pub fn delta_frame(text: &str) -> String {
    format!("data: {}\n\n", serde_json::json!({ "delta": text }))
}

/// The terminal frame carrying the full answer.
pub fn done_frame(text: &str) -> String {
    format!("data: {}\n\n", serde_json::json!({ "done": true, "text": text }))
}

pub fn error_frame(message: &str) -> String {
    format!("data: {}\n\n", serde_json::json!({ "error": message }))
}

/// The frames of a normal answer: one delta per fragment, then done.
pub fn sse_body(fragments: &[&str], full: &str) -> String {
    let mut body: String = fragments.iter().map(|f| delta_frame(f)).collect();
    body.push_str(&done_frame(full));
    body
}

/// A normal answer delivered one frame per chunk.
#[allow(dead_code)]
pub fn sse_answer(fragments: &[&str], full: &str) -> MockResponse {
    let mut frames: Vec<String> = fragments.iter().map(|f| delta_frame(f)).collect();
    frames.push(done_frame(full));
    MockResponse::frames(frames)
}

/// Deliver `body` in chunks of `size` bytes, ignoring frame and character
/// boundaries.
#[allow(dead_code)]
pub fn chunked(body: &str, size: usize) -> MockResponse {
    MockResponse::Stream(body.as_bytes().chunks(size).map(Bytes::copy_from_slice).collect())
}
