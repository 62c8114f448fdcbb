//! Controller states and the per-exchange session record.

use std::fmt;

use tokio_util::sync::CancellationToken;

/// Lifecycle of the controller's current exchange.
///
/// `Completed`, `Aborted` and `Failed` are resting states: like `Idle` they
/// accept the next `ask`. Only `Sending` and `Streaming` reject it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionState {
    #[default]
    Idle,
    /// Request issued, waiting for the response headers
    Sending,
    /// Consuming the response stream
    Streaming,
    Completed,
    Aborted,
    Failed,
}

impl SessionState {
    /// Whether an exchange is in flight
    pub fn is_busy(&self) -> bool {
        matches!(self, SessionState::Sending | SessionState::Streaming)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SessionState::Idle => "idle",
            SessionState::Sending => "sending",
            SessionState::Streaming => "streaming",
            SessionState::Completed => "completed",
            SessionState::Aborted => "aborted",
            SessionState::Failed => "failed",
        }
    }
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Bookkeeping for one in-flight exchange.
///
/// Lives exactly as long as the exchange. The controller keeps only a
/// [`SessionHandle`] to it, which is how `stop()` and thread switches reach
/// the cancellation token.
#[derive(Debug)]
pub struct Session {
    id: u64,
    thread_id: String,
    user_message_id: String,
    assistant_message_id: String,
    prompt: String,
    cancel: CancellationToken,
    accumulated_text: String,
    received_any_content: bool,
}

impl Session {
    pub fn new(
        id: u64,
        thread_id: impl Into<String>,
        user_message_id: impl Into<String>,
        assistant_message_id: impl Into<String>,
        prompt: impl Into<String>,
    ) -> Self {
        Self {
            id,
            thread_id: thread_id.into(),
            user_message_id: user_message_id.into(),
            assistant_message_id: assistant_message_id.into(),
            prompt: prompt.into(),
            cancel: CancellationToken::new(),
            accumulated_text: String::new(),
            received_any_content: false,
        }
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn thread_id(&self) -> &str {
        &self.thread_id
    }

    pub fn user_message_id(&self) -> &str {
        &self.user_message_id
    }

    pub fn assistant_message_id(&self) -> &str {
        &self.assistant_message_id
    }

    /// The prompt as sent
    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    pub fn cancel_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    pub fn text(&self) -> &str {
        &self.accumulated_text
    }

    pub fn handle(&self) -> SessionHandle {
        SessionHandle {
            id: self.id,
            thread_id: self.thread_id.clone(),
            cancel: self.cancel.clone(),
        }
    }

    /// Append a fragment. Returns the text accumulated so far.
    pub fn apply_delta(&mut self, fragment: &str) -> &str {
        self.accumulated_text.push_str(fragment);
        self.received_any_content = true;
        &self.accumulated_text
    }

    /// Replace the accumulated text with the authoritative final text.
    pub fn apply_done(&mut self, text: String) -> &str {
        if !text.is_empty() {
            self.received_any_content = true;
        }
        self.accumulated_text = text;
        &self.accumulated_text
    }

    /// Whether the exchange produced a usable answer
    pub fn has_content(&self) -> bool {
        self.received_any_content && !self.accumulated_text.trim().is_empty()
    }
}

/// The controller's reference to its live session.
#[derive(Debug, Clone)]
pub struct SessionHandle {
    pub id: u64,
    pub thread_id: String,
    cancel: CancellationToken,
}

impl SessionHandle {
    pub fn cancel(&self) {
        self.cancel.cancel();
    }
}
