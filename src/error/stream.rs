//! Streaming-related error types.
//!
//! Errors that arise while decoding the event stream of one exchange.

use std::fmt;

/// Stream-specific error variants.
#[derive(Debug, Clone, PartialEq)]
pub enum StreamError {
    /// A `data:` frame whose payload could not be parsed. Only ever logged;
    /// the stream carries on with the next frame.
    MalformedFrame {
        payload: String,
        message: String,
    },

    /// The backend sent an explicit `error` payload.
    Upstream {
        message: String,
    },
}

impl StreamError {
    /// Malformed frames are skipped, upstream errors end the exchange but
    /// the same prompt may well succeed a second time.
    pub fn is_retryable(&self) -> bool {
        matches!(self, StreamError::Upstream { .. })
    }

    /// Get a user-facing message.
    pub fn user_message(&self) -> String {
        match self {
            StreamError::MalformedFrame { .. } => {
                "Received invalid data from server. Please try again.".to_string()
            }
            StreamError::Upstream { message } => message.clone(),
        }
    }

    /// Get a short error code for logging.
    pub fn error_code(&self) -> &'static str {
        match self {
            StreamError::MalformedFrame { .. } => "E_STREAM_FRAME",
            StreamError::Upstream { .. } => "E_STREAM_UPSTREAM",
        }
    }
}

impl fmt::Display for StreamError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StreamError::MalformedFrame { payload, message } => {
                write!(f, "Malformed frame payload '{}': {}", payload, message)
            }
            StreamError::Upstream { message } => write!(f, "Upstream error: {}", message),
        }
    }
}

impl std::error::Error for StreamError {}
