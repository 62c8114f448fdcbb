//! Unified error type for the chat client.

use std::fmt;

use super::category::ErrorCategory;
use super::network::NetworkError;
use super::stream::StreamError;
use super::system::{ConfigError, StorageError};
use crate::models::looks_like_markup;

/// Shown whenever a failure has no human-readable text of its own
pub const GENERIC_FAILURE_MESSAGE: &str = "Something went wrong. Please try again.";

/// Shown when a prompt is blank after trimming
pub const EMPTY_PROMPT_MESSAGE: &str = "Please enter a prompt to continue.";

/// Shown when a stream finishes without usable text
pub const NO_RESPONSE_MESSAGE: &str = "No response received. Please try again.";

/// Shown after the user stops a generation
pub const STOPPED_MESSAGE: &str = "Generation stopped.";

/// Shown when a second prompt arrives while an answer is still streaming
pub const BUSY_MESSAGE: &str =
    "Please wait for the current response to complete before sending another message.";

/// Unified error type.
///
/// Every variant maps onto one of the outcomes an exchange can have. None of
/// them is fatal: each failure path hands control back to an idle controller.
#[derive(Debug)]
pub enum ChatError {
    /// The prompt was empty. Rejected before any network activity.
    Validation { message: String },

    /// An exchange is already live on this controller.
    Busy { thread_id: String },

    /// Request rejected or network failure. The exchange is rolled back.
    Network(NetworkError),

    /// Error raised while decoding the stream (an upstream error payload).
    Stream(StreamError),

    /// The stream completed without any usable text.
    EmptyResponse,

    /// The user stopped the exchange. Not a fault.
    Cancelled,

    /// The thread collection could not be persisted.
    Storage(StorageError),

    /// Invalid configuration.
    Config(ConfigError),
}

impl ChatError {
    pub fn validation(message: impl Into<String>) -> Self {
        ChatError::Validation {
            message: message.into(),
        }
    }

    pub fn upstream(message: impl Into<String>) -> Self {
        ChatError::Stream(StreamError::Upstream {
            message: message.into(),
        })
    }

    /// Get the category of this error.
    pub fn category(&self) -> ErrorCategory {
        match self {
            ChatError::Validation { .. } => ErrorCategory::User,
            ChatError::Busy { .. } => ErrorCategory::Client,
            ChatError::Network(NetworkError::HttpStatus { .. }) => ErrorCategory::Server,
            ChatError::Network(_) => ErrorCategory::Network,
            ChatError::Stream(StreamError::Upstream { .. }) => ErrorCategory::Server,
            ChatError::Stream(StreamError::MalformedFrame { .. }) => ErrorCategory::Client,
            ChatError::EmptyResponse => ErrorCategory::Server,
            ChatError::Cancelled => ErrorCategory::User,
            ChatError::Storage(_) => ErrorCategory::System,
            ChatError::Config(_) => ErrorCategory::Configuration,
        }
    }

    /// Check if retrying the same prompt makes sense.
    pub fn is_retryable(&self) -> bool {
        match self {
            ChatError::Network(err) => err.is_retryable(),
            ChatError::Stream(err) => err.is_retryable(),
            ChatError::EmptyResponse => true,
            _ => false,
        }
    }

    /// Whether the exchange is rolled back in full, user message included.
    /// Cancelled and empty exchanges keep their user message.
    pub fn is_full_rollback(&self) -> bool {
        matches!(self, ChatError::Network(_) | ChatError::Stream(_))
    }

    /// The text surfaced in the notice banner.
    ///
    /// Server-provided text that is empty or looks like markup is swapped for
    /// a generic message.
    pub fn user_message(&self) -> String {
        match self {
            ChatError::Validation { message } => message.clone(),
            ChatError::Busy { .. } => BUSY_MESSAGE.to_string(),
            ChatError::Network(err) => readable_or_generic(err.user_message()),
            ChatError::Stream(err) => readable_or_generic(err.user_message()),
            ChatError::EmptyResponse => NO_RESPONSE_MESSAGE.to_string(),
            ChatError::Cancelled => STOPPED_MESSAGE.to_string(),
            ChatError::Storage(_) => "Your conversations could not be saved.".to_string(),
            ChatError::Config(err) => err.to_string(),
        }
    }

    /// Get a short error code for logging.
    pub fn error_code(&self) -> &'static str {
        match self {
            ChatError::Validation { .. } => "E_VALIDATION",
            ChatError::Busy { .. } => "E_BUSY",
            ChatError::Network(err) => err.error_code(),
            ChatError::Stream(err) => err.error_code(),
            ChatError::EmptyResponse => "E_EMPTY_RESPONSE",
            ChatError::Cancelled => "E_CANCELLED",
            ChatError::Storage(err) => err.error_code(),
            ChatError::Config(_) => "E_CONFIG",
        }
    }

    /// Get the recovery hint for this error.
    pub fn recovery_hint(&self) -> &'static str {
        self.category().recovery_hint()
    }
}

fn readable_or_generic(message: String) -> String {
    let trimmed = message.trim();
    if trimmed.is_empty() || looks_like_markup(trimmed) {
        GENERIC_FAILURE_MESSAGE.to_string()
    } else {
        trimmed.to_string()
    }
}

impl fmt::Display for ChatError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChatError::Validation { message } => write!(f, "Validation error: {}", message),
            ChatError::Busy { thread_id } => {
                write!(f, "An exchange is already in flight on thread {}", thread_id)
            }
            ChatError::Network(err) => write!(f, "{}", err),
            ChatError::Stream(err) => write!(f, "{}", err),
            ChatError::EmptyResponse => write!(f, "Stream completed without content"),
            ChatError::Cancelled => write!(f, "Exchange cancelled"),
            ChatError::Storage(err) => write!(f, "{}", err),
            ChatError::Config(err) => write!(f, "{}", err),
        }
    }
}

impl std::error::Error for ChatError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ChatError::Network(err) => Some(err),
            ChatError::Stream(err) => Some(err),
            ChatError::Storage(err) => Some(err),
            ChatError::Config(err) => Some(err),
            _ => None,
        }
    }
}

impl From<NetworkError> for ChatError {
    fn from(err: NetworkError) -> Self {
        ChatError::Network(err)
    }
}

impl From<StreamError> for ChatError {
    fn from(err: StreamError) -> Self {
        ChatError::Stream(err)
    }
}

impl From<StorageError> for ChatError {
    fn from(err: StorageError) -> Self {
        ChatError::Storage(err)
    }
}

impl From<ConfigError> for ChatError {
    fn from(err: ConfigError) -> Self {
        ChatError::Config(err)
    }
}
