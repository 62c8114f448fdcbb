//! Network-related error types.
//!
//! Errors raised while opening the exchange request or reading its body.
//! Every one of them rolls the exchange back in full.

use std::fmt;

use crate::traits::HttpError;

/// Network-specific error variants.
#[derive(Debug, Clone, PartialEq)]
pub enum NetworkError {
    /// Connection to the server failed.
    ConnectionFailed {
        url: String,
        message: String,
    },

    /// Request timed out.
    Timeout {
        message: String,
    },

    /// HTTP status error (non-2xx response). `message` is the response body
    /// text, or a status line when the body was empty.
    HttpStatus {
        status: u16,
        message: String,
    },

    /// The response body broke off mid-read.
    BodyInterrupted {
        message: String,
    },

    /// The request could not be built (bad URL, unserializable body).
    InvalidRequest {
        message: String,
    },

    /// Request was cancelled.
    Cancelled,

    /// Generic network error.
    Other {
        message: String,
    },
}

impl NetworkError {
    /// Build an HTTP status error from a response body, falling back to a
    /// status line when the body has nothing to say.
    pub fn from_status(status: u16, body: &str) -> Self {
        let trimmed = body.trim();
        let message = if trimmed.is_empty() {
            format!("Request failed with status {}", status)
        } else {
            trimmed.to_string()
        };
        NetworkError::HttpStatus { status, message }
    }

    /// Check if this error is likely transient and can be retried.
    pub fn is_retryable(&self) -> bool {
        match self {
            NetworkError::ConnectionFailed { .. } => true,
            NetworkError::Timeout { .. } => true,
            NetworkError::HttpStatus { status, .. } => {
                *status >= 500 || *status == 429 || *status == 408
            }
            NetworkError::BodyInterrupted { .. } => true,
            NetworkError::InvalidRequest { .. } => false,
            NetworkError::Cancelled => false,
            NetworkError::Other { .. } => false,
        }
    }

    /// Get a user-facing message.
    ///
    /// Status errors surface the server's own text; the session controller
    /// swaps it for a generic message when that text is markup.
    pub fn user_message(&self) -> String {
        match self {
            NetworkError::ConnectionFailed { .. } => {
                "Unable to connect to the server. Please check your internet connection."
                    .to_string()
            }
            NetworkError::Timeout { .. } => {
                "The request timed out. The server may be slow or unreachable.".to_string()
            }
            NetworkError::HttpStatus { message, .. } => message.clone(),
            NetworkError::BodyInterrupted { .. } => {
                "The connection was interrupted while the answer was streaming.".to_string()
            }
            NetworkError::InvalidRequest { message } => format!("Invalid request: {}", message),
            NetworkError::Cancelled => "The request was cancelled.".to_string(),
            NetworkError::Other { message } => message.clone(),
        }
    }

    /// Get a short error code for logging.
    pub fn error_code(&self) -> &'static str {
        match self {
            NetworkError::ConnectionFailed { .. } => "E_NET_CONN",
            NetworkError::Timeout { .. } => "E_NET_TIMEOUT",
            NetworkError::HttpStatus { .. } => "E_NET_HTTP",
            NetworkError::BodyInterrupted { .. } => "E_NET_BODY",
            NetworkError::InvalidRequest { .. } => "E_NET_INVALID",
            NetworkError::Cancelled => "E_NET_CANCEL",
            NetworkError::Other { .. } => "E_NET_OTHER",
        }
    }
}

impl fmt::Display for NetworkError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NetworkError::ConnectionFailed { url, message } => {
                write!(f, "Connection failed to '{}': {}", url, message)
            }
            NetworkError::Timeout { message } => write!(f, "Request timed out: {}", message),
            NetworkError::HttpStatus { status, message } => {
                write!(f, "HTTP {} error: {}", status, message)
            }
            NetworkError::BodyInterrupted { message } => {
                write!(f, "Response body interrupted: {}", message)
            }
            NetworkError::InvalidRequest { message } => write!(f, "Invalid request: {}", message),
            NetworkError::Cancelled => write!(f, "Request cancelled"),
            NetworkError::Other { message } => write!(f, "Network error: {}", message),
        }
    }
}

impl std::error::Error for NetworkError {}

/// Classify a transport-level error for the exchange targeting `url`.
pub fn classify_http_error(err: HttpError, url: &str) -> NetworkError {
    match err {
        HttpError::ConnectionFailed(message) => NetworkError::ConnectionFailed {
            url: url.to_string(),
            message,
        },
        HttpError::Timeout(message) => NetworkError::Timeout { message },
        HttpError::ServerError { status, message } => NetworkError::from_status(status, &message),
        HttpError::Cancelled => NetworkError::Cancelled,
        HttpError::Io(message) => NetworkError::BodyInterrupted { message },
        HttpError::InvalidUrl(message) => NetworkError::InvalidRequest { message },
        HttpError::Other(message) => NetworkError::Other { message },
    }
}
