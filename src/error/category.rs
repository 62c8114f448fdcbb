//! Error category classification.
//!
//! Categories drive how the session controller reacts to a failure: whether
//! the prompt is worth offering for retry, and what kind of notice to show.

use std::fmt;

/// High-level categorization of errors for handling decisions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    /// Connection, DNS, timeout, interrupted body.
    /// Generally transient and retryable.
    Network,

    /// The backend answered with an error status or an error payload.
    /// Generally transient and retryable after delay.
    Server,

    /// Client-side misuse (e.g. a second exchange while one is live).
    Client,

    /// User action required (empty prompt, explicit stop).
    User,

    /// Local storage errors.
    System,

    /// Invalid configuration (bad API URL, unusable data directory).
    Configuration,
}

impl ErrorCategory {
    /// Returns true if errors in this category are generally transient
    /// and the operation can be retried.
    pub fn is_retryable(&self) -> bool {
        matches!(self, ErrorCategory::Network | ErrorCategory::Server)
    }

    /// Returns a short label for the category suitable for logging.
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCategory::Network => "network",
            ErrorCategory::Server => "server",
            ErrorCategory::Client => "client",
            ErrorCategory::User => "user",
            ErrorCategory::System => "system",
            ErrorCategory::Configuration => "configuration",
        }
    }

    /// Returns a user-friendly description of the category.
    pub fn description(&self) -> &'static str {
        match self {
            ErrorCategory::Network => "Network connectivity issue",
            ErrorCategory::Server => "Server-side issue",
            ErrorCategory::Client => "Application error",
            ErrorCategory::User => "User action required",
            ErrorCategory::System => "System error",
            ErrorCategory::Configuration => "Configuration problem",
        }
    }

    /// Returns suggested recovery actions for this category.
    pub fn recovery_hint(&self) -> &'static str {
        match self {
            ErrorCategory::Network => "Check your internet connection and try again",
            ErrorCategory::Server => {
                "The server may be experiencing issues. Please try again later"
            }
            ErrorCategory::Client => "Wait for the current answer to finish, or stop it first",
            ErrorCategory::User => "Please check your input and try again",
            ErrorCategory::System => "Check file permissions and available disk space",
            ErrorCategory::Configuration => "Check COLLOQ_API_URL and COLLOQ_DATA_DIR",
        }
    }
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
