//! Transient notices shown above the composer.

use std::time::{Duration, Instant};

/// Default auto-dismiss delay
pub const DEFAULT_NOTICE_TTL: Duration = Duration::from_secs(3);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    /// Something went wrong
    Error,
    /// Informational, e.g. a stopped generation
    Info,
}

/// A short-lived message for the user. Never blocks input; it simply
/// disappears once its time-to-live has passed.
#[derive(Debug, Clone)]
pub struct Notice {
    pub message: String,
    pub kind: NoticeKind,
    raised_at: Instant,
}

impl Notice {
    pub fn error(message: impl Into<String>) -> Self {
        Self::new(message, NoticeKind::Error)
    }

    pub fn info(message: impl Into<String>) -> Self {
        Self::new(message, NoticeKind::Info)
    }

    fn new(message: impl Into<String>, kind: NoticeKind) -> Self {
        Self {
            message: message.into(),
            kind,
            raised_at: Instant::now(),
        }
    }

    pub fn is_error(&self) -> bool {
        self.kind == NoticeKind::Error
    }

    pub fn is_expired(&self, ttl: Duration) -> bool {
        self.raised_at.elapsed() >= ttl
    }
}
