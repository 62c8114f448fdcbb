//! Decoded stream events.
//!
//! Events are transient: the session controller applies each one to thread
//! state as it arrives and then drops it.

/// One decoded event of an exchange's response stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StreamEvent {
    /// Incremental text fragment of the answer
    Delta(String),
    /// Completion marker carrying the full, authoritative answer text.
    /// Supersedes whatever was accumulated from earlier deltas.
    Done(String),
    /// Explicit error payload from the backend
    Error(String),
}
