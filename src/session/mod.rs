//! Session Controller.
//!
//! Drives question/answer exchanges against the chat backend and keeps the
//! thread store consistent through partial delivery, cancellation and
//! failure.
//!
//! ```text
//! Idle -> Sending -> Streaming -> Completed | Aborted | Failed
//! ```
//!
//! | Outcome | User message | Placeholder | Composer | Pending retry |
//! |---------|--------------|-------------|----------|---------------|
//! | Completed | kept | final text | empty | cleared |
//! | Aborted (`stop`) | kept | removed | empty | cleared |
//! | Transport/upstream failure | removed | removed | prompt | prompt |
//! | Empty response | kept | removed | prompt | prompt |

mod controller;
mod notice;
mod state;

pub use controller::{ExchangeOutcome, SessionController};
pub use notice::{Notice, NoticeKind, DEFAULT_NOTICE_TTL};
pub use state::{Session, SessionHandle, SessionState};
