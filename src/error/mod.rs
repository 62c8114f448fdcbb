//! Error handling for the chat client.
//!
//! - **Error Categories**: High-level classification for handling decisions
//! - **Domain-specific Errors**: Network, Stream, Storage and Config errors
//! - **Unified Error Type**: `ChatError` maps every exchange outcome that is
//!   not a success
//! - **Result Type Alias**: `ChatResult<T>`
//!
//! | Variant | Exchange effect | Retryable |
//! |---------|-----------------|-----------|
//! | Validation | nothing sent | No |
//! | Busy | nothing sent | No |
//! | Network | full rollback, prompt restored | Depends |
//! | Stream (upstream) | full rollback, prompt restored | Yes |
//! | EmptyResponse | placeholder removed, prompt restored | Yes |
//! | Cancelled | placeholder removed, user message kept | No |

mod category;
mod chat_error;
mod network;
mod stream;
mod system;

pub use category::ErrorCategory;
pub use chat_error::{
    ChatError, BUSY_MESSAGE, EMPTY_PROMPT_MESSAGE, GENERIC_FAILURE_MESSAGE, NO_RESPONSE_MESSAGE,
    STOPPED_MESSAGE,
};
pub use network::{classify_http_error, NetworkError};
pub use stream::StreamError;
pub use system::{ConfigError, StorageError};

/// Result alias used across the crate.
pub type ChatResult<T> = Result<T, ChatError>;
