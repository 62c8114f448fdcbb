//! HTTP client trait abstraction.
//!
//! Provides a trait-based abstraction for the one HTTP operation the chat
//! client needs, a streaming POST, enabling dependency injection and mocking
//! in tests.

use async_trait::async_trait;
use bytes::Bytes;
use futures::Stream;
use std::collections::HashMap;
use std::pin::Pin;

/// HTTP headers represented as a key-value map.
pub type Headers = HashMap<String, String>;

/// Raw response body, chunk by chunk, as the network delivers it.
pub type ByteStream = Pin<Box<dyn Stream<Item = Result<Bytes, HttpError>> + Send>>;

/// HTTP client errors.
#[derive(Debug, Clone, PartialEq)]
pub enum HttpError {
    /// Connection failed
    ConnectionFailed(String),
    /// Request timeout
    Timeout(String),
    /// Server returned an error status
    ServerError { status: u16, message: String },
    /// Request was cancelled
    Cancelled,
    /// IO error while reading the body
    Io(String),
    /// Invalid URL
    InvalidUrl(String),
    /// Other error
    Other(String),
}

impl std::fmt::Display for HttpError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            HttpError::ConnectionFailed(msg) => write!(f, "Connection failed: {}", msg),
            HttpError::Timeout(msg) => write!(f, "Request timeout: {}", msg),
            HttpError::ServerError { status, message } => {
                write!(f, "Server error ({}): {}", status, message)
            }
            HttpError::Cancelled => write!(f, "Request cancelled"),
            HttpError::Io(msg) => write!(f, "IO error: {}", msg),
            HttpError::InvalidUrl(msg) => write!(f, "Invalid URL: {}", msg),
            HttpError::Other(msg) => write!(f, "HTTP error: {}", msg),
        }
    }
}

impl std::error::Error for HttpError {}

/// Trait for HTTP client operations.
///
/// Implementations include the production reqwest-based client and a mock
/// client that replays scripted byte chunks.
///
/// # Example
///
/// ```ignore
/// use colloq::traits::{HttpClient, Headers};
///
/// async fn open<C: HttpClient>(client: &C) -> Result<(), HttpError> {
///     let mut body = client.post_stream("http://localhost:8000/gemini", "{}", &Headers::new()).await?;
///     while let Some(chunk) = body.next().await {
///         println!("{:?}", chunk?);
///     }
///     Ok(())
/// }
/// ```
#[async_trait]
pub trait HttpClient: Send + Sync {
    /// Perform a POST request and return a streaming response.
    ///
    /// A non-2xx status must come back as [`HttpError::ServerError`] carrying
    /// the response body text, so the caller can surface it.
    async fn post_stream(
        &self,
        url: &str,
        body: &str,
        headers: &Headers,
    ) -> Result<ByteStream, HttpError>;
}
