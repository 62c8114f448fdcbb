//! Chat API client for backend communication.
//!
//! Opens one streaming POST per exchange and turns the response body into a
//! stream of [`StreamEvent`]s through the Stream Reader.

use std::pin::Pin;
use std::sync::Arc;

use futures_util::stream::Stream;
use futures_util::StreamExt;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error};

use crate::adapters::ReqwestHttpClient;
use crate::error::{classify_http_error, NetworkError};
use crate::models::ChatMessage;
use crate::sse::{encode_request, read_events, StreamEvent};
use crate::traits::{Headers, HttpClient};

pub const DEFAULT_API_URL: &str = "http://localhost:8000/gemini";

/// Events of one exchange, in arrival order.
pub type EventStream = Pin<Box<dyn Stream<Item = Result<StreamEvent, NetworkError>> + Send>>;

/// Client for the chat backend
#[derive(Clone)]
pub struct ChatClient {
    api_url: String,
    http: Arc<dyn HttpClient>,
}

impl std::fmt::Debug for ChatClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChatClient")
            .field("api_url", &self.api_url)
            .finish_non_exhaustive()
    }
}

impl ChatClient {
    /// Create a client posting to `api_url` through the given transport.
    pub fn new(api_url: impl Into<String>, http: Arc<dyn HttpClient>) -> Self {
        Self {
            api_url: api_url.into(),
            http,
        }
    }

    /// Create a client backed by [`ReqwestHttpClient`].
    pub fn with_reqwest(api_url: impl Into<String>) -> Self {
        Self::new(api_url, Arc::new(ReqwestHttpClient::new()))
    }

    pub fn api_url(&self) -> &str {
        &self.api_url
    }

    /// Open a streaming exchange.
    ///
    /// Sends `history` as given, in order, together with `message`. The
    /// session controller passes the thread so far followed by the new user
    /// message. Resolves once the response headers arrive; the body is then
    /// consumed lazily through the returned stream.
    ///
    /// # Errors
    /// - [`NetworkError::Cancelled`] if `cancel` fires before the response
    /// - [`NetworkError::HttpStatus`] for a non-success status, carrying the
    ///   response body text
    /// - any other transport failure, classified
    ///
    /// Cancelling after this returns simply ends the event stream.
    pub async fn stream(
        &self,
        history: &[ChatMessage],
        message: &str,
        cancel: CancellationToken,
    ) -> Result<EventStream, NetworkError> {
        let body = encode_request(history, message).map_err(|e| NetworkError::InvalidRequest {
            message: e.to_string(),
        })?;

        let mut headers = Headers::new();
        headers.insert("Content-Type".to_string(), "application/json".to_string());
        headers.insert("Accept".to_string(), "text/event-stream".to_string());

        debug!(url = %self.api_url, history = history.len(), "Opening chat stream");

        let response = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(NetworkError::Cancelled),
            response = self.http.post_stream(&self.api_url, &body, &headers) => response,
        };

        let body = response.map_err(|e| {
            let err = classify_http_error(e, &self.api_url);
            error!(code = err.error_code(), "Chat request failed: {}", err);
            err
        })?;

        let url = self.api_url.clone();
        let events = read_events(body, cancel)
            .map(move |item| item.map_err(|e| classify_http_error(e, &url)));

        Ok(Box::pin(events))
    }
}
