//! Mock HTTP client for testing.
//!
//! Replays scripted response bodies chunk by chunk so the Stream Reader and
//! the session controller can be exercised without network access.

use async_trait::async_trait;
use bytes::Bytes;
use futures::stream::{self, StreamExt};
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex, MutexGuard};

use crate::traits::{ByteStream, Headers, HttpClient, HttpError};

/// A recorded HTTP request for verification in tests.
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    /// Request URL
    pub url: String,
    /// Request headers
    pub headers: Headers,
    /// Request body
    pub body: String,
}

impl RecordedRequest {
    /// Parse the recorded body as JSON.
    pub fn json(&self) -> serde_json::Result<serde_json::Value> {
        serde_json::from_str(&self.body)
    }
}

/// Configuration for a mock response.
#[derive(Debug, Clone)]
pub enum MockResponse {
    /// Stream these chunks, then end the body
    Stream(Vec<Bytes>),
    /// Stream these chunks, then fail the body read with the error
    StreamError(Vec<Bytes>, HttpError),
    /// Stream these chunks, then stall forever
    Hang(Vec<Bytes>),
    /// Never answer the request at all
    Stall,
    /// Fail the request before any body is returned
    Error(HttpError),
}

impl MockResponse {
    /// Stream a list of SSE frames, one chunk per string.
    pub fn frames<I, S>(frames: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        MockResponse::Stream(
            frames
                .into_iter()
                .map(|frame| Bytes::from(frame.into()))
                .collect(),
        )
    }

    /// A non-success status carrying `body` as the response text.
    pub fn status(status: u16, body: impl Into<String>) -> Self {
        MockResponse::Error(HttpError::ServerError {
            status,
            message: body.into(),
        })
    }
}

/// Mock HTTP client for testing.
///
/// Responses are resolved in this order: the next queued response, an
/// exact (then prefix) URL match, the default response.
///
/// # Example
///
/// ```ignore
/// use colloq::adapters::mock::{MockHttpClient, MockResponse};
///
/// let client = MockHttpClient::new();
/// client.push_response(MockResponse::frames([
///     "data: {\"delta\":\"Hi\"}\n\n",
///     "data: {\"done\":true,\"text\":\"Hi\"}\n\n",
/// ]));
///
/// let mut body = client.post_stream("http://test/gemini", "{}", &Headers::new()).await?;
/// assert_eq!(client.get_requests().len(), 1);
/// ```
#[derive(Debug, Clone, Default)]
pub struct MockHttpClient {
    /// One-shot responses, consumed in order
    queue: Arc<Mutex<VecDeque<MockResponse>>>,
    /// Configured responses by URL
    responses: Arc<Mutex<HashMap<String, MockResponse>>>,
    /// Default response when nothing else matches
    default_response: Arc<Mutex<Option<MockResponse>>>,
    /// Recorded requests for verification
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

impl MockHttpClient {
    /// Create a new mock HTTP client.
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a response for the next request.
    pub fn push_response(&self, response: MockResponse) {
        lock(&self.queue).push_back(response);
    }

    /// Set a response for a specific URL.
    pub fn set_response(&self, url: &str, response: MockResponse) {
        lock(&self.responses).insert(url.to_string(), response);
    }

    /// Set a default response for requests without a specific match.
    pub fn set_default_response(&self, response: MockResponse) {
        *lock(&self.default_response) = Some(response);
    }

    /// Get all recorded requests.
    pub fn get_requests(&self) -> Vec<RecordedRequest> {
        lock(&self.requests).clone()
    }

    /// Get the most recent request.
    pub fn last_request(&self) -> Option<RecordedRequest> {
        lock(&self.requests).last().cloned()
    }

    /// Clear all recorded requests.
    pub fn clear_requests(&self) {
        lock(&self.requests).clear();
    }

    fn record_request(&self, url: &str, headers: &Headers, body: &str) {
        lock(&self.requests).push(RecordedRequest {
            url: url.to_string(),
            headers: headers.clone(),
            body: body.to_string(),
        });
    }

    fn get_response(&self, url: &str) -> Option<MockResponse> {
        if let Some(response) = lock(&self.queue).pop_front() {
            return Some(response);
        }

        {
            let responses = lock(&self.responses);
            if let Some(response) = responses.get(url) {
                return Some(response.clone());
            }
            for (pattern, response) in responses.iter() {
                if url.starts_with(pattern) {
                    return Some(response.clone());
                }
            }
        }

        lock(&self.default_response).clone()
    }
}

fn chunks_then<S>(chunks: Vec<Bytes>, tail: S) -> ByteStream
where
    S: futures::Stream<Item = Result<Bytes, HttpError>> + Send + 'static,
{
    Box::pin(stream::iter(chunks.into_iter().map(Ok)).chain(tail))
}

#[async_trait]
impl HttpClient for MockHttpClient {
    async fn post_stream(
        &self,
        url: &str,
        body: &str,
        headers: &Headers,
    ) -> Result<ByteStream, HttpError> {
        self.record_request(url, headers, body);

        match self.get_response(url) {
            Some(MockResponse::Stream(chunks)) => Ok(chunks_then(chunks, stream::empty())),
            Some(MockResponse::StreamError(chunks, err)) => {
                Ok(chunks_then(chunks, stream::once(async move { Err(err) })))
            }
            Some(MockResponse::Hang(chunks)) => Ok(chunks_then(chunks, stream::pending())),
            Some(MockResponse::Stall) => futures::future::pending().await,
            Some(MockResponse::Error(err)) => Err(err),
            None => Err(HttpError::Other(format!("No mock response for URL: {}", url))),
        }
    }
}
