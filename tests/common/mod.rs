//! Common test utilities for integration tests.
//!
//! # Example
//!
//! ```ignore
//! use common::{controller_with, sse_answer};
//!
//! let (controller, http, store) = controller_with([sse_answer(&["Hi"], "Hi")]);
//! ```

pub mod mocks;

#[allow(unused_imports)]
pub use mocks::*;

use std::sync::Arc;

use colloq::conductor::ChatClient;
use colloq::session::SessionController;
use colloq::store::ThreadStore;

pub const TEST_API_URL: &str = "http://chat.test/gemini";
pub const TEST_STORAGE_KEY: &str = "llm-powered-chat-platform::threads";

/// Build a controller over a mock transport and an in-memory persistent
/// store. `responses` are queued in order, one per exchange.
#[allow(dead_code)]
pub fn controller_with<I>(responses: I) -> (SessionController, MockHttpClient, InMemoryStore)
where
    I: IntoIterator<Item = MockResponse>,
{
    let http = MockHttpClient::new();
    for response in responses {
        http.push_response(response);
    }
    let backend = InMemoryStore::new();
    let store = ThreadStore::open(Box::new(backend.clone()), TEST_STORAGE_KEY);
    let client = ChatClient::new(TEST_API_URL, Arc::new(http.clone()));
    (
        SessionController::new(client, store.into_shared()),
        http,
        backend,
    )
}

/// Wait until `condition` holds, yielding to other tasks in between.
#[allow(dead_code)]
pub async fn wait_until<F>(mut condition: F)
where
    F: FnMut() -> bool,
{
    tokio::time::timeout(std::time::Duration::from_secs(5), async {
        while !condition() {
            tokio::task::yield_now().await;
        }
    })
    .await
    .expect("condition not reached in time");
}
