//! Concrete implementations of trait abstractions.
//!
//! # Adapters
//!
//! - [`ReqwestHttpClient`] - HTTP client using reqwest
//! - [`FileKeyValueStore`] - One JSON file per key in a data directory
//!
//! # Mock Implementations
//!
//! The [`mock`] submodule provides test doubles for all adapters:
//! - [`mock::MockHttpClient`] - Scripted streaming responses
//! - [`mock::InMemoryStore`] - In-memory blob storage

pub mod file_store;
pub mod mock;
pub mod reqwest_http;

pub use file_store::FileKeyValueStore;
pub use mock::{InMemoryStore, MockHttpClient, MockResponse};
pub use reqwest_http::ReqwestHttpClient;
