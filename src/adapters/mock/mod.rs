//! Mock implementations for testing.
//!
//! This module provides mock implementations of all trait abstractions,
//! enabling unit testing without network dependencies or file system access.
//!
//! # Available Mocks
//!
//! - [`MockHttpClient`] - HTTP client replaying scripted response bodies
//! - [`InMemoryStore`] - In-memory key-value blob storage

pub mod http;
pub mod store;

pub use http::{MockHttpClient, MockResponse, RecordedRequest};
pub use store::InMemoryStore;
