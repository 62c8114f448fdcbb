//! Trait abstractions for dependency injection and testability.
//!
//! # Traits
//!
//! - [`HttpClient`] - Streaming POST used to open an exchange
//! - [`KeyValueStore`] - Durable blob storage behind the thread store

pub mod http;
pub mod storage;

pub use http::{ByteStream, Headers, HttpClient, HttpError};
pub use storage::KeyValueStore;
