//! Durable blob storage trait abstraction.
//!
//! The thread store persists its whole collection as one serialized blob
//! under a fixed key. This trait is the seam between that contract and the
//! actual storage medium, so tests can run against memory.

use crate::error::StorageError;

/// Trait for a key-value blob store.
///
/// Calls are synchronous: the thread store writes after every mutation while
/// holding its own lock, and blobs are small.
///
/// # Example
///
/// ```ignore
/// use colloq::traits::KeyValueStore;
///
/// fn remember<S: KeyValueStore>(store: &S) -> Result<(), StorageError> {
///     store.set("app::greeting", "hello")?;
///     assert_eq!(store.get("app::greeting")?, Some("hello".to_string()));
///     Ok(())
/// }
/// ```
pub trait KeyValueStore: Send + Sync {
    /// Read the blob stored under `key`.
    ///
    /// # Returns
    /// - `Ok(Some(blob))` if a value is stored
    /// - `Ok(None)` if nothing is stored under that key
    /// - `Err(error)` if reading failed
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Replace the blob stored under `key`.
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Remove the blob stored under `key`. Removing a missing key is not an
    /// error.
    fn remove(&self, key: &str) -> Result<(), StorageError>;
}
