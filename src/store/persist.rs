//! Loading and saving the thread collection through a [`KeyValueStore`].

use tracing::{debug, warn};

use crate::error::StorageError;
use crate::traits::KeyValueStore;

use super::ThreadCollection;

/// Read the stored collection.
///
/// Never fails: a missing, unreadable, corrupt or empty blob yields a fresh
/// single-thread collection, and a dangling active id is repaired.
pub fn load_collection(backend: &dyn KeyValueStore, key: &str) -> ThreadCollection {
    let raw = match backend.get(key) {
        Ok(Some(raw)) => raw,
        Ok(None) => {
            debug!(key, "No stored threads, starting fresh");
            return ThreadCollection::fresh();
        }
        Err(e) => {
            warn!(key, code = e.error_code(), "Failed to read stored threads: {}", e);
            return ThreadCollection::fresh();
        }
    };

    let mut collection: ThreadCollection = match serde_json::from_str(&raw) {
        Ok(collection) => collection,
        Err(e) => {
            warn!(key, "Discarding corrupt stored threads: {}", e);
            return ThreadCollection::fresh();
        }
    };

    if collection.threads.is_empty() {
        return ThreadCollection::fresh();
    }
    if collection.repair() {
        debug!(key, "Stored active thread id was stale, using first thread");
    }
    collection
}

/// Write the whole collection under `key`.
pub fn save_collection(
    backend: &dyn KeyValueStore,
    key: &str,
    collection: &ThreadCollection,
) -> Result<(), StorageError> {
    let blob = serde_json::to_string(collection)?;
    backend.set(key, &blob)
}
