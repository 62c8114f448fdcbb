//! In-memory key-value store for testing.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use crate::error::StorageError;
use crate::traits::KeyValueStore;

/// Key-value store kept in memory.
///
/// Clones share the same map, so a test can hand one clone to a
/// [`ThreadStore`](crate::store::ThreadStore) and inspect the blob through
/// another.
#[derive(Debug, Clone, Default)]
pub struct InMemoryStore {
    entries: Arc<Mutex<HashMap<String, String>>>,
    /// Whether writes should fail
    fail_writes: Arc<Mutex<bool>>,
}

impl InMemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store pre-seeded with one entry.
    pub fn with_entry(key: &str, value: &str) -> Self {
        let store = Self::new();
        lock(&store.entries).insert(key.to_string(), value.to_string());
        store
    }

    /// Make subsequent `set` calls fail.
    pub fn set_fail_writes(&self, fail: bool) {
        *lock(&self.fail_writes) = fail;
    }

    /// Peek at a stored value without going through the trait.
    pub fn raw(&self, key: &str) -> Option<String> {
        lock(&self.entries).get(key).cloned()
    }

    pub fn len(&self) -> usize {
        lock(&self.entries).len()
    }

    pub fn is_empty(&self) -> bool {
        lock(&self.entries).is_empty()
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

impl KeyValueStore for InMemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(lock(&self.entries).get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        if *lock(&self.fail_writes) {
            return Err(StorageError::Write {
                path: key.into(),
                source: std::io::Error::new(std::io::ErrorKind::Other, "simulated write failure"),
            });
        }
        lock(&self.entries).insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        lock(&self.entries).remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_get_remove() {
        let store = InMemoryStore::new();
        assert_eq!(store.get("k").unwrap(), None);

        store.set("k", "v").unwrap();
        assert_eq!(store.get("k").unwrap(), Some("v".to_string()));
        assert_eq!(store.len(), 1);

        store.remove("k").unwrap();
        assert!(store.is_empty());
        store.remove("k").unwrap();
    }

    #[test]
    fn test_clones_share_entries() {
        let store = InMemoryStore::with_entry("k", "v");
        let other = store.clone();
        other.set("k", "w").unwrap();
        assert_eq!(store.raw("k"), Some("w".to_string()));
    }

    #[test]
    fn test_failing_writes() {
        let store = InMemoryStore::new();
        store.set_fail_writes(true);
        assert!(store.set("k", "v").is_err());
        assert!(store.is_empty());
    }
}
