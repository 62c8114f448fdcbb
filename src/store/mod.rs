//! Thread Store: the durable collection of conversation threads.
//!
//! Every mutation goes through [`ThreadStore`], which rewrites the persisted
//! blob afterwards (save-on-mutate). A failed save is logged and otherwise
//! ignored; the in-memory collection stays authoritative.

mod collection;
mod persist;

use std::sync::{Arc, Mutex, MutexGuard};

use chrono::Utc;
use tracing::{debug, warn};

use crate::models::{ChatThread, DEFAULT_THREAD_TITLE};
use crate::traits::KeyValueStore;

pub use collection::ThreadCollection;
pub use persist::{load_collection, save_collection};

/// Thread store shared between the session controller and its observers.
pub type SharedThreadStore = Arc<Mutex<ThreadStore>>;

/// Lock a shared store, recovering from a poisoned mutex.
pub fn lock_store(store: &SharedThreadStore) -> MutexGuard<'_, ThreadStore> {
    store.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Create a thread with a fresh identity, current timestamps and no
/// messages. A blank title becomes the default placeholder.
pub fn create_thread(title: &str) -> ChatThread {
    if title.trim().is_empty() {
        ChatThread::new(DEFAULT_THREAD_TITLE)
    } else {
        ChatThread::new(title)
    }
}

struct Backend {
    store: Box<dyn KeyValueStore>,
    key: String,
}

/// Owns the thread collection and, optionally, its durable backing store.
pub struct ThreadStore {
    collection: ThreadCollection,
    backend: Option<Backend>,
}

impl std::fmt::Debug for ThreadStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ThreadStore")
            .field("threads", &self.collection.threads.len())
            .field("active_thread_id", &self.collection.active_thread_id)
            .field("persistent", &self.backend.is_some())
            .finish()
    }
}

impl ThreadStore {
    /// An in-memory store holding one fresh thread. Nothing is persisted.
    pub fn new() -> Self {
        Self::from_collection(ThreadCollection::fresh())
    }

    /// An in-memory store over an existing collection, repaired if needed.
    pub fn from_collection(mut collection: ThreadCollection) -> Self {
        collection.repair();
        Self {
            collection,
            backend: None,
        }
    }

    /// Load the collection stored under `key` and persist every later
    /// mutation back to it.
    pub fn open(store: Box<dyn KeyValueStore>, key: impl Into<String>) -> Self {
        let key = key.into();
        let collection = load_collection(store.as_ref(), &key);
        debug!(threads = collection.threads.len(), "Loaded thread store");
        Self {
            collection,
            backend: Some(Backend { store, key }),
        }
    }

    pub fn into_shared(self) -> SharedThreadStore {
        Arc::new(Mutex::new(self))
    }

    /// Threads, most recently updated first
    pub fn threads(&self) -> &[ChatThread] {
        &self.collection.threads
    }

    pub fn active_thread_id(&self) -> &str {
        &self.collection.active_thread_id
    }

    pub fn active_thread(&self) -> &ChatThread {
        self.collection.active()
    }

    pub fn get_thread(&self, id: &str) -> Option<&ChatThread> {
        self.collection.get(id)
    }

    pub fn collection(&self) -> &ThreadCollection {
        &self.collection
    }

    /// Make `id` the active thread.
    ///
    /// Returns `true` if the active thread changed. Selecting the active
    /// thread or an unknown id is a no-op.
    pub fn select_thread(&mut self, id: &str) -> bool {
        if self.collection.active_thread_id == id {
            return false;
        }
        if self.collection.get(id).is_none() {
            warn!(thread_id = id, "Ignoring selection of unknown thread");
            return false;
        }
        self.collection.active_thread_id = id.to_string();
        self.save();
        true
    }

    /// Insert a new empty thread at the front and make it active.
    /// Returns its id.
    pub fn create_new_thread(&mut self) -> String {
        let thread = create_thread(DEFAULT_THREAD_TITLE);
        let id = thread.id.clone();
        self.collection.threads.insert(0, thread);
        self.collection.active_thread_id = id.clone();
        self.save();
        id
    }

    /// Remove a thread. Returns `false` if no thread has that id.
    ///
    /// Deleting the last thread synthesizes a replacement; deleting the
    /// active thread activates the first remaining one.
    pub fn delete_thread(&mut self, id: &str) -> bool {
        let Some(index) = self.collection.position(id) else {
            return false;
        };
        self.collection.threads.remove(index);

        if self.collection.threads.is_empty() {
            self.collection = ThreadCollection::fresh();
        } else if self.collection.active_thread_id == id {
            self.collection.active_thread_id = self.collection.threads[0].id.clone();
        }
        self.save();
        true
    }

    /// Reset a thread to an empty, default-titled state, keeping its id.
    pub fn clear_thread(&mut self, id: &str) -> bool {
        let Some(thread) = self.collection.get_mut(id) else {
            return false;
        };
        let now = Utc::now();
        thread.title = DEFAULT_THREAD_TITLE.to_string();
        thread.messages.clear();
        thread.created_at = now;
        thread.updated_at = now;
        self.collection.sort_by_recency();
        self.save();
        true
    }

    /// Apply `transform` to the thread with the given id, refresh its
    /// `updated_at`, and re-sort the collection by recency.
    ///
    /// No-op returning `false` if the thread does not exist. This is the only
    /// mutation the session controller performs.
    pub fn update_thread<F>(&mut self, id: &str, transform: F) -> bool
    where
        F: FnOnce(&mut ChatThread),
    {
        let Some(thread) = self.collection.get_mut(id) else {
            return false;
        };
        transform(thread);
        thread.touch();
        self.collection.sort_by_recency();
        self.save();
        true
    }

    fn save(&self) {
        let Some(backend) = &self.backend else {
            return;
        };
        if let Err(e) = save_collection(backend.store.as_ref(), &backend.key, &self.collection) {
            warn!(code = e.error_code(), "Failed to persist threads: {}", e);
        }
    }
}

impl Default for ThreadStore {
    fn default() -> Self {
        Self::new()
    }
}
