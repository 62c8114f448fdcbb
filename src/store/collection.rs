//! The persisted thread collection and its invariants.

use serde::{Deserialize, Serialize};

use crate::models::ChatThread;

/// Every conversation thread plus the id of the active one.
///
/// Invariant: `active_thread_id` names a member of `threads`, which is never
/// empty. [`ThreadCollection::repair`] restores it after any edit that could
/// break it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ThreadCollection {
    /// Threads, most recently updated first
    pub threads: Vec<ChatThread>,
    pub active_thread_id: String,
}

impl ThreadCollection {
    /// A collection holding one empty, active thread.
    pub fn fresh() -> Self {
        let thread = ChatThread::default();
        Self {
            active_thread_id: thread.id.clone(),
            threads: vec![thread],
        }
    }

    /// Re-establish the invariant. Returns `true` if anything changed.
    ///
    /// An empty collection gets a synthesized thread; a dangling active id
    /// falls back to the first thread.
    pub fn repair(&mut self) -> bool {
        if self.threads.is_empty() {
            *self = Self::fresh();
            return true;
        }
        if self.position(&self.active_thread_id).is_none() {
            self.active_thread_id = self.threads[0].id.clone();
            return true;
        }
        false
    }

    pub fn position(&self, id: &str) -> Option<usize> {
        self.threads.iter().position(|t| t.id == id)
    }

    pub fn get(&self, id: &str) -> Option<&ChatThread> {
        self.threads.iter().find(|t| t.id == id)
    }

    pub fn get_mut(&mut self, id: &str) -> Option<&mut ChatThread> {
        self.threads.iter_mut().find(|t| t.id == id)
    }

    /// The active thread, or the first thread if the active id is stale.
    pub fn active(&self) -> &ChatThread {
        match self.get(&self.active_thread_id) {
            Some(thread) => thread,
            None => &self.threads[0],
        }
    }

    /// Stable sort, most recently updated first.
    pub fn sort_by_recency(&mut self) {
        self.threads
            .sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
    }
}

impl Default for ThreadCollection {
    fn default() -> Self {
        Self::fresh()
    }
}
