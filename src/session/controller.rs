//! The session controller: drives one question/answer exchange at a time
//! and reconciles the thread store with whatever the stream delivers.

use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use futures_util::StreamExt;
use tracing::{debug, error, info, warn};

use crate::adapters::FileKeyValueStore;
use crate::conductor::ChatClient;
use crate::config::ChatConfig;
use crate::error::{ChatError, ChatResult, NetworkError, EMPTY_PROMPT_MESSAGE};
use crate::models::{derive_title, ChatMessage, ChatThread, DEFAULT_THREAD_TITLE};
use crate::sse::StreamEvent;
use crate::store::{lock_store, SharedThreadStore, ThreadStore};

use super::notice::{Notice, DEFAULT_NOTICE_TTL};
use super::state::{Session, SessionHandle, SessionState};

/// How an accepted exchange ended, when it did not fail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExchangeOutcome {
    /// The answer is final and stored in the thread
    Completed { text: String },
    /// The user stopped the exchange; the placeholder has been removed
    Aborted,
}

/// Per-controller transient state. Reset whenever the active thread changes.
#[derive(Debug, Default)]
struct ControllerState {
    state: SessionState,
    session: Option<SessionHandle>,
    next_session_id: u64,
    composer: String,
    notice: Option<Notice>,
    pending_retry: Option<String>,
    focus_requested: bool,
}

impl ControllerState {
    fn is_current(&self, session_id: u64) -> bool {
        self.session.as_ref().map(|s| s.id) == Some(session_id)
    }

    /// Cancel and forget the live session, if any.
    fn drop_session(&mut self) -> Option<SessionHandle> {
        let handle = self.session.take()?;
        handle.cancel();
        Some(handle)
    }

    fn reset_transient(&mut self) {
        self.drop_session();
        self.state = SessionState::Idle;
        self.composer.clear();
        self.notice = None;
        self.pending_retry = None;
        self.focus_requested = false;
    }
}

/// Handle to the chat session controller.
///
/// Cheap to clone; clones share state, so one clone can `stop()` an `ask`
/// running on another task.
///
/// At most one exchange is live per controller. Its events are applied to
/// the thread store in arrival order through
/// [`ThreadStore::update_thread`], always targeting the thread the exchange
/// started on, even if the user has since switched away.
///
/// Lock order is controller state, then thread store. Neither lock is held
/// across an await point.
#[derive(Clone)]
pub struct SessionController {
    client: ChatClient,
    store: SharedThreadStore,
    inner: Arc<Mutex<ControllerState>>,
    notice_ttl: Duration,
}

impl std::fmt::Debug for SessionController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionController")
            .field("client", &self.client)
            .field("state", &self.state())
            .finish_non_exhaustive()
    }
}

impl SessionController {
    pub fn new(client: ChatClient, store: SharedThreadStore) -> Self {
        Self {
            client,
            store,
            inner: Arc::new(Mutex::new(ControllerState::default())),
            notice_ttl: DEFAULT_NOTICE_TTL,
        }
    }

    /// Build the production controller: reqwest transport, file-backed store.
    pub fn from_config(config: &ChatConfig) -> Self {
        let backend = FileKeyValueStore::new(config.data_dir.clone());
        let store = ThreadStore::open(Box::new(backend), config.storage_key.clone());
        Self::new(ChatClient::with_reqwest(config.api_url.clone()), store.into_shared())
            .with_notice_ttl(config.notice_ttl)
    }

    pub fn with_notice_ttl(mut self, ttl: Duration) -> Self {
        self.notice_ttl = ttl;
        self
    }

    fn lock(&self) -> MutexGuard<'_, ControllerState> {
        self.inner
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    // ---- exchange ----

    /// Ask a question on the active thread.
    ///
    /// `prompt` defaults to the composer text. See [`Self::ask_with`].
    pub async fn ask(&self, prompt: Option<&str>) -> ChatResult<ExchangeOutcome> {
        self.ask_with(prompt, |_| {}).await
    }

    /// Ask a question, reporting every decoded event to `observer` before it
    /// is applied.
    ///
    /// # Errors
    /// - `Validation` if the prompt is blank; nothing is sent
    /// - `Busy` if an exchange is already in flight; nothing is sent
    /// - `Network` or `Stream` if the exchange failed; it has been rolled
    ///   back and the prompt restored to the composer
    /// - `EmptyResponse` if no content arrived; the placeholder is gone, the
    ///   question stays, and the prompt is restored to the composer
    ///
    /// A stopped exchange is not an error: it resolves to
    /// [`ExchangeOutcome::Aborted`].
    pub async fn ask_with<F>(&self, prompt: Option<&str>, mut observer: F) -> ChatResult<ExchangeOutcome>
    where
        F: FnMut(&StreamEvent) + Send,
    {
        let (mut session, history) = self.begin(prompt)?;
        let result = self.run(&mut session, history, &mut observer).await;
        self.finish(session, result)
    }

    /// Validate, write the exchange optimistically and register the session.
    fn begin(&self, prompt: Option<&str>) -> ChatResult<(Session, Vec<ChatMessage>)> {
        let mut inner = self.lock();

        if inner.state.is_busy() {
            let thread_id = inner
                .session
                .as_ref()
                .map(|s| s.thread_id.clone())
                .unwrap_or_default();
            warn!(%thread_id, state = %inner.state, "Rejecting ask while an exchange is in flight");
            return Err(ChatError::Busy { thread_id });
        }

        let question = match prompt {
            Some(text) => text.trim().to_string(),
            None => inner.composer.trim().to_string(),
        };
        if question.is_empty() {
            inner.notice = Some(Notice::error(EMPTY_PROMPT_MESSAGE));
            return Err(ChatError::validation(EMPTY_PROMPT_MESSAGE));
        }

        if let Some(stale) = inner.drop_session() {
            debug!(session = stale.id, "Cancelled stale session");
        }

        let user_message = ChatMessage::user(question.clone());
        let placeholder = ChatMessage::placeholder();

        let (thread_id, history) = {
            let mut store = lock_store(&self.store);
            let thread_id = store.active_thread_id().to_string();
            let mut history = store.active_thread().messages.clone();
            history.push(user_message.clone());
            store.update_thread(&thread_id, |thread| {
                if thread.is_empty() || thread.has_default_title() {
                    thread.title = derive_title(&question);
                }
                thread.messages.push(user_message.clone());
                thread.messages.push(placeholder.clone());
            });
            (thread_id, history)
        };

        inner.next_session_id += 1;
        let session = Session::new(
            inner.next_session_id,
            thread_id,
            user_message.id,
            placeholder.id,
            question,
        );

        inner.session = Some(session.handle());
        inner.state = SessionState::Sending;
        inner.composer.clear();
        inner.notice = None;
        inner.pending_retry = Some(session.prompt().to_string());

        info!(
            session = session.id(),
            thread_id = session.thread_id(),
            history = history.len(),
            "Sending question"
        );
        Ok((session, history))
    }

    /// Issue the request and apply the stream. Returns the final text.
    async fn run<F>(
        &self,
        session: &mut Session,
        history: Vec<ChatMessage>,
        observer: &mut F,
    ) -> ChatResult<String>
    where
        F: FnMut(&StreamEvent) + Send,
    {
        let mut events = match self
            .client
            .stream(&history, session.prompt(), session.cancel_token())
            .await
        {
            Ok(events) => events,
            Err(NetworkError::Cancelled) => return Err(ChatError::Cancelled),
            Err(e) => return Err(e.into()),
        };

        self.transition(session.id(), SessionState::Streaming);

        while let Some(item) = events.next().await {
            let event = match item {
                Ok(event) => event,
                Err(NetworkError::Cancelled) => return Err(ChatError::Cancelled),
                Err(e) => return Err(e.into()),
            };
            observer(&event);

            match event {
                StreamEvent::Delta(fragment) => {
                    session.apply_delta(&fragment);
                    self.write_answer(session);
                }
                StreamEvent::Done(text) => {
                    session.apply_done(text);
                    self.write_answer(session);
                }
                StreamEvent::Error(message) => return Err(ChatError::upstream(message)),
            }
        }

        // The reader ends quietly on cancellation
        if session.is_cancelled() {
            return Err(ChatError::Cancelled);
        }
        if !session.has_content() {
            return Err(ChatError::EmptyResponse);
        }
        Ok(session.text().to_string())
    }

    fn write_answer(&self, session: &Session) {
        let id = session.assistant_message_id();
        let text = session.text();
        lock_store(&self.store).update_thread(session.thread_id(), |thread| {
            thread.set_message_text(id, text);
        });
    }

    fn transition(&self, session_id: u64, state: SessionState) {
        let mut inner = self.lock();
        if inner.is_current(session_id) {
            debug!(session = session_id, from = %inner.state, to = %state, "Session transition");
            inner.state = state;
        }
    }

    /// Reconcile the thread with the outcome and settle controller state.
    ///
    /// Thread edits always apply to the session's own thread. Controller
    /// state is only touched if the session is still the live one, since
    /// `stop()` or a thread switch may already have moved on.
    fn finish(&self, session: Session, result: ChatResult<String>) -> ChatResult<ExchangeOutcome> {
        let mut inner = self.lock();
        let current = inner.is_current(session.id());

        match result {
            Ok(text) => {
                if current {
                    inner.session = None;
                    inner.state = SessionState::Completed;
                    inner.pending_retry = None;
                }
                info!(session = session.id(), chars = text.chars().count(), "Answer completed");
                Ok(ExchangeOutcome::Completed { text })
            }
            Err(ChatError::Cancelled) => {
                lock_store(&self.store).update_thread(session.thread_id(), |thread| {
                    thread.remove_messages(&[session.assistant_message_id()]);
                });
                if current {
                    inner.session = None;
                    inner.state = SessionState::Aborted;
                    inner.pending_retry = None;
                }
                info!(session = session.id(), "Exchange stopped");
                Ok(ExchangeOutcome::Aborted)
            }
            Err(err) => {
                rollback(&self.store, &session, err.is_full_rollback());
                error!(
                    session = session.id(),
                    code = err.error_code(),
                    "Exchange failed: {}",
                    err
                );
                if current {
                    inner.session = None;
                    inner.state = SessionState::Failed;
                    inner.notice = Some(Notice::error(err.user_message()));
                    inner.composer = session.prompt().to_string();
                    inner.pending_retry = Some(session.prompt().to_string());
                }
                Err(err)
            }
        }
    }

    // ---- user actions ----

    /// Stop the live exchange. No-op if there is none.
    pub fn stop(&self) {
        let mut inner = self.lock();
        let Some(handle) = inner.drop_session() else {
            return;
        };
        info!(session = handle.id, "Stopping generation");
        inner.state = SessionState::Aborted;
        inner.pending_retry = None;
        inner.notice = Some(Notice::info(ChatError::Cancelled.user_message()));
    }

    /// Put the last failed prompt back into the composer and focus it.
    /// Does not resend. Returns `false`, changing nothing, if there is no
    /// pending prompt.
    pub fn retry(&self) -> bool {
        let mut inner = self.lock();
        let Some(prompt) = inner.pending_retry.clone() else {
            return false;
        };
        inner.composer = prompt;
        inner.notice = None;
        inner.focus_requested = true;
        true
    }

    /// Fill the composer with `text` (e.g. a suggested prompt) and focus it.
    pub fn insert_prompt(&self, text: &str) {
        let mut inner = self.lock();
        inner.composer = text.to_string();
        inner.notice = None;
        inner.focus_requested = true;
    }

    /// Empty the active thread and reset the composer.
    pub fn clear_conversation(&self) {
        let mut inner = self.lock();
        inner.drop_session();
        if inner.state.is_busy() {
            inner.state = SessionState::Idle;
        }
        inner.composer.clear();
        inner.notice = None;
        inner.pending_retry = None;

        let mut store = lock_store(&self.store);
        let id = store.active_thread_id().to_string();
        store.clear_thread(&id);
    }

    // ---- thread management ----

    /// Switch the active thread. Returns `false` if nothing changed.
    pub fn select_thread(&self, id: &str) -> bool {
        self.change_active(|store| {
            store.select_thread(id);
        })
    }

    /// Start a new thread and switch to it. Returns its id.
    pub fn new_thread(&self) -> String {
        let mut id = String::new();
        self.change_active(|store| id = store.create_new_thread());
        id
    }

    /// Delete a thread. Switching away from it if it was active resets
    /// the session just like [`Self::select_thread`].
    pub fn delete_thread(&self, id: &str) -> bool {
        let mut deleted = false;
        self.change_active(|store| deleted = store.delete_thread(id));
        deleted
    }

    /// Run a store operation; if the active thread changed, cancel the live
    /// session and reset every piece of per-session state.
    fn change_active<F>(&self, op: F) -> bool
    where
        F: FnOnce(&mut ThreadStore),
    {
        let mut inner = self.lock();
        let changed = {
            let mut store = lock_store(&self.store);
            let before = store.active_thread_id().to_string();
            op(&mut *store);
            store.active_thread_id() != before
        };
        if changed {
            if let Some(handle) = &inner.session {
                debug!(session = handle.id, "Active thread changed, cancelling session");
            }
            inner.reset_transient();
        }
        changed
    }

    // ---- observers ----

    pub fn state(&self) -> SessionState {
        self.lock().state
    }

    /// Whether an exchange is in flight
    pub fn is_loading(&self) -> bool {
        self.lock().state.is_busy()
    }

    pub fn composer(&self) -> String {
        self.lock().composer.clone()
    }

    pub fn set_composer(&self, text: &str) {
        self.lock().composer = text.to_string();
    }

    /// Whether the send action should be disabled
    pub fn disable_send(&self) -> bool {
        let inner = self.lock();
        inner.state.is_busy() || inner.composer.trim().is_empty()
    }

    pub fn pending_retry(&self) -> Option<String> {
        self.lock().pending_retry.clone()
    }

    /// The current notice, unless it has expired. Expired notices are
    /// dropped on access.
    pub fn notice(&self) -> Option<Notice> {
        let mut inner = self.lock();
        if inner
            .notice
            .as_ref()
            .is_some_and(|n| n.is_expired(self.notice_ttl))
        {
            inner.notice = None;
        }
        inner.notice.clone()
    }

    pub fn dismiss_notice(&self) {
        self.lock().notice = None;
    }

    /// Returns `true` once after the composer was asked to take focus.
    pub fn take_focus_request(&self) -> bool {
        std::mem::take(&mut self.lock().focus_requested)
    }

    pub fn store(&self) -> SharedThreadStore {
        Arc::clone(&self.store)
    }

    pub fn threads(&self) -> Vec<ChatThread> {
        lock_store(&self.store).threads().to_vec()
    }

    pub fn active_thread(&self) -> ChatThread {
        lock_store(&self.store).active_thread().clone()
    }

    pub fn get_thread(&self, id: &str) -> Option<ChatThread> {
        lock_store(&self.store).get_thread(id).cloned()
    }

    /// Whether the active thread has any messages
    pub fn has_conversation(&self) -> bool {
        !lock_store(&self.store).active_thread().is_empty()
    }
}

/// Remove what a failed exchange added. A full rollback also drops the user
/// message and restores the default title if the thread ends up empty.
fn rollback(store: &SharedThreadStore, session: &Session, full: bool) {
    lock_store(store).update_thread(session.thread_id(), |thread| {
        if full {
            thread.remove_messages(&[session.user_message_id(), session.assistant_message_id()]);
            if thread.is_empty() {
                thread.title = DEFAULT_THREAD_TITLE.to_string();
            }
        } else {
            thread.remove_messages(&[session.assistant_message_id()]);
        }
    });
}
