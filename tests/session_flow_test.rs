//! End-to-end exchanges through the session controller over a mock
//! transport.

mod common;

use bytes::Bytes;
use common::*;
use colloq::error::{ChatError, GENERIC_FAILURE_MESSAGE, NO_RESPONSE_MESSAGE};
use colloq::models::{MessageRole, DEFAULT_THREAD_TITLE};
use colloq::session::{ExchangeOutcome, SessionState};
use colloq::store::ThreadCollection;

#[tokio::test]
async fn test_done_text_supersedes_deltas() {
    let (controller, _, _) = controller_with([MockResponse::frames([
        "data: {\"delta\":\"Hi\"}\n\n",
        "data: {\"delta\":\" there\"}\n\n",
        "data: {\"done\":true,\"text\":\"Hi there!\"}\n\n",
    ])]);

    let outcome = controller.ask(Some("hello")).await.unwrap();

    assert_eq!(
        outcome,
        ExchangeOutcome::Completed {
            text: "Hi there!".to_string()
        }
    );
    let thread = controller.active_thread();
    assert_eq!(thread.messages.len(), 2);
    assert_eq!(thread.messages[0].role, MessageRole::User);
    assert_eq!(thread.messages[0].text, "hello");
    assert_eq!(thread.messages[1].role, MessageRole::Model);
    assert_eq!(thread.messages[1].text, "Hi there!");
}

#[tokio::test]
async fn test_done_differs_from_concatenation() {
    let (controller, _, _) = controller_with([sse_answer(&["draft ", "answer"], "Final answer.")]);

    controller.ask(Some("q")).await.unwrap();

    assert_eq!(controller.active_thread().messages[1].text, "Final answer.");
}

#[tokio::test]
async fn test_title_derived_once() {
    let (controller, _, _) = controller_with([
        sse_answer(&["Hi"], "Hi"),
        sse_answer(&["Again"], "Again"),
    ]);

    controller.ask(Some("hello")).await.unwrap();
    assert_eq!(controller.active_thread().title, "hello");

    controller.ask(Some("a different question")).await.unwrap();
    assert_eq!(controller.active_thread().title, "hello");
}

#[tokio::test]
async fn test_long_title_is_truncated() {
    let (controller, _, _) = controller_with([sse_answer(&["ok"], "ok")]);
    let prompt = "Find   suppliers with the fastest delivery times across every region we ship to";

    controller.ask(Some(prompt)).await.unwrap();

    let title = controller.active_thread().title;
    assert!(title.ends_with("..."));
    assert!(title.chars().count() <= 48);
    assert!(title.starts_with("Find suppliers with"));
}

#[tokio::test]
async fn test_stream_without_content_keeps_question() {
    let (controller, _, _) = controller_with([MockResponse::frames([
        ": keep-alive\n\n",
        "data: [DONE]\n\n",
    ])]);

    let err = controller.ask(Some("hello")).await.unwrap_err();

    assert!(matches!(err, ChatError::EmptyResponse));
    let thread = controller.active_thread();
    assert_eq!(thread.messages.len(), 1);
    assert!(thread.messages[0].is_user());
    assert_eq!(thread.messages[0].text, "hello");
    assert_eq!(thread.title, "hello");
    assert_eq!(controller.notice().unwrap().message, NO_RESPONSE_MESSAGE);
    assert_eq!(controller.composer(), "hello");
    assert_eq!(controller.pending_retry().as_deref(), Some("hello"));
}

#[tokio::test]
async fn test_blank_final_text_counts_as_empty() {
    let (controller, _, _) = controller_with([sse_answer(&["   "], "  ")]);

    let err = controller.ask(Some("hello")).await.unwrap_err();

    assert!(matches!(err, ChatError::EmptyResponse));
    let thread = controller.active_thread();
    assert_eq!(thread.messages.len(), 1);
    assert_eq!(thread.messages[0].text, "hello");
}

#[tokio::test]
async fn test_malformed_frames_are_skipped() {
    let (controller, _, _) = controller_with([MockResponse::frames([
        delta_frame("A"),
        "data: {\"delta\": \n\n".to_string(),
        "data: not json at all\n\n".to_string(),
        delta_frame("B"),
        done_frame("AB"),
    ])]);

    controller.ask(Some("q")).await.unwrap();

    assert_eq!(controller.active_thread().messages[1].text, "AB");
}

#[tokio::test]
async fn test_arbitrary_chunking_with_multibyte_text() {
    let body = sse_body(&["Grüße ", "aus ", "Köln 🚀"], "Grüße aus Köln 🚀");
    let (controller, _, _) = controller_with([chunked(&body, 3)]);

    controller.ask(Some("hallo")).await.unwrap();

    assert_eq!(
        controller.active_thread().messages[1].text,
        "Grüße aus Köln 🚀"
    );
}

#[tokio::test]
async fn test_transport_failure_rolls_back_fully() {
    let (controller, _, backend) = controller_with([MockResponse::Error(
        HttpError::ConnectionFailed("connection refused".to_string()),
    )]);

    let err = controller.ask(Some("hello")).await.unwrap_err();

    assert!(matches!(err, ChatError::Network(_)));
    let thread = controller.active_thread();
    assert!(thread.is_empty());
    assert_eq!(thread.title, DEFAULT_THREAD_TITLE);
    assert_eq!(controller.composer(), "hello");
    assert_eq!(controller.pending_retry().as_deref(), Some("hello"));
    assert_eq!(controller.state(), SessionState::Failed);
    assert!(controller.notice().unwrap().is_error());

    let saved: ThreadCollection =
        serde_json::from_str(&backend.raw(TEST_STORAGE_KEY).unwrap()).unwrap();
    assert!(saved.threads.iter().all(|t| t.messages.is_empty()));
}

#[tokio::test]
async fn test_body_interrupted_mid_stream_rolls_back() {
    let (controller, _, _) = controller_with([MockResponse::StreamError(
        vec![Bytes::from(delta_frame("partial"))],
        HttpError::Io("connection reset".to_string()),
    )]);

    let err = controller.ask(Some("hello")).await.unwrap_err();

    assert!(err.is_full_rollback());
    assert!(!controller.has_conversation());
    assert_eq!(controller.composer(), "hello");
}

#[tokio::test]
async fn test_status_error_body_is_surfaced() {
    let (controller, _, _) = controller_with([MockResponse::status(429, "Too many requests, slow down.")]);

    controller.ask(Some("hello")).await.unwrap_err();

    assert_eq!(
        controller.notice().unwrap().message,
        "Too many requests, slow down."
    );
}

#[tokio::test]
async fn test_markup_error_body_is_replaced() {
    let (controller, _, _) = controller_with([MockResponse::status(
        502,
        "<!DOCTYPE html><html><body>Bad Gateway</body></html>",
    )]);

    controller.ask(Some("hello")).await.unwrap_err();

    assert_eq!(controller.notice().unwrap().message, GENERIC_FAILURE_MESSAGE);
}

#[tokio::test]
async fn test_upstream_error_frame_is_a_failure() {
    let (controller, _, _) = controller_with([MockResponse::frames([
        delta_frame("Once upon"),
        error_frame("The model is overloaded."),
        delta_frame(" a time"),
    ])]);

    let err = controller.ask(Some("story")).await.unwrap_err();

    assert!(matches!(err, ChatError::Stream(_)));
    assert!(!controller.has_conversation());
    assert_eq!(controller.notice().unwrap().message, "The model is overloaded.");
}

#[tokio::test]
async fn test_error_frame_with_odd_fields_still_fails() {
    let (controller, _, _) = controller_with([MockResponse::frames([
        delta_frame("partial"),
        "data: {\"error\":\"quota exceeded\",\"delta\":5}\n\n".to_string(),
        done_frame("partial answer"),
    ])]);

    let err = controller.ask(Some("hello")).await.unwrap_err();

    assert!(matches!(err, ChatError::Stream(_)));
    assert!(!controller.has_conversation());
    assert_eq!(controller.notice().unwrap().message, "quota exceeded");
}

#[tokio::test]
async fn test_stop_removes_placeholder_only() {
    let (controller, _, _) = controller_with([MockResponse::Hang(vec![Bytes::from(
        delta_frame("Let me think"),
    )])]);

    let runner = controller.clone();
    let task = tokio::spawn(async move { runner.ask(Some("hard question")).await });

    let watcher = controller.clone();
    wait_until(move || watcher.state() == SessionState::Streaming).await;
    let watcher = controller.clone();
    wait_until(move || {
        watcher
            .active_thread()
            .messages
            .last()
            .is_some_and(|m| m.text == "Let me think")
    })
    .await;

    controller.stop();
    assert_eq!(task.await.unwrap().unwrap(), ExchangeOutcome::Aborted);

    let thread = controller.active_thread();
    assert_eq!(thread.messages.len(), 1);
    assert_eq!(thread.messages[0].text, "hard question");
    assert_eq!(thread.title, "hard question");
    assert_eq!(controller.composer(), "");
    assert!(controller.pending_retry().is_none());
    assert!(!controller.retry());
}

#[tokio::test]
async fn test_stop_while_waiting_for_response() {
    let (controller, _, _) = controller_with([MockResponse::Stall]);

    let runner = controller.clone();
    let task = tokio::spawn(async move { runner.ask(Some("hello")).await });

    let watcher = controller.clone();
    wait_until(move || watcher.state() == SessionState::Sending).await;
    controller.stop();

    assert_eq!(task.await.unwrap().unwrap(), ExchangeOutcome::Aborted);
    assert_eq!(controller.active_thread().messages.len(), 1);
}

#[tokio::test]
async fn test_concurrent_ask_is_rejected() {
    let (controller, http, _) = controller_with([MockResponse::Hang(Vec::new())]);

    let runner = controller.clone();
    let task = tokio::spawn(async move { runner.ask(Some("first")).await });
    let watcher = controller.clone();
    wait_until(move || watcher.is_loading()).await;

    let err = controller.ask(Some("second")).await.unwrap_err();
    assert!(matches!(err, ChatError::Busy { .. }));
    assert!(controller.disable_send());
    assert_eq!(http.get_requests().len(), 1);
    assert_eq!(controller.active_thread().messages.len(), 2);

    controller.stop();
    task.await.unwrap().unwrap();
}

#[tokio::test]
async fn test_ask_allowed_after_each_terminal_state() {
    let (controller, _, _) = controller_with([
        MockResponse::status(500, "down"),
        sse_answer(&["ok"], "ok"),
        sse_answer(&["again"], "again"),
    ]);

    controller.ask(Some("one")).await.unwrap_err();
    assert_eq!(controller.state(), SessionState::Failed);

    controller.ask(Some("two")).await.unwrap();
    assert_eq!(controller.state(), SessionState::Completed);

    controller.ask(Some("three")).await.unwrap();
    assert_eq!(controller.active_thread().messages.len(), 4);
}

#[tokio::test]
async fn test_retry_without_pending_prompt_changes_nothing() {
    let (controller, http, _) = controller_with([]);
    controller.set_composer("draft");

    assert!(!controller.retry());

    assert_eq!(controller.composer(), "draft");
    assert!(controller.notice().is_none());
    assert!(!controller.take_focus_request());
    assert_eq!(controller.state(), SessionState::Idle);
    assert!(http.get_requests().is_empty());
}

#[tokio::test]
async fn test_retry_then_resend() {
    let (controller, http, _) = controller_with([
        MockResponse::status(503, "busy"),
        sse_answer(&["done"], "done"),
    ]);

    controller.ask(Some("hello")).await.unwrap_err();
    controller.set_composer("");
    assert!(controller.retry());
    assert_eq!(controller.composer(), "hello");

    controller.ask(None).await.unwrap();

    let thread = controller.active_thread();
    assert_eq!(thread.messages.len(), 2);
    assert_eq!(thread.messages[0].text, "hello");
    let body = http.last_request().unwrap().json().unwrap();
    let history = body["history"].as_array().unwrap();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0]["parts"][0]["text"], "hello");
}

#[tokio::test]
async fn test_thread_switch_cancels_and_resets() {
    let (controller, _, _) = controller_with([MockResponse::Hang(vec![Bytes::from(
        delta_frame("partial"),
    )])]);
    let original = controller.active_thread().id;
    let other = controller.new_thread();
    assert!(controller.select_thread(&original));

    let runner = controller.clone();
    let task = tokio::spawn(async move { runner.ask(Some("hello")).await });
    let watcher = controller.clone();
    wait_until(move || watcher.state() == SessionState::Streaming).await;
    controller.set_composer("half typed");

    assert!(controller.select_thread(&other));

    assert_eq!(task.await.unwrap().unwrap(), ExchangeOutcome::Aborted);
    assert_eq!(controller.state(), SessionState::Idle);
    assert_eq!(controller.composer(), "");
    assert!(controller.notice().is_none());
    assert!(controller.pending_retry().is_none());
    assert!(!controller.is_loading());

    let first = controller.get_thread(&original).unwrap();
    assert_eq!(first.messages.len(), 1);
    assert!(first.messages[0].is_user());
    assert!(controller.active_thread().is_empty());
}

#[tokio::test]
async fn test_exchanges_are_persisted() {
    let (controller, _, backend) = controller_with([sse_answer(&["Hi"], "Hi!")]);

    controller.ask(Some("hello")).await.unwrap();

    let saved: ThreadCollection =
        serde_json::from_str(&backend.raw(TEST_STORAGE_KEY).unwrap()).unwrap();
    let thread = saved
        .threads
        .iter()
        .find(|t| t.id == saved.active_thread_id)
        .unwrap();
    assert_eq!(thread.messages.len(), 2);
    assert_eq!(thread.messages[1].text, "Hi!");
}
