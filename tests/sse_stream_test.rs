//! Streaming over real HTTP against a local mock server.

mod common;

use std::sync::Arc;

use common::{delta_frame, done_frame, sse_body, TEST_STORAGE_KEY};
use colloq::adapters::{InMemoryStore, ReqwestHttpClient};
use colloq::conductor::ChatClient;
use colloq::error::{ChatError, NetworkError};
use colloq::models::{ChatMessage, MessageRole};
use colloq::session::{ExchangeOutcome, SessionController};
use colloq::sse::StreamEvent;
use colloq::store::ThreadStore;
use futures::StreamExt;
use tokio_util::sync::CancellationToken;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn event_stream(body: String) -> ResponseTemplate {
    ResponseTemplate::new(200)
        .insert_header("content-type", "text/event-stream")
        .set_body_string(body)
}

fn client_for(server: &MockServer) -> ChatClient {
    ChatClient::new(
        format!("{}/gemini", server.uri()),
        Arc::new(ReqwestHttpClient::new()),
    )
}

async fn collect(client: &ChatClient, history: &[ChatMessage], message: &str) -> Vec<StreamEvent> {
    let events = client
        .stream(history, message, CancellationToken::new())
        .await
        .unwrap();
    events.map(|item| item.unwrap()).collect().await
}

#[tokio::test]
async fn test_stream_over_http() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/gemini"))
        .and(header("accept", "text/event-stream"))
        .respond_with(event_stream(sse_body(&["Hi", " there"], "Hi there!")))
        .expect(1)
        .mount(&server)
        .await;

    let events = collect(&client_for(&server), &[], "hello").await;

    assert_eq!(
        events,
        vec![
            StreamEvent::Delta("Hi".to_string()),
            StreamEvent::Delta(" there".to_string()),
            StreamEvent::Done("Hi there!".to_string()),
        ]
    );
}

#[tokio::test]
async fn test_request_body_carries_history_and_message() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/gemini"))
        .and(body_json(serde_json::json!({
            "history": [
                { "role": "user", "parts": [ { "text": "hello" } ] },
                { "role": "model", "parts": [ { "text": "Hi!" } ] },
                { "role": "user", "parts": [ { "text": "and now?" } ] }
            ],
            "message": "and now?"
        })))
        .respond_with(event_stream(done_frame("Now this.")))
        .expect(1)
        .mount(&server)
        .await;

    let history = vec![
        ChatMessage::user("hello"),
        ChatMessage::new(MessageRole::Model, "Hi!"),
        ChatMessage::user("and now?"),
    ];
    let events = collect(&client_for(&server), &history, "and now?").await;

    assert_eq!(events, vec![StreamEvent::Done("Now this.".to_string())]);
}

#[tokio::test]
async fn test_unterminated_last_frame_is_flushed() {
    let server = MockServer::start().await;
    let mut body = delta_frame("partial");
    body.push_str("data: {\"done\":true,\"text\":\"complete\"}");
    Mock::given(method("POST"))
        .respond_with(event_stream(body))
        .mount(&server)
        .await;

    let events = collect(&client_for(&server), &[], "q").await;

    assert_eq!(events.last(), Some(&StreamEvent::Done("complete".to_string())));
}

#[tokio::test]
async fn test_error_status_carries_body_text() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(500).set_body_string("Model is overloaded"))
        .mount(&server)
        .await;

    let err = client_for(&server)
        .stream(&[], "q", CancellationToken::new())
        .await
        .err()
        .unwrap();

    match err {
        NetworkError::HttpStatus { status, message } => {
            assert_eq!(status, 500);
            assert_eq!(message, "Model is overloaded");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn test_error_status_without_body_falls_back() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let err = client_for(&server)
        .stream(&[], "q", CancellationToken::new())
        .await
        .err()
        .unwrap();

    assert_eq!(err.user_message(), "Request failed with status 404");
}

#[tokio::test]
async fn test_unreachable_server_is_connection_failure() {
    let server = MockServer::start().await;
    let client = client_for(&server);
    drop(server);

    let err = client
        .stream(&[], "q", CancellationToken::new())
        .await
        .err()
        .unwrap();

    assert!(matches!(err, NetworkError::ConnectionFailed { .. }));
}

#[tokio::test]
async fn test_controller_end_to_end() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/gemini"))
        .respond_with(event_stream(sse_body(&["Fast", "est"], "Fastest: Acme.")))
        .up_to_n_times(1)
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/gemini"))
        .respond_with(ResponseTemplate::new(503).set_body_string("Try again later"))
        .mount(&server)
        .await;

    let backend = InMemoryStore::new();
    let store = ThreadStore::open(Box::new(backend.clone()), TEST_STORAGE_KEY).into_shared();
    let controller = SessionController::new(client_for(&server), store);

    let outcome = controller
        .ask(Some("Find suppliers with the fastest delivery times."))
        .await
        .unwrap();
    assert_eq!(
        outcome,
        ExchangeOutcome::Completed {
            text: "Fastest: Acme.".to_string()
        }
    );

    let err = controller.ask(Some("and the cheapest?")).await.unwrap_err();
    assert!(matches!(err, ChatError::Network(_)));
    assert_eq!(controller.notice().unwrap().message, "Try again later");

    let thread = controller.active_thread();
    assert_eq!(thread.messages.len(), 2);
    assert_eq!(thread.title, "Find suppliers with the fastest delivery times.");
    assert_eq!(controller.composer(), "and the cheapest?");
}
