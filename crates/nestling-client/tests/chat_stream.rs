//! Streaming chat protocol against a mock backend.

use std::sync::Arc;

use futures::StreamExt;
use serde_json::json;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use nestling_client::chat::SESSION_EXPIRED_MESSAGE;
use nestling_client::{ChatApi, ChatCallbacks, ChatEvent, Gateway, MemorySessionStore, SessionStore};
use nestling_models::chat::ChatMessageRequest;

fn disable_system_proxy_for_tests() {
    static INIT: std::sync::Once = std::sync::Once::new();
    INIT.call_once(|| {
        // Safety: set once for the process before any HTTP clients are built.
        unsafe {
            std::env::set_var("NESTLING_DISABLE_SYSTEM_PROXY", "1");
        }
    });
}

fn request() -> ChatMessageRequest {
    ChatMessageRequest {
        baby_id: "b1".to_string(),
        message: "hello".to_string(),
        session_id: None,
    }
}

fn chat_api(server: &MockServer) -> ChatApi {
    let store = Arc::new(MemorySessionStore::with_token("tok"));
    ChatApi::new(Arc::new(Gateway::new(
        server.uri(),
        store as Arc<dyn SessionStore>,
    )))
}

const SCENARIO_BODY: &str = "data: {\"type\":\"chunk\",\"content\":\"Hel\"}\n\ndata: {\"type\":\"chunk\",\"content\":\"lo\"}\n\ndata: {\"type\":\"done\",\"session_id\":\"s1\",\"response\":\"Hello\",\"is_emergency\":false}\n\n";

#[tokio::test]
async fn fragments_then_completion_arrive_in_order() {
    disable_system_proxy_for_tests();
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/v1/chat/message"))
        .and(header("authorization", "Bearer tok"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(SCENARIO_BODY, "text/event-stream"))
        .expect(1)
        .mount(&server)
        .await;

    let events: Vec<ChatEvent> = chat_api(&server)
        .send_message_stream(request())
        .collect()
        .await;

    assert_eq!(events.len(), 3, "got: {events:?}");
    let ChatEvent::Fragment(first) = &events[0] else {
        panic!("expected fragment, got: {:?}", events[0]);
    };
    assert_eq!(first, "Hel");
    let ChatEvent::Fragment(second) = &events[1] else {
        panic!("expected fragment, got: {:?}", events[1]);
    };
    assert_eq!(second, "lo");
    let ChatEvent::Complete(completion) = &events[2] else {
        panic!("expected completion, got: {:?}", events[2]);
    };
    assert_eq!(completion.session_id, "s1");
    assert_eq!(completion.response, "Hello");
    assert!(!completion.is_emergency);
}

#[tokio::test]
async fn callbacks_receive_the_same_sequence() {
    disable_system_proxy_for_tests();
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/v1/chat/message"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(SCENARIO_BODY, "text/event-stream"))
        .mount(&server)
        .await;

    let mut fragments = Vec::new();
    let mut completions = Vec::new();
    let mut errors = Vec::new();
    chat_api(&server)
        .send_message_streaming(
            request(),
            ChatCallbacks {
                on_fragment: Box::new(|text| fragments.push(text.to_string())),
                on_complete: Box::new(|completion| completions.push(completion)),
                on_error: Box::new(|message| errors.push(message)),
            },
        )
        .await;

    assert_eq!(fragments, ["Hel", "lo"]);
    assert_eq!(completions.len(), 1);
    assert_eq!(completions[0].session_id, "s1");
    assert!(errors.is_empty());
}

#[tokio::test]
async fn malformed_frame_does_not_drop_its_neighbors() {
    disable_system_proxy_for_tests();
    let server = MockServer::start().await;

    let body = "data: {\"type\":\"chunk\",\"content\":\"a\"}\n\ndata: {oops\n\ndata: {\"type\":\"chunk\",\"content\":\"b\"}\n\n";
    Mock::given(method("POST"))
        .and(path("/api/v1/chat/message"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(body, "text/event-stream"))
        .mount(&server)
        .await;

    let events: Vec<ChatEvent> = chat_api(&server)
        .send_message_stream(request())
        .collect()
        .await;

    let fragments: Vec<&str> = events
        .iter()
        .map(|event| match event {
            ChatEvent::Fragment(text) => text.as_str(),
            other => panic!("unexpected event: {other:?}"),
        })
        .collect();
    assert_eq!(fragments, ["a", "b"]);
}

#[tokio::test]
async fn server_error_frame_does_not_end_the_stream() {
    disable_system_proxy_for_tests();
    let server = MockServer::start().await;

    let body = "data: {\"type\":\"error\",\"detail\":\"model hiccup\"}\n\ndata: {\"type\":\"chunk\",\"content\":\"ok\"}\n\n";
    Mock::given(method("POST"))
        .and(path("/api/v1/chat/message"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(body, "text/event-stream"))
        .mount(&server)
        .await;

    let events: Vec<ChatEvent> = chat_api(&server)
        .send_message_stream(request())
        .collect()
        .await;

    assert_eq!(events.len(), 2, "got: {events:?}");
    assert!(matches!(&events[0], ChatEvent::Error(message) if message == "model hiccup"));
    assert!(matches!(&events[1], ChatEvent::Fragment(text) if text == "ok"));
}

#[tokio::test]
async fn non_success_status_surfaces_its_detail() {
    disable_system_proxy_for_tests();
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/v1/chat/message"))
        .respond_with(ResponseTemplate::new(429).set_body_json(json!({"detail": "rate limited"})))
        .mount(&server)
        .await;

    let events: Vec<ChatEvent> = chat_api(&server)
        .send_message_stream(request())
        .collect()
        .await;

    assert_eq!(events.len(), 1);
    assert!(matches!(&events[0], ChatEvent::Error(message) if message == "rate limited"));
}

#[tokio::test]
async fn authorization_failure_maps_to_the_fixed_message() {
    disable_system_proxy_for_tests();
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/v1/chat/message"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let events: Vec<ChatEvent> = chat_api(&server)
        .send_message_stream(request())
        .collect()
        .await;

    assert_eq!(events.len(), 1);
    assert!(matches!(&events[0], ChatEvent::Error(message) if message == SESSION_EXPIRED_MESSAGE));
}

#[tokio::test]
async fn unparseable_error_body_falls_back_to_a_generic_message() {
    disable_system_proxy_for_tests();
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/v1/chat/message"))
        .respond_with(ResponseTemplate::new(500).set_body_raw("upstream exploded", "text/plain"))
        .mount(&server)
        .await;

    let events: Vec<ChatEvent> = chat_api(&server)
        .send_message_stream(request())
        .collect()
        .await;

    assert_eq!(events.len(), 1);
    assert!(matches!(&events[0], ChatEvent::Error(message) if message == "Failed to send message."));
}

#[tokio::test]
async fn absent_credential_still_connects() {
    disable_system_proxy_for_tests();
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/v1/chat/message"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(
            "data: {\"type\":\"chunk\",\"content\":\"hi\"}\n\n",
            "text/event-stream",
        ))
        .mount(&server)
        .await;

    let store = Arc::new(MemorySessionStore::new());
    let api = ChatApi::new(Arc::new(Gateway::new(
        server.uri(),
        store as Arc<dyn SessionStore>,
    )));

    let events: Vec<ChatEvent> = api.send_message_stream(request()).collect().await;
    assert_eq!(events.len(), 1);
    assert!(matches!(&events[0], ChatEvent::Fragment(text) if text == "hi"));
}
