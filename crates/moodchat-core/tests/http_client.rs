//! HttpChatClient against a local stub of the chat service

use std::sync::{Arc, Mutex};

use axum::extract::State;
use axum::http::{header, HeaderMap, StatusCode};
use axum::routing::post;
use axum::{Json, Router};
use moodchat_core::{
    ChatBackend, ChatRequest, ConversationController, ExchangeError, HttpChatClient, Message,
    EXCHANGE_FAILED_REPLY, NO_RESPONSE_REPLY,
};
use serde_json::{json, Value};
use tokio::net::TcpListener;

#[derive(Clone, Default)]
struct Recorded {
    bodies: Arc<Mutex<Vec<Value>>>,
    content_types: Arc<Mutex<Vec<String>>>,
}

impl Recorded {
    fn bodies(&self) -> Vec<Value> {
        self.bodies.lock().unwrap().clone()
    }
}

/// Replies like the real service: echoes the message and always offers a session id
async fn echo_chat(
    State(recorded): State<Recorded>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Json<Value> {
    let content_type = headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string();
    recorded.content_types.lock().unwrap().push(content_type);

    let turn = recorded.bodies.lock().unwrap().len();
    let message = body["message"].as_str().unwrap_or_default().to_string();
    recorded.bodies.lock().unwrap().push(body);

    Json(json!({
        "response": format!("echo: {message}"),
        "session_id": format!("session-{turn}"),
    }))
}

async fn spawn_stub(router: Router) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{addr}/chat/")
}

async fn spawn_echo() -> (String, Recorded) {
    let recorded = Recorded::default();
    let router = Router::new()
        .route("/chat/", post(echo_chat))
        .with_state(recorded.clone());
    (spawn_stub(router).await, recorded)
}

#[tokio::test]
async fn test_posts_json_body() {
    let (endpoint, recorded) = spawn_echo().await;
    let client = HttpChatClient::new(&endpoint);

    let reply = client
        .send(ChatRequest {
            message: " upbeat ".to_string(),
            session_id: None,
        })
        .await
        .unwrap();

    assert_eq!(reply.response.as_deref(), Some("echo:  upbeat "));
    assert_eq!(reply.session_id.as_deref(), Some("session-0"));
    assert_eq!(recorded.bodies(), vec![json!({ "message": " upbeat " })]);
    assert_eq!(
        recorded.content_types.lock().unwrap().as_slice(),
        ["application/json".to_string()]
    );
}

#[tokio::test]
async fn test_conversation_keeps_first_session() {
    let (endpoint, recorded) = spawn_echo().await;
    let client = HttpChatClient::new(&endpoint);
    let mut controller = ConversationController::new();

    controller.submit("I'm feeling upbeat", &client).await;
    controller.submit("more like that", &client).await;

    assert_eq!(
        recorded.bodies(),
        vec![
            json!({ "message": "I'm feeling upbeat" }),
            json!({ "message": "more like that", "session_id": "session-0" }),
        ]
    );
    assert_eq!(controller.session_id(), Some("session-0"));
    assert_eq!(
        controller.transcript().last(),
        Some(&Message::bot("echo: more like that"))
    );
}

#[tokio::test]
async fn test_empty_object_yields_placeholder() {
    let router = Router::new().route("/chat/", post(|| async { Json(json!({})) }));
    let client = HttpChatClient::new(&spawn_stub(router).await);
    let mut controller = ConversationController::new();

    controller.submit("hello", &client).await;

    assert_eq!(controller.transcript()[1], Message::bot(NO_RESPONSE_REPLY));
    assert!(controller.session_id().is_none());
}

#[tokio::test]
async fn test_error_status_is_a_failure() {
    let router = Router::new().route(
        "/chat/",
        post(|| async {
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "response": "should not be shown" })),
            )
        }),
    );
    let client = HttpChatClient::new(&spawn_stub(router).await);

    let err = client
        .send(ChatRequest {
            message: "hello".to_string(),
            session_id: None,
        })
        .await
        .unwrap_err();

    assert!(matches!(err, ExchangeError::Status(status) if status.as_u16() == 500));
}

#[tokio::test]
async fn test_non_json_body_is_a_failure() {
    let router = Router::new().route("/chat/", post(|| async { "<html>gateway</html>" }));
    let client = HttpChatClient::new(&spawn_stub(router).await);
    let mut controller = ConversationController::new();

    controller.submit("hello", &client).await;

    assert_eq!(
        controller.transcript(),
        &[Message::user("hello"), Message::bot(EXCHANGE_FAILED_REPLY)]
    );
    assert!(!controller.is_busy());
}

#[tokio::test]
async fn test_unreachable_service_is_a_failure() {
    // Grab a free port, then close it so the connection is refused
    let port = {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap().port()
    };
    let client = HttpChatClient::new(&format!("http://127.0.0.1:{port}/chat/"));

    let err = client
        .send(ChatRequest {
            message: "hello".to_string(),
            session_id: None,
        })
        .await
        .unwrap_err();
    assert!(matches!(err, ExchangeError::Transport(_)));

    let mut controller = ConversationController::new();
    controller.submit("hello", &client).await;
    assert_eq!(
        controller.transcript(),
        &[Message::user("hello"), Message::bot("Error connecting to backend.")]
    );
    assert!(!controller.is_busy());
}
