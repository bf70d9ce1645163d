//! The widget against real HTTP backends bound to a local port.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use axum::{Json, Router, http::StatusCode, routing::post};
use serde_json::{Value, json};

use policy_chat::widget::{ChatBackend, ChatWidget, HttpChatBackend, SendError, Sender};

/// Serve `app` on an ephemeral port and return the `/chat` URL.
async fn spawn(app: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind");
    let addr = listener.local_addr().expect("local addr");
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("serve");
    });
    format!("http://{addr}/chat")
}

fn is_hh_mm(s: &str) -> bool {
    let b = s.as_bytes();
    b.len() == 5 && b[2] == b':' && s.chars().filter(char::is_ascii_digit).count() == 4
}

fn count(widget: &ChatWidget, sender: Sender) -> usize {
    widget.messages().iter().filter(|m| m.sender == sender).count()
}

#[tokio::test]
async fn test_send_renders_reply() {
    let app = Router::new().route(
        "/chat",
        post(|Json(body): Json<Value>| async move {
            assert_eq!(body, json!({ "message": "hi" }));
            Json(json!({ "reply": "hello" }))
        }),
    );
    let backend = HttpChatBackend::new(spawn(app).await).unwrap();
    let mut widget = ChatWidget::new();
    widget.set_input("hi");

    let pending = widget.begin_send().unwrap();
    assert_eq!(count(&widget, Sender::User), 1);
    assert!(widget.messages()[0].text.contains("hi"));
    assert!(is_hh_mm(&widget.messages()[0].timestamp));
    assert_eq!(widget.input(), "");
    assert!(widget.is_typing());

    let result = backend.send(pending.message()).await;
    widget.complete_send(pending, result);

    assert_eq!(count(&widget, Sender::Bot), 1);
    assert_eq!(widget.messages()[1].text, "hello");
    assert!(!widget.is_typing());
}

#[tokio::test]
async fn test_missing_reply_renders_error() {
    let app = Router::new().route("/chat", post(|| async { Json(json!({ "answer": "hello" })) }));
    let backend = HttpChatBackend::new(spawn(app).await).unwrap();
    let mut widget = ChatWidget::new();
    widget.set_input("hi");

    let bubble = widget.send(&backend).await.unwrap();

    assert_eq!(bubble.sender, Sender::Error);
    assert!(bubble.text.contains("missing reply"));
    assert_eq!(count(&widget, Sender::Error), 1);
    assert!(!widget.is_typing());
}

#[tokio::test]
async fn test_server_error_uses_reply_text() {
    let app = Router::new().route(
        "/chat",
        post(|| async {
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "reply": "Error: model not loaded" })),
            )
        }),
    );
    let backend = HttpChatBackend::new(spawn(app).await).unwrap();

    let err = backend.send("hi").await.unwrap_err();

    match &err {
        SendError::Status { status, message } => {
            assert_eq!(*status, 500);
            assert_eq!(message, "Error: model not loaded");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn test_unreachable_backend_renders_error() {
    // Bind then drop to get a port nobody listens on.
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let backend =
        HttpChatBackend::with_timeout(format!("http://{addr}/chat"), Duration::from_secs(2))
            .unwrap();
    let mut widget = ChatWidget::new();
    widget.set_input("hi");

    widget.send(&backend).await;

    assert_eq!(count(&widget, Sender::User), 1);
    assert_eq!(count(&widget, Sender::Error), 1);
    assert!(widget.messages()[1].text.starts_with("Network error"));
    assert!(!widget.is_typing());
}

#[tokio::test]
async fn test_blank_input_sends_nothing() {
    let hits = Arc::new(AtomicUsize::new(0));
    let counter = hits.clone();
    let app = Router::new().route(
        "/chat",
        post(move || {
            counter.fetch_add(1, Ordering::SeqCst);
            async { Json(json!({ "reply": "unexpected" })) }
        }),
    );
    let backend = HttpChatBackend::new(spawn(app).await).unwrap();
    let mut widget = ChatWidget::new();
    widget.set_input("   ");

    assert!(widget.send(&backend).await.is_none());
    assert!(widget.messages().is_empty());
    assert!(!widget.is_typing());
    assert_eq!(hits.load(Ordering::SeqCst), 0);
}
