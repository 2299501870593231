// tests/api_tests.rs
//
// End-to-end tests driving the router with in-memory storage and a canned
// chat model, so no network or database is needed.

use std::sync::Arc;
use std::time::Duration;

use api_lib::adapters::MemoryStore;
use api_lib::web::{auth::AuthMode, build_router, state::AppState};
use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use promptdesk_core::domain::{ChatMessage, ChatReply};
use promptdesk_core::models::ModelId;
use promptdesk_core::ports::{ChatModelService, PortResult};
use serde_json::{json, Value};
use tower::ServiceExt;

/// Echoes the last message back, tagged with the requested model.
struct CannedChat;

#[async_trait::async_trait]
impl ChatModelService for CannedChat {
    async fn generate(&self, messages: &[ChatMessage], model: ModelId) -> PortResult<ChatReply> {
        let last = messages.last().map(|m| m.content.clone()).unwrap_or_default();
        Ok(ChatReply {
            response: format!("echo: {}", last),
            model,
        })
    }
}

fn test_app(auth: AuthMode) -> Router {
    let store = Arc::new(MemoryStore::new());
    let state = Arc::new(AppState {
        conversations: store.clone(),
        documents: store,
        chat_model: Arc::new(CannedChat),
        auth,
    });
    build_router(state)
}

fn anonymous_app() -> Router {
    test_app(AuthMode::Anonymous)
}

async fn send(
    app: &Router,
    method: &str,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header("authorization", format!("Bearer {}", token));
    }
    let request = match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    (status, value)
}

fn make_token(secret: &str, sub: &str) -> String {
    #[derive(serde::Serialize)]
    struct Claims<'a> {
        sub: &'a str,
        exp: usize,
    }
    jsonwebtoken::encode(
        &jsonwebtoken::Header::default(),
        &Claims {
            sub,
            exp: 4_102_444_800, // far future
        },
        &jsonwebtoken::EncodingKey::from_secret(secret.as_bytes()),
    )
    .unwrap()
}

#[tokio::test]
async fn health_is_public() {
    let app = anonymous_app();
    let (status, body) = send(&app, "GET", "/api/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], json!(true));
    assert_eq!(body["message"], json!("API is working"));
}

#[tokio::test]
async fn chat_without_id_creates_a_conversation() {
    let app = anonymous_app();

    let (status, body) = send(
        &app,
        "POST",
        "/api/chat",
        None,
        Some(json!({"message": "hi"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], json!(true));
    assert_eq!(body["response"], json!("echo: hi"));
    assert_eq!(body["model"], json!("gpt-4o"));

    // The returned id matches the persisted record.
    let id = body["conversationId"].as_str().unwrap().to_string();
    let (status, body) = send(
        &app,
        "GET",
        &format!("/api/conversations/{}", id),
        None,
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["conversation"]["id"], json!(id));
    assert_eq!(body["conversation"]["initialDescription"], json!("hi"));
    assert_eq!(body["conversation"]["currentStep"], json!("chatting"));
    assert_eq!(
        body["conversation"]["conversationHistory"]
            .as_array()
            .unwrap()
            .len(),
        2
    );
}

#[tokio::test]
async fn chat_appends_two_entries_and_tracks_the_last_model() {
    let app = anonymous_app();

    let (_, body) = send(
        &app,
        "POST",
        "/api/chat",
        None,
        Some(json!({"message": "hi"})),
    )
    .await;
    let id = body["conversationId"].as_str().unwrap().to_string();

    let (status, body) = send(
        &app,
        "POST",
        "/api/chat",
        None,
        Some(json!({
            "message": "again",
            "conversationId": id,
            "model": "claude-4-sonnet"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["model"], json!("claude-4-sonnet"));

    let (_, body) = send(
        &app,
        "GET",
        &format!("/api/conversations/{}", id),
        None,
        None,
    )
    .await;
    let conversation = &body["conversation"];
    assert_eq!(conversation["selectedModel"], json!("claude-4-sonnet"));
    let history = conversation["conversationHistory"].as_array().unwrap();
    assert_eq!(history.len(), 4);
    assert_eq!(history[0]["role"], json!("user"));
    assert_eq!(history[1]["role"], json!("assistant"));
    assert_eq!(history[2]["role"], json!("user"));
    assert_eq!(history[3]["role"], json!("assistant"));
    assert_eq!(history[3]["model"], json!("claude-4-sonnet"));
}

#[tokio::test]
async fn chat_with_unknown_id_is_404_and_creates_nothing() {
    let app = anonymous_app();

    let (status, body) = send(
        &app,
        "POST",
        "/api/chat",
        None,
        Some(json!({"message": "hi", "conversationId": "conv_0_missing"})),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["success"], json!(false));
    assert_eq!(body["error"], json!("Conversation not found"));

    let (_, body) = send(&app, "GET", "/api/conversations", None, None).await;
    assert!(body["conversations"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn chat_rejects_an_empty_message() {
    let app = anonymous_app();
    let (status, body) = send(
        &app,
        "POST",
        "/api/chat",
        None,
        Some(json!({"message": "   "})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], json!("Please provide a message"));
}

#[tokio::test]
async fn chat_rejects_an_unknown_model_with_the_failure_envelope() {
    let app = anonymous_app();
    let (status, body) = send(
        &app,
        "POST",
        "/api/chat",
        None,
        Some(json!({"message": "hi", "model": "not-a-model"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], json!(false));
    assert!(body["error"].as_str().is_some_and(|e| !e.is_empty()));
}

#[tokio::test]
async fn craft_super_prompt_enhances_a_prompt() {
    let app = anonymous_app();
    let (status, body) = send(
        &app,
        "POST",
        "/api/craft-super-prompt",
        None,
        Some(json!({"prompt": "write a poem"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], json!(true));
    assert!(body["enhancedPrompt"]
        .as_str()
        .unwrap()
        .contains("write a poem"));
}

#[tokio::test]
async fn document_lifecycle() {
    let app = anonymous_app();

    // Create: content defaults to empty string.
    let (status, body) = send(
        &app,
        "POST",
        "/api/documents",
        None,
        Some(json!({"title": "Notes"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let document = &body["document"];
    assert_eq!(document["title"], json!("Notes"));
    assert_eq!(document["content"], json!(""));
    let id = document["id"].as_str().unwrap().to_string();
    let created_at = document["createdAt"].as_str().unwrap().to_string();

    // Patch only content; title survives and updatedAt advances.
    tokio::time::sleep(Duration::from_millis(5)).await;
    let (status, body) = send(
        &app,
        "PUT",
        &format!("/api/documents/{}", id),
        None,
        Some(json!({"content": "hi"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let document = &body["document"];
    assert_eq!(document["title"], json!("Notes"));
    assert_eq!(document["content"], json!("hi"));
    let updated_at =
        chrono::DateTime::parse_from_rfc3339(document["updatedAt"].as_str().unwrap()).unwrap();
    let created_at = chrono::DateTime::parse_from_rfc3339(&created_at).unwrap();
    assert!(updated_at > created_at);

    let (_, body) = send(&app, "GET", &format!("/api/documents/{}", id), None, None).await;
    assert_eq!(body["document"]["content"], json!("hi"));

    // Delete removes it; a second delete is not-found.
    let (status, body) = send(
        &app,
        "DELETE",
        &format!("/api/documents/{}", id),
        None,
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], json!("Document deleted successfully"));

    let (status, _) = send(&app, "GET", &format!("/api/documents/{}", id), None, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(
        &app,
        "DELETE",
        &format!("/api/documents/{}", id),
        None,
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn update_rejects_an_empty_title() {
    let app = anonymous_app();
    let (_, body) = send(
        &app,
        "POST",
        "/api/documents",
        None,
        Some(json!({"title": "Notes"})),
    )
    .await;
    let id = body["document"]["id"].as_str().unwrap().to_string();

    let (status, body) = send(
        &app,
        "PUT",
        &format!("/api/documents/{}", id),
        None,
        Some(json!({"title": ""})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], json!("Please provide a document title"));
}

#[tokio::test]
async fn create_rejects_a_missing_title() {
    let app = anonymous_app();
    let (status, _) = send(
        &app,
        "POST",
        "/api/documents",
        None,
        Some(json!({"title": " "})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn protected_routes_require_a_token_in_jwt_mode() {
    let app = test_app(AuthMode::from_secret(Some("test-secret")));

    let (status, body) = send(&app, "GET", "/api/documents", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["success"], json!(false));

    // Garbage tokens are rejected too.
    let (status, _) = send(&app, "GET", "/api/documents", Some("not-a-jwt"), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    // A valid provider-issued token passes.
    let token = make_token("test-secret", "user_a");
    let (status, body) = send(&app, "GET", "/api/documents", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["documents"].as_array().unwrap().is_empty());

    // Tokens signed with a different secret are rejected.
    let forged = make_token("other-secret", "user_a");
    let (status, _) = send(&app, "GET", "/api/documents", Some(&forged), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn listings_are_scoped_to_the_caller() {
    let app = test_app(AuthMode::from_secret(Some("test-secret")));
    let token_a = make_token("test-secret", "user_a");
    let token_b = make_token("test-secret", "user_b");

    send(
        &app,
        "POST",
        "/api/documents",
        Some(&token_a),
        Some(json!({"title": "A's notes"})),
    )
    .await;
    send(
        &app,
        "POST",
        "/api/chat",
        Some(&token_a),
        Some(json!({"message": "hi"})),
    )
    .await;

    let (_, body) = send(&app, "GET", "/api/documents", Some(&token_a), None).await;
    assert_eq!(body["documents"].as_array().unwrap().len(), 1);
    let (_, body) = send(&app, "GET", "/api/documents", Some(&token_b), None).await;
    assert!(body["documents"].as_array().unwrap().is_empty());

    let (_, body) = send(&app, "GET", "/api/conversations", Some(&token_a), None).await;
    assert_eq!(body["conversations"].as_array().unwrap().len(), 1);
    let (_, body) = send(&app, "GET", "/api/conversations", Some(&token_b), None).await;
    assert!(body["conversations"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn conversations_can_be_deleted() {
    let app = anonymous_app();
    let (_, body) = send(
        &app,
        "POST",
        "/api/chat",
        None,
        Some(json!({"message": "hi"})),
    )
    .await;
    let id = body["conversationId"].as_str().unwrap().to_string();

    let (status, body) = send(
        &app,
        "DELETE",
        &format!("/api/conversations/{}", id),
        None,
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], json!("Conversation deleted successfully"));

    let (status, _) = send(
        &app,
        "GET",
        &format!("/api/conversations/{}", id),
        None,
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(
        &app,
        "DELETE",
        &format!("/api/conversations/{}", id),
        None,
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
