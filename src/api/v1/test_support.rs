//! Shared helpers for the HTTP handler tests.

use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode},
};
use http_body_util::BodyExt;
use serde_json::{Value, json};
use tower::ServiceExt;

use crate::api::notifier::ChangeNotifier;
use crate::api::{AppState, USER_HEADER, routes};
use crate::db::{Database, SqliteDatabase};

/// A router over a fresh in-memory database, plus its notifier.
pub(crate) async fn test_app_with_notifier() -> (Router, ChangeNotifier) {
    let db = SqliteDatabase::in_memory().await.unwrap();
    db.migrate().await.unwrap();
    let notifier = ChangeNotifier::new();
    let app = routes::create_router(AppState::new(db, notifier.clone()));
    (app, notifier)
}

pub(crate) async fn test_app() -> Router {
    test_app_with_notifier().await.0
}

/// Parse a response body, `Null` when empty.
pub(crate) async fn json_body(response: axum::response::Response) -> Value {
    let body = response.into_body().collect().await.unwrap().to_bytes();
    if body.is_empty() {
        return Value::Null;
    }
    serde_json::from_slice(&body).unwrap()
}

/// Send a request as `user` (if any) and return status and JSON body.
pub(crate) async fn send(
    app: &Router,
    method: &str,
    uri: &str,
    user: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(user) = user {
        builder = builder.header(USER_HEADER, user);
    }
    let request = match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(serde_json::to_vec(&body).unwrap()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    (status, json_body(response).await)
}

/// Register a user and return their id.
pub(crate) async fn register(app: &Router, name: &str) -> String {
    let (status, body) = send(
        app,
        "POST",
        "/api/v1/users",
        None,
        Some(json!({
            "email": format!("{}@example.com", name.to_lowercase()),
            "display_name": name,
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "register {}: {}", name, body);
    body["id"].as_str().unwrap().to_string()
}

/// Create a team owned by `owner` and return its id.
pub(crate) async fn create_team(app: &Router, owner: &str, name: &str) -> String {
    let (status, body) = send(
        app,
        "POST",
        "/api/v1/teams",
        Some(owner),
        Some(json!({ "name": name })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "create team: {}", body);
    body["id"].as_str().unwrap().to_string()
}

pub(crate) async fn add_member(app: &Router, team: &str, actor: &str, user: &str, role: &str) {
    let (status, body) = send(
        app,
        "POST",
        &format!("/api/v1/teams/{}/members", team),
        Some(actor),
        Some(json!({ "user_id": user, "role": role })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "add member: {}", body);
}

/// Create a content item and return its id.
pub(crate) async fn create_content(app: &Router, owner: &str, body: Value) -> String {
    let (status, body) = send(app, "POST", "/api/v1/content", Some(owner), Some(body)).await;
    assert_eq!(status, StatusCode::CREATED, "create content: {}", body);
    body["id"].as_str().unwrap().to_string()
}
