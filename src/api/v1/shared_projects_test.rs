//! Integration tests for shared project endpoints.

use axum::{Router, http::StatusCode};
use serde_json::json;

use super::test_support::{register, send, test_app};

struct Pair {
    ana: String,
    ben: String,
    request: String,
    project: String,
}

/// Ana asks Ben to collaborate and Ben accepts.
async fn accepted_pair(app: &Router) -> Pair {
    let ana = register(app, "Ana").await;
    let ben = register(app, "Ben").await;

    let (_, body) = send(
        app,
        "POST",
        "/api/v1/collaborations",
        Some(&ana),
        Some(json!({ "recipient_id": ben, "title": "Market day" })),
    )
    .await;
    let request = body["id"].as_str().unwrap().to_string();

    let (status, body) = send(
        app,
        "POST",
        &format!("/api/v1/collaborations/{}/accept", request),
        Some(&ben),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let project = body["project"]["id"].as_str().unwrap().to_string();

    Pair {
        ana,
        ben,
        request,
        project,
    }
}

#[tokio::test(flavor = "multi_thread")]
async fn create_is_idempotent_per_request() {
    let app = test_app().await;
    let pair = accepted_pair(&app).await;

    let (status, body) = send(
        &app,
        "POST",
        "/api/v1/shared-projects",
        Some(&pair.ana),
        Some(json!({ "collaboration_request_id": pair.request })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["id"], pair.project.as_str());
}

#[tokio::test(flavor = "multi_thread")]
async fn create_requires_accepted_request() {
    let app = test_app().await;
    let ana = register(&app, "Ana").await;
    let ben = register(&app, "Ben").await;

    let (_, body) = send(
        &app,
        "POST",
        "/api/v1/collaborations",
        Some(&ana),
        Some(json!({ "recipient_id": ben, "title": "Pending" })),
    )
    .await;
    let request = body["id"].as_str().unwrap().to_string();

    let (status, _) = send(
        &app,
        "POST",
        "/api/v1/shared-projects",
        Some(&ana),
        Some(json!({ "collaboration_request_id": request })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test(flavor = "multi_thread")]
async fn participants_only() {
    let app = test_app().await;
    let pair = accepted_pair(&app).await;
    let eve = register(&app, "Eve").await;
    let uri = format!("/api/v1/shared-projects/{}", pair.project);

    let (status, _) = send(&app, "GET", &uri, Some(&pair.ben), None).await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = send(&app, "GET", &uri, Some(&eve), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (_, body) = send(&app, "GET", "/api/v1/shared-projects", Some(&pair.ana), None).await;
    assert_eq!(body.as_array().unwrap().len(), 1);

    let (_, body) = send(&app, "GET", "/api/v1/shared-projects", Some(&eve), None).await;
    assert_eq!(body.as_array().unwrap().len(), 0);
}

#[tokio::test(flavor = "multi_thread")]
async fn checklist_tasks_toggle_completion() {
    let app = test_app().await;
    let pair = accepted_pair(&app).await;
    let eve = register(&app, "Eve").await;
    let tasks_uri = format!("/api/v1/shared-projects/{}/tasks", pair.project);

    let (status, _) = send(
        &app,
        "POST",
        &tasks_uri,
        Some(&pair.ana),
        Some(json!({ "title": "Scout", "assignee_id": eve })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, task) = send(
        &app,
        "POST",
        &tasks_uri,
        Some(&pair.ana),
        Some(json!({ "title": "Scout", "assignee_id": pair.ben })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(task["is_completed"], false);

    let task_uri = format!("{}/{}", tasks_uri, task["id"].as_str().unwrap());
    let (status, body) = send(&app, "PATCH", &task_uri, Some(&pair.ben), Some(json!({ "is_completed": true }))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["is_completed"], true);
    assert!(body["completed_at"].is_string());

    let (_, body) = send(&app, "PATCH", &task_uri, Some(&pair.ben), Some(json!({ "is_completed": false }))).await;
    assert!(body["completed_at"].is_null());

    let (_, project) = send(
        &app,
        "GET",
        &format!("/api/v1/shared-projects/{}", pair.project),
        Some(&pair.ana),
        None,
    )
    .await;
    assert_eq!(project["tasks"].as_array().unwrap().len(), 1);

    let (status, _) = send(&app, "DELETE", &task_uri, Some(&pair.ana), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = send(&app, "DELETE", &task_uri, Some(&pair.ana), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test(flavor = "multi_thread")]
async fn links_require_http_urls() {
    let app = test_app().await;
    let pair = accepted_pair(&app).await;
    let links_uri = format!("/api/v1/shared-projects/{}/links", pair.project);

    let (status, _) = send(
        &app,
        "POST",
        &links_uri,
        Some(&pair.ana),
        Some(json!({ "url": "ftp://files.example.com" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, link) = send(
        &app,
        "POST",
        &links_uri,
        Some(&pair.ana),
        Some(json!({ "url": "https://drive.example.com/market", "label": "Footage" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(link["added_by"], pair.ana.as_str());

    let (status, _) = send(
        &app,
        "DELETE",
        &format!("{}/{}", links_uri, link["id"].as_str().unwrap()),
        Some(&pair.ben),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NO_CONTENT);
}

#[tokio::test(flavor = "multi_thread")]
async fn update_project_status() {
    let app = test_app().await;
    let pair = accepted_pair(&app).await;
    let uri = format!("/api/v1/shared-projects/{}", pair.project);

    let (status, body) = send(
        &app,
        "PATCH",
        &uri,
        Some(&pair.ben),
        Some(json!({ "status": "completed", "description": "Wrapped" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "completed");
    assert_eq!(body["description"], "Wrapped");

    let (status, _) = send(&app, "PATCH", &uri, Some(&pair.ben), Some(json!({ "status": "paused" }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}
