use serde_json::json;

use crate::cli::commands::PageParams;
use crate::cli::commands::task::*;
use crate::cli::commands::test_server::{client, post_json, register, spawn_test_server};
use crate::cli::error::CliError;

fn sample_task() -> Task {
    Task {
        id: "t0000001".to_string(),
        team_id: "team0001".to_string(),
        content_id: None,
        title: "Edit b-roll".to_string(),
        description: None,
        assignee_id: "user0001".to_string(),
        created_by: "user0002".to_string(),
        status: "not_started".to_string(),
        priority: None,
        due_date: Some("2025-06-03 18:00:00".to_string()),
        created_at: "2025-06-01 09:00:00".to_string(),
        updated_at: "2025-06-01 09:00:00".to_string(),
        started_at: None,
        completed_at: None,
    }
}

#[test]
fn test_format_table_empty() {
    assert_eq!(format_table(&[]), "No tasks found.");
}

#[test]
fn test_display_fills_missing_values() {
    let display = TaskDisplay::from(&sample_task());
    assert_eq!(display.priority, "-");
    assert_eq!(display.content_id, "-");
    assert_eq!(display.due_date, "2025-06-03 18:00");
}

#[test]
fn test_page_params_query() {
    let page = PageParams {
        limit: Some(10),
        offset: None,
    };
    assert_eq!(page.query(), vec![("limit", "10".to_string())]);
    assert!(PageParams::default().query().is_empty());
}

/// Team owned by `owner` with `member` added, plus one task for `member`.
async fn team_with_task(url: &str, owner: &str, member: &str) -> String {
    let team = post_json(url, owner, "/api/v1/teams", json!({ "name": "Crew" })).await;
    let team_id = team["id"].as_str().unwrap().to_string();

    post_json(
        url,
        owner,
        &format!("/api/v1/teams/{}/members", team_id),
        json!({ "user_id": member, "role": "member" }),
    )
    .await;

    let task = post_json(
        url,
        owner,
        &format!("/api/v1/teams/{}/tasks", team_id),
        json!({ "title": "Edit b-roll", "assignee_id": member, "priority": 2 }),
    )
    .await;
    task["id"].as_str().unwrap().to_string()
}

#[tokio::test(flavor = "multi_thread")]
async fn test_my_tasks_lists_assigned_work() {
    let (url, _handle) = spawn_test_server().await;
    let owner = register(&url, "Owner").await;
    let editor = register(&url, "Editor").await;
    team_with_task(&url, &owner, &editor).await;

    let table = my_tasks(&client(&url, &editor), None, PageParams::default(), "table")
        .await
        .unwrap();
    assert!(table.contains("Edit b-roll"));

    let none = my_tasks(&client(&url, &owner), None, PageParams::default(), "table")
        .await
        .unwrap();
    assert_eq!(none, "No tasks found.");
}

#[tokio::test(flavor = "multi_thread")]
async fn test_change_status_moves_task() {
    let (url, _handle) = spawn_test_server().await;
    let owner = register(&url, "Owner").await;
    let editor = register(&url, "Editor").await;
    let task_id = team_with_task(&url, &owner, &editor).await;
    let api = client(&url, &editor);

    let output = change_status(&api, &task_id, "in_progress").await.unwrap();
    assert_eq!(output, format!("✓ Task {} is now in_progress", task_id));

    let json = my_tasks(&api, Some("in_progress"), PageParams::default(), "json")
        .await
        .unwrap();
    let tasks: Vec<Task> = serde_json::from_str(&json).unwrap();
    assert_eq!(tasks.len(), 1);
    assert!(tasks[0].started_at.is_some());
}

#[tokio::test(flavor = "multi_thread")]
async fn test_change_status_rejects_unknown_status() {
    let (url, _handle) = spawn_test_server().await;
    let owner = register(&url, "Owner").await;
    let editor = register(&url, "Editor").await;
    let task_id = team_with_task(&url, &owner, &editor).await;

    let err = change_status(&client(&url, &editor), &task_id, "done")
        .await
        .unwrap_err();
    assert!(matches!(err, CliError::ApiError { status: 400, .. }));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_unknown_user_is_rejected() {
    let (url, _handle) = spawn_test_server().await;

    let err = my_tasks(&client(&url, "ffffffff"), None, PageParams::default(), "table")
        .await
        .unwrap_err();
    assert!(matches!(err, CliError::ApiError { status: 401, .. }));
}
