//! Tests for SQLite database connection and migrations.

use tempfile::TempDir;

use super::test_support::{make_user, setup_db};
use crate::db::{Database, SqliteDatabase, UserRepository};

#[tokio::test(flavor = "multi_thread")]
async fn migrate_creates_all_tables() {
    let db = setup_db().await;

    let tables: Vec<String> =
        sqlx::query_scalar("SELECT name FROM sqlite_master WHERE type='table' ORDER BY name")
            .fetch_all(db.pool())
            .await
            .expect("Query should succeed");

    let expected = vec![
        "_sqlx_migrations",
        "approval_record",
        "collaboration_request",
        "content_item",
        "conversation",
        "conversation_participant",
        "message",
        "shared_project",
        "shared_project_link",
        "shared_project_task",
        "task_assignment",
        "task_comment",
        "team",
        "team_member",
        "user",
    ];

    for table in &expected {
        assert!(
            tables.iter().any(|t| t == table),
            "Missing table: {}. Found tables: {:?}",
            table,
            tables
        );
    }
}

#[tokio::test(flavor = "multi_thread")]
async fn migrate_is_idempotent() {
    let db = setup_db().await;
    db.migrate().await.expect("Second migration should succeed");
}

#[tokio::test(flavor = "multi_thread")]
async fn foreign_keys_are_enforced() {
    let db = setup_db().await;

    let enabled: i64 = sqlx::query_scalar("PRAGMA foreign_keys")
        .fetch_one(db.pool())
        .await
        .expect("Query should succeed");
    assert_eq!(enabled, 1);

    let result = sqlx::query(
        "INSERT INTO team (id, name, owner_id, created_at, updated_at) VALUES ('t1', 'x', 'nobody', '', '')",
    )
    .execute(db.pool())
    .await;
    assert!(result.is_err(), "Team with unknown owner should be rejected");
}

#[tokio::test(flavor = "multi_thread")]
async fn file_database_persists_between_opens() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let path = temp_dir.path().join("vlogforge.db");

    {
        let db = SqliteDatabase::open(&path)
            .await
            .expect("Open should succeed");
        db.migrate().await.expect("Migration should succeed");
        db.users()
            .create(&make_user("persist1", "Persisted"))
            .await
            .expect("Create should succeed");
        db.pool().close().await;
    }

    let db = SqliteDatabase::open(&path)
        .await
        .expect("Reopen should succeed");
    db.migrate().await.expect("Migration should succeed");
    let user = db.users().get("persist1").await.expect("Get should succeed");
    assert_eq!(user.display_name, "Persisted");
}
