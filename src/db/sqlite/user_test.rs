//! Tests for SqliteUserRepository.

use super::test_support::{make_user, setup_db};
use crate::db::{Database, DbError, UserRepository};

#[tokio::test(flavor = "multi_thread")]
async fn user_create_and_get() {
    let db = setup_db().await;
    let users = db.users();

    let mut user = make_user("user0001", "Ana Ribeiro");
    user.bio = Some("Slow travel".to_string());
    user.niche = Some("travel".to_string());

    let created = users.create(&user).await.expect("Create should succeed");
    assert_eq!(created.id, "user0001");
    assert!(!created.created_at.is_empty());
    assert_eq!(created.created_at, created.updated_at);

    let retrieved = users.get("user0001").await.expect("Get should succeed");
    assert_eq!(retrieved.email, "user0001@example.com");
    assert_eq!(retrieved.display_name, "Ana Ribeiro");
    assert_eq!(retrieved.niche.as_deref(), Some("travel"));
}

#[tokio::test(flavor = "multi_thread")]
async fn user_create_generates_id() {
    let db = setup_db().await;

    let created = db
        .users()
        .create(&make_user("", "No Id"))
        .await
        .expect("Create should succeed");
    assert_eq!(created.id.len(), 8);
    assert!(created.id.chars().all(|c| c.is_ascii_hexdigit()));
}

#[tokio::test(flavor = "multi_thread")]
async fn user_duplicate_email_rejected() {
    let db = setup_db().await;
    let users = db.users();

    users
        .create(&make_user("user0001", "First"))
        .await
        .expect("Create should succeed");

    let mut dup = make_user("user0002", "Second");
    dup.email = "user0001@example.com".to_string();

    match users.create(&dup).await {
        Err(DbError::AlreadyExists { entity_type, id }) => {
            assert_eq!(entity_type, "User");
            assert_eq!(id, "user0001@example.com");
        }
        other => panic!("Expected AlreadyExists, got {:?}", other),
    }
}

#[tokio::test(flavor = "multi_thread")]
async fn user_get_by_email_ignores_case() {
    let db = setup_db().await;
    let users = db.users();

    users
        .create(&make_user("user0001", "Ana"))
        .await
        .expect("Create should succeed");

    let found = users
        .get_by_email("USER0001@Example.com")
        .await
        .expect("Lookup should succeed");
    assert_eq!(found.map(|u| u.id), Some("user0001".to_string()));

    let missing = users
        .get_by_email("nobody@example.com")
        .await
        .expect("Lookup should succeed");
    assert!(missing.is_none());
}

#[tokio::test(flavor = "multi_thread")]
async fn user_update_profile() {
    let db = setup_db().await;
    let users = db.users();

    let mut user = users
        .create(&make_user("user0001", "Ana"))
        .await
        .expect("Create should succeed");

    user.display_name = "Ana R.".to_string();
    user.bio = Some("Food and trains".to_string());
    users.update(&user).await.expect("Update should succeed");

    let retrieved = users.get("user0001").await.expect("Get should succeed");
    assert_eq!(retrieved.display_name, "Ana R.");
    assert_eq!(retrieved.bio.as_deref(), Some("Food and trains"));
}

#[tokio::test(flavor = "multi_thread")]
async fn user_get_and_update_missing() {
    let db = setup_db().await;
    let users = db.users();

    assert!(matches!(
        users.get("nonexist").await,
        Err(DbError::NotFound { .. })
    ));
    assert!(matches!(
        users.update(&make_user("nonexist", "Ghost")).await,
        Err(DbError::NotFound { .. })
    ));
}
