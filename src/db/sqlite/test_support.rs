//! Shared fixtures for the SQLite repository tests.

use crate::db::{
    ContentItem, ContentRepository, ContentStatus, Database, SqliteDatabase, Team,
    TeamRepository, User, UserRepository,
};

pub(crate) async fn setup_db() -> SqliteDatabase {
    let db = SqliteDatabase::in_memory()
        .await
        .expect("Failed to create in-memory database");
    db.migrate().await.expect("Migration should succeed");
    db
}

pub(crate) fn make_user(id: &str, name: &str) -> User {
    User {
        id: id.to_string(),
        email: format!("{}@example.com", id),
        display_name: name.to_string(),
        bio: None,
        niche: None,
        created_at: String::new(),
        updated_at: String::new(),
    }
}

pub(crate) fn make_team(id: &str, owner_id: &str) -> Team {
    Team {
        id: id.to_string(),
        name: format!("Team {}", id),
        description: None,
        owner_id: owner_id.to_string(),
        approval_required: false,
        approver_ids: vec![],
        created_at: String::new(),
        updated_at: String::new(),
    }
}

pub(crate) fn make_content(id: &str, owner_id: &str, team_id: Option<&str>) -> ContentItem {
    ContentItem {
        id: id.to_string(),
        owner_id: owner_id.to_string(),
        team_id: team_id.map(String::from),
        title: format!("Video {}", id),
        description: None,
        notes: None,
        platform: None,
        tags: vec![],
        status: ContentStatus::Idea,
        scheduled_at: None,
        published_at: None,
        deleted_at: None,
        created_at: String::new(),
        updated_at: String::new(),
    }
}

/// Insert users with the given IDs.
pub(crate) async fn seed_users(db: &SqliteDatabase, ids: &[&str]) {
    for id in ids {
        db.users()
            .create(&make_user(id, id))
            .await
            .expect("Create user should succeed");
    }
}

/// Insert a team owned by `owner_id`.
pub(crate) async fn seed_team(db: &SqliteDatabase, id: &str, owner_id: &str) -> Team {
    db.teams()
        .create(&make_team(id, owner_id))
        .await
        .expect("Create team should succeed")
}

/// Insert a content item.
pub(crate) async fn seed_content(
    db: &SqliteDatabase,
    id: &str,
    owner_id: &str,
    team_id: Option<&str>,
) -> ContentItem {
    db.content()
        .create(&make_content(id, owner_id, team_id))
        .await
        .expect("Create content should succeed")
}
