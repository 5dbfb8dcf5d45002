//! Tests for SqliteSharedProjectRepository.

use super::test_support::{seed_users, setup_db};
use crate::db::{
    CollaborationRepository, CollaborationRequest, CollaborationStatus, Database, DbError,
    SharedProject, SharedProjectLink, SharedProjectRepository, SharedProjectStatus,
    SharedProjectTask, SqliteDatabase,
};

async fn setup() -> SqliteDatabase {
    let db = setup_db().await;
    seed_users(&db, &["alice001", "bob00001", "carol001"]).await;
    db.collaborations()
        .create(&CollaborationRequest {
            id: "req00001".to_string(),
            sender_id: "alice001".to_string(),
            recipient_id: "bob00001".to_string(),
            title: "Porto food tour".to_string(),
            message: None,
            status: CollaborationStatus::Accepted,
            created_at: String::new(),
            responded_at: None,
        })
        .await
        .expect("Create request should succeed");
    db
}

fn make_project(id: &str) -> SharedProject {
    SharedProject {
        id: id.to_string(),
        collaboration_request_id: "req00001".to_string(),
        title: "Porto food tour".to_string(),
        description: None,
        owner_id: "alice001".to_string(),
        partner_id: "bob00001".to_string(),
        status: SharedProjectStatus::Active,
        tasks: vec![],
        links: vec![],
        created_at: String::new(),
        updated_at: String::new(),
    }
}

fn make_task(id: &str, title: &str) -> SharedProjectTask {
    SharedProjectTask {
        id: id.to_string(),
        project_id: "proj0001".to_string(),
        title: title.to_string(),
        assignee_id: None,
        is_completed: false,
        due_date: None,
        created_at: String::new(),
        completed_at: None,
    }
}

#[tokio::test(flavor = "multi_thread")]
async fn project_create_or_get_is_idempotent() {
    let db = setup().await;
    let projects = db.shared_projects();

    let (first, created) = projects
        .create_or_get(&make_project("proj0001"))
        .await
        .expect("Create should succeed");
    assert!(created);
    assert_eq!(first.id, "proj0001");

    let (second, created) = projects
        .create_or_get(&make_project("proj0002"))
        .await
        .expect("Second create should succeed");
    assert!(!created);
    assert_eq!(second.id, "proj0001");

    let by_request = projects
        .get_by_request("req00001")
        .await
        .expect("Lookup should succeed");
    assert_eq!(by_request.map(|p| p.id), Some("proj0001".to_string()));
}

#[tokio::test(flavor = "multi_thread")]
async fn project_list_for_participants_only() {
    let db = setup().await;
    db.shared_projects()
        .create_or_get(&make_project("proj0001"))
        .await
        .expect("Create should succeed");

    for user in ["alice001", "bob00001"] {
        let list = db
            .shared_projects()
            .list_for_user(user)
            .await
            .expect("List should succeed");
        assert_eq!(list.len(), 1, "{} should see the project", user);
    }
    let outsider = db
        .shared_projects()
        .list_for_user("carol001")
        .await
        .expect("List should succeed");
    assert!(outsider.is_empty());
}

#[tokio::test(flavor = "multi_thread")]
async fn project_update_fields() {
    let db = setup().await;
    let (mut project, _) = db
        .shared_projects()
        .create_or_get(&make_project("proj0001"))
        .await
        .expect("Create should succeed");

    project.title = "Porto and Braga".to_string();
    project.status = SharedProjectStatus::Completed;
    db.shared_projects()
        .update(&project)
        .await
        .expect("Update should succeed");

    let retrieved = db
        .shared_projects()
        .get("proj0001")
        .await
        .expect("Get should succeed");
    assert_eq!(retrieved.title, "Porto and Braga");
    assert_eq!(retrieved.status, SharedProjectStatus::Completed);

    assert!(matches!(
        db.shared_projects().update(&make_project("nonexist")).await,
        Err(DbError::NotFound { .. })
    ));
}

#[tokio::test(flavor = "multi_thread")]
async fn project_tasks_and_links_are_hydrated() {
    let db = setup().await;
    let projects = db.shared_projects();
    projects
        .create_or_get(&make_project("proj0001"))
        .await
        .expect("Create should succeed");

    projects
        .add_task(&make_task("sptask01", "Scout locations"))
        .await
        .expect("Add task should succeed");
    let mut second = make_task("sptask02", "Book tables");
    second.assignee_id = Some("bob00001".to_string());
    projects.add_task(&second).await.expect("Add task should succeed");

    projects
        .add_link(&SharedProjectLink {
            id: "link0001".to_string(),
            project_id: "proj0001".to_string(),
            url: "https://example.com/shotlist".to_string(),
            label: Some("Shot list".to_string()),
            added_by: "alice001".to_string(),
            created_at: String::new(),
        })
        .await
        .expect("Add link should succeed");

    let project = projects.get("proj0001").await.expect("Get should succeed");
    let titles: Vec<&str> = project.tasks.iter().map(|t| t.title.as_str()).collect();
    assert_eq!(titles, vec!["Scout locations", "Book tables"]);
    assert_eq!(project.links.len(), 1);
    assert_eq!(project.links[0].label.as_deref(), Some("Shot list"));
}

#[tokio::test(flavor = "multi_thread")]
async fn project_task_update_and_delete_scoped() {
    let db = setup().await;
    let projects = db.shared_projects();
    projects
        .create_or_get(&make_project("proj0001"))
        .await
        .expect("Create should succeed");

    let mut task = projects
        .add_task(&make_task("sptask01", "Edit"))
        .await
        .expect("Add task should succeed");
    task.is_completed = true;
    task.completed_at = Some("2025-02-02 00:00:00".to_string());
    projects.update_task(&task).await.expect("Update should succeed");

    let retrieved = projects
        .get_task("proj0001", "sptask01")
        .await
        .expect("Get task should succeed");
    assert!(retrieved.is_completed);
    assert_eq!(retrieved.completed_at.as_deref(), Some("2025-02-02 00:00:00"));

    // Wrong project scope
    assert!(matches!(
        projects.get_task("otherprj", "sptask01").await,
        Err(DbError::NotFound { .. })
    ));
    assert!(matches!(
        projects.delete_task("otherprj", "sptask01").await,
        Err(DbError::NotFound { .. })
    ));

    projects
        .delete_task("proj0001", "sptask01")
        .await
        .expect("Delete should succeed");
    assert!(matches!(
        projects.get_task("proj0001", "sptask01").await,
        Err(DbError::NotFound { .. })
    ));
}

#[tokio::test(flavor = "multi_thread")]
async fn project_link_delete() {
    let db = setup().await;
    let projects = db.shared_projects();
    projects
        .create_or_get(&make_project("proj0001"))
        .await
        .expect("Create should succeed");

    projects
        .add_link(&SharedProjectLink {
            id: "link0001".to_string(),
            project_id: "proj0001".to_string(),
            url: "https://example.com/a".to_string(),
            label: None,
            added_by: "bob00001".to_string(),
            created_at: String::new(),
        })
        .await
        .expect("Add link should succeed");

    projects
        .delete_link("proj0001", "link0001")
        .await
        .expect("Delete should succeed");
    assert!(matches!(
        projects.delete_link("proj0001", "link0001").await,
        Err(DbError::NotFound { .. })
    ));

    let project = projects.get("proj0001").await.expect("Get should succeed");
    assert!(project.links.is_empty());
}
