//! Tests for SqliteTeamRepository.

use super::test_support::{make_team, seed_content, seed_team, seed_users, setup_db};
use crate::db::{
    ApprovalRecord, ApprovalRepository, ApprovalStatus, AssignmentRepository, AssignmentStatus,
    ContentRepository, Database, DbError, TaskAssignment, TeamMember, TeamRepository, TeamRole,
};

fn member(team_id: &str, user_id: &str, role: TeamRole) -> TeamMember {
    TeamMember {
        team_id: team_id.to_string(),
        user_id: user_id.to_string(),
        role,
        joined_at: String::new(),
    }
}

#[tokio::test(flavor = "multi_thread")]
async fn team_create_registers_owner() {
    let db = setup_db().await;
    seed_users(&db, &["owner001"]).await;

    let team = seed_team(&db, "team0001", "owner001").await;
    assert_eq!(team.owner_id, "owner001");

    let owner = db
        .teams()
        .get_member("team0001", "owner001")
        .await
        .expect("Get member should succeed")
        .expect("Owner should be a member");
    assert_eq!(owner.role, TeamRole::Owner);
}

#[tokio::test(flavor = "multi_thread")]
async fn team_create_rolls_back_with_unknown_owner() {
    let db = setup_db().await;

    let result = db.teams().create(&make_team("team0001", "ghost001")).await;
    assert!(matches!(result, Err(DbError::Constraint { .. })));
    assert!(matches!(
        db.teams().get("team0001").await,
        Err(DbError::NotFound { .. })
    ));
}

#[tokio::test(flavor = "multi_thread")]
async fn team_update_workflow_settings() {
    let db = setup_db().await;
    seed_users(&db, &["owner001", "user0002"]).await;
    let mut team = seed_team(&db, "team0001", "owner001").await;

    team.approval_required = true;
    team.approver_ids = vec!["user0002".to_string(), "owner001".to_string()];
    team.description = Some("Weekly travel vlogs".to_string());
    db.teams().update(&team).await.expect("Update should succeed");

    let retrieved = db.teams().get("team0001").await.expect("Get should succeed");
    assert!(retrieved.approval_required);
    assert_eq!(retrieved.approver_ids, vec!["user0002", "owner001"]);
    assert_eq!(retrieved.description.as_deref(), Some("Weekly travel vlogs"));
}

#[tokio::test(flavor = "multi_thread")]
async fn team_members_listed_owner_first() {
    let db = setup_db().await;
    seed_users(&db, &["owner001", "admin001", "user0002"]).await;
    seed_team(&db, "team0001", "owner001").await;
    let teams = db.teams();

    teams
        .add_member(&member("team0001", "user0002", TeamRole::Member))
        .await
        .expect("Add member should succeed");
    teams
        .add_member(&member("team0001", "admin001", TeamRole::Admin))
        .await
        .expect("Add admin should succeed");

    let members = teams
        .list_members("team0001")
        .await
        .expect("List should succeed");
    let order: Vec<(&str, TeamRole)> = members
        .iter()
        .map(|m| (m.user_id.as_str(), m.role))
        .collect();
    assert_eq!(
        order,
        vec![
            ("owner001", TeamRole::Owner),
            ("admin001", TeamRole::Admin),
            ("user0002", TeamRole::Member),
        ]
    );
}

#[tokio::test(flavor = "multi_thread")]
async fn team_add_member_twice_conflicts() {
    let db = setup_db().await;
    seed_users(&db, &["owner001", "user0002"]).await;
    seed_team(&db, "team0001", "owner001").await;

    db.teams()
        .add_member(&member("team0001", "user0002", TeamRole::Member))
        .await
        .expect("Add member should succeed");

    let result = db
        .teams()
        .add_member(&member("team0001", "user0002", TeamRole::Admin))
        .await;
    assert!(matches!(result, Err(DbError::AlreadyExists { .. })));
}

#[tokio::test(flavor = "multi_thread")]
async fn team_list_for_user() {
    let db = setup_db().await;
    seed_users(&db, &["owner001", "user0002"]).await;
    seed_team(&db, "team0001", "owner001").await;
    seed_team(&db, "team0002", "user0002").await;
    db.teams()
        .add_member(&member("team0002", "owner001", TeamRole::Member))
        .await
        .expect("Add member should succeed");

    let mine = db
        .teams()
        .list_for_user("owner001")
        .await
        .expect("List should succeed");
    assert_eq!(mine.len(), 2);

    let theirs = db
        .teams()
        .list_for_user("user0002")
        .await
        .expect("List should succeed");
    assert_eq!(theirs.len(), 1);
    assert_eq!(theirs[0].id, "team0002");
}

#[tokio::test(flavor = "multi_thread")]
async fn team_role_update_and_missing_member() {
    let db = setup_db().await;
    seed_users(&db, &["owner001", "user0002"]).await;
    seed_team(&db, "team0001", "owner001").await;
    let teams = db.teams();

    teams
        .add_member(&member("team0001", "user0002", TeamRole::Member))
        .await
        .expect("Add member should succeed");
    teams
        .update_member_role("team0001", "user0002", TeamRole::Admin)
        .await
        .expect("Role update should succeed");

    let updated = teams
        .get_member("team0001", "user0002")
        .await
        .expect("Get member should succeed")
        .expect("Member should exist");
    assert_eq!(updated.role, TeamRole::Admin);

    assert!(matches!(
        teams
            .update_member_role("team0001", "nobody01", TeamRole::Admin)
            .await,
        Err(DbError::NotFound { .. })
    ));
}

#[tokio::test(flavor = "multi_thread")]
async fn team_remove_member_prunes_approvers() {
    let db = setup_db().await;
    seed_users(&db, &["owner001", "user0002", "user0003"]).await;
    let mut team = seed_team(&db, "team0001", "owner001").await;
    let teams = db.teams();

    for id in ["user0002", "user0003"] {
        teams
            .add_member(&member("team0001", id, TeamRole::Member))
            .await
            .expect("Add member should succeed");
    }
    team.approver_ids = vec!["user0002".to_string(), "user0003".to_string()];
    teams.update(&team).await.expect("Update should succeed");

    teams
        .remove_member("team0001", "user0002")
        .await
        .expect("Remove should succeed");

    assert!(
        teams
            .get_member("team0001", "user0002")
            .await
            .expect("Get member should succeed")
            .is_none()
    );
    let retrieved = teams.get("team0001").await.expect("Get should succeed");
    assert_eq!(retrieved.approver_ids, vec!["user0003"]);

    assert!(matches!(
        teams.remove_member("team0001", "user0002").await,
        Err(DbError::NotFound { .. })
    ));
}

#[tokio::test(flavor = "multi_thread")]
async fn team_delete_cascades_memberships() {
    let db = setup_db().await;
    seed_users(&db, &["owner001"]).await;
    seed_team(&db, "team0001", "owner001").await;

    db.teams().delete("team0001").await.expect("Delete should succeed");

    let members = db
        .teams()
        .list_members("team0001")
        .await
        .expect("List should succeed");
    assert!(members.is_empty());
    assert!(matches!(
        db.teams().delete("team0001").await,
        Err(DbError::NotFound { .. })
    ));
}

#[tokio::test(flavor = "multi_thread")]
async fn team_delete_detaches_content_and_drops_team_work() {
    let db = setup_db().await;
    seed_users(&db, &["owner001"]).await;
    seed_team(&db, "team0001", "owner001").await;
    seed_content(&db, "cont0001", "owner001", Some("team0001")).await;

    db.assignments()
        .create(&TaskAssignment {
            id: "task0001".to_string(),
            team_id: "team0001".to_string(),
            content_id: Some("cont0001".to_string()),
            title: "Cut the intro".to_string(),
            description: None,
            assignee_id: "owner001".to_string(),
            created_by: "owner001".to_string(),
            status: AssignmentStatus::NotStarted,
            priority: None,
            due_date: None,
            created_at: String::new(),
            updated_at: String::new(),
            started_at: None,
            completed_at: None,
        })
        .await
        .expect("Create task should succeed");
    db.approvals()
        .create(&ApprovalRecord {
            id: "appr0001".to_string(),
            content_id: "cont0001".to_string(),
            team_id: "team0001".to_string(),
            submitted_by: "owner001".to_string(),
            note: None,
            status: ApprovalStatus::Pending,
            decided_by: None,
            feedback: None,
            created_at: String::new(),
            decided_at: None,
        })
        .await
        .expect("Create approval should succeed");

    db.teams().delete("team0001").await.expect("Delete should succeed");

    let item = db.content().get("cont0001").await.expect("Content should survive");
    assert!(item.team_id.is_none());
    assert!(matches!(
        db.assignments().get("task0001").await,
        Err(DbError::NotFound { .. })
    ));
    assert!(matches!(
        db.approvals().get("appr0001").await,
        Err(DbError::NotFound { .. })
    ));
}
