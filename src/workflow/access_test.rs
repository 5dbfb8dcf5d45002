use crate::db::{ContentItem, ContentStatus, TaskAssignment, Team, TeamMember, TeamRole};
use crate::workflow::WorkflowError;
use crate::workflow::access::*;

fn team(approver_ids: &[&str]) -> Team {
    Team {
        id: "team0001".to_string(),
        name: "Travel Crew".to_string(),
        description: None,
        owner_id: "owner001".to_string(),
        approval_required: true,
        approver_ids: approver_ids.iter().map(|s| s.to_string()).collect(),
        created_at: "2025-01-01 00:00:00".to_string(),
        updated_at: "2025-01-01 00:00:00".to_string(),
    }
}

fn member(user_id: &str, role: TeamRole) -> TeamMember {
    TeamMember {
        team_id: "team0001".to_string(),
        user_id: user_id.to_string(),
        role,
        joined_at: "2025-01-01 00:00:00".to_string(),
    }
}

fn content(owner_id: &str, team_id: Option<&str>) -> ContentItem {
    ContentItem {
        id: "cont0001".to_string(),
        owner_id: owner_id.to_string(),
        team_id: team_id.map(String::from),
        title: "Lisbon in 48 hours".to_string(),
        description: None,
        notes: None,
        platform: None,
        tags: vec![],
        status: ContentStatus::Idea,
        scheduled_at: None,
        published_at: None,
        deleted_at: None,
        created_at: "2025-01-01 00:00:00".to_string(),
        updated_at: "2025-01-01 00:00:00".to_string(),
    }
}

fn task(created_by: &str, assignee_id: &str) -> TaskAssignment {
    TaskAssignment {
        id: "task0001".to_string(),
        team_id: "team0001".to_string(),
        content_id: None,
        title: "Edit b-roll".to_string(),
        description: None,
        assignee_id: assignee_id.to_string(),
        created_by: created_by.to_string(),
        status: Default::default(),
        priority: None,
        due_date: None,
        created_at: "2025-01-01 00:00:00".to_string(),
        updated_at: "2025-01-01 00:00:00".to_string(),
        started_at: None,
        completed_at: None,
    }
}

fn is_forbidden<T: std::fmt::Debug>(result: Result<T, WorkflowError>) -> bool {
    matches!(result, Err(WorkflowError::Forbidden { .. }))
}

fn is_validation<T: std::fmt::Debug>(result: Result<T, WorkflowError>) -> bool {
    matches!(result, Err(WorkflowError::Validation { .. }))
}

#[test]
fn test_require_member_and_admin() {
    assert_eq!(
        require_member(Some(TeamRole::Member), "view").unwrap(),
        TeamRole::Member
    );
    assert!(is_forbidden(require_member(None, "view")));

    assert!(require_admin(Some(TeamRole::Owner), "edit").is_ok());
    assert!(require_admin(Some(TeamRole::Admin), "edit").is_ok());
    assert!(is_forbidden(require_admin(Some(TeamRole::Member), "edit")));
    assert!(is_forbidden(require_admin(None, "edit")));

    assert!(require_owner(Some(TeamRole::Owner), "delete").is_ok());
    assert!(is_forbidden(require_owner(Some(TeamRole::Admin), "delete")));
}

#[test]
fn test_member_addition_rules() {
    assert!(check_member_addition(Some(TeamRole::Owner), TeamRole::Admin).is_ok());
    assert!(check_member_addition(Some(TeamRole::Admin), TeamRole::Member).is_ok());

    // Only the owner grants admin
    assert!(is_forbidden(check_member_addition(
        Some(TeamRole::Admin),
        TeamRole::Admin
    )));
    assert!(is_forbidden(check_member_addition(
        Some(TeamRole::Member),
        TeamRole::Member
    )));
    assert!(is_validation(check_member_addition(
        Some(TeamRole::Owner),
        TeamRole::Owner
    )));
}

#[test]
fn test_role_change_rules() {
    assert!(check_role_change(Some(TeamRole::Owner), TeamRole::Member, TeamRole::Admin).is_ok());
    assert!(check_role_change(Some(TeamRole::Owner), TeamRole::Admin, TeamRole::Member).is_ok());

    assert!(is_forbidden(check_role_change(
        Some(TeamRole::Owner),
        TeamRole::Owner,
        TeamRole::Member
    )));
    assert!(is_validation(check_role_change(
        Some(TeamRole::Owner),
        TeamRole::Member,
        TeamRole::Owner
    )));
    assert!(is_forbidden(check_role_change(
        Some(TeamRole::Admin),
        TeamRole::Member,
        TeamRole::Admin
    )));
    assert!(is_forbidden(check_role_change(
        Some(TeamRole::Admin),
        TeamRole::Admin,
        TeamRole::Member
    )));
    assert!(is_forbidden(check_role_change(
        Some(TeamRole::Member),
        TeamRole::Member,
        TeamRole::Member
    )));
}

#[test]
fn test_member_removal_rules() {
    // Owner is never removable, not even by themselves
    assert!(is_forbidden(check_member_removal(
        "owner001",
        Some(TeamRole::Owner),
        "owner001",
        TeamRole::Owner
    )));

    // Anyone else may leave
    assert!(check_member_removal("user0002", Some(TeamRole::Member), "user0002", TeamRole::Member).is_ok());
    assert!(check_member_removal("admin001", Some(TeamRole::Admin), "admin001", TeamRole::Admin).is_ok());

    // Admins remove members but not other admins
    assert!(check_member_removal("admin001", Some(TeamRole::Admin), "user0002", TeamRole::Member).is_ok());
    assert!(is_forbidden(check_member_removal(
        "admin001",
        Some(TeamRole::Admin),
        "admin002",
        TeamRole::Admin
    )));
    assert!(check_member_removal("owner001", Some(TeamRole::Owner), "admin002", TeamRole::Admin).is_ok());

    // Members remove nobody else
    assert!(is_forbidden(check_member_removal(
        "user0002",
        Some(TeamRole::Member),
        "user0003",
        TeamRole::Member
    )));
}

#[test]
fn test_content_visibility() {
    let personal = content("user0001", None);
    assert!(can_view_content(&personal, "user0001", None));
    assert!(!can_view_content(&personal, "user0002", None));
    assert!(can_modify_content(&personal, "user0001", None));
    assert!(!can_modify_content(&personal, "user0002", None));

    let shared = content("user0001", Some("team0001"));
    assert!(can_view_content(&shared, "user0002", Some(TeamRole::Member)));
    assert!(!can_view_content(&shared, "user0003", None));
    assert!(!can_modify_content(&shared, "user0002", Some(TeamRole::Member)));
    assert!(can_modify_content(&shared, "admin001", Some(TeamRole::Admin)));
}

#[test]
fn test_assignment_permissions() {
    let t = task("creator1", "assign01");

    assert!(can_modify_assignment(&t, "creator1", Some(TeamRole::Member)));
    assert!(can_modify_assignment(&t, "assign01", Some(TeamRole::Member)));
    assert!(can_modify_assignment(&t, "admin001", Some(TeamRole::Admin)));
    assert!(!can_modify_assignment(&t, "other001", Some(TeamRole::Member)));
    // Former members lose access even to their own tasks
    assert!(!can_modify_assignment(&t, "creator1", None));

    assert!(can_delete_assignment(&t, "creator1", Some(TeamRole::Member)));
    assert!(can_delete_assignment(&t, "owner001", Some(TeamRole::Owner)));
    assert!(!can_delete_assignment(&t, "assign01", Some(TeamRole::Member)));
}

#[test]
fn test_can_approve_without_explicit_approvers() {
    let t = team(&[]);
    assert!(can_approve(&t, "owner001", Some(TeamRole::Owner)));
    assert!(can_approve(&t, "admin001", Some(TeamRole::Admin)));
    assert!(!can_approve(&t, "user0002", Some(TeamRole::Member)));
    assert!(!can_approve(&t, "stranger", None));
}

#[test]
fn test_can_approve_with_explicit_approvers() {
    let t = team(&["user0002"]);
    assert!(can_approve(&t, "user0002", Some(TeamRole::Member)));
    // Listed approvers replace the admin default
    assert!(!can_approve(&t, "owner001", Some(TeamRole::Owner)));
    // Non-members never approve
    assert!(!can_approve(&t, "user0002", None));
}

#[test]
fn test_normalize_approvers() {
    let members = vec![
        member("owner001", TeamRole::Owner),
        member("user0002", TeamRole::Member),
        member("user0003", TeamRole::Member),
    ];

    let ids: Vec<String> = ["user0003", "user0002", "user0003", " ", "user0002"]
        .iter()
        .map(|s| s.to_string())
        .collect();
    assert_eq!(
        normalize_approvers(&ids, &members).unwrap(),
        vec!["user0003".to_string(), "user0002".to_string()]
    );

    assert!(normalize_approvers(&[], &members).unwrap().is_empty());

    let outsider = vec!["user0009".to_string()];
    let err = normalize_approvers(&outsider, &members).unwrap_err();
    assert!(err.to_string().contains("user0009"));
}
