use crate::db::{CollaborationRequest, CollaborationStatus, SharedProject, SharedProjectStatus};
use crate::workflow::WorkflowError;
use crate::workflow::collaboration::*;

fn request(status: CollaborationStatus) -> CollaborationRequest {
    CollaborationRequest {
        id: "req00001".to_string(),
        sender_id: "sender01".to_string(),
        recipient_id: "recip001".to_string(),
        title: "Joint vlog in Tokyo".to_string(),
        message: None,
        status,
        created_at: "2025-01-01 00:00:00".to_string(),
        responded_at: None,
    }
}

fn project() -> SharedProject {
    SharedProject {
        id: "proj0001".to_string(),
        collaboration_request_id: "req00001".to_string(),
        title: "Joint vlog in Tokyo".to_string(),
        description: None,
        owner_id: "sender01".to_string(),
        partner_id: "recip001".to_string(),
        status: SharedProjectStatus::Active,
        tasks: vec![],
        links: vec![],
        created_at: "2025-01-01 00:00:00".to_string(),
        updated_at: "2025-01-01 00:00:00".to_string(),
    }
}

#[test]
fn test_validate_new_request() {
    assert!(validate_new_request("sender01", "recip001").is_ok());
    assert!(matches!(
        validate_new_request("sender01", "sender01"),
        Err(WorkflowError::Validation { .. })
    ));
}

#[test]
fn test_recipient_accepts_or_declines() {
    let pending = request(CollaborationStatus::Pending);
    assert!(check_response(&pending, "recip001", CollaborationStatus::Accepted).is_ok());
    assert!(check_response(&pending, "recip001", CollaborationStatus::Declined).is_ok());

    assert!(matches!(
        check_response(&pending, "sender01", CollaborationStatus::Accepted),
        Err(WorkflowError::Forbidden { .. })
    ));
    assert!(matches!(
        check_response(&pending, "recip001", CollaborationStatus::Cancelled),
        Err(WorkflowError::Forbidden { .. })
    ));
}

#[test]
fn test_sender_cancels() {
    let pending = request(CollaborationStatus::Pending);
    assert!(check_response(&pending, "sender01", CollaborationStatus::Cancelled).is_ok());
    assert!(matches!(
        check_response(&pending, "stranger", CollaborationStatus::Cancelled),
        Err(WorkflowError::Forbidden { .. })
    ));
}

#[test]
fn test_resolved_requests_do_not_move() {
    for status in [
        CollaborationStatus::Accepted,
        CollaborationStatus::Declined,
        CollaborationStatus::Cancelled,
    ] {
        let resolved = request(status);
        let result = check_response(&resolved, "recip001", CollaborationStatus::Declined);
        assert!(
            matches!(result, Err(WorkflowError::InvalidTransition { .. })),
            "{} request should not move",
            status
        );
    }
}

#[test]
fn test_shared_project_participants() {
    let p = project();
    assert!(require_participant(&p, "sender01").is_ok());
    assert!(require_participant(&p, "recip001").is_ok());
    assert!(require_participant(&p, "stranger").is_err());

    assert!(check_shared_assignee(&p, None).is_ok());
    assert!(check_shared_assignee(&p, Some("recip001")).is_ok());
    assert!(matches!(
        check_shared_assignee(&p, Some("stranger")),
        Err(WorkflowError::Validation { .. })
    ));
}
