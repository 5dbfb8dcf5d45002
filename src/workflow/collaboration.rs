//! Collaboration request transitions and shared project membership.

use crate::db::{CollaborationRequest, CollaborationStatus, SharedProject};

use super::{WorkflowError, WorkflowResult};

/// Check that a new request is addressed to someone else.
pub fn validate_new_request(sender_id: &str, recipient_id: &str) -> WorkflowResult<()> {
    if sender_id == recipient_id {
        return Err(WorkflowError::validation(
            "cannot send a collaboration request to yourself",
        ));
    }
    Ok(())
}

/// Whether the user is the sender or the recipient.
pub fn is_party(request: &CollaborationRequest, user_id: &str) -> bool {
    request.sender_id == user_id || request.recipient_id == user_id
}

/// Validate a response to a pending request.
///
/// Only pending requests move. The recipient accepts or declines; the
/// sender cancels.
pub fn check_response(
    request: &CollaborationRequest,
    actor_id: &str,
    target: CollaborationStatus,
) -> WorkflowResult<()> {
    if !is_party(request, actor_id) {
        return Err(WorkflowError::forbidden(
            "only the sender or recipient can act on this request",
        ));
    }

    if request.status != CollaborationStatus::Pending {
        return Err(WorkflowError::InvalidTransition {
            entity: "collaboration request",
            from: request.status.to_string(),
            to: target.to_string(),
            reason: "request has already been resolved".to_string(),
        });
    }

    match target {
        CollaborationStatus::Accepted | CollaborationStatus::Declined
            if request.recipient_id != actor_id =>
        {
            Err(WorkflowError::forbidden(
                "only the recipient can accept or decline a request",
            ))
        }
        CollaborationStatus::Cancelled if request.sender_id != actor_id => Err(
            WorkflowError::forbidden("only the sender can cancel a request"),
        ),
        CollaborationStatus::Pending => Err(WorkflowError::InvalidTransition {
            entity: "collaboration request",
            from: request.status.to_string(),
            to: target.to_string(),
            reason: "request is already pending".to_string(),
        }),
        _ => Ok(()),
    }
}

/// Require that the user participates in the shared project.
pub fn require_participant(project: &SharedProject, user_id: &str) -> WorkflowResult<()> {
    if project.has_participant(user_id) {
        Ok(())
    } else {
        Err(WorkflowError::forbidden(
            "only the two collaborators can access this shared project",
        ))
    }
}

/// Shared project tasks can only be assigned to one of the two parties.
pub fn check_shared_assignee(project: &SharedProject, assignee_id: Option<&str>) -> WorkflowResult<()> {
    match assignee_id {
        Some(id) if !project.has_participant(id) => Err(WorkflowError::validation(format!(
            "assignee '{}' is not part of this shared project",
            id
        ))),
        _ => Ok(()),
    }
}
