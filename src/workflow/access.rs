//! Access-control predicates.
//!
//! A caller's standing in a team is expressed as `Option<TeamRole>`:
//! `None` means "not a member".

use crate::db::{ContentItem, Id, TaskAssignment, Team, TeamMember, TeamRole};

use super::{WorkflowError, WorkflowResult};

/// Require team membership of any role.
pub fn require_member(role: Option<TeamRole>, action: &str) -> WorkflowResult<TeamRole> {
    role.ok_or_else(|| WorkflowError::forbidden(format!("only team members can {}", action)))
}

/// Require the admin or owner role.
pub fn require_admin(role: Option<TeamRole>, action: &str) -> WorkflowResult<TeamRole> {
    match role {
        Some(role) if role.is_admin() => Ok(role),
        _ => Err(WorkflowError::forbidden(format!(
            "only team admins can {}",
            action
        ))),
    }
}

/// Require the owner role.
pub fn require_owner(role: Option<TeamRole>, action: &str) -> WorkflowResult<()> {
    match role {
        Some(TeamRole::Owner) => Ok(()),
        _ => Err(WorkflowError::forbidden(format!(
            "only the team owner can {}",
            action
        ))),
    }
}

/// Admins add members or admins; nobody can be added as owner.
pub fn check_member_addition(actor: Option<TeamRole>, new_role: TeamRole) -> WorkflowResult<()> {
    let actor = require_admin(actor, "add members")?;
    match new_role {
        TeamRole::Owner => Err(WorkflowError::validation(
            "a team has exactly one owner; add the user as admin or member",
        )),
        TeamRole::Admin if actor != TeamRole::Owner => Err(WorkflowError::forbidden(
            "only the team owner can grant the admin role",
        )),
        _ => Ok(()),
    }
}

/// Role changes: the owner's role is fixed, and only the owner grants or
/// revokes admin.
pub fn check_role_change(
    actor: Option<TeamRole>,
    current: TeamRole,
    new_role: TeamRole,
) -> WorkflowResult<()> {
    let actor = require_admin(actor, "change member roles")?;

    if current == TeamRole::Owner {
        return Err(WorkflowError::forbidden("the owner's role cannot be changed"));
    }
    if new_role == TeamRole::Owner {
        return Err(WorkflowError::validation("the owner role cannot be granted"));
    }
    if (current == TeamRole::Admin || new_role == TeamRole::Admin) && actor != TeamRole::Owner {
        return Err(WorkflowError::forbidden(
            "only the team owner can grant or revoke the admin role",
        ));
    }

    Ok(())
}

/// Removal: anyone but the owner may leave; admins remove members; only
/// the owner removes admins.
pub fn check_member_removal(
    actor_id: &str,
    actor: Option<TeamRole>,
    target_id: &str,
    target: TeamRole,
) -> WorkflowResult<()> {
    if target == TeamRole::Owner {
        return Err(WorkflowError::forbidden("the team owner cannot be removed"));
    }
    if actor_id == target_id {
        return Ok(());
    }

    let actor = require_admin(actor, "remove members")?;
    if target == TeamRole::Admin && actor != TeamRole::Owner {
        return Err(WorkflowError::forbidden(
            "only the team owner can remove an admin",
        ));
    }

    Ok(())
}

/// Owners read their content; team members read team content.
pub fn can_view_content(item: &ContentItem, user_id: &str, team_role: Option<TeamRole>) -> bool {
    item.owner_id == user_id || (item.team_id.is_some() && team_role.is_some())
}

/// Owners modify their content; team admins modify team content.
pub fn can_modify_content(item: &ContentItem, user_id: &str, team_role: Option<TeamRole>) -> bool {
    item.owner_id == user_id
        || (item.team_id.is_some() && team_role.is_some_and(|r| r.is_admin()))
}

/// A task may be modified by its creator, its assignee, or a team admin.
pub fn can_modify_assignment(
    task: &TaskAssignment,
    user_id: &str,
    team_role: Option<TeamRole>,
) -> bool {
    if team_role.is_none() {
        return false;
    }
    task.created_by == user_id
        || task.assignee_id == user_id
        || team_role.is_some_and(|r| r.is_admin())
}

/// A task may be deleted by its creator or a team admin.
pub fn can_delete_assignment(
    task: &TaskAssignment,
    user_id: &str,
    team_role: Option<TeamRole>,
) -> bool {
    if team_role.is_none() {
        return false;
    }
    task.created_by == user_id || team_role.is_some_and(|r| r.is_admin())
}

/// Approver resolution.
///
/// With an empty approver list any admin or owner may approve; otherwise
/// only listed users who are still members.
pub fn can_approve(team: &Team, user_id: &str, team_role: Option<TeamRole>) -> bool {
    match team_role {
        None => false,
        Some(role) if team.approver_ids.is_empty() => role.is_admin(),
        Some(_) => team.approver_ids.iter().any(|id| id == user_id),
    }
}

/// Deduplicate an approver list (keeping first occurrence) and check that
/// every approver is a member of the team.
pub fn normalize_approvers(approver_ids: &[Id], members: &[TeamMember]) -> WorkflowResult<Vec<Id>> {
    let mut normalized: Vec<Id> = Vec::with_capacity(approver_ids.len());

    for id in approver_ids {
        let id = id.trim();
        if id.is_empty() || normalized.iter().any(|existing| existing == id) {
            continue;
        }
        if !members.iter().any(|m| m.user_id == id) {
            return Err(WorkflowError::validation(format!(
                "approver '{}' is not a member of this team",
                id
            )));
        }
        normalized.push(id.to_string());
    }

    Ok(normalized)
}
