//! Team approval workflow settings.

use axum::{
    Json,
    extract::{Path, State},
};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};
use utoipa::ToSchema;

use super::team_role;
use super::teams::load_team_as_member;
use crate::api::notifier::UpdateMessage;
use crate::api::{ApiError, AppState, CurrentUser, ErrorResponse, Validate, ValidatedJson};
use crate::db::{Database, Team, TeamRepository};
use crate::workflow::access;

const MAX_APPROVERS: usize = 50;

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct WorkflowResponse {
    pub team_id: String,
    /// Content must be approved before it is scheduled or published
    pub approval_required: bool,
    /// Users allowed to approve; empty means any admin or the owner
    pub approver_ids: Vec<String>,
}

impl From<Team> for WorkflowResponse {
    fn from(t: Team) -> Self {
        Self {
            team_id: t.id,
            approval_required: t.approval_required,
            approver_ids: t.approver_ids,
        }
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateWorkflowRequest {
    pub approval_required: bool,
    #[serde(default)]
    pub approver_ids: Vec<String>,
}

impl Validate for UpdateWorkflowRequest {
    fn validate(&self) -> Result<(), ApiError> {
        if self.approver_ids.len() > MAX_APPROVERS {
            return Err(ApiError::validation(format!(
                "at most {} approvers are allowed",
                MAX_APPROVERS
            )));
        }
        Ok(())
    }
}

/// Get a team's approval workflow
#[utoipa::path(
    get,
    path = "/api/v1/teams/{id}/workflow",
    tag = "teams",
    params(("id" = String, Path, description = "Team ID")),
    responses(
        (status = 200, description = "Workflow settings", body = WorkflowResponse),
        (status = 403, description = "Not a member", body = ErrorResponse),
        (status = 404, description = "Team not found", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn get_workflow<D: Database>(
    State(state): State<AppState<D>>,
    user: CurrentUser,
    Path(id): Path<String>,
) -> Result<Json<WorkflowResponse>, ApiError> {
    let (team, _) = load_team_as_member(&state, &id, user.id(), "view the workflow").await?;
    Ok(Json(WorkflowResponse::from(team)))
}

/// Replace a team's approval workflow
///
/// Approvers must be members of the team; duplicates are dropped.
#[utoipa::path(
    put,
    path = "/api/v1/teams/{id}/workflow",
    tag = "teams",
    params(("id" = String, Path, description = "Team ID")),
    request_body = UpdateWorkflowRequest,
    responses(
        (status = 200, description = "Workflow updated", body = WorkflowResponse),
        (status = 400, description = "Approver is not a member", body = ErrorResponse),
        (status = 403, description = "Not an admin", body = ErrorResponse),
        (status = 404, description = "Team not found", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn update_workflow<D: Database>(
    State(state): State<AppState<D>>,
    user: CurrentUser,
    Path(id): Path<String>,
    ValidatedJson(req): ValidatedJson<UpdateWorkflowRequest>,
) -> Result<Json<WorkflowResponse>, ApiError> {
    let mut team = state.db().teams().get(&id).await?;
    access::require_admin(
        team_role(state.db(), &id, user.id()).await?,
        "change the approval workflow",
    )?;

    let members = state.db().teams().list_members(&id).await?;
    team.approver_ids = access::normalize_approvers(&req.approver_ids, &members)?;
    team.approval_required = req.approval_required;

    state.db().teams().update(&team).await?;
    info!(
        team_id = %id,
        approval_required = team.approval_required,
        approvers = team.approver_ids.len(),
        "workflow updated"
    );

    state.notifier().notify(UpdateMessage::TeamUpdated {
        team_id: id.clone(),
    });

    Ok(Json(WorkflowResponse::from(team)))
}
