//! Team and membership handlers.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};
use utoipa::ToSchema;

use super::team_role;
use crate::api::notifier::UpdateMessage;
use crate::api::validation::{optional_text, parse_enum, require_text};
use crate::api::{ApiError, AppState, CurrentUser, ErrorResponse, Validate, ValidatedJson};
use crate::db::{Database, Team, TeamMember, TeamRepository, TeamRole, UserRepository};
use crate::workflow::access;

const MAX_TEAM_NAME_LEN: usize = 100;
const MAX_TEAM_DESCRIPTION_LEN: usize = 1000;

// =============================================================================
// DTOs
// =============================================================================

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct TeamResponse {
    #[schema(example = "b2c3d4e5")]
    pub id: String,
    #[schema(example = "Weekend Wanderers")]
    pub name: String,
    pub description: Option<String>,
    pub owner_id: String,
    pub approval_required: bool,
    pub approver_ids: Vec<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl From<Team> for TeamResponse {
    fn from(t: Team) -> Self {
        Self {
            id: t.id,
            name: t.name,
            description: t.description,
            owner_id: t.owner_id,
            approval_required: t.approval_required,
            approver_ids: t.approver_ids,
            created_at: t.created_at,
            updated_at: t.updated_at,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct MemberResponse {
    pub team_id: String,
    pub user_id: String,
    #[schema(example = "member")]
    pub role: String,
    pub joined_at: String,
}

impl From<TeamMember> for MemberResponse {
    fn from(m: TeamMember) -> Self {
        Self {
            team_id: m.team_id,
            user_id: m.user_id,
            role: m.role.to_string(),
            joined_at: m.joined_at,
        }
    }
}

/// A team with its roster
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct TeamDetailResponse {
    #[serde(flatten)]
    pub team: TeamResponse,
    pub members: Vec<MemberResponse>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateTeamRequest {
    #[schema(example = "Weekend Wanderers")]
    pub name: String,
    pub description: Option<String>,
}

impl Validate for CreateTeamRequest {
    fn validate(&self) -> Result<(), ApiError> {
        require_text("name", &self.name, MAX_TEAM_NAME_LEN)?;
        optional_text(
            "description",
            self.description.as_deref(),
            MAX_TEAM_DESCRIPTION_LEN,
        )
    }
}

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct UpdateTeamRequest {
    pub name: Option<String>,
    pub description: Option<String>,
}

impl Validate for UpdateTeamRequest {
    fn validate(&self) -> Result<(), ApiError> {
        if let Some(name) = &self.name {
            require_text("name", name, MAX_TEAM_NAME_LEN)?;
        }
        optional_text(
            "description",
            self.description.as_deref(),
            MAX_TEAM_DESCRIPTION_LEN,
        )
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct AddMemberRequest {
    pub user_id: String,
    /// `admin` or `member` (default)
    #[schema(example = "member")]
    pub role: Option<String>,
}

impl Validate for AddMemberRequest {
    fn validate(&self) -> Result<(), ApiError> {
        require_text("user_id", &self.user_id, 64)?;
        parse_enum::<TeamRole>(self.role.as_deref())?;
        Ok(())
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateMemberRequest {
    #[schema(example = "admin")]
    pub role: String,
}

impl Validate for UpdateMemberRequest {
    fn validate(&self) -> Result<(), ApiError> {
        parse_enum::<TeamRole>(Some(&self.role))?;
        Ok(())
    }
}

/// Load a team the caller belongs to, with the caller's role.
pub(crate) async fn load_team_as_member<D: Database>(
    state: &AppState<D>,
    team_id: &str,
    user_id: &str,
    action: &str,
) -> Result<(Team, TeamRole), ApiError> {
    let team = state.db().teams().get(team_id).await?;
    let role = access::require_member(team_role(state.db(), team_id, user_id).await?, action)?;
    Ok((team, role))
}

async fn team_detail<D: Database>(
    state: &AppState<D>,
    team: Team,
) -> Result<TeamDetailResponse, ApiError> {
    let members = state.db().teams().list_members(&team.id).await?;
    Ok(TeamDetailResponse {
        team: TeamResponse::from(team),
        members: members.into_iter().map(MemberResponse::from).collect(),
    })
}

// =============================================================================
// Handlers
// =============================================================================

/// Create a team
///
/// The caller becomes the team's owner.
#[utoipa::path(
    post,
    path = "/api/v1/teams",
    tag = "teams",
    request_body = CreateTeamRequest,
    responses(
        (status = 201, description = "Team created", body = TeamDetailResponse),
        (status = 400, description = "Invalid request", body = ErrorResponse),
        (status = 401, description = "Unknown caller", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn create_team<D: Database>(
    State(state): State<AppState<D>>,
    user: CurrentUser,
    ValidatedJson(req): ValidatedJson<CreateTeamRequest>,
) -> Result<(StatusCode, Json<TeamDetailResponse>), ApiError> {
    let team = Team {
        id: String::new(),
        name: req.name.trim().to_string(),
        description: req.description,
        owner_id: user.id().to_string(),
        approval_required: false,
        approver_ids: vec![],
        created_at: String::new(),
        updated_at: String::new(),
    };

    let created = state.db().teams().create(&team).await?;
    info!(team_id = %created.id, owner_id = %created.owner_id, "team created");

    state.notifier().notify(UpdateMessage::TeamUpdated {
        team_id: created.id.clone(),
    });

    Ok((StatusCode::CREATED, Json(team_detail(&state, created).await?)))
}

/// List the caller's teams
#[utoipa::path(
    get,
    path = "/api/v1/teams",
    tag = "teams",
    responses(
        (status = 200, description = "Teams the caller belongs to", body = Vec<TeamResponse>),
        (status = 401, description = "Unknown caller", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn list_teams<D: Database>(
    State(state): State<AppState<D>>,
    user: CurrentUser,
) -> Result<Json<Vec<TeamResponse>>, ApiError> {
    let teams = state.db().teams().list_for_user(user.id()).await?;
    Ok(Json(teams.into_iter().map(TeamResponse::from).collect()))
}

/// Get a team with its members
#[utoipa::path(
    get,
    path = "/api/v1/teams/{id}",
    tag = "teams",
    params(("id" = String, Path, description = "Team ID")),
    responses(
        (status = 200, description = "Team found", body = TeamDetailResponse),
        (status = 403, description = "Not a member", body = ErrorResponse),
        (status = 404, description = "Team not found", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn get_team<D: Database>(
    State(state): State<AppState<D>>,
    user: CurrentUser,
    Path(id): Path<String>,
) -> Result<Json<TeamDetailResponse>, ApiError> {
    let (team, _) = load_team_as_member(&state, &id, user.id(), "view this team").await?;
    Ok(Json(team_detail(&state, team).await?))
}

/// Update a team's name or description
#[utoipa::path(
    patch,
    path = "/api/v1/teams/{id}",
    tag = "teams",
    params(("id" = String, Path, description = "Team ID")),
    request_body = UpdateTeamRequest,
    responses(
        (status = 200, description = "Team updated", body = TeamResponse),
        (status = 400, description = "Invalid request", body = ErrorResponse),
        (status = 403, description = "Not an admin", body = ErrorResponse),
        (status = 404, description = "Team not found", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn update_team<D: Database>(
    State(state): State<AppState<D>>,
    user: CurrentUser,
    Path(id): Path<String>,
    ValidatedJson(req): ValidatedJson<UpdateTeamRequest>,
) -> Result<Json<TeamResponse>, ApiError> {
    let mut team = state.db().teams().get(&id).await?;
    access::require_admin(
        team_role(state.db(), &id, user.id()).await?,
        "update the team",
    )?;

    if let Some(name) = req.name {
        team.name = name.trim().to_string();
    }
    if let Some(description) = req.description {
        team.description = Some(description);
    }

    state.db().teams().update(&team).await?;
    let updated = state.db().teams().get(&id).await?;

    state
        .notifier()
        .notify(UpdateMessage::TeamUpdated { team_id: id });

    Ok(Json(TeamResponse::from(updated)))
}

/// Delete a team
#[utoipa::path(
    delete,
    path = "/api/v1/teams/{id}",
    tag = "teams",
    params(("id" = String, Path, description = "Team ID")),
    responses(
        (status = 204, description = "Team deleted"),
        (status = 403, description = "Not the owner", body = ErrorResponse),
        (status = 404, description = "Team not found", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn delete_team<D: Database>(
    State(state): State<AppState<D>>,
    user: CurrentUser,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    state.db().teams().get(&id).await?;
    access::require_owner(
        team_role(state.db(), &id, user.id()).await?,
        "delete the team",
    )?;

    state.db().teams().delete(&id).await?;
    info!(team_id = %id, "team deleted");

    state
        .notifier()
        .notify(UpdateMessage::TeamDeleted { team_id: id });

    Ok(StatusCode::NO_CONTENT)
}

/// Add a member to a team
#[utoipa::path(
    post,
    path = "/api/v1/teams/{id}/members",
    tag = "teams",
    params(("id" = String, Path, description = "Team ID")),
    request_body = AddMemberRequest,
    responses(
        (status = 201, description = "Member added", body = MemberResponse),
        (status = 400, description = "Invalid role", body = ErrorResponse),
        (status = 403, description = "Not allowed to add members", body = ErrorResponse),
        (status = 404, description = "Team or user not found", body = ErrorResponse),
        (status = 409, description = "Already a member", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn add_member<D: Database>(
    State(state): State<AppState<D>>,
    user: CurrentUser,
    Path(id): Path<String>,
    ValidatedJson(req): ValidatedJson<AddMemberRequest>,
) -> Result<(StatusCode, Json<MemberResponse>), ApiError> {
    state.db().teams().get(&id).await?;
    let role = parse_enum::<TeamRole>(req.role.as_deref())?.unwrap_or_default();
    access::check_member_addition(team_role(state.db(), &id, user.id()).await?, role)?;

    let user_id = req.user_id.trim().to_string();
    state.db().users().get(&user_id).await?;

    if state.db().teams().get_member(&id, &user_id).await?.is_some() {
        return Err(ApiError::Conflict(format!(
            "user '{}' is already a member of team '{}'",
            user_id, id
        )));
    }

    let member = state
        .db()
        .teams()
        .add_member(&TeamMember {
            team_id: id.clone(),
            user_id,
            role,
            joined_at: String::new(),
        })
        .await?;
    info!(team_id = %id, user_id = %member.user_id, role = %member.role, "member added");

    state
        .notifier()
        .notify(UpdateMessage::TeamUpdated { team_id: id });

    Ok((StatusCode::CREATED, Json(MemberResponse::from(member))))
}

/// Change a member's role
#[utoipa::path(
    patch,
    path = "/api/v1/teams/{id}/members/{user_id}",
    tag = "teams",
    params(
        ("id" = String, Path, description = "Team ID"),
        ("user_id" = String, Path, description = "Member user ID")
    ),
    request_body = UpdateMemberRequest,
    responses(
        (status = 200, description = "Role changed", body = MemberResponse),
        (status = 400, description = "Invalid role", body = ErrorResponse),
        (status = 403, description = "Not allowed to change this role", body = ErrorResponse),
        (status = 404, description = "Team or member not found", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn update_member<D: Database>(
    State(state): State<AppState<D>>,
    user: CurrentUser,
    Path((id, member_id)): Path<(String, String)>,
    ValidatedJson(req): ValidatedJson<UpdateMemberRequest>,
) -> Result<Json<MemberResponse>, ApiError> {
    state.db().teams().get(&id).await?;
    let new_role = parse_enum::<TeamRole>(Some(&req.role))?.unwrap_or_default();

    let target = state
        .db()
        .teams()
        .get_member(&id, &member_id)
        .await?
        .ok_or_else(|| ApiError::not_found("TeamMember", &member_id))?;

    access::check_role_change(
        team_role(state.db(), &id, user.id()).await?,
        target.role,
        new_role,
    )?;

    state
        .db()
        .teams()
        .update_member_role(&id, &member_id, new_role)
        .await?;
    info!(team_id = %id, user_id = %member_id, role = %new_role, "member role changed");

    state.notifier().notify(UpdateMessage::TeamUpdated {
        team_id: id.clone(),
    });

    Ok(Json(MemberResponse::from(TeamMember {
        role: new_role,
        ..target
    })))
}

/// Remove a member, or leave the team
#[utoipa::path(
    delete,
    path = "/api/v1/teams/{id}/members/{user_id}",
    tag = "teams",
    params(
        ("id" = String, Path, description = "Team ID"),
        ("user_id" = String, Path, description = "Member user ID")
    ),
    responses(
        (status = 204, description = "Member removed"),
        (status = 403, description = "Not allowed to remove this member", body = ErrorResponse),
        (status = 404, description = "Team or member not found", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn remove_member<D: Database>(
    State(state): State<AppState<D>>,
    user: CurrentUser,
    Path((id, member_id)): Path<(String, String)>,
) -> Result<StatusCode, ApiError> {
    state.db().teams().get(&id).await?;

    let target = state
        .db()
        .teams()
        .get_member(&id, &member_id)
        .await?
        .ok_or_else(|| ApiError::not_found("TeamMember", &member_id))?;

    access::check_member_removal(
        user.id(),
        team_role(state.db(), &id, user.id()).await?,
        &member_id,
        target.role,
    )?;

    state.db().teams().remove_member(&id, &member_id).await?;
    info!(team_id = %id, user_id = %member_id, "member removed");

    state
        .notifier()
        .notify(UpdateMessage::TeamUpdated { team_id: id });

    Ok(StatusCode::NO_CONTENT)
}
