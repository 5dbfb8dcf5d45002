//! Collaboration request handlers.

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};
use utoipa::{IntoParams, ToSchema};

use super::page_sort;
use super::shared_projects::SharedProjectResponse;
use crate::api::notifier::UpdateMessage;
use crate::api::validation::{optional_text, parse_enum, require_text};
use crate::api::{ApiError, AppState, CurrentUser, ErrorResponse, Validate, ValidatedJson};
use crate::db::{
    CollaborationQuery, CollaborationRepository, CollaborationRequest, CollaborationStatus,
    Database, SharedProject, SharedProjectStatus, UserRepository,
};
use crate::workflow::collaboration;

const MAX_TITLE_LEN: usize = 200;
const MAX_MESSAGE_LEN: usize = 5000;

// =============================================================================
// DTOs
// =============================================================================

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CollaborationResponse {
    #[schema(example = "a7b8c9d0")]
    pub id: String,
    pub sender_id: String,
    pub recipient_id: String,
    #[schema(example = "Joint food tour episode")]
    pub title: String,
    pub message: Option<String>,
    #[schema(example = "pending")]
    pub status: String,
    pub created_at: String,
    pub responded_at: Option<String>,
}

impl From<CollaborationRequest> for CollaborationResponse {
    fn from(r: CollaborationRequest) -> Self {
        Self {
            id: r.id,
            sender_id: r.sender_id,
            recipient_id: r.recipient_id,
            title: r.title,
            message: r.message,
            status: r.status.to_string(),
            created_at: r.created_at,
            responded_at: r.responded_at,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct PaginatedCollaborations {
    pub items: Vec<CollaborationResponse>,
    pub total: usize,
    pub limit: usize,
    pub offset: usize,
}

/// An accepted request and the shared project it opened
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct AcceptCollaborationResponse {
    pub request: CollaborationResponse,
    pub project: SharedProjectResponse,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateCollaborationRequest {
    pub recipient_id: String,
    #[schema(example = "Joint food tour episode")]
    pub title: String,
    pub message: Option<String>,
}

impl Validate for CreateCollaborationRequest {
    fn validate(&self) -> Result<(), ApiError> {
        require_text("recipient_id", &self.recipient_id, 64)?;
        require_text("title", &self.title, MAX_TITLE_LEN)?;
        optional_text("message", self.message.as_deref(), MAX_MESSAGE_LEN)
    }
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct ListCollaborationsQuery {
    /// `incoming` (default) or `outgoing`
    pub direction: Option<String>,
    /// Filter by status
    pub status: Option<String>,
    pub limit: Option<usize>,
    pub offset: Option<usize>,
}

async fn respond<D: Database>(
    state: &AppState<D>,
    id: &str,
    user_id: &str,
    target: CollaborationStatus,
) -> Result<CollaborationRequest, ApiError> {
    let request = state.db().collaborations().get(id).await?;
    collaboration::check_response(&request, user_id, target)?;

    state.db().collaborations().update_status(id, target).await?;
    info!(request_id = %id, status = %target, "collaboration request answered");

    state.notifier().notify(UpdateMessage::CollaborationUpdated {
        request_id: id.to_string(),
        status: target.to_string(),
    });

    Ok(state.db().collaborations().get(id).await?)
}

// =============================================================================
// Handlers
// =============================================================================

/// Send a collaboration request
#[utoipa::path(
    post,
    path = "/api/v1/collaborations",
    tag = "collaborations",
    request_body = CreateCollaborationRequest,
    responses(
        (status = 201, description = "Request sent", body = CollaborationResponse),
        (status = 400, description = "Invalid request", body = ErrorResponse),
        (status = 404, description = "Recipient not found", body = ErrorResponse),
        (status = 409, description = "A pending request already exists", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn create_collaboration<D: Database>(
    State(state): State<AppState<D>>,
    user: CurrentUser,
    ValidatedJson(req): ValidatedJson<CreateCollaborationRequest>,
) -> Result<(StatusCode, Json<CollaborationResponse>), ApiError> {
    let recipient_id = req.recipient_id.trim().to_string();
    collaboration::validate_new_request(user.id(), &recipient_id)?;
    state.db().users().get(&recipient_id).await?;

    if state
        .db()
        .collaborations()
        .find_pending(user.id(), &recipient_id)
        .await?
        .is_some()
    {
        return Err(ApiError::Conflict(format!(
            "a pending request to '{}' already exists",
            recipient_id
        )));
    }

    let created = state
        .db()
        .collaborations()
        .create(&CollaborationRequest {
            id: String::new(),
            sender_id: user.id().to_string(),
            recipient_id,
            title: req.title.trim().to_string(),
            message: req.message,
            status: CollaborationStatus::Pending,
            created_at: String::new(),
            responded_at: None,
        })
        .await?;
    info!(request_id = %created.id, recipient_id = %created.recipient_id, "collaboration requested");

    state.notifier().notify(UpdateMessage::CollaborationRequested {
        request_id: created.id.clone(),
    });

    Ok((StatusCode::CREATED, Json(CollaborationResponse::from(created))))
}

/// List the caller's collaboration requests
#[utoipa::path(
    get,
    path = "/api/v1/collaborations",
    tag = "collaborations",
    params(ListCollaborationsQuery),
    responses(
        (status = 200, description = "Paginated requests", body = PaginatedCollaborations),
        (status = 400, description = "Invalid filter", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn list_collaborations<D: Database>(
    State(state): State<AppState<D>>,
    user: CurrentUser,
    Query(query): Query<ListCollaborationsQuery>,
) -> Result<Json<PaginatedCollaborations>, ApiError> {
    let status = parse_enum::<CollaborationStatus>(query.status.as_deref())?;

    let (sender_id, recipient_id) = match query.direction.as_deref() {
        None | Some("incoming") => (None, Some(user.id().to_string())),
        Some("outgoing") => (Some(user.id().to_string()), None),
        Some(other) => {
            return Err(ApiError::validation(format!(
                "direction must be incoming or outgoing, got '{}'",
                other
            )));
        }
    };

    let result = state
        .db()
        .collaborations()
        .list(&CollaborationQuery {
            page: page_sort(query.limit, query.offset, None, None)?,
            sender_id,
            recipient_id,
            status,
        })
        .await?;

    Ok(Json(PaginatedCollaborations {
        items: result
            .items
            .into_iter()
            .map(CollaborationResponse::from)
            .collect(),
        total: result.total,
        limit: result.limit.unwrap_or(super::DEFAULT_LIMIT),
        offset: result.offset,
    }))
}

/// Get a collaboration request
#[utoipa::path(
    get,
    path = "/api/v1/collaborations/{id}",
    tag = "collaborations",
    params(("id" = String, Path, description = "Request ID")),
    responses(
        (status = 200, description = "Request found", body = CollaborationResponse),
        (status = 403, description = "Not a party to the request", body = ErrorResponse),
        (status = 404, description = "Request not found", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn get_collaboration<D: Database>(
    State(state): State<AppState<D>>,
    user: CurrentUser,
    Path(id): Path<String>,
) -> Result<Json<CollaborationResponse>, ApiError> {
    let request = state.db().collaborations().get(&id).await?;
    if !collaboration::is_party(&request, user.id()) {
        return Err(ApiError::forbidden(
            "only the sender or recipient can view this request",
        ));
    }
    Ok(Json(CollaborationResponse::from(request)))
}

/// Accept a collaboration request
///
/// Opens a shared project for the two creators.
#[utoipa::path(
    post,
    path = "/api/v1/collaborations/{id}/accept",
    tag = "collaborations",
    params(("id" = String, Path, description = "Request ID")),
    responses(
        (status = 200, description = "Request accepted", body = AcceptCollaborationResponse),
        (status = 403, description = "Not the recipient", body = ErrorResponse),
        (status = 404, description = "Request not found", body = ErrorResponse),
        (status = 409, description = "Request is not pending", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn accept_collaboration<D: Database>(
    State(state): State<AppState<D>>,
    user: CurrentUser,
    Path(id): Path<String>,
) -> Result<Json<AcceptCollaborationResponse>, ApiError> {
    let request = state.db().collaborations().get(&id).await?;
    collaboration::check_response(&request, user.id(), CollaborationStatus::Accepted)?;

    let project = state
        .db()
        .collaborations()
        .accept(
            &id,
            &SharedProject {
                id: String::new(),
                collaboration_request_id: request.id.clone(),
                title: request.title.clone(),
                description: request.message.clone(),
                owner_id: request.sender_id.clone(),
                partner_id: request.recipient_id.clone(),
                status: SharedProjectStatus::Active,
                tasks: vec![],
                links: vec![],
                created_at: String::new(),
                updated_at: String::new(),
            },
        )
        .await?;

    info!(request_id = %id, project_id = %project.id, "collaboration request accepted, shared project opened");

    state.notifier().notify(UpdateMessage::CollaborationUpdated {
        request_id: id.clone(),
        status: CollaborationStatus::Accepted.to_string(),
    });
    state.notifier().notify(UpdateMessage::SharedProjectCreated {
        project_id: project.id.clone(),
    });

    let request = state.db().collaborations().get(&id).await?;
    Ok(Json(AcceptCollaborationResponse {
        request: CollaborationResponse::from(request),
        project: SharedProjectResponse::from(project),
    }))
}

/// Decline a collaboration request
#[utoipa::path(
    post,
    path = "/api/v1/collaborations/{id}/decline",
    tag = "collaborations",
    params(("id" = String, Path, description = "Request ID")),
    responses(
        (status = 200, description = "Request declined", body = CollaborationResponse),
        (status = 403, description = "Not the recipient", body = ErrorResponse),
        (status = 404, description = "Request not found", body = ErrorResponse),
        (status = 409, description = "Request is not pending", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn decline_collaboration<D: Database>(
    State(state): State<AppState<D>>,
    user: CurrentUser,
    Path(id): Path<String>,
) -> Result<Json<CollaborationResponse>, ApiError> {
    let request = respond(&state, &id, user.id(), CollaborationStatus::Declined).await?;
    Ok(Json(CollaborationResponse::from(request)))
}

/// Cancel a collaboration request
#[utoipa::path(
    post,
    path = "/api/v1/collaborations/{id}/cancel",
    tag = "collaborations",
    params(("id" = String, Path, description = "Request ID")),
    responses(
        (status = 200, description = "Request cancelled", body = CollaborationResponse),
        (status = 403, description = "Not the sender", body = ErrorResponse),
        (status = 404, description = "Request not found", body = ErrorResponse),
        (status = 409, description = "Request is not pending", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn cancel_collaboration<D: Database>(
    State(state): State<AppState<D>>,
    user: CurrentUser,
    Path(id): Path<String>,
) -> Result<Json<CollaborationResponse>, ApiError> {
    let request = respond(&state, &id, user.id(), CollaborationStatus::Cancelled).await?;
    Ok(Json(CollaborationResponse::from(request)))
}
