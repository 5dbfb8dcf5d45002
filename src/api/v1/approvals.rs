//! Approval submission and decision handlers.

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};
use utoipa::{IntoParams, ToSchema};

use super::content::{ContentResponse, approval_required, load_modifiable_content, load_visible_content};
use super::teams::load_team_as_member;
use super::{page_sort, team_role};
use crate::api::notifier::UpdateMessage;
use crate::api::validation::{optional_text, parse_enum};
use crate::api::{ApiError, AppState, CurrentUser, ErrorResponse, Validate, ValidatedJson};
use crate::db::utils::current_timestamp;
use crate::db::{
    ApprovalQuery, ApprovalRecord, ApprovalRepository, ApprovalStatus, ContentRepository,
    ContentStatus, Database, PageSort, TeamRepository,
};
use crate::workflow::access;
use crate::workflow::content::{ChangeOrigin, StatusChange, apply_status_change};

const MAX_NOTE_LEN: usize = 2000;

// =============================================================================
// DTOs
// =============================================================================

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ApprovalResponse {
    #[schema(example = "d4e5f6a7")]
    pub id: String,
    pub content_id: String,
    pub team_id: String,
    pub submitted_by: String,
    pub note: Option<String>,
    #[schema(example = "pending")]
    pub status: String,
    pub decided_by: Option<String>,
    pub feedback: Option<String>,
    pub created_at: String,
    pub decided_at: Option<String>,
}

impl From<ApprovalRecord> for ApprovalResponse {
    fn from(a: ApprovalRecord) -> Self {
        Self {
            id: a.id,
            content_id: a.content_id,
            team_id: a.team_id,
            submitted_by: a.submitted_by,
            note: a.note,
            status: a.status.to_string(),
            decided_by: a.decided_by,
            feedback: a.feedback,
            created_at: a.created_at,
            decided_at: a.decided_at,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct PaginatedApprovals {
    pub items: Vec<ApprovalResponse>,
    pub total: usize,
    pub limit: usize,
    pub offset: usize,
}

/// An approval decision together with the content it moved
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ApprovalDecisionResponse {
    pub approval: ApprovalResponse,
    pub content: ContentResponse,
}

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct SubmitApprovalRequest {
    /// Message for the approvers
    pub note: Option<String>,
}

impl Validate for SubmitApprovalRequest {
    fn validate(&self) -> Result<(), ApiError> {
        optional_text("note", self.note.as_deref(), MAX_NOTE_LEN)
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct DecideApprovalRequest {
    /// `approved` or `changes_requested`
    #[schema(example = "approved")]
    pub decision: String,
    /// Required when requesting changes
    pub feedback: Option<String>,
}

impl Validate for DecideApprovalRequest {
    fn validate(&self) -> Result<(), ApiError> {
        optional_text("feedback", self.feedback.as_deref(), MAX_NOTE_LEN)?;
        match parse_enum::<ApprovalStatus>(Some(&self.decision))? {
            Some(ApprovalStatus::Approved) => Ok(()),
            Some(ApprovalStatus::ChangesRequested) => {
                let has_feedback = self
                    .feedback
                    .as_deref()
                    .is_some_and(|f| !f.trim().is_empty());
                if has_feedback {
                    Ok(())
                } else {
                    Err(ApiError::validation(
                        "feedback is required when requesting changes",
                    ))
                }
            }
            _ => Err(ApiError::validation(
                "decision must be approved or changes_requested",
            )),
        }
    }
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct ListApprovalsQuery {
    /// Filter by status (pending, approved, changes_requested)
    pub status: Option<String>,
    pub limit: Option<usize>,
    pub offset: Option<usize>,
}

// =============================================================================
// Handlers
// =============================================================================

/// Submit content for approval
///
/// The content must be a team draft. It moves to `in_review` and a pending
/// approval record is opened.
#[utoipa::path(
    post,
    path = "/api/v1/content/{id}/approvals",
    tag = "approvals",
    params(("id" = String, Path, description = "Content ID")),
    request_body = SubmitApprovalRequest,
    responses(
        (status = 201, description = "Submitted for approval", body = ApprovalResponse),
        (status = 400, description = "Content has no team", body = ErrorResponse),
        (status = 403, description = "Not allowed to modify", body = ErrorResponse),
        (status = 404, description = "Content not found", body = ErrorResponse),
        (status = 409, description = "Not a draft, or already pending", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn submit_for_approval<D: Database>(
    State(state): State<AppState<D>>,
    user: CurrentUser,
    Path(id): Path<String>,
    ValidatedJson(req): ValidatedJson<SubmitApprovalRequest>,
) -> Result<(StatusCode, Json<ApprovalResponse>), ApiError> {
    let (mut item, _) = load_modifiable_content(&state, &id, user.id()).await?;

    let team_id = item
        .team_id
        .clone()
        .ok_or_else(|| ApiError::validation("only team content can be submitted for approval"))?;

    if state.db().approvals().pending_for_content(&id).await?.is_some() {
        return Err(ApiError::Conflict(format!(
            "content '{}' already has a pending approval",
            id
        )));
    }

    let approval_required = approval_required(&state, &item).await?;
    let from = item.status;
    let now = current_timestamp();
    apply_status_change(
        &mut item,
        StatusChange {
            target: ContentStatus::InReview,
            origin: ChangeOrigin::Submission,
            scheduled_at: None,
            approval_required,
            now: &now,
        },
    )?;

    let record = state
        .db()
        .approvals()
        .submit(
            &ApprovalRecord {
                id: String::new(),
                content_id: id.clone(),
                team_id,
                submitted_by: user.id().to_string(),
                note: req.note,
                status: ApprovalStatus::Pending,
                decided_by: None,
                feedback: None,
                created_at: String::new(),
                decided_at: None,
            },
            from,
        )
        .await?;

    info!(approval_id = %record.id, content_id = %id, "content submitted for approval");

    state.notifier().notify(UpdateMessage::ApprovalSubmitted {
        approval_id: record.id.clone(),
        content_id: id.clone(),
    });
    state.notifier().notify(UpdateMessage::ContentStatusChanged {
        content_id: id,
        status: item.status.to_string(),
    });

    Ok((StatusCode::CREATED, Json(ApprovalResponse::from(record))))
}

/// Approval history of a content item
#[utoipa::path(
    get,
    path = "/api/v1/content/{id}/approvals",
    tag = "approvals",
    params(("id" = String, Path, description = "Content ID")),
    responses(
        (status = 200, description = "Approval records, newest first", body = Vec<ApprovalResponse>),
        (status = 403, description = "No access", body = ErrorResponse),
        (status = 404, description = "Content not found", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn list_content_approvals<D: Database>(
    State(state): State<AppState<D>>,
    user: CurrentUser,
    Path(id): Path<String>,
) -> Result<Json<Vec<ApprovalResponse>>, ApiError> {
    load_visible_content(&state, &id, user.id()).await?;

    let result = state
        .db()
        .approvals()
        .list(&ApprovalQuery {
            content_id: Some(id),
            ..Default::default()
        })
        .await?;

    Ok(Json(
        result.items.into_iter().map(ApprovalResponse::from).collect(),
    ))
}

/// Approval queue of a team
#[utoipa::path(
    get,
    path = "/api/v1/teams/{id}/approvals",
    tag = "approvals",
    params(
        ("id" = String, Path, description = "Team ID"),
        ListApprovalsQuery
    ),
    responses(
        (status = 200, description = "Paginated approvals", body = PaginatedApprovals),
        (status = 403, description = "Not a member", body = ErrorResponse),
        (status = 404, description = "Team not found", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn list_team_approvals<D: Database>(
    State(state): State<AppState<D>>,
    user: CurrentUser,
    Path(id): Path<String>,
    Query(query): Query<ListApprovalsQuery>,
) -> Result<Json<PaginatedApprovals>, ApiError> {
    load_team_as_member(&state, &id, user.id(), "view approvals").await?;
    let status = parse_enum::<ApprovalStatus>(query.status.as_deref())?;

    let page: PageSort = page_sort(query.limit, query.offset, None, None)?;
    let result = state
        .db()
        .approvals()
        .list(&ApprovalQuery {
            page,
            team_id: Some(id),
            content_id: None,
            status,
        })
        .await?;

    Ok(Json(PaginatedApprovals {
        items: result.items.into_iter().map(ApprovalResponse::from).collect(),
        total: result.total,
        limit: result.limit.unwrap_or(super::DEFAULT_LIMIT),
        offset: result.offset,
    }))
}

/// Decide a pending approval
///
/// Approving moves the content to `approved`; requesting changes sends it
/// back to `draft`.
#[utoipa::path(
    put,
    path = "/api/v1/approvals/{id}",
    tag = "approvals",
    params(("id" = String, Path, description = "Approval ID")),
    request_body = DecideApprovalRequest,
    responses(
        (status = 200, description = "Decision recorded", body = ApprovalDecisionResponse),
        (status = 400, description = "Invalid decision", body = ErrorResponse),
        (status = 403, description = "Not an approver", body = ErrorResponse),
        (status = 404, description = "Approval not found", body = ErrorResponse),
        (status = 409, description = "Already decided", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn decide_approval<D: Database>(
    State(state): State<AppState<D>>,
    user: CurrentUser,
    Path(id): Path<String>,
    ValidatedJson(req): ValidatedJson<DecideApprovalRequest>,
) -> Result<Json<ApprovalDecisionResponse>, ApiError> {
    let record = state.db().approvals().get(&id).await?;
    if record.status != ApprovalStatus::Pending {
        return Err(ApiError::Conflict(format!(
            "approval '{}' was already decided ({})",
            id, record.status
        )));
    }

    let team = state.db().teams().get(&record.team_id).await?;
    let role = team_role(state.db(), &team.id, user.id()).await?;
    if !access::can_approve(&team, user.id(), role) {
        return Err(ApiError::forbidden(
            "you are not an approver for this team",
        ));
    }

    let decision = parse_enum::<ApprovalStatus>(Some(&req.decision))?.unwrap_or_default();
    let target = match decision {
        ApprovalStatus::Approved => ContentStatus::Approved,
        _ => ContentStatus::Draft,
    };

    let mut item = state.db().content().get(&record.content_id).await?;
    let now = current_timestamp();
    apply_status_change(
        &mut item,
        StatusChange {
            target,
            origin: ChangeOrigin::ApprovalDecision,
            scheduled_at: None,
            approval_required: team.approval_required,
            now: &now,
        },
    )?;

    let record = ApprovalRecord {
        status: decision,
        decided_by: Some(user.id().to_string()),
        feedback: req.feedback,
        decided_at: Some(now),
        ..record
    };
    state.db().approvals().decide(&record, item.status).await?;

    info!(approval_id = %id, decision = %decision, content_id = %item.id, "approval decided");

    state.notifier().notify(UpdateMessage::ApprovalDecided {
        approval_id: id,
        content_id: item.id.clone(),
        status: decision.to_string(),
    });
    state.notifier().notify(UpdateMessage::ContentStatusChanged {
        content_id: item.id.clone(),
        status: item.status.to_string(),
    });

    let item = state.db().content().get(&item.id).await?;
    Ok(Json(ApprovalDecisionResponse {
        approval: ApprovalResponse::from(record),
        content: ContentResponse::from(item),
    }))
}
