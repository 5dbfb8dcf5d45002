//! Content item handlers: CRUD, status machine, calendar and stats.

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};
use utoipa::{IntoParams, ToSchema};

use super::{page_sort, team_role};
use crate::api::notifier::UpdateMessage;
use crate::api::validation::{
    optional_text, parse_enum, parse_range_end, parse_timestamp, require_text, validate_tags,
};
use crate::api::{ApiError, AppState, CurrentUser, ErrorResponse, Validate, ValidatedJson};
use crate::db::utils::current_timestamp;
use crate::db::{
    ApprovalRecord, ContentItem, ContentQuery, ContentRepository, ContentStatus, Database,
    PageSort, SortOrder, TeamRepository, TeamRole,
};
use crate::workflow::access;
use crate::workflow::content::{ChangeOrigin, StatusChange, apply_status_change};

const MAX_TITLE_LEN: usize = 200;
const MAX_DESCRIPTION_LEN: usize = 5000;
const MAX_NOTES_LEN: usize = 10000;
const MAX_PLATFORM_LEN: usize = 50;

// =============================================================================
// DTOs
// =============================================================================

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ContentResponse {
    #[schema(example = "c3d4e5f6")]
    pub id: String,
    pub owner_id: String,
    pub team_id: Option<String>,
    #[schema(example = "Lisbon in 48 hours")]
    pub title: String,
    pub description: Option<String>,
    pub notes: Option<String>,
    #[schema(example = "youtube")]
    pub platform: Option<String>,
    pub tags: Vec<String>,
    #[schema(example = "draft")]
    pub status: String,
    pub scheduled_at: Option<String>,
    pub published_at: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl From<ContentItem> for ContentResponse {
    fn from(c: ContentItem) -> Self {
        Self {
            id: c.id,
            owner_id: c.owner_id,
            team_id: c.team_id,
            title: c.title,
            description: c.description,
            notes: c.notes,
            platform: c.platform,
            tags: c.tags,
            status: c.status.to_string(),
            scheduled_at: c.scheduled_at,
            published_at: c.published_at,
            created_at: c.created_at,
            updated_at: c.updated_at,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct PaginatedContent {
    pub items: Vec<ContentResponse>,
    pub total: usize,
    pub limit: usize,
    pub offset: usize,
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct ListContentQuery {
    /// Filter by status
    pub status: Option<String>,
    /// Filter by team
    pub team_id: Option<String>,
    pub limit: Option<usize>,
    pub offset: Option<usize>,
    /// Field to sort by (title, status, scheduled_at, created_at, updated_at)
    pub sort: Option<String>,
    /// Sort order (asc, desc)
    pub order: Option<String>,
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct CalendarQuery {
    /// Start of the window, inclusive
    #[param(example = "2025-03-01 00:00:00")]
    pub from: String,
    /// End of the window, inclusive. A bare date covers the whole day.
    #[param(example = "2025-03-31")]
    pub to: String,
    /// Restrict to one team
    pub team_id: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct StatusCount {
    pub status: String,
    pub count: usize,
}

/// Counts of visible content per status; every status is listed
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ContentStatsResponse {
    pub total: usize,
    pub by_status: Vec<StatusCount>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateContentRequest {
    #[schema(example = "Lisbon in 48 hours")]
    pub title: String,
    pub description: Option<String>,
    pub notes: Option<String>,
    pub platform: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    /// Share with a team the caller belongs to
    pub team_id: Option<String>,
    /// `idea` (default) or `draft`
    pub status: Option<String>,
    /// Planned publication time
    pub scheduled_at: Option<String>,
}

impl Validate for CreateContentRequest {
    fn validate(&self) -> Result<(), ApiError> {
        require_text("title", &self.title, MAX_TITLE_LEN)?;
        optional_text(
            "description",
            self.description.as_deref(),
            MAX_DESCRIPTION_LEN,
        )?;
        optional_text("notes", self.notes.as_deref(), MAX_NOTES_LEN)?;
        optional_text("platform", self.platform.as_deref(), MAX_PLATFORM_LEN)?;
        validate_tags(&self.tags)?;
        parse_timestamp("scheduled_at", self.scheduled_at.as_deref())?;

        match parse_enum::<ContentStatus>(self.status.as_deref())? {
            None | Some(ContentStatus::Idea) | Some(ContentStatus::Draft) => Ok(()),
            Some(other) => Err(ApiError::validation(format!(
                "new content starts as idea or draft, not {}",
                other
            ))),
        }
    }
}

/// Partial update of a content item's fields
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct UpdateContentRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub notes: Option<String>,
    pub platform: Option<String>,
    pub tags: Option<Vec<String>>,
}

impl Validate for UpdateContentRequest {
    fn validate(&self) -> Result<(), ApiError> {
        if let Some(title) = &self.title {
            require_text("title", title, MAX_TITLE_LEN)?;
        }
        optional_text(
            "description",
            self.description.as_deref(),
            MAX_DESCRIPTION_LEN,
        )?;
        optional_text("notes", self.notes.as_deref(), MAX_NOTES_LEN)?;
        optional_text("platform", self.platform.as_deref(), MAX_PLATFORM_LEN)?;
        if let Some(tags) = &self.tags {
            validate_tags(tags)?;
        }
        Ok(())
    }
}

impl UpdateContentRequest {
    fn merge_into(self, target: &mut ContentItem) {
        if let Some(title) = self.title {
            target.title = title.trim().to_string();
        }
        if let Some(description) = self.description {
            target.description = Some(description);
        }
        if let Some(notes) = self.notes {
            target.notes = Some(notes);
        }
        if let Some(platform) = self.platform {
            target.platform = Some(platform);
        }
        if let Some(tags) = self.tags {
            target.tags = tags;
        }
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct ChangeStatusRequest {
    #[schema(example = "scheduled")]
    pub status: String,
    /// Required when scheduling content without a date
    #[schema(example = "2025-03-14 18:00:00")]
    pub scheduled_at: Option<String>,
}

impl Validate for ChangeStatusRequest {
    fn validate(&self) -> Result<(), ApiError> {
        parse_enum::<ContentStatus>(Some(&self.status))?;
        parse_timestamp("scheduled_at", self.scheduled_at.as_deref())?;
        Ok(())
    }
}

// =============================================================================
// Access helpers
// =============================================================================

/// Load a content item the caller may read, with the caller's role in its
/// team.
pub(crate) async fn load_visible_content<D: Database>(
    state: &AppState<D>,
    id: &str,
    user_id: &str,
) -> Result<(ContentItem, Option<TeamRole>), ApiError> {
    let item = state.db().content().get(id).await?;
    let role = match &item.team_id {
        Some(team_id) => team_role(state.db(), team_id, user_id).await?,
        None => None,
    };

    if !access::can_view_content(&item, user_id, role) {
        return Err(ApiError::forbidden(format!(
            "you do not have access to content '{}'",
            id
        )));
    }

    Ok((item, role))
}

/// Load a content item the caller may modify.
pub(crate) async fn load_modifiable_content<D: Database>(
    state: &AppState<D>,
    id: &str,
    user_id: &str,
) -> Result<(ContentItem, Option<TeamRole>), ApiError> {
    let (item, role) = load_visible_content(state, id, user_id).await?;
    if !access::can_modify_content(&item, user_id, role) {
        return Err(ApiError::forbidden(format!(
            "only the owner or a team admin can modify content '{}'",
            id
        )));
    }
    Ok((item, role))
}

/// Whether the item's team gates scheduling and publishing on approval.
pub(crate) async fn approval_required<D: Database>(
    state: &AppState<D>,
    item: &ContentItem,
) -> Result<bool, ApiError> {
    match &item.team_id {
        Some(team_id) => Ok(state.db().teams().get(team_id).await?.approval_required),
        None => Ok(false),
    }
}

// =============================================================================
// Handlers
// =============================================================================

/// Create a content item
#[utoipa::path(
    post,
    path = "/api/v1/content",
    tag = "content",
    request_body = CreateContentRequest,
    responses(
        (status = 201, description = "Content created", body = ContentResponse),
        (status = 400, description = "Invalid request", body = ErrorResponse),
        (status = 403, description = "Not a member of the team", body = ErrorResponse),
        (status = 404, description = "Team not found", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn create_content<D: Database>(
    State(state): State<AppState<D>>,
    user: CurrentUser,
    ValidatedJson(req): ValidatedJson<CreateContentRequest>,
) -> Result<(StatusCode, Json<ContentResponse>), ApiError> {
    if let Some(team_id) = &req.team_id {
        state.db().teams().get(team_id).await?;
        access::require_member(
            team_role(state.db(), team_id, user.id()).await?,
            "add content to this team",
        )?;
    }

    let status = parse_enum::<ContentStatus>(req.status.as_deref())?.unwrap_or_default();
    let scheduled_at = parse_timestamp("scheduled_at", req.scheduled_at.as_deref())?;

    let item = ContentItem {
        id: String::new(),
        owner_id: user.id().to_string(),
        team_id: req.team_id,
        title: req.title.trim().to_string(),
        description: req.description,
        notes: req.notes,
        platform: req.platform,
        tags: req.tags,
        status,
        scheduled_at,
        published_at: None,
        deleted_at: None,
        created_at: String::new(),
        updated_at: String::new(),
    };

    let created = state.db().content().create(&item).await?;
    info!(content_id = %created.id, status = %created.status, "content created");

    state.notifier().notify(UpdateMessage::ContentCreated {
        content_id: created.id.clone(),
    });

    Ok((StatusCode::CREATED, Json(ContentResponse::from(created))))
}

/// List content visible to the caller
///
/// Returns the caller's own items and items of teams they belong to.
#[utoipa::path(
    get,
    path = "/api/v1/content",
    tag = "content",
    params(ListContentQuery),
    responses(
        (status = 200, description = "Paginated content", body = PaginatedContent),
        (status = 400, description = "Invalid filter", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn list_content<D: Database>(
    State(state): State<AppState<D>>,
    user: CurrentUser,
    Query(query): Query<ListContentQuery>,
) -> Result<Json<PaginatedContent>, ApiError> {
    let status = parse_enum::<ContentStatus>(query.status.as_deref())?;

    let db_query = ContentQuery {
        page: page_sort(query.limit, query.offset, query.sort, query.order.as_deref())?,
        visible_to: Some(user.id().to_string()),
        team_id: query.team_id,
        status,
        ..Default::default()
    };

    let result = state.db().content().list(&db_query).await?;

    Ok(Json(PaginatedContent {
        items: result.items.into_iter().map(ContentResponse::from).collect(),
        total: result.total,
        limit: result.limit.unwrap_or(super::DEFAULT_LIMIT),
        offset: result.offset,
    }))
}

/// Content calendar
///
/// Visible content with `scheduled_at` inside the window, earliest first.
#[utoipa::path(
    get,
    path = "/api/v1/content/calendar",
    tag = "content",
    params(CalendarQuery),
    responses(
        (status = 200, description = "Scheduled content in the window", body = Vec<ContentResponse>),
        (status = 400, description = "Invalid window", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn content_calendar<D: Database>(
    State(state): State<AppState<D>>,
    user: CurrentUser,
    Query(query): Query<CalendarQuery>,
) -> Result<Json<Vec<ContentResponse>>, ApiError> {
    let from = parse_timestamp("from", Some(&query.from))?;
    let to = Some(parse_range_end("to", &query.to)?);
    if from > to {
        return Err(ApiError::validation("from must not be after to"));
    }

    let db_query = ContentQuery {
        page: PageSort {
            sort_by: Some("scheduled_at".to_string()),
            sort_order: Some(SortOrder::Asc),
            ..Default::default()
        },
        visible_to: Some(user.id().to_string()),
        team_id: query.team_id,
        status: None,
        scheduled_from: from,
        scheduled_to: to,
    };

    let result = state.db().content().list(&db_query).await?;
    Ok(Json(
        result.items.into_iter().map(ContentResponse::from).collect(),
    ))
}

/// Content counts per status
#[utoipa::path(
    get,
    path = "/api/v1/content/stats",
    tag = "content",
    responses(
        (status = 200, description = "Counts per status", body = ContentStatsResponse)
    )
)]
#[instrument(skip(state))]
pub async fn content_stats<D: Database>(
    State(state): State<AppState<D>>,
    user: CurrentUser,
) -> Result<Json<ContentStatsResponse>, ApiError> {
    let counts = state.db().content().count_by_status(user.id()).await?;

    let by_status: Vec<StatusCount> = ContentStatus::all()
        .iter()
        .map(|status| StatusCount {
            status: status.to_string(),
            count: counts
                .iter()
                .find(|(s, _)| s == status)
                .map(|(_, n)| *n)
                .unwrap_or(0),
        })
        .collect();

    Ok(Json(ContentStatsResponse {
        total: by_status.iter().map(|s| s.count).sum(),
        by_status,
    }))
}

/// Get a content item
#[utoipa::path(
    get,
    path = "/api/v1/content/{id}",
    tag = "content",
    params(("id" = String, Path, description = "Content ID")),
    responses(
        (status = 200, description = "Content found", body = ContentResponse),
        (status = 403, description = "No access", body = ErrorResponse),
        (status = 404, description = "Content not found", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn get_content<D: Database>(
    State(state): State<AppState<D>>,
    user: CurrentUser,
    Path(id): Path<String>,
) -> Result<Json<ContentResponse>, ApiError> {
    let (item, _) = load_visible_content(&state, &id, user.id()).await?;
    Ok(Json(ContentResponse::from(item)))
}

/// Update a content item
///
/// Updates only the fields provided in the request (PATCH semantics).
/// Status changes go through the status endpoint.
#[utoipa::path(
    patch,
    path = "/api/v1/content/{id}",
    tag = "content",
    params(("id" = String, Path, description = "Content ID")),
    request_body = UpdateContentRequest,
    responses(
        (status = 200, description = "Content updated", body = ContentResponse),
        (status = 400, description = "Invalid request", body = ErrorResponse),
        (status = 403, description = "Not allowed to modify", body = ErrorResponse),
        (status = 404, description = "Content not found", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn update_content<D: Database>(
    State(state): State<AppState<D>>,
    user: CurrentUser,
    Path(id): Path<String>,
    ValidatedJson(req): ValidatedJson<UpdateContentRequest>,
) -> Result<Json<ContentResponse>, ApiError> {
    let (mut item, _) = load_modifiable_content(&state, &id, user.id()).await?;

    req.merge_into(&mut item);
    state.db().content().update(&item).await?;
    let updated = state.db().content().get(&id).await?;

    state
        .notifier()
        .notify(UpdateMessage::ContentUpdated { content_id: id });

    Ok(Json(ContentResponse::from(updated)))
}

/// Change a content item's status
///
/// Enforces the content status machine. Entering review happens by
/// submitting for approval, and only an approver's decision approves.
/// Moving content out of review withdraws its pending approval request.
#[utoipa::path(
    put,
    path = "/api/v1/content/{id}/status",
    tag = "content",
    params(("id" = String, Path, description = "Content ID")),
    request_body = ChangeStatusRequest,
    responses(
        (status = 200, description = "Status changed", body = ContentResponse),
        (status = 400, description = "Invalid status or missing schedule", body = ErrorResponse),
        (status = 403, description = "Not allowed to modify", body = ErrorResponse),
        (status = 404, description = "Content not found", body = ErrorResponse),
        (status = 409, description = "Transition not allowed", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn change_content_status<D: Database>(
    State(state): State<AppState<D>>,
    user: CurrentUser,
    Path(id): Path<String>,
    ValidatedJson(req): ValidatedJson<ChangeStatusRequest>,
) -> Result<Json<ContentResponse>, ApiError> {
    let (mut item, _) = load_modifiable_content(&state, &id, user.id()).await?;
    let target = parse_enum::<ContentStatus>(Some(&req.status))?.unwrap_or_default();
    let scheduled_at = parse_timestamp("scheduled_at", req.scheduled_at.as_deref())?;
    let approval_required = approval_required(&state, &item).await?;
    let from = item.status;
    let now = current_timestamp();

    apply_status_change(
        &mut item,
        StatusChange {
            target,
            origin: ChangeOrigin::Direct,
            scheduled_at,
            approval_required,
            now: &now,
        },
    )?;

    let withdrawn = state
        .db()
        .content()
        .change_status(&item, from, user.id())
        .await?;
    notify_withdrawn(&state, withdrawn);

    info!(content_id = %id, from = %from, to = %item.status, "content status changed");

    state.notifier().notify(UpdateMessage::ContentStatusChanged {
        content_id: id.clone(),
        status: item.status.to_string(),
    });

    let updated = state.db().content().get(&id).await?;
    Ok(Json(ContentResponse::from(updated)))
}

/// Announce an approval closed because its content left review.
fn notify_withdrawn<D: Database>(state: &AppState<D>, withdrawn: Option<ApprovalRecord>) {
    if let Some(record) = withdrawn {
        info!(approval_id = %record.id, content_id = %record.content_id, "pending approval withdrawn");
        state.notifier().notify(UpdateMessage::ApprovalDecided {
            approval_id: record.id,
            content_id: record.content_id,
            status: record.status.to_string(),
        });
    }
}

/// Delete a content item
#[utoipa::path(
    delete,
    path = "/api/v1/content/{id}",
    tag = "content",
    params(("id" = String, Path, description = "Content ID")),
    responses(
        (status = 204, description = "Content deleted"),
        (status = 403, description = "Not allowed to modify", body = ErrorResponse),
        (status = 404, description = "Content not found", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn delete_content<D: Database>(
    State(state): State<AppState<D>>,
    user: CurrentUser,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    load_modifiable_content(&state, &id, user.id()).await?;

    let withdrawn = state.db().content().soft_delete(&id, user.id()).await?;
    info!(content_id = %id, "content deleted");
    notify_withdrawn(&state, withdrawn);

    state
        .notifier()
        .notify(UpdateMessage::ContentDeleted { content_id: id });

    Ok(StatusCode::NO_CONTENT)
}
