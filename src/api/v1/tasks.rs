//! Team task assignment handlers.

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};
use utoipa::{IntoParams, ToSchema};

use super::teams::load_team_as_member;
use super::{page_sort, team_role};
use crate::api::notifier::UpdateMessage;
use crate::api::validation::{optional_text, parse_enum, parse_timestamp, require_text};
use crate::api::{ApiError, AppState, CurrentUser, ErrorResponse, Validate, ValidatedJson};
use crate::db::utils::current_timestamp;
use crate::db::{
    AssignmentQuery, AssignmentRepository, AssignmentStatus, ContentRepository, Database,
    DbError, TaskAssignment, TaskComment, TeamRepository,
};
use crate::workflow::{access, assignment};

const MAX_TASK_TITLE_LEN: usize = 200;
const MAX_TASK_DESCRIPTION_LEN: usize = 5000;
const MAX_COMMENT_LEN: usize = 5000;

// =============================================================================
// DTOs
// =============================================================================

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct TaskResponse {
    #[schema(example = "e5f6a7b8")]
    pub id: String,
    pub team_id: String,
    pub content_id: Option<String>,
    #[schema(example = "Color grade the Lisbon footage")]
    pub title: String,
    pub description: Option<String>,
    pub assignee_id: String,
    pub created_by: String,
    #[schema(example = "in_progress")]
    pub status: String,
    /// 1 (highest) to 5 (lowest)
    pub priority: Option<i32>,
    pub due_date: Option<String>,
    pub created_at: String,
    pub updated_at: String,
    pub started_at: Option<String>,
    pub completed_at: Option<String>,
}

impl From<TaskAssignment> for TaskResponse {
    fn from(t: TaskAssignment) -> Self {
        Self {
            id: t.id,
            team_id: t.team_id,
            content_id: t.content_id,
            title: t.title,
            description: t.description,
            assignee_id: t.assignee_id,
            created_by: t.created_by,
            status: t.status.to_string(),
            priority: t.priority,
            due_date: t.due_date,
            created_at: t.created_at,
            updated_at: t.updated_at,
            started_at: t.started_at,
            completed_at: t.completed_at,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct PaginatedTasks {
    pub items: Vec<TaskResponse>,
    pub total: usize,
    pub limit: usize,
    pub offset: usize,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CommentResponse {
    pub id: String,
    pub task_id: String,
    pub author_id: String,
    pub content: String,
    pub created_at: String,
}

impl From<TaskComment> for CommentResponse {
    fn from(c: TaskComment) -> Self {
        Self {
            id: c.id,
            task_id: c.task_id,
            author_id: c.author_id,
            content: c.content,
            created_at: c.created_at,
        }
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateTaskRequest {
    #[schema(example = "Color grade the Lisbon footage")]
    pub title: String,
    pub description: Option<String>,
    /// Must be a member of the team
    pub assignee_id: String,
    /// Team content this task belongs to
    pub content_id: Option<String>,
    pub priority: Option<i32>,
    pub due_date: Option<String>,
    /// Initial status (default not_started)
    pub status: Option<String>,
}

impl Validate for CreateTaskRequest {
    fn validate(&self) -> Result<(), ApiError> {
        require_text("title", &self.title, MAX_TASK_TITLE_LEN)?;
        optional_text(
            "description",
            self.description.as_deref(),
            MAX_TASK_DESCRIPTION_LEN,
        )?;
        require_text("assignee_id", &self.assignee_id, 64)?;
        assignment::validate_priority(self.priority)?;
        parse_timestamp("due_date", self.due_date.as_deref())?;
        parse_enum::<AssignmentStatus>(self.status.as_deref())?;
        Ok(())
    }
}

/// Partial task update
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct UpdateTaskRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub assignee_id: Option<String>,
    pub content_id: Option<String>,
    pub status: Option<String>,
    pub priority: Option<i32>,
    pub due_date: Option<String>,
}

impl Validate for UpdateTaskRequest {
    fn validate(&self) -> Result<(), ApiError> {
        if let Some(title) = &self.title {
            require_text("title", title, MAX_TASK_TITLE_LEN)?;
        }
        optional_text(
            "description",
            self.description.as_deref(),
            MAX_TASK_DESCRIPTION_LEN,
        )?;
        assignment::validate_priority(self.priority)?;
        parse_timestamp("due_date", self.due_date.as_deref())?;
        parse_enum::<AssignmentStatus>(self.status.as_deref())?;
        Ok(())
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateCommentRequest {
    #[schema(example = "First pass done, needs a second look at the sunset shots")]
    pub content: String,
}

impl Validate for CreateCommentRequest {
    fn validate(&self) -> Result<(), ApiError> {
        require_text("content", &self.content, MAX_COMMENT_LEN)
    }
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct ListTasksQuery {
    /// Filter by status
    pub status: Option<String>,
    /// Filter by assignee
    pub assignee_id: Option<String>,
    /// Filter by content item
    pub content_id: Option<String>,
    pub limit: Option<usize>,
    pub offset: Option<usize>,
    /// Field to sort by (title, status, priority, due_date, created_at, updated_at)
    pub sort: Option<String>,
    /// Sort order (asc, desc)
    pub order: Option<String>,
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct MyTasksQuery {
    /// Filter by status
    pub status: Option<String>,
    pub limit: Option<usize>,
    pub offset: Option<usize>,
    pub sort: Option<String>,
    pub order: Option<String>,
}

// =============================================================================
// Helpers
// =============================================================================

async fn require_team_member<D: Database>(
    state: &AppState<D>,
    team_id: &str,
    user_id: &str,
) -> Result<(), ApiError> {
    if state.db().teams().get_member(team_id, user_id).await?.is_none() {
        return Err(ApiError::validation(format!(
            "assignee '{}' is not a member of this team",
            user_id
        )));
    }
    Ok(())
}

/// Linked content must exist and belong to the task's team.
async fn require_team_content<D: Database>(
    state: &AppState<D>,
    team_id: &str,
    content_id: &str,
) -> Result<(), ApiError> {
    let item = match state.db().content().get(content_id).await {
        Ok(item) => item,
        Err(DbError::NotFound { .. }) => {
            return Err(ApiError::validation(format!(
                "content '{}' does not exist",
                content_id
            )));
        }
        Err(e) => return Err(e.into()),
    };

    if item.team_id.as_deref() != Some(team_id) {
        return Err(ApiError::validation(format!(
            "content '{}' does not belong to this team",
            content_id
        )));
    }
    Ok(())
}

fn paginated(result: crate::db::ListResult<TaskAssignment>) -> PaginatedTasks {
    PaginatedTasks {
        items: result.items.into_iter().map(TaskResponse::from).collect(),
        total: result.total,
        limit: result.limit.unwrap_or(super::DEFAULT_LIMIT),
        offset: result.offset,
    }
}

// =============================================================================
// Handlers
// =============================================================================

/// Assign a task to a team member
#[utoipa::path(
    post,
    path = "/api/v1/teams/{id}/tasks",
    tag = "tasks",
    params(("id" = String, Path, description = "Team ID")),
    request_body = CreateTaskRequest,
    responses(
        (status = 201, description = "Task created", body = TaskResponse),
        (status = 400, description = "Invalid request or assignee", body = ErrorResponse),
        (status = 403, description = "Not a member", body = ErrorResponse),
        (status = 404, description = "Team not found", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn create_task<D: Database>(
    State(state): State<AppState<D>>,
    user: CurrentUser,
    Path(team_id): Path<String>,
    ValidatedJson(req): ValidatedJson<CreateTaskRequest>,
) -> Result<(StatusCode, Json<TaskResponse>), ApiError> {
    load_team_as_member(&state, &team_id, user.id(), "assign tasks").await?;

    let assignee_id = req.assignee_id.trim().to_string();
    require_team_member(&state, &team_id, &assignee_id).await?;
    if let Some(content_id) = &req.content_id {
        require_team_content(&state, &team_id, content_id).await?;
    }

    let mut task = TaskAssignment {
        id: String::new(),
        team_id: team_id.clone(),
        content_id: req.content_id,
        title: req.title.trim().to_string(),
        description: req.description,
        assignee_id,
        created_by: user.id().to_string(),
        status: AssignmentStatus::NotStarted,
        priority: req.priority,
        due_date: parse_timestamp("due_date", req.due_date.as_deref())?,
        created_at: String::new(),
        updated_at: String::new(),
        started_at: None,
        completed_at: None,
    };
    let status = parse_enum::<AssignmentStatus>(req.status.as_deref())?.unwrap_or_default();
    assignment::apply_status(&mut task, status, &current_timestamp());

    let created = state.db().assignments().create(&task).await?;
    info!(task_id = %created.id, team_id = %team_id, assignee_id = %created.assignee_id, "task assigned");

    state.notifier().notify(UpdateMessage::TaskCreated {
        task_id: created.id.clone(),
    });

    Ok((StatusCode::CREATED, Json(TaskResponse::from(created))))
}

/// List a team's tasks
#[utoipa::path(
    get,
    path = "/api/v1/teams/{id}/tasks",
    tag = "tasks",
    params(("id" = String, Path, description = "Team ID"), ListTasksQuery),
    responses(
        (status = 200, description = "Paginated tasks", body = PaginatedTasks),
        (status = 403, description = "Not a member", body = ErrorResponse),
        (status = 404, description = "Team not found", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn list_team_tasks<D: Database>(
    State(state): State<AppState<D>>,
    user: CurrentUser,
    Path(team_id): Path<String>,
    Query(query): Query<ListTasksQuery>,
) -> Result<Json<PaginatedTasks>, ApiError> {
    load_team_as_member(&state, &team_id, user.id(), "view tasks").await?;
    let status = parse_enum::<AssignmentStatus>(query.status.as_deref())?;

    let result = state
        .db()
        .assignments()
        .list(&AssignmentQuery {
            page: page_sort(query.limit, query.offset, query.sort, query.order.as_deref())?,
            team_id: Some(team_id),
            assignee_id: query.assignee_id,
            content_id: query.content_id,
            status,
        })
        .await?;

    Ok(Json(paginated(result)))
}

/// Tasks assigned to the caller, across all teams
#[utoipa::path(
    get,
    path = "/api/v1/tasks/mine",
    tag = "tasks",
    params(MyTasksQuery),
    responses(
        (status = 200, description = "Paginated tasks", body = PaginatedTasks)
    )
)]
#[instrument(skip(state))]
pub async fn my_tasks<D: Database>(
    State(state): State<AppState<D>>,
    user: CurrentUser,
    Query(query): Query<MyTasksQuery>,
) -> Result<Json<PaginatedTasks>, ApiError> {
    let status = parse_enum::<AssignmentStatus>(query.status.as_deref())?;

    let result = state
        .db()
        .assignments()
        .list(&AssignmentQuery {
            page: page_sort(query.limit, query.offset, query.sort, query.order.as_deref())?,
            assignee_id: Some(user.id().to_string()),
            status,
            ..Default::default()
        })
        .await?;

    Ok(Json(paginated(result)))
}

/// Get a task
#[utoipa::path(
    get,
    path = "/api/v1/tasks/{id}",
    tag = "tasks",
    params(("id" = String, Path, description = "Task ID")),
    responses(
        (status = 200, description = "Task found", body = TaskResponse),
        (status = 403, description = "Not a member", body = ErrorResponse),
        (status = 404, description = "Task not found", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn get_task<D: Database>(
    State(state): State<AppState<D>>,
    user: CurrentUser,
    Path(id): Path<String>,
) -> Result<Json<TaskResponse>, ApiError> {
    let task = state.db().assignments().get(&id).await?;
    access::require_member(
        team_role(state.db(), &task.team_id, user.id()).await?,
        "view this task",
    )?;
    Ok(Json(TaskResponse::from(task)))
}

/// Update a task
///
/// Updates only the fields provided in the request (PATCH semantics).
/// The creator, the assignee and team admins may update a task.
#[utoipa::path(
    patch,
    path = "/api/v1/tasks/{id}",
    tag = "tasks",
    params(("id" = String, Path, description = "Task ID")),
    request_body = UpdateTaskRequest,
    responses(
        (status = 200, description = "Task updated", body = TaskResponse),
        (status = 400, description = "Invalid request", body = ErrorResponse),
        (status = 403, description = "Not allowed to modify", body = ErrorResponse),
        (status = 404, description = "Task not found", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn update_task<D: Database>(
    State(state): State<AppState<D>>,
    user: CurrentUser,
    Path(id): Path<String>,
    ValidatedJson(req): ValidatedJson<UpdateTaskRequest>,
) -> Result<Json<TaskResponse>, ApiError> {
    let mut task = state.db().assignments().get(&id).await?;
    let role = team_role(state.db(), &task.team_id, user.id()).await?;
    if !access::can_modify_assignment(&task, user.id(), role) {
        return Err(ApiError::forbidden(
            "only the creator, the assignee or a team admin can update this task",
        ));
    }

    if let Some(assignee_id) = &req.assignee_id {
        let assignee_id = assignee_id.trim();
        require_team_member(&state, &task.team_id, assignee_id).await?;
        task.assignee_id = assignee_id.to_string();
    }
    if let Some(content_id) = req.content_id {
        require_team_content(&state, &task.team_id, &content_id).await?;
        task.content_id = Some(content_id);
    }
    if let Some(title) = req.title {
        task.title = title.trim().to_string();
    }
    if let Some(description) = req.description {
        task.description = Some(description);
    }
    if let Some(priority) = req.priority {
        task.priority = Some(priority);
    }
    if let Some(due_date) = parse_timestamp("due_date", req.due_date.as_deref())? {
        task.due_date = Some(due_date);
    }
    let from = task.status;
    if let Some(status) = parse_enum::<AssignmentStatus>(req.status.as_deref())? {
        assignment::apply_status(&mut task, status, &current_timestamp());
    }

    state.db().assignments().update(&task).await?;
    if task.status != from {
        info!(task_id = %id, from = %from, to = %task.status, "task status changed");
    }
    let updated = state.db().assignments().get(&id).await?;

    state
        .notifier()
        .notify(UpdateMessage::TaskUpdated { task_id: id });

    Ok(Json(TaskResponse::from(updated)))
}

/// Delete a task
#[utoipa::path(
    delete,
    path = "/api/v1/tasks/{id}",
    tag = "tasks",
    params(("id" = String, Path, description = "Task ID")),
    responses(
        (status = 204, description = "Task deleted"),
        (status = 403, description = "Not allowed to delete", body = ErrorResponse),
        (status = 404, description = "Task not found", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn delete_task<D: Database>(
    State(state): State<AppState<D>>,
    user: CurrentUser,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let task = state.db().assignments().get(&id).await?;
    let role = team_role(state.db(), &task.team_id, user.id()).await?;
    if !access::can_delete_assignment(&task, user.id(), role) {
        return Err(ApiError::forbidden(
            "only the creator or a team admin can delete this task",
        ));
    }

    state.db().assignments().delete(&id).await?;
    info!(task_id = %id, "task deleted");

    state
        .notifier()
        .notify(UpdateMessage::TaskDeleted { task_id: id });

    Ok(StatusCode::NO_CONTENT)
}

/// Comment on a task
#[utoipa::path(
    post,
    path = "/api/v1/tasks/{id}/comments",
    tag = "tasks",
    params(("id" = String, Path, description = "Task ID")),
    request_body = CreateCommentRequest,
    responses(
        (status = 201, description = "Comment added", body = CommentResponse),
        (status = 400, description = "Empty comment", body = ErrorResponse),
        (status = 403, description = "Not a member", body = ErrorResponse),
        (status = 404, description = "Task not found", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn add_task_comment<D: Database>(
    State(state): State<AppState<D>>,
    user: CurrentUser,
    Path(id): Path<String>,
    ValidatedJson(req): ValidatedJson<CreateCommentRequest>,
) -> Result<(StatusCode, Json<CommentResponse>), ApiError> {
    let task = state.db().assignments().get(&id).await?;
    access::require_member(
        team_role(state.db(), &task.team_id, user.id()).await?,
        "comment on this task",
    )?;

    let comment = state
        .db()
        .assignments()
        .add_comment(&TaskComment {
            id: String::new(),
            task_id: id.clone(),
            author_id: user.id().to_string(),
            content: req.content,
            created_at: String::new(),
        })
        .await?;

    state
        .notifier()
        .notify(UpdateMessage::TaskUpdated { task_id: id });

    Ok((StatusCode::CREATED, Json(CommentResponse::from(comment))))
}

/// List a task's comments, oldest first
#[utoipa::path(
    get,
    path = "/api/v1/tasks/{id}/comments",
    tag = "tasks",
    params(("id" = String, Path, description = "Task ID")),
    responses(
        (status = 200, description = "Comments", body = Vec<CommentResponse>),
        (status = 403, description = "Not a member", body = ErrorResponse),
        (status = 404, description = "Task not found", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn list_task_comments<D: Database>(
    State(state): State<AppState<D>>,
    user: CurrentUser,
    Path(id): Path<String>,
) -> Result<Json<Vec<CommentResponse>>, ApiError> {
    let task = state.db().assignments().get(&id).await?;
    access::require_member(
        team_role(state.db(), &task.team_id, user.id()).await?,
        "view comments on this task",
    )?;

    let comments = state.db().assignments().list_comments(&id).await?;
    Ok(Json(
        comments.into_iter().map(CommentResponse::from).collect(),
    ))
}
