//! Shared project handlers: the workspace two collaborators get once a
//! request is accepted.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};
use utoipa::ToSchema;

use crate::api::notifier::UpdateMessage;
use crate::api::validation::{
    optional_text, parse_enum, parse_timestamp, require_text, validate_url,
};
use crate::api::{ApiError, AppState, CurrentUser, ErrorResponse, Validate, ValidatedJson};
use crate::db::utils::current_timestamp;
use crate::db::{
    CollaborationRepository, CollaborationStatus, Database, SharedProject, SharedProjectLink,
    SharedProjectRepository, SharedProjectStatus, SharedProjectTask,
};
use crate::workflow::{assignment, collaboration};

const MAX_TITLE_LEN: usize = 200;
const MAX_DESCRIPTION_LEN: usize = 5000;
const MAX_LABEL_LEN: usize = 200;

// =============================================================================
// DTOs
// =============================================================================

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct SharedTaskResponse {
    pub id: String,
    pub project_id: String,
    pub title: String,
    pub assignee_id: Option<String>,
    pub is_completed: bool,
    pub due_date: Option<String>,
    pub created_at: String,
    pub completed_at: Option<String>,
}

impl From<SharedProjectTask> for SharedTaskResponse {
    fn from(t: SharedProjectTask) -> Self {
        Self {
            id: t.id,
            project_id: t.project_id,
            title: t.title,
            assignee_id: t.assignee_id,
            is_completed: t.is_completed,
            due_date: t.due_date,
            created_at: t.created_at,
            completed_at: t.completed_at,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct SharedLinkResponse {
    pub id: String,
    pub project_id: String,
    #[schema(example = "https://drive.example.com/folder/lisbon")]
    pub url: String,
    pub label: Option<String>,
    pub added_by: String,
    pub created_at: String,
}

impl From<SharedProjectLink> for SharedLinkResponse {
    fn from(l: SharedProjectLink) -> Self {
        Self {
            id: l.id,
            project_id: l.project_id,
            url: l.url,
            label: l.label,
            added_by: l.added_by,
            created_at: l.created_at,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct SharedProjectResponse {
    #[schema(example = "b8c9d0e1")]
    pub id: String,
    pub collaboration_request_id: String,
    pub title: String,
    pub description: Option<String>,
    /// The creator who sent the request
    pub owner_id: String,
    /// The creator who accepted it
    pub partner_id: String,
    #[schema(example = "active")]
    pub status: String,
    pub tasks: Vec<SharedTaskResponse>,
    pub links: Vec<SharedLinkResponse>,
    pub created_at: String,
    pub updated_at: String,
}

impl From<SharedProject> for SharedProjectResponse {
    fn from(p: SharedProject) -> Self {
        Self {
            id: p.id,
            collaboration_request_id: p.collaboration_request_id,
            title: p.title,
            description: p.description,
            owner_id: p.owner_id,
            partner_id: p.partner_id,
            status: p.status.to_string(),
            tasks: p.tasks.into_iter().map(SharedTaskResponse::from).collect(),
            links: p.links.into_iter().map(SharedLinkResponse::from).collect(),
            created_at: p.created_at,
            updated_at: p.updated_at,
        }
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateSharedProjectRequest {
    /// An accepted collaboration request
    pub collaboration_request_id: String,
}

impl Validate for CreateSharedProjectRequest {
    fn validate(&self) -> Result<(), ApiError> {
        require_text("collaboration_request_id", &self.collaboration_request_id, 64)
    }
}

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct UpdateSharedProjectRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    /// active, completed or archived
    pub status: Option<String>,
}

impl Validate for UpdateSharedProjectRequest {
    fn validate(&self) -> Result<(), ApiError> {
        if let Some(title) = &self.title {
            require_text("title", title, MAX_TITLE_LEN)?;
        }
        optional_text(
            "description",
            self.description.as_deref(),
            MAX_DESCRIPTION_LEN,
        )?;
        parse_enum::<SharedProjectStatus>(self.status.as_deref())?;
        Ok(())
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateSharedTaskRequest {
    #[schema(example = "Scout filming locations")]
    pub title: String,
    /// One of the two collaborators
    pub assignee_id: Option<String>,
    pub due_date: Option<String>,
}

impl Validate for CreateSharedTaskRequest {
    fn validate(&self) -> Result<(), ApiError> {
        require_text("title", &self.title, MAX_TITLE_LEN)?;
        parse_timestamp("due_date", self.due_date.as_deref())?;
        Ok(())
    }
}

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct UpdateSharedTaskRequest {
    pub title: Option<String>,
    pub assignee_id: Option<String>,
    pub is_completed: Option<bool>,
    pub due_date: Option<String>,
}

impl Validate for UpdateSharedTaskRequest {
    fn validate(&self) -> Result<(), ApiError> {
        if let Some(title) = &self.title {
            require_text("title", title, MAX_TITLE_LEN)?;
        }
        parse_timestamp("due_date", self.due_date.as_deref())?;
        Ok(())
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateLinkRequest {
    #[schema(example = "https://drive.example.com/folder/lisbon")]
    pub url: String,
    pub label: Option<String>,
}

impl Validate for CreateLinkRequest {
    fn validate(&self) -> Result<(), ApiError> {
        validate_url(&self.url)?;
        optional_text("label", self.label.as_deref(), MAX_LABEL_LEN)
    }
}

async fn load_project<D: Database>(
    state: &AppState<D>,
    id: &str,
    user_id: &str,
) -> Result<SharedProject, ApiError> {
    let project = state.db().shared_projects().get(id).await?;
    collaboration::require_participant(&project, user_id)?;
    Ok(project)
}

fn project_updated<D: Database>(state: &AppState<D>, project_id: &str) {
    state.notifier().notify(UpdateMessage::SharedProjectUpdated {
        project_id: project_id.to_string(),
    });
}

// =============================================================================
// Handlers
// =============================================================================

/// Open the shared project of an accepted request
///
/// Idempotent: returns the existing project when one was already opened.
#[utoipa::path(
    post,
    path = "/api/v1/shared-projects",
    tag = "shared-projects",
    request_body = CreateSharedProjectRequest,
    responses(
        (status = 200, description = "Existing project", body = SharedProjectResponse),
        (status = 201, description = "Project created", body = SharedProjectResponse),
        (status = 403, description = "Not a party to the request", body = ErrorResponse),
        (status = 404, description = "Request not found", body = ErrorResponse),
        (status = 409, description = "Request is not accepted", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn create_shared_project<D: Database>(
    State(state): State<AppState<D>>,
    user: CurrentUser,
    ValidatedJson(req): ValidatedJson<CreateSharedProjectRequest>,
) -> Result<(StatusCode, Json<SharedProjectResponse>), ApiError> {
    let request = state
        .db()
        .collaborations()
        .get(req.collaboration_request_id.trim())
        .await?;

    if !collaboration::is_party(&request, user.id()) {
        return Err(ApiError::forbidden(
            "only the sender or recipient can open this shared project",
        ));
    }
    if request.status != CollaborationStatus::Accepted {
        return Err(ApiError::Conflict(format!(
            "collaboration request '{}' is {}, not accepted",
            request.id, request.status
        )));
    }

    let (project, created) = state
        .db()
        .shared_projects()
        .create_or_get(&SharedProject {
            id: String::new(),
            collaboration_request_id: request.id.clone(),
            title: request.title,
            description: request.message,
            owner_id: request.sender_id,
            partner_id: request.recipient_id,
            status: SharedProjectStatus::Active,
            tasks: vec![],
            links: vec![],
            created_at: String::new(),
            updated_at: String::new(),
        })
        .await?;

    if created {
        info!(project_id = %project.id, request_id = %request.id, "shared project opened");
        state.notifier().notify(UpdateMessage::SharedProjectCreated {
            project_id: project.id.clone(),
        });
        Ok((StatusCode::CREATED, Json(SharedProjectResponse::from(project))))
    } else {
        Ok((StatusCode::OK, Json(SharedProjectResponse::from(project))))
    }
}

/// List the caller's shared projects
///
/// Tasks and links are omitted; fetch a project to see them.
#[utoipa::path(
    get,
    path = "/api/v1/shared-projects",
    tag = "shared-projects",
    responses(
        (status = 200, description = "Shared projects, most recently updated first", body = Vec<SharedProjectResponse>)
    )
)]
#[instrument(skip(state))]
pub async fn list_shared_projects<D: Database>(
    State(state): State<AppState<D>>,
    user: CurrentUser,
) -> Result<Json<Vec<SharedProjectResponse>>, ApiError> {
    let projects = state.db().shared_projects().list_for_user(user.id()).await?;
    Ok(Json(
        projects
            .into_iter()
            .map(SharedProjectResponse::from)
            .collect(),
    ))
}

/// Get a shared project with its tasks and links
#[utoipa::path(
    get,
    path = "/api/v1/shared-projects/{id}",
    tag = "shared-projects",
    params(("id" = String, Path, description = "Shared project ID")),
    responses(
        (status = 200, description = "Project found", body = SharedProjectResponse),
        (status = 403, description = "Not a collaborator", body = ErrorResponse),
        (status = 404, description = "Project not found", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn get_shared_project<D: Database>(
    State(state): State<AppState<D>>,
    user: CurrentUser,
    Path(id): Path<String>,
) -> Result<Json<SharedProjectResponse>, ApiError> {
    let project = load_project(&state, &id, user.id()).await?;
    Ok(Json(SharedProjectResponse::from(project)))
}

/// Update a shared project
#[utoipa::path(
    patch,
    path = "/api/v1/shared-projects/{id}",
    tag = "shared-projects",
    params(("id" = String, Path, description = "Shared project ID")),
    request_body = UpdateSharedProjectRequest,
    responses(
        (status = 200, description = "Project updated", body = SharedProjectResponse),
        (status = 400, description = "Invalid request", body = ErrorResponse),
        (status = 403, description = "Not a collaborator", body = ErrorResponse),
        (status = 404, description = "Project not found", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn update_shared_project<D: Database>(
    State(state): State<AppState<D>>,
    user: CurrentUser,
    Path(id): Path<String>,
    ValidatedJson(req): ValidatedJson<UpdateSharedProjectRequest>,
) -> Result<Json<SharedProjectResponse>, ApiError> {
    let mut project = load_project(&state, &id, user.id()).await?;

    if let Some(title) = req.title {
        project.title = title.trim().to_string();
    }
    if let Some(description) = req.description {
        project.description = Some(description);
    }
    if let Some(status) = parse_enum::<SharedProjectStatus>(req.status.as_deref())? {
        project.status = status;
    }

    state.db().shared_projects().update(&project).await?;
    project_updated(&state, &id);

    let updated = state.db().shared_projects().get(&id).await?;
    Ok(Json(SharedProjectResponse::from(updated)))
}

/// Add a checklist task to a shared project
#[utoipa::path(
    post,
    path = "/api/v1/shared-projects/{id}/tasks",
    tag = "shared-projects",
    params(("id" = String, Path, description = "Shared project ID")),
    request_body = CreateSharedTaskRequest,
    responses(
        (status = 201, description = "Task added", body = SharedTaskResponse),
        (status = 400, description = "Invalid request or assignee", body = ErrorResponse),
        (status = 403, description = "Not a collaborator", body = ErrorResponse),
        (status = 404, description = "Project not found", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn add_shared_task<D: Database>(
    State(state): State<AppState<D>>,
    user: CurrentUser,
    Path(id): Path<String>,
    ValidatedJson(req): ValidatedJson<CreateSharedTaskRequest>,
) -> Result<(StatusCode, Json<SharedTaskResponse>), ApiError> {
    let project = load_project(&state, &id, user.id()).await?;
    collaboration::check_shared_assignee(&project, req.assignee_id.as_deref())?;

    let task = state
        .db()
        .shared_projects()
        .add_task(&SharedProjectTask {
            id: String::new(),
            project_id: id.clone(),
            title: req.title.trim().to_string(),
            assignee_id: req.assignee_id,
            is_completed: false,
            due_date: parse_timestamp("due_date", req.due_date.as_deref())?,
            created_at: String::new(),
            completed_at: None,
        })
        .await?;

    project_updated(&state, &id);
    Ok((StatusCode::CREATED, Json(SharedTaskResponse::from(task))))
}

/// Update a shared project task
#[utoipa::path(
    patch,
    path = "/api/v1/shared-projects/{id}/tasks/{task_id}",
    tag = "shared-projects",
    params(
        ("id" = String, Path, description = "Shared project ID"),
        ("task_id" = String, Path, description = "Task ID")
    ),
    request_body = UpdateSharedTaskRequest,
    responses(
        (status = 200, description = "Task updated", body = SharedTaskResponse),
        (status = 400, description = "Invalid request or assignee", body = ErrorResponse),
        (status = 403, description = "Not a collaborator", body = ErrorResponse),
        (status = 404, description = "Project or task not found", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn update_shared_task<D: Database>(
    State(state): State<AppState<D>>,
    user: CurrentUser,
    Path((id, task_id)): Path<(String, String)>,
    ValidatedJson(req): ValidatedJson<UpdateSharedTaskRequest>,
) -> Result<Json<SharedTaskResponse>, ApiError> {
    let project = load_project(&state, &id, user.id()).await?;
    let mut task = state.db().shared_projects().get_task(&id, &task_id).await?;

    if let Some(assignee_id) = req.assignee_id {
        collaboration::check_shared_assignee(&project, Some(&assignee_id))?;
        task.assignee_id = Some(assignee_id);
    }
    if let Some(title) = req.title {
        task.title = title.trim().to_string();
    }
    if let Some(due_date) = parse_timestamp("due_date", req.due_date.as_deref())? {
        task.due_date = Some(due_date);
    }
    if let Some(completed) = req.is_completed {
        assignment::set_shared_task_completion(&mut task, completed, &current_timestamp());
    }

    state.db().shared_projects().update_task(&task).await?;
    project_updated(&state, &id);

    Ok(Json(SharedTaskResponse::from(task)))
}

/// Delete a shared project task
#[utoipa::path(
    delete,
    path = "/api/v1/shared-projects/{id}/tasks/{task_id}",
    tag = "shared-projects",
    params(
        ("id" = String, Path, description = "Shared project ID"),
        ("task_id" = String, Path, description = "Task ID")
    ),
    responses(
        (status = 204, description = "Task deleted"),
        (status = 403, description = "Not a collaborator", body = ErrorResponse),
        (status = 404, description = "Project or task not found", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn delete_shared_task<D: Database>(
    State(state): State<AppState<D>>,
    user: CurrentUser,
    Path((id, task_id)): Path<(String, String)>,
) -> Result<StatusCode, ApiError> {
    load_project(&state, &id, user.id()).await?;
    state.db().shared_projects().delete_task(&id, &task_id).await?;
    project_updated(&state, &id);
    Ok(StatusCode::NO_CONTENT)
}

/// Attach a link to a shared project
#[utoipa::path(
    post,
    path = "/api/v1/shared-projects/{id}/links",
    tag = "shared-projects",
    params(("id" = String, Path, description = "Shared project ID")),
    request_body = CreateLinkRequest,
    responses(
        (status = 201, description = "Link added", body = SharedLinkResponse),
        (status = 400, description = "Invalid URL", body = ErrorResponse),
        (status = 403, description = "Not a collaborator", body = ErrorResponse),
        (status = 404, description = "Project not found", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn add_shared_link<D: Database>(
    State(state): State<AppState<D>>,
    user: CurrentUser,
    Path(id): Path<String>,
    ValidatedJson(req): ValidatedJson<CreateLinkRequest>,
) -> Result<(StatusCode, Json<SharedLinkResponse>), ApiError> {
    load_project(&state, &id, user.id()).await?;

    let link = state
        .db()
        .shared_projects()
        .add_link(&SharedProjectLink {
            id: String::new(),
            project_id: id.clone(),
            url: req.url.trim().to_string(),
            label: req.label,
            added_by: user.id().to_string(),
            created_at: String::new(),
        })
        .await?;

    project_updated(&state, &id);
    Ok((StatusCode::CREATED, Json(SharedLinkResponse::from(link))))
}

/// Remove a link from a shared project
#[utoipa::path(
    delete,
    path = "/api/v1/shared-projects/{id}/links/{link_id}",
    tag = "shared-projects",
    params(
        ("id" = String, Path, description = "Shared project ID"),
        ("link_id" = String, Path, description = "Link ID")
    ),
    responses(
        (status = 204, description = "Link removed"),
        (status = 403, description = "Not a collaborator", body = ErrorResponse),
        (status = 404, description = "Project or link not found", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn delete_shared_link<D: Database>(
    State(state): State<AppState<D>>,
    user: CurrentUser,
    Path((id, link_id)): Path<(String, String)>,
) -> Result<StatusCode, ApiError> {
    load_project(&state, &id, user.id()).await?;
    state.db().shared_projects().delete_link(&id, &link_id).await?;
    project_updated(&state, &id);
    Ok(StatusCode::NO_CONTENT)
}
