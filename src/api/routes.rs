//! API route configuration.

use axum::Router;
use axum::routing::{delete, get, patch, post, put};
use utoipa::OpenApi;
use utoipa_scalar::{Scalar, Servable};

use super::error::ErrorResponse;
use super::state::AppState;
use super::v1::{self, *};
use super::websocket;
use crate::db::Database;

/// Build routes with generic database type.
///
/// This macro reduces boilerplate when registering handlers that are generic
/// over the Database trait. It applies the turbofish operator automatically.
macro_rules! routes {
    ($D:ty => {
        $($method:ident $path:literal => $($handler:ident)::+),* $(,)?
    }) => {{
        let router = Router::new();
        $(
            let router = router.route($path, $method($($handler)::+::<$D>));
        )*
        router
    }};
}

/// OpenAPI documentation
#[derive(OpenApi)]
#[openapi(
    info(
        title = "VlogForge API",
        version = "0.1.0",
        description = "Content planning and collaboration API for video creators",
        license(name = "MIT")
    ),
    paths(
        v1::root,
        v1::health,
        v1::create_user,
        v1::get_user,
        v1::get_me,
        v1::update_me,
        v1::create_team,
        v1::list_teams,
        v1::get_team,
        v1::update_team,
        v1::delete_team,
        v1::add_member,
        v1::update_member,
        v1::remove_member,
        v1::get_workflow,
        v1::update_workflow,
        v1::create_content,
        v1::list_content,
        v1::content_calendar,
        v1::content_stats,
        v1::get_content,
        v1::update_content,
        v1::change_content_status,
        v1::delete_content,
        v1::submit_for_approval,
        v1::list_content_approvals,
        v1::list_team_approvals,
        v1::decide_approval,
        v1::create_task,
        v1::list_team_tasks,
        v1::my_tasks,
        v1::get_task,
        v1::update_task,
        v1::delete_task,
        v1::add_task_comment,
        v1::list_task_comments,
        v1::start_conversation,
        v1::list_conversations,
        v1::list_messages,
        v1::send_message,
        v1::mark_conversation_read,
        v1::unread_count,
        v1::create_collaboration,
        v1::list_collaborations,
        v1::get_collaboration,
        v1::accept_collaboration,
        v1::decline_collaboration,
        v1::cancel_collaboration,
        v1::create_shared_project,
        v1::list_shared_projects,
        v1::get_shared_project,
        v1::update_shared_project,
        v1::add_shared_task,
        v1::update_shared_task,
        v1::delete_shared_task,
        v1::add_shared_link,
        v1::delete_shared_link,
    ),
    components(
        schemas(
            HealthResponse,
            ErrorResponse,
            UserResponse,
            CreateUserRequest,
            UpdateProfileRequest,
            TeamResponse,
            TeamDetailResponse,
            MemberResponse,
            CreateTeamRequest,
            UpdateTeamRequest,
            AddMemberRequest,
            UpdateMemberRequest,
            WorkflowResponse,
            UpdateWorkflowRequest,
            ContentResponse,
            PaginatedContent,
            ContentStatsResponse,
            StatusCount,
            CreateContentRequest,
            UpdateContentRequest,
            ChangeStatusRequest,
            ApprovalResponse,
            PaginatedApprovals,
            ApprovalDecisionResponse,
            SubmitApprovalRequest,
            DecideApprovalRequest,
            TaskResponse,
            PaginatedTasks,
            CommentResponse,
            CreateTaskRequest,
            UpdateTaskRequest,
            CreateCommentRequest,
            ConversationResponse,
            ConversationSummaryResponse,
            MessageResponse,
            PaginatedMessages,
            MarkReadResponse,
            UnreadCountResponse,
            StartConversationRequest,
            SendMessageRequest,
            CollaborationResponse,
            PaginatedCollaborations,
            AcceptCollaborationResponse,
            CreateCollaborationRequest,
            SharedProjectResponse,
            SharedTaskResponse,
            SharedLinkResponse,
            CreateSharedProjectRequest,
            UpdateSharedProjectRequest,
            CreateSharedTaskRequest,
            UpdateSharedTaskRequest,
            CreateLinkRequest,
        )
    ),
    tags(
        (name = "system", description = "System health and status endpoints"),
        (name = "users", description = "Registration and creator profiles"),
        (name = "teams", description = "Teams, members and approval workflow"),
        (name = "content", description = "Content planning and status"),
        (name = "approvals", description = "Content approval requests and decisions"),
        (name = "tasks", description = "Team task assignments"),
        (name = "messaging", description = "Direct conversations"),
        (name = "collaborations", description = "Collaboration requests between creators"),
        (name = "shared-projects", description = "Workspaces for accepted collaborations")
    )
)]
pub struct ApiDoc;

/// Create the API router with OpenAPI documentation
pub fn create_router<D: Database + 'static>(state: AppState<D>) -> Router {
    let api = ApiDoc::openapi();

    // System routes (non-generic)
    let system_routes = Router::new()
        .route("/", get(v1::root))
        .route("/health", get(v1::health));

    let user_routes = routes!(D => {
        post "/users" => v1::create_user,
        get "/users/{id}" => v1::get_user,
        get "/me" => v1::get_me,
        patch "/me" => v1::update_me,
    });

    let team_routes = routes!(D => {
        get "/teams" => v1::list_teams,
        post "/teams" => v1::create_team,
        get "/teams/{id}" => v1::get_team,
        patch "/teams/{id}" => v1::update_team,
        delete "/teams/{id}" => v1::delete_team,
        post "/teams/{id}/members" => v1::add_member,
        patch "/teams/{id}/members/{user_id}" => v1::update_member,
        delete "/teams/{id}/members/{user_id}" => v1::remove_member,
        get "/teams/{id}/workflow" => v1::get_workflow,
        put "/teams/{id}/workflow" => v1::update_workflow,
        get "/teams/{id}/approvals" => v1::list_team_approvals,
        get "/teams/{id}/tasks" => v1::list_team_tasks,
        post "/teams/{id}/tasks" => v1::create_task,
    });

    // Static segments take priority over `{id}`
    let content_routes = routes!(D => {
        get "/content" => v1::list_content,
        post "/content" => v1::create_content,
        get "/content/calendar" => v1::content_calendar,
        get "/content/stats" => v1::content_stats,
        get "/content/{id}" => v1::get_content,
        patch "/content/{id}" => v1::update_content,
        delete "/content/{id}" => v1::delete_content,
        put "/content/{id}/status" => v1::change_content_status,
        get "/content/{id}/approvals" => v1::list_content_approvals,
        post "/content/{id}/approvals" => v1::submit_for_approval,
        put "/approvals/{id}" => v1::decide_approval,
    });

    let task_routes = routes!(D => {
        get "/tasks/mine" => v1::my_tasks,
        get "/tasks/{id}" => v1::get_task,
        patch "/tasks/{id}" => v1::update_task,
        delete "/tasks/{id}" => v1::delete_task,
        get "/tasks/{id}/comments" => v1::list_task_comments,
        post "/tasks/{id}/comments" => v1::add_task_comment,
    });

    let messaging_routes = routes!(D => {
        get "/conversations" => v1::list_conversations,
        post "/conversations" => v1::start_conversation,
        get "/conversations/{id}/messages" => v1::list_messages,
        post "/conversations/{id}/messages" => v1::send_message,
        post "/conversations/{id}/read" => v1::mark_conversation_read,
        get "/messages/unread" => v1::unread_count,
    });

    let collaboration_routes = routes!(D => {
        get "/collaborations" => v1::list_collaborations,
        post "/collaborations" => v1::create_collaboration,
        get "/collaborations/{id}" => v1::get_collaboration,
        post "/collaborations/{id}/accept" => v1::accept_collaboration,
        post "/collaborations/{id}/decline" => v1::decline_collaboration,
        post "/collaborations/{id}/cancel" => v1::cancel_collaboration,
        get "/shared-projects" => v1::list_shared_projects,
        post "/shared-projects" => v1::create_shared_project,
        get "/shared-projects/{id}" => v1::get_shared_project,
        patch "/shared-projects/{id}" => v1::update_shared_project,
        post "/shared-projects/{id}/tasks" => v1::add_shared_task,
        patch "/shared-projects/{id}/tasks/{task_id}" => v1::update_shared_task,
        delete "/shared-projects/{id}/tasks/{task_id}" => v1::delete_shared_task,
        post "/shared-projects/{id}/links" => v1::add_shared_link,
        delete "/shared-projects/{id}/links/{link_id}" => v1::delete_shared_link,
    });

    let api_routes = user_routes
        .merge(team_routes)
        .merge(content_routes)
        .merge(task_routes)
        .merge(messaging_routes)
        .merge(collaboration_routes);

    system_routes
        .route("/ws", get(websocket::ws_handler::<D>))
        .nest("/api/v1", api_routes)
        .merge(Scalar::with_url("/docs", api))
        .with_state(state)
}
