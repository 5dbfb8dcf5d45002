//! Direct messaging handlers.

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};
use utoipa::{IntoParams, ToSchema};

use super::page_sort;
use crate::api::notifier::UpdateMessage;
use crate::api::validation::require_text;
use crate::api::{ApiError, AppState, CurrentUser, ErrorResponse, Validate, ValidatedJson};
use crate::db::{
    Conversation, ConversationSummary, Database, Message, MessagingRepository, UserRepository,
};

const MAX_MESSAGE_LEN: usize = 10000;

// =============================================================================
// DTOs
// =============================================================================

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ConversationResponse {
    #[schema(example = "f6a7b8c9")]
    pub id: String,
    pub participant_ids: Vec<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl From<Conversation> for ConversationResponse {
    fn from(c: Conversation) -> Self {
        Self {
            id: c.id,
            participant_ids: c.participant_ids,
            created_at: c.created_at,
            updated_at: c.updated_at,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct MessageResponse {
    pub id: String,
    pub conversation_id: String,
    pub sender_id: String,
    pub content: String,
    pub created_at: String,
    pub read_at: Option<String>,
}

impl From<Message> for MessageResponse {
    fn from(m: Message) -> Self {
        Self {
            id: m.id,
            conversation_id: m.conversation_id,
            sender_id: m.sender_id,
            content: m.content,
            created_at: m.created_at,
            read_at: m.read_at,
        }
    }
}

/// Inbox entry
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ConversationSummaryResponse {
    pub id: String,
    pub participant_ids: Vec<String>,
    pub created_at: String,
    pub updated_at: String,
    /// Messages from others the caller has not read
    pub unread_count: usize,
    pub last_message: Option<MessageResponse>,
}

impl From<ConversationSummary> for ConversationSummaryResponse {
    fn from(s: ConversationSummary) -> Self {
        Self {
            id: s.conversation.id,
            participant_ids: s.conversation.participant_ids,
            created_at: s.conversation.created_at,
            updated_at: s.conversation.updated_at,
            unread_count: s.unread_count,
            last_message: s.last_message.map(MessageResponse::from),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct PaginatedMessages {
    pub items: Vec<MessageResponse>,
    pub total: usize,
    pub limit: usize,
    pub offset: usize,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct MarkReadResponse {
    /// Number of messages newly marked as read
    pub updated: u64,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct UnreadCountResponse {
    pub unread_count: u64,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct StartConversationRequest {
    /// The other participant
    pub participant_id: String,
}

impl Validate for StartConversationRequest {
    fn validate(&self) -> Result<(), ApiError> {
        require_text("participant_id", &self.participant_id, 64)
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct SendMessageRequest {
    #[schema(example = "Want to film the market together on Saturday?")]
    pub content: String,
}

impl Validate for SendMessageRequest {
    fn validate(&self) -> Result<(), ApiError> {
        require_text("content", &self.content, MAX_MESSAGE_LEN)
    }
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct ListMessagesQuery {
    pub limit: Option<usize>,
    pub offset: Option<usize>,
}

async fn load_conversation<D: Database>(
    state: &AppState<D>,
    id: &str,
    user_id: &str,
) -> Result<Conversation, ApiError> {
    let conversation = state.db().messaging().get_conversation(id).await?;
    if !conversation.participant_ids.iter().any(|p| p == user_id) {
        return Err(ApiError::forbidden(format!(
            "you are not a participant in conversation '{}'",
            id
        )));
    }
    Ok(conversation)
}

// =============================================================================
// Handlers
// =============================================================================

/// Start or resume a direct conversation
///
/// Returns the existing conversation between the two users when there is
/// one.
#[utoipa::path(
    post,
    path = "/api/v1/conversations",
    tag = "messaging",
    request_body = StartConversationRequest,
    responses(
        (status = 200, description = "Existing conversation", body = ConversationResponse),
        (status = 201, description = "Conversation created", body = ConversationResponse),
        (status = 400, description = "Cannot message yourself", body = ErrorResponse),
        (status = 404, description = "User not found", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn start_conversation<D: Database>(
    State(state): State<AppState<D>>,
    user: CurrentUser,
    ValidatedJson(req): ValidatedJson<StartConversationRequest>,
) -> Result<(StatusCode, Json<ConversationResponse>), ApiError> {
    let other = req.participant_id.trim();
    if other == user.id() {
        return Err(ApiError::validation("cannot start a conversation with yourself"));
    }
    state.db().users().get(other).await?;

    if let Some(existing) = state.db().messaging().find_direct(user.id(), other).await? {
        return Ok((StatusCode::OK, Json(ConversationResponse::from(existing))));
    }

    let created = state
        .db()
        .messaging()
        .create_conversation(&[user.id().to_string(), other.to_string()])
        .await?;
    debug!(conversation_id = %created.id, "conversation created");

    Ok((StatusCode::CREATED, Json(ConversationResponse::from(created))))
}

/// The caller's inbox
#[utoipa::path(
    get,
    path = "/api/v1/conversations",
    tag = "messaging",
    responses(
        (status = 200, description = "Conversations, most recent first", body = Vec<ConversationSummaryResponse>)
    )
)]
#[instrument(skip(state))]
pub async fn list_conversations<D: Database>(
    State(state): State<AppState<D>>,
    user: CurrentUser,
) -> Result<Json<Vec<ConversationSummaryResponse>>, ApiError> {
    let summaries = state.db().messaging().list_for_user(user.id()).await?;
    Ok(Json(
        summaries
            .into_iter()
            .map(ConversationSummaryResponse::from)
            .collect(),
    ))
}

/// Messages of a conversation, newest first
#[utoipa::path(
    get,
    path = "/api/v1/conversations/{id}/messages",
    tag = "messaging",
    params(("id" = String, Path, description = "Conversation ID"), ListMessagesQuery),
    responses(
        (status = 200, description = "Paginated messages", body = PaginatedMessages),
        (status = 403, description = "Not a participant", body = ErrorResponse),
        (status = 404, description = "Conversation not found", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn list_messages<D: Database>(
    State(state): State<AppState<D>>,
    user: CurrentUser,
    Path(id): Path<String>,
    Query(query): Query<ListMessagesQuery>,
) -> Result<Json<PaginatedMessages>, ApiError> {
    load_conversation(&state, &id, user.id()).await?;

    let page = page_sort(query.limit, query.offset, None, None)?;
    let result = state.db().messaging().list_messages(&id, &page).await?;

    Ok(Json(PaginatedMessages {
        items: result.items.into_iter().map(MessageResponse::from).collect(),
        total: result.total,
        limit: result.limit.unwrap_or(super::DEFAULT_LIMIT),
        offset: result.offset,
    }))
}

/// Send a message
#[utoipa::path(
    post,
    path = "/api/v1/conversations/{id}/messages",
    tag = "messaging",
    params(("id" = String, Path, description = "Conversation ID")),
    request_body = SendMessageRequest,
    responses(
        (status = 201, description = "Message sent", body = MessageResponse),
        (status = 400, description = "Empty message", body = ErrorResponse),
        (status = 403, description = "Not a participant", body = ErrorResponse),
        (status = 404, description = "Conversation not found", body = ErrorResponse)
    )
)]
#[instrument(skip(state, req))]
pub async fn send_message<D: Database>(
    State(state): State<AppState<D>>,
    user: CurrentUser,
    Path(id): Path<String>,
    ValidatedJson(req): ValidatedJson<SendMessageRequest>,
) -> Result<(StatusCode, Json<MessageResponse>), ApiError> {
    load_conversation(&state, &id, user.id()).await?;

    let message = state
        .db()
        .messaging()
        .add_message(&Message {
            id: String::new(),
            conversation_id: id.clone(),
            sender_id: user.id().to_string(),
            content: req.content,
            created_at: String::new(),
            read_at: None,
        })
        .await?;
    debug!(conversation_id = %id, message_id = %message.id, "message sent");

    state.notifier().notify(UpdateMessage::MessageSent {
        conversation_id: id,
        message_id: message.id.clone(),
    });

    Ok((StatusCode::CREATED, Json(MessageResponse::from(message))))
}

/// Mark a conversation as read
#[utoipa::path(
    post,
    path = "/api/v1/conversations/{id}/read",
    tag = "messaging",
    params(("id" = String, Path, description = "Conversation ID")),
    responses(
        (status = 200, description = "Messages marked as read", body = MarkReadResponse),
        (status = 403, description = "Not a participant", body = ErrorResponse),
        (status = 404, description = "Conversation not found", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn mark_conversation_read<D: Database>(
    State(state): State<AppState<D>>,
    user: CurrentUser,
    Path(id): Path<String>,
) -> Result<Json<MarkReadResponse>, ApiError> {
    load_conversation(&state, &id, user.id()).await?;

    let updated = state.db().messaging().mark_read(&id, user.id()).await?;
    if updated > 0 {
        state.notifier().notify(UpdateMessage::ConversationRead {
            conversation_id: id,
            user_id: user.id().to_string(),
        });
    }

    Ok(Json(MarkReadResponse { updated }))
}

/// Unread messages across all of the caller's conversations
#[utoipa::path(
    get,
    path = "/api/v1/messages/unread",
    tag = "messaging",
    responses(
        (status = 200, description = "Unread count", body = UnreadCountResponse)
    )
)]
#[instrument(skip(state))]
pub async fn unread_count<D: Database>(
    State(state): State<AppState<D>>,
    user: CurrentUser,
) -> Result<Json<UnreadCountResponse>, ApiError> {
    let unread_count = state.db().messaging().unread_count(user.id()).await?;
    Ok(Json(UnreadCountResponse { unread_count }))
}
