use crate::cli::api_client::ApiClient;
use crate::cli::error::CliResult;
use crate::cli::utils::{apply_table_style, short_timestamp, truncate_with_ellipsis};
use serde::{Deserialize, Serialize};
use tabled::{Table, Tabled};

#[derive(Debug, Serialize, Deserialize)]
pub struct Message {
    pub id: String,
    pub conversation_id: String,
    pub sender_id: String,
    pub content: String,
    pub created_at: String,
    pub read_at: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ConversationSummary {
    pub id: String,
    pub participant_ids: Vec<String>,
    pub created_at: String,
    pub updated_at: String,
    pub unread_count: usize,
    pub last_message: Option<Message>,
}

#[derive(Debug, Deserialize)]
struct UnreadCountResponse {
    unread_count: u64,
}

#[derive(Debug, Deserialize)]
struct MarkReadResponse {
    updated: u64,
}

#[derive(Debug, Serialize)]
pub(crate) struct SendMessageRequest {
    pub(crate) content: String,
}

#[derive(Tabled)]
pub(crate) struct ConversationDisplay {
    #[tabled(rename = "ID")]
    pub(crate) id: String,
    #[tabled(rename = "With")]
    pub(crate) with: String,
    #[tabled(rename = "Unread")]
    pub(crate) unread: usize,
    #[tabled(rename = "Last message")]
    pub(crate) last_message: String,
    #[tabled(rename = "Updated")]
    pub(crate) updated_at: String,
}

impl ConversationDisplay {
    /// Build a row from the point of view of `viewer_id`.
    pub(crate) fn for_viewer(summary: &ConversationSummary, viewer_id: &str) -> Self {
        let others: Vec<&str> = summary
            .participant_ids
            .iter()
            .map(String::as_str)
            .filter(|id| *id != viewer_id)
            .collect();

        Self {
            id: summary.id.clone(),
            with: if others.is_empty() {
                "-".to_string()
            } else {
                others.join(", ")
            },
            unread: summary.unread_count,
            last_message: summary
                .last_message
                .as_ref()
                .map(|m| truncate_with_ellipsis(&m.content, 40))
                .unwrap_or_else(|| "-".to_string()),
            updated_at: short_timestamp(Some(&summary.updated_at)),
        }
    }
}

/// List the current user's conversations, most recent first
pub async fn list_conversations(api_client: &ApiClient, format: &str) -> CliResult<String> {
    let user_id = api_client.require_user()?;

    let response = api_client.get("/api/v1/conversations").send().await?;
    let conversations: Vec<ConversationSummary> = ApiClient::handle_response(response).await?;

    match format {
        "json" => Ok(serde_json::to_string_pretty(&conversations)?),
        _ => Ok(format_table(&conversations, user_id)),
    }
}

pub(crate) fn format_table(conversations: &[ConversationSummary], viewer_id: &str) -> String {
    if conversations.is_empty() {
        return "No conversations found.".to_string();
    }

    let rows: Vec<ConversationDisplay> = conversations
        .iter()
        .map(|c| ConversationDisplay::for_viewer(c, viewer_id))
        .collect();
    let mut table = Table::new(rows);
    apply_table_style(&mut table);
    table.to_string()
}

/// Total unread messages across all conversations
pub async fn unread(api_client: &ApiClient) -> CliResult<String> {
    api_client.require_user()?;

    let response = api_client.get("/api/v1/messages/unread").send().await?;
    let body: UnreadCountResponse = ApiClient::handle_response(response).await?;

    Ok(match body.unread_count {
        0 => "No unread messages.".to_string(),
        1 => "1 unread message".to_string(),
        n => format!("{} unread messages", n),
    })
}

/// Send a message to a conversation
pub async fn send(api_client: &ApiClient, conversation_id: &str, content: &str) -> CliResult<String> {
    api_client.require_user()?;

    let response = api_client
        .post(&format!("/api/v1/conversations/{}/messages", conversation_id))
        .json(&SendMessageRequest {
            content: content.to_string(),
        })
        .send()
        .await?;

    let message: Message = ApiClient::handle_response(response).await?;
    Ok(format!("✓ Sent message {}", message.id))
}

/// Mark every message from others in a conversation as read
pub async fn mark_read(api_client: &ApiClient, conversation_id: &str) -> CliResult<String> {
    api_client.require_user()?;

    let response = api_client
        .post(&format!("/api/v1/conversations/{}/read", conversation_id))
        .send()
        .await?;

    let body: MarkReadResponse = ApiClient::handle_response(response).await?;
    Ok(format!("✓ Marked {} message(s) as read", body.updated))
}
