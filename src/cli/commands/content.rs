use crate::cli::api_client::ApiClient;
use crate::cli::commands::PageParams;
use crate::cli::error::CliResult;
use crate::cli::utils::{
    apply_table_style, format_tags, or_dash, parse_tags, short_timestamp, truncate_with_ellipsis,
};
use serde::{Deserialize, Serialize};
use tabled::{Table, Tabled};

#[derive(Debug, Serialize, Deserialize)]
pub struct ContentItem {
    pub id: String,
    pub owner_id: String,
    pub team_id: Option<String>,
    pub title: String,
    pub description: Option<String>,
    pub notes: Option<String>,
    pub platform: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    pub status: String,
    pub scheduled_at: Option<String>,
    pub published_at: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Serialize)]
pub(crate) struct CreateContentRequest {
    pub(crate) title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) platform: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) tags: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) team_id: Option<String>,
}

#[derive(Debug, Serialize)]
pub(crate) struct ChangeStatusRequest {
    pub(crate) status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) scheduled_at: Option<String>,
}

#[derive(Tabled)]
pub(crate) struct ContentDisplay {
    #[tabled(rename = "ID")]
    pub(crate) id: String,
    #[tabled(rename = "Title")]
    pub(crate) title: String,
    #[tabled(rename = "Status")]
    pub(crate) status: String,
    #[tabled(rename = "Platform")]
    pub(crate) platform: String,
    #[tabled(rename = "Scheduled")]
    pub(crate) scheduled_at: String,
}

impl From<&ContentItem> for ContentDisplay {
    fn from(item: &ContentItem) -> Self {
        Self {
            id: item.id.clone(),
            title: truncate_with_ellipsis(&item.title, 50),
            status: item.status.clone(),
            platform: or_dash(item.platform.as_deref()),
            scheduled_at: short_timestamp(item.scheduled_at.as_deref()),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct ContentListResponse {
    items: Vec<ContentItem>,
    total: usize,
    limit: usize,
    offset: usize,
}

/// Filter parameters for listing content
#[derive(Debug, Default)]
pub struct ListContentFilter<'a> {
    pub status: Option<&'a str>,
    pub team_id: Option<&'a str>,
    pub page: PageParams,
}

/// List content visible to the current user
pub async fn list_content(
    api_client: &ApiClient,
    filter: ListContentFilter<'_>,
    format: &str,
) -> CliResult<String> {
    api_client.require_user()?;

    let mut request = api_client.get("/api/v1/content");
    if let Some(s) = filter.status {
        request = request.query(&[("status", s)]);
    }
    if let Some(t) = filter.team_id {
        request = request.query(&[("team_id", t)]);
    }
    request = request.query(&filter.page.query());

    let response: ContentListResponse =
        ApiClient::handle_response(request.send().await?).await?;

    match format {
        "json" => Ok(serde_json::to_string_pretty(&response.items)?),
        _ => Ok(format_table(&response.items)),
    }
}

/// Scheduled content between two dates, earliest first
pub async fn calendar(
    api_client: &ApiClient,
    from: &str,
    to: &str,
    team_id: Option<&str>,
    format: &str,
) -> CliResult<String> {
    api_client.require_user()?;

    let mut request = api_client
        .get("/api/v1/content/calendar")
        .query(&[("from", from), ("to", to)]);
    if let Some(t) = team_id {
        request = request.query(&[("team_id", t)]);
    }

    let items: Vec<ContentItem> = ApiClient::handle_response(request.send().await?).await?;

    match format {
        "json" => Ok(serde_json::to_string_pretty(&items)?),
        _ => Ok(format_table(&items)),
    }
}

pub(crate) fn format_table(items: &[ContentItem]) -> String {
    if items.is_empty() {
        return "No content found.".to_string();
    }

    let display: Vec<ContentDisplay> = items.iter().map(|i| i.into()).collect();
    let mut table = Table::new(display);
    apply_table_style(&mut table);
    table.to_string()
}

/// Get a single content item by ID
pub async fn get_content(api_client: &ApiClient, id: &str, format: &str) -> CliResult<String> {
    api_client.require_user()?;

    let response = api_client
        .get(&format!("/api/v1/content/{}", id))
        .send()
        .await?;

    let item: ContentItem = ApiClient::handle_response(response).await?;

    match format {
        "json" => Ok(serde_json::to_string_pretty(&item)?),
        _ => Ok(format_detail(&item)),
    }
}

pub(crate) fn format_detail(item: &ContentItem) -> String {
    use tabled::builder::Builder;

    let mut builder = Builder::default();
    builder.push_record(["Field", "Value"]);
    builder.push_record(["ID", &item.id]);
    builder.push_record(["Title", &item.title]);
    if let Some(desc) = &item.description {
        builder.push_record(["Description", desc]);
    }
    builder.push_record(["Status", &item.status]);
    builder.push_record(["Owner", &item.owner_id]);
    builder.push_record(["Team", &or_dash(item.team_id.as_deref())]);
    builder.push_record(["Platform", &or_dash(item.platform.as_deref())]);
    builder.push_record(["Tags", &format_tags(&item.tags)]);
    builder.push_record(["Scheduled", &or_dash(item.scheduled_at.as_deref())]);
    builder.push_record(["Published", &or_dash(item.published_at.as_deref())]);
    builder.push_record(["Created", &item.created_at]);
    builder.push_record(["Updated", &item.updated_at]);

    let mut table = builder.build();
    apply_table_style(&mut table);
    table.to_string()
}

/// Parameters for creating content
#[derive(Debug, Default)]
pub struct CreateContentParams<'a> {
    pub title: &'a str,
    pub description: Option<&'a str>,
    pub platform: Option<&'a str>,
    pub tags: Option<&'a str>,
    pub team_id: Option<&'a str>,
}

/// Create a new content idea
pub async fn create_content(
    api_client: &ApiClient,
    params: CreateContentParams<'_>,
) -> CliResult<String> {
    api_client.require_user()?;

    let request_body = CreateContentRequest {
        title: params.title.to_string(),
        description: params.description.map(|s| s.to_string()),
        platform: params.platform.map(|s| s.to_string()),
        tags: parse_tags(params.tags),
        team_id: params.team_id.map(|s| s.to_string()),
    };

    let response = api_client
        .post("/api/v1/content")
        .json(&request_body)
        .send()
        .await?;

    let item: ContentItem = ApiClient::handle_response(response).await?;
    Ok(format!("✓ Created content: {} ({})", item.title, item.id))
}

/// Move content to another workflow status
pub async fn change_status(
    api_client: &ApiClient,
    id: &str,
    status: &str,
    scheduled_at: Option<&str>,
) -> CliResult<String> {
    api_client.require_user()?;

    let request_body = ChangeStatusRequest {
        status: status.to_string(),
        scheduled_at: scheduled_at.map(|s| s.to_string()),
    };

    let response = api_client
        .put(&format!("/api/v1/content/{}/status", id))
        .json(&request_body)
        .send()
        .await?;

    let item: ContentItem = ApiClient::handle_response(response).await?;
    Ok(format!("✓ Content {} is now {}", item.id, item.status))
}
