use crate::cli::api_client::ApiClient;
use crate::cli::commands::PageParams;
use crate::cli::error::CliResult;
use crate::cli::utils::{apply_table_style, or_dash, short_timestamp, truncate_with_ellipsis};
use serde::{Deserialize, Serialize};
use tabled::{Table, Tabled};

#[derive(Debug, Serialize, Deserialize)]
pub struct Task {
    pub id: String,
    pub team_id: String,
    pub content_id: Option<String>,
    pub title: String,
    pub description: Option<String>,
    pub assignee_id: String,
    pub created_by: String,
    pub status: String,
    pub priority: Option<i32>,
    pub due_date: Option<String>,
    pub created_at: String,
    pub updated_at: String,
    pub started_at: Option<String>,
    pub completed_at: Option<String>,
}

#[derive(Debug, Serialize)]
pub(crate) struct UpdateStatusRequest {
    pub(crate) status: String,
}

#[derive(Tabled)]
pub(crate) struct TaskDisplay {
    #[tabled(rename = "ID")]
    pub(crate) id: String,
    #[tabled(rename = "Title")]
    pub(crate) title: String,
    #[tabled(rename = "Status")]
    pub(crate) status: String,
    #[tabled(rename = "Priority")]
    pub(crate) priority: String,
    #[tabled(rename = "Due")]
    pub(crate) due_date: String,
    #[tabled(rename = "Content")]
    pub(crate) content_id: String,
}

impl From<&Task> for TaskDisplay {
    fn from(task: &Task) -> Self {
        Self {
            id: task.id.clone(),
            title: truncate_with_ellipsis(&task.title, 50),
            status: task.status.clone(),
            priority: task
                .priority
                .map(|p| p.to_string())
                .unwrap_or_else(|| "-".to_string()),
            due_date: short_timestamp(task.due_date.as_deref()),
            content_id: or_dash(task.content_id.as_deref()),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct TaskListResponse {
    items: Vec<Task>,
    total: usize,
    limit: usize,
    offset: usize,
}

/// List tasks assigned to the current user across all teams
pub async fn my_tasks(
    api_client: &ApiClient,
    status: Option<&str>,
    page: PageParams,
    format: &str,
) -> CliResult<String> {
    api_client.require_user()?;

    let mut request = api_client.get("/api/v1/tasks/mine");
    if let Some(s) = status {
        request = request.query(&[("status", s)]);
    }
    request = request.query(&page.query());

    let response: TaskListResponse = ApiClient::handle_response(request.send().await?).await?;

    match format {
        "json" => Ok(serde_json::to_string_pretty(&response.items)?),
        _ => Ok(format_table(&response.items)),
    }
}

pub(crate) fn format_table(tasks: &[Task]) -> String {
    if tasks.is_empty() {
        return "No tasks found.".to_string();
    }

    let display_tasks: Vec<TaskDisplay> = tasks.iter().map(|t| t.into()).collect();
    let mut table = Table::new(display_tasks);
    apply_table_style(&mut table);
    table.to_string()
}

/// Move a task to another status (`not_started`, `in_progress`, `blocked`, `completed`)
pub async fn change_status(api_client: &ApiClient, id: &str, status: &str) -> CliResult<String> {
    api_client.require_user()?;

    let response = api_client
        .patch(&format!("/api/v1/tasks/{}", id))
        .json(&UpdateStatusRequest {
            status: status.to_string(),
        })
        .send()
        .await?;

    let task: Task = ApiClient::handle_response(response).await?;
    Ok(format!("✓ Task {} is now {}", task.id, task.status))
}
