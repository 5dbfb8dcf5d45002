pub mod api_client;
mod commands;
pub mod error;
pub mod utils;

#[cfg(test)]
#[path = "utils_test.rs"]
mod utils_test;

use clap::{Parser, Subcommand};

use commands::PageParams;
use commands::content::{CreateContentParams, ListContentFilter};

#[derive(Parser)]
#[command(name = "vf")]
#[command(author, version, about = "VlogForge CLI", long_about = None)]
pub struct Cli {
    /// Override the API URL (default: VF_API_URL env or http://localhost:3737)
    #[arg(long, global = true)]
    pub api_url: Option<String>,

    /// Act as this user id (default: VF_USER_ID env)
    #[arg(long, global = true)]
    pub user: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Content pipeline commands
    Content {
        #[command(subcommand)]
        command: ContentCommands,
    },
    /// Team task commands
    Task {
        #[command(subcommand)]
        command: TaskCommands,
    },
    /// Direct message commands
    Inbox {
        #[command(subcommand)]
        command: InboxCommands,
    },
}

#[derive(Subcommand)]
enum ContentCommands {
    /// List content visible to you
    List {
        /// Filter by status (idea, draft, in_review, approved, scheduled, published, archived)
        #[arg(long)]
        status: Option<String>,
        /// Filter by team ID
        #[arg(long)]
        team: Option<String>,
        /// Maximum number of items
        #[arg(long)]
        limit: Option<u32>,
        /// Items to skip
        #[arg(long)]
        offset: Option<u32>,
        /// Output format (table or json)
        #[arg(long, default_value = "table")]
        format: String,
    },
    /// Show a content item
    Get {
        /// Content ID
        id: String,
        /// Output format (table or json)
        #[arg(long, default_value = "table")]
        format: String,
    },
    /// Capture a new content idea
    Create {
        /// Title
        title: String,
        /// Team ID to share the content with
        #[arg(long)]
        team: Option<String>,
        /// Description
        #[arg(long)]
        description: Option<String>,
        /// Target platform (e.g. youtube)
        #[arg(long)]
        platform: Option<String>,
        /// Tags (comma-separated)
        #[arg(long)]
        tags: Option<String>,
    },
    /// Move content to another status
    Status {
        /// Content ID
        id: String,
        /// Target status
        status: String,
        /// Publication slot, required when scheduling unscheduled content
        #[arg(long)]
        scheduled_at: Option<String>,
    },
    /// Scheduled content in a date window
    Calendar {
        /// Window start (YYYY-MM-DD or timestamp)
        from: String,
        /// Window end (YYYY-MM-DD or timestamp)
        to: String,
        /// Filter by team ID
        #[arg(long)]
        team: Option<String>,
        /// Output format (table or json)
        #[arg(long, default_value = "table")]
        format: String,
    },
}

#[derive(Subcommand)]
enum TaskCommands {
    /// List tasks assigned to you
    Mine {
        /// Filter by status (not_started, in_progress, blocked, completed)
        #[arg(long)]
        status: Option<String>,
        /// Maximum number of items
        #[arg(long)]
        limit: Option<u32>,
        /// Items to skip
        #[arg(long)]
        offset: Option<u32>,
        /// Output format (table or json)
        #[arg(long, default_value = "table")]
        format: String,
    },
    /// Move a task to another status
    Status {
        /// Task ID
        id: String,
        /// Target status
        status: String,
    },
}

#[derive(Subcommand)]
enum InboxCommands {
    /// List your conversations
    List {
        /// Output format (table or json)
        #[arg(long, default_value = "table")]
        format: String,
    },
    /// Count unread messages
    Unread,
    /// Send a message to a conversation
    Send {
        /// Conversation ID
        conversation_id: String,
        /// Message text
        content: String,
    },
    /// Mark a conversation as read
    Read {
        /// Conversation ID
        conversation_id: String,
    },
}

fn print_result(result: error::CliResult<String>) {
    match result {
        Ok(output) => println!("{}", output),
        Err(e) => eprintln!("Error: {}", e),
    }
}

pub async fn run() -> miette::Result<()> {
    let cli = Cli::parse();
    let api_client = api_client::ApiClient::new(cli.api_url, cli.user);

    match cli.command {
        Some(Commands::Content { command }) => match command {
            ContentCommands::List {
                status,
                team,
                limit,
                offset,
                format,
            } => {
                let filter = ListContentFilter {
                    status: status.as_deref(),
                    team_id: team.as_deref(),
                    page: PageParams { limit, offset },
                };
                print_result(commands::content::list_content(&api_client, filter, &format).await)
            }
            ContentCommands::Get { id, format } => {
                print_result(commands::content::get_content(&api_client, &id, &format).await)
            }
            ContentCommands::Create {
                title,
                team,
                description,
                platform,
                tags,
            } => {
                let params = CreateContentParams {
                    title: &title,
                    description: description.as_deref(),
                    platform: platform.as_deref(),
                    tags: tags.as_deref(),
                    team_id: team.as_deref(),
                };
                print_result(commands::content::create_content(&api_client, params).await)
            }
            ContentCommands::Status {
                id,
                status,
                scheduled_at,
            } => print_result(
                commands::content::change_status(
                    &api_client,
                    &id,
                    &status,
                    scheduled_at.as_deref(),
                )
                .await,
            ),
            ContentCommands::Calendar {
                from,
                to,
                team,
                format,
            } => print_result(
                commands::content::calendar(&api_client, &from, &to, team.as_deref(), &format)
                    .await,
            ),
        },
        Some(Commands::Task { command }) => match command {
            TaskCommands::Mine {
                status,
                limit,
                offset,
                format,
            } => print_result(
                commands::task::my_tasks(
                    &api_client,
                    status.as_deref(),
                    PageParams { limit, offset },
                    &format,
                )
                .await,
            ),
            TaskCommands::Status { id, status } => {
                print_result(commands::task::change_status(&api_client, &id, &status).await)
            }
        },
        Some(Commands::Inbox { command }) => match command {
            InboxCommands::List { format } => {
                print_result(commands::inbox::list_conversations(&api_client, &format).await)
            }
            InboxCommands::Unread => print_result(commands::inbox::unread(&api_client).await),
            InboxCommands::Send {
                conversation_id,
                content,
            } => print_result(
                commands::inbox::send(&api_client, &conversation_id, &content).await,
            ),
            InboxCommands::Read { conversation_id } => {
                print_result(commands::inbox::mark_read(&api_client, &conversation_id).await)
            }
        },
        None => {
            // Show help when no command provided
            let _ = Cli::parse_from(["vf", "--help"]);
        }
    }

    Ok(())
}
