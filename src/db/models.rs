//! Domain models for the VlogForge database.
//!
//! These models are storage-agnostic and represent the core entities
//! used throughout the application.

use serde::{Deserialize, Serialize};

// =============================================================================
// Query Types for Pagination and Sorting
// =============================================================================

/// Sort order for list queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

impl SortOrder {
    /// Parse the `order` query parameter used by list endpoints.
    pub fn from_param(value: Option<&str>) -> Option<Self> {
        match value {
            Some("desc") => Some(SortOrder::Desc),
            Some("asc") => Some(SortOrder::Asc),
            _ => None,
        }
    }
}

/// Base pagination and sorting options - composed into entity-specific queries.
#[derive(Debug, Clone, Default)]
pub struct PageSort {
    /// Maximum number of items to return.
    pub limit: Option<usize>,
    /// Number of items to skip.
    pub offset: Option<usize>,
    /// Field to sort by (validated per entity type).
    pub sort_by: Option<String>,
    /// Sort order (ascending or descending).
    pub sort_order: Option<SortOrder>,
}

/// Query for content items.
#[derive(Debug, Clone, Default)]
pub struct ContentQuery {
    pub page: PageSort,
    /// Only items owned by this user or belonging to one of this user's teams.
    pub visible_to: Option<Id>,
    /// Filter by team.
    pub team_id: Option<Id>,
    /// Filter by status.
    pub status: Option<ContentStatus>,
    /// Inclusive lower bound on `scheduled_at`.
    pub scheduled_from: Option<String>,
    /// Inclusive upper bound on `scheduled_at`.
    pub scheduled_to: Option<String>,
}

/// Query for task assignments.
#[derive(Debug, Clone, Default)]
pub struct AssignmentQuery {
    pub page: PageSort,
    pub team_id: Option<Id>,
    pub assignee_id: Option<Id>,
    pub content_id: Option<Id>,
    pub status: Option<AssignmentStatus>,
}

/// Query for approval records.
#[derive(Debug, Clone, Default)]
pub struct ApprovalQuery {
    pub page: PageSort,
    pub team_id: Option<Id>,
    pub content_id: Option<Id>,
    pub status: Option<ApprovalStatus>,
}

/// Query for collaboration requests.
#[derive(Debug, Clone, Default)]
pub struct CollaborationQuery {
    pub page: PageSort,
    pub sender_id: Option<Id>,
    pub recipient_id: Option<Id>,
    pub status: Option<CollaborationStatus>,
}

/// Result of a paginated list query.
#[derive(Debug, Clone)]
pub struct ListResult<T> {
    /// The items in this page.
    pub items: Vec<T>,
    /// Total count of all matching items (before pagination).
    pub total: usize,
    /// Limit that was applied.
    pub limit: Option<usize>,
    /// Offset that was applied.
    pub offset: usize,
}

/// 8-character hex ID type used for all entities.
pub type Id = String;

/// Implements `Display` and `FromStr` for a fieldless enum using its
/// snake_case storage names.
macro_rules! string_enum {
    ($name:ident, $label:literal, { $($variant:ident => $text:literal),+ $(,)? }) => {
        impl $name {
            /// Storage and wire representation.
            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $text,)+
                }
            }

            /// Every variant, in declaration order.
            pub fn all() -> &'static [$name] {
                &[$($name::$variant,)+]
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.as_str())
            }
        }

        impl std::str::FromStr for $name {
            type Err = String;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($text => Ok($name::$variant),)+
                    _ => Err(format!("Invalid {}: {}", $label, s)),
                }
            }
        }
    };
}

// =============================================================================
// Users
// =============================================================================

/// A registered creator. Profile fields live directly on the user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: Id,
    pub email: String,
    pub display_name: String,
    pub bio: Option<String>,
    /// Content niche, e.g. "travel" or "tech reviews".
    pub niche: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

// =============================================================================
// Teams
// =============================================================================

/// A team of creators sharing content and tasks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Team {
    pub id: Id,
    pub name: String,
    pub description: Option<String>,
    pub owner_id: Id,
    /// Content must be approved before it can be scheduled or published.
    pub approval_required: bool,
    /// Explicit approvers. Empty means any admin or owner may approve.
    #[serde(default)]
    pub approver_ids: Vec<Id>,
    pub created_at: String,
    pub updated_at: String,
}

/// Role of a user within a team.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum TeamRole {
    Owner,
    Admin,
    #[default]
    Member,
}

string_enum!(TeamRole, "team role", {
    Owner => "owner",
    Admin => "admin",
    Member => "member",
});

impl TeamRole {
    /// Owners and admins manage the team.
    pub fn is_admin(&self) -> bool {
        matches!(self, TeamRole::Owner | TeamRole::Admin)
    }
}

/// Membership of a user in a team.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamMember {
    pub team_id: Id,
    pub user_id: Id,
    pub role: TeamRole,
    pub joined_at: String,
}

// =============================================================================
// Content
// =============================================================================

/// A user-owned content idea moving towards publication.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentItem {
    pub id: Id,
    pub owner_id: Id,
    pub team_id: Option<Id>,
    pub title: String,
    pub description: Option<String>,
    pub notes: Option<String>,
    pub platform: Option<String>,
    pub tags: Vec<String>,
    pub status: ContentStatus,
    pub scheduled_at: Option<String>,
    pub published_at: Option<String>,
    pub deleted_at: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

/// Lifecycle status of a content item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ContentStatus {
    #[default]
    Idea,
    Draft,
    InReview,
    Approved,
    Scheduled,
    Published,
    Archived,
}

string_enum!(ContentStatus, "content status", {
    Idea => "idea",
    Draft => "draft",
    InReview => "in_review",
    Approved => "approved",
    Scheduled => "scheduled",
    Published => "published",
    Archived => "archived",
});

// =============================================================================
// Approvals
// =============================================================================

/// A request for a team approver to sign off on a content item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApprovalRecord {
    pub id: Id,
    pub content_id: Id,
    pub team_id: Id,
    pub submitted_by: Id,
    pub note: Option<String>,
    pub status: ApprovalStatus,
    pub decided_by: Option<Id>,
    pub feedback: Option<String>,
    pub created_at: String,
    pub decided_at: Option<String>,
}

/// State of an approval record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ApprovalStatus {
    #[default]
    Pending,
    Approved,
    ChangesRequested,
}

string_enum!(ApprovalStatus, "approval status", {
    Pending => "pending",
    Approved => "approved",
    ChangesRequested => "changes_requested",
});

// =============================================================================
// Task assignments
// =============================================================================

/// A team-scoped unit of work, optionally attached to a content item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskAssignment {
    pub id: Id,
    pub team_id: Id,
    pub content_id: Option<Id>,
    pub title: String,
    pub description: Option<String>,
    pub assignee_id: Id,
    pub created_by: Id,
    pub status: AssignmentStatus,
    pub priority: Option<i32>,
    pub due_date: Option<String>,
    pub created_at: String,
    pub updated_at: String,
    pub started_at: Option<String>,
    pub completed_at: Option<String>,
}

/// Status of a task assignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum AssignmentStatus {
    #[default]
    NotStarted,
    InProgress,
    Blocked,
    Completed,
}

string_enum!(AssignmentStatus, "assignment status", {
    NotStarted => "not_started",
    InProgress => "in_progress",
    Blocked => "blocked",
    Completed => "completed",
});

/// A comment left on a task by a team member.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskComment {
    pub id: Id,
    pub task_id: Id,
    pub author_id: Id,
    pub content: String,
    pub created_at: String,
}

// =============================================================================
// Messaging
// =============================================================================

/// A direct conversation between users.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Conversation {
    pub id: Id,
    pub participant_ids: Vec<Id>,
    pub created_at: String,
    /// Time of the latest message, or creation time.
    pub updated_at: String,
}

/// A single message within a conversation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub id: Id,
    pub conversation_id: Id,
    pub sender_id: Id,
    pub content: String,
    pub created_at: String,
    pub read_at: Option<String>,
}

/// Inbox row: a conversation with per-viewer unread state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversationSummary {
    pub conversation: Conversation,
    pub unread_count: usize,
    pub last_message: Option<Message>,
}

// =============================================================================
// Collaboration
// =============================================================================

/// An invitation from one creator to another to work together.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollaborationRequest {
    pub id: Id,
    pub sender_id: Id,
    pub recipient_id: Id,
    pub title: String,
    pub message: Option<String>,
    pub status: CollaborationStatus,
    pub created_at: String,
    pub responded_at: Option<String>,
}

/// Status of a collaboration request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum CollaborationStatus {
    #[default]
    Pending,
    Accepted,
    Declined,
    Cancelled,
}

string_enum!(CollaborationStatus, "collaboration status", {
    Pending => "pending",
    Accepted => "accepted",
    Declined => "declined",
    Cancelled => "cancelled",
});

/// Two-party collaboration container created from an accepted request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SharedProject {
    pub id: Id,
    pub collaboration_request_id: Id,
    pub title: String,
    pub description: Option<String>,
    /// Sender of the originating request.
    pub owner_id: Id,
    /// Recipient of the originating request.
    pub partner_id: Id,
    pub status: SharedProjectStatus,
    #[serde(default)]
    pub tasks: Vec<SharedProjectTask>,
    #[serde(default)]
    pub links: Vec<SharedProjectLink>,
    pub created_at: String,
    pub updated_at: String,
}

impl SharedProject {
    /// Whether the user is one of the two parties.
    pub fn has_participant(&self, user_id: &str) -> bool {
        self.owner_id == user_id || self.partner_id == user_id
    }
}

/// Status of a shared project.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SharedProjectStatus {
    #[default]
    Active,
    Completed,
    Archived,
}

string_enum!(SharedProjectStatus, "shared project status", {
    Active => "active",
    Completed => "completed",
    Archived => "archived",
});

/// A checklist item inside a shared project.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SharedProjectTask {
    pub id: Id,
    pub project_id: Id,
    pub title: String,
    pub assignee_id: Option<Id>,
    pub is_completed: bool,
    pub due_date: Option<String>,
    pub created_at: String,
    pub completed_at: Option<String>,
}

/// A reference URL attached to a shared project.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SharedProjectLink {
    pub id: Id,
    pub project_id: Id,
    pub url: String,
    pub label: Option<String>,
    pub added_by: Id,
    pub created_at: String,
}
