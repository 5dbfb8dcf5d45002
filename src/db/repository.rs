//! Repository traits for data access abstraction.
//!
//! These traits define the contract for data access, allowing different
//! storage backends to be swapped without changing business logic.
//! Methods return `Send` futures so handlers generic over [`Database`]
//! can run on a multi-threaded runtime.

use std::future::Future;

use crate::db::{
    DbResult,
    models::{
        ApprovalQuery, ApprovalRecord, AssignmentQuery, CollaborationQuery,
        CollaborationRequest, CollaborationStatus, ContentItem, ContentQuery, ContentStatus,
        Conversation, ConversationSummary, ListResult, Message, PageSort, SharedProject,
        SharedProjectLink, SharedProjectTask, TaskAssignment, TaskComment, Team, TeamMember,
        TeamRole, User,
    },
};

/// Repository for User operations.
pub trait UserRepository: Send + Sync {
    /// Create a new user. Generates the ID when empty.
    fn create(&self, user: &User) -> impl Future<Output = DbResult<User>> + Send;

    /// Get a user by ID.
    fn get(&self, id: &str) -> impl Future<Output = DbResult<User>> + Send;

    /// Look up a user by email address.
    fn get_by_email(&self, email: &str) -> impl Future<Output = DbResult<Option<User>>> + Send;

    /// Update profile fields of an existing user.
    fn update(&self, user: &User) -> impl Future<Output = DbResult<()>> + Send;
}

/// Repository for Team and membership operations.
pub trait TeamRepository: Send + Sync {
    /// Create a team and register its owner as a member in one transaction.
    fn create(&self, team: &Team) -> impl Future<Output = DbResult<Team>> + Send;

    /// Get a team by ID.
    fn get(&self, id: &str) -> impl Future<Output = DbResult<Team>> + Send;

    /// Get all teams the user is a member of.
    fn list_for_user(&self, user_id: &str) -> impl Future<Output = DbResult<Vec<Team>>> + Send;

    /// Update name, description and workflow settings.
    fn update(&self, team: &Team) -> impl Future<Output = DbResult<()>> + Send;

    /// Delete a team. Memberships, tasks and approvals cascade.
    fn delete(&self, id: &str) -> impl Future<Output = DbResult<()>> + Send;

    /// Add a member.
    fn add_member(&self, member: &TeamMember) -> impl Future<Output = DbResult<TeamMember>> + Send;

    /// Get a single membership, if any.
    fn get_member(
        &self,
        team_id: &str,
        user_id: &str,
    ) -> impl Future<Output = DbResult<Option<TeamMember>>> + Send;

    /// Get all members of a team, owner first.
    fn list_members(&self, team_id: &str) -> impl Future<Output = DbResult<Vec<TeamMember>>> + Send;

    /// Change a member's role.
    fn update_member_role(
        &self,
        team_id: &str,
        user_id: &str,
        role: TeamRole,
    ) -> impl Future<Output = DbResult<()>> + Send;

    /// Remove a member and drop them from the approver list.
    fn remove_member(&self, team_id: &str, user_id: &str)
    -> impl Future<Output = DbResult<()>> + Send;
}

/// Repository for ContentItem operations.
pub trait ContentRepository: Send + Sync {
    /// Create a content item.
    fn create(&self, item: &ContentItem) -> impl Future<Output = DbResult<ContentItem>> + Send;

    /// Get a content item by ID. Soft-deleted items are reported as not found.
    fn get(&self, id: &str) -> impl Future<Output = DbResult<ContentItem>> + Send;

    /// List content items. Soft-deleted items are never returned.
    fn list(
        &self,
        query: &ContentQuery,
    ) -> impl Future<Output = DbResult<ListResult<ContentItem>>> + Send;

    /// Update an existing content item.
    fn update(&self, item: &ContentItem) -> impl Future<Output = DbResult<()>> + Send;

    /// Persist a status change (status, scheduled_at, published_at) only if
    /// the item is still in `from`. Leaving review withdraws the pending
    /// approval in the same transaction; the withdrawn record is returned.
    fn change_status(
        &self,
        item: &ContentItem,
        from: ContentStatus,
        actor_id: &str,
    ) -> impl Future<Output = DbResult<Option<ApprovalRecord>>> + Send;

    /// Mark a content item as deleted, withdrawing its pending approval
    /// in the same transaction. The withdrawn record is returned.
    fn soft_delete(
        &self,
        id: &str,
        actor_id: &str,
    ) -> impl Future<Output = DbResult<Option<ApprovalRecord>>> + Send;

    /// Count visible items per status for the given viewer.
    fn count_by_status(
        &self,
        viewer_id: &str,
    ) -> impl Future<Output = DbResult<Vec<(ContentStatus, usize)>>> + Send;
}

/// Repository for ApprovalRecord operations.
pub trait ApprovalRepository: Send + Sync {
    /// Create an approval record.
    fn create(
        &self,
        record: &ApprovalRecord,
    ) -> impl Future<Output = DbResult<ApprovalRecord>> + Send;

    /// Get an approval record by ID.
    fn get(&self, id: &str) -> impl Future<Output = DbResult<ApprovalRecord>> + Send;

    /// List approval records, newest first.
    fn list(
        &self,
        query: &ApprovalQuery,
    ) -> impl Future<Output = DbResult<ListResult<ApprovalRecord>>> + Send;

    /// Get the pending record for a content item, if any.
    fn pending_for_content(
        &self,
        content_id: &str,
    ) -> impl Future<Output = DbResult<Option<ApprovalRecord>>> + Send;

    /// Open a review: insert the pending record and move its content from
    /// `content_from` to `in_review` in one transaction. A content item
    /// that has meanwhile left `content_from` is a `Constraint` error; an
    /// existing pending record is `AlreadyExists`.
    fn submit(
        &self,
        record: &ApprovalRecord,
        content_from: ContentStatus,
    ) -> impl Future<Output = DbResult<ApprovalRecord>> + Send;

    /// Persist a decision (status, decided_by, feedback, decided_at) and
    /// move the content out of review to `content_status`, atomically.
    /// Only a pending record can be decided; otherwise `Constraint`.
    fn decide(
        &self,
        record: &ApprovalRecord,
        content_status: ContentStatus,
    ) -> impl Future<Output = DbResult<()>> + Send;
}

/// Repository for TaskAssignment and TaskComment operations.
pub trait AssignmentRepository: Send + Sync {
    /// Create a task assignment.
    fn create(
        &self,
        task: &TaskAssignment,
    ) -> impl Future<Output = DbResult<TaskAssignment>> + Send;

    /// Get a task assignment by ID.
    fn get(&self, id: &str) -> impl Future<Output = DbResult<TaskAssignment>> + Send;

    /// List task assignments.
    fn list(
        &self,
        query: &AssignmentQuery,
    ) -> impl Future<Output = DbResult<ListResult<TaskAssignment>>> + Send;

    /// Update an existing task assignment.
    fn update(&self, task: &TaskAssignment) -> impl Future<Output = DbResult<()>> + Send;

    /// Delete a task assignment and its comments.
    fn delete(&self, id: &str) -> impl Future<Output = DbResult<()>> + Send;

    /// Add a comment to a task.
    fn add_comment(
        &self,
        comment: &TaskComment,
    ) -> impl Future<Output = DbResult<TaskComment>> + Send;

    /// List comments on a task, oldest first.
    fn list_comments(
        &self,
        task_id: &str,
    ) -> impl Future<Output = DbResult<Vec<TaskComment>>> + Send;
}

/// Repository for conversations and messages.
pub trait MessagingRepository: Send + Sync {
    /// Find the direct conversation between exactly these two users.
    fn find_direct(
        &self,
        user_a: &str,
        user_b: &str,
    ) -> impl Future<Output = DbResult<Option<Conversation>>> + Send;

    /// Create a conversation with the given participants.
    fn create_conversation(
        &self,
        participant_ids: &[String],
    ) -> impl Future<Output = DbResult<Conversation>> + Send;

    /// Get a conversation by ID.
    fn get_conversation(&self, id: &str) -> impl Future<Output = DbResult<Conversation>> + Send;

    /// Inbox for a user, most recent activity first.
    fn list_for_user(
        &self,
        user_id: &str,
    ) -> impl Future<Output = DbResult<Vec<ConversationSummary>>> + Send;

    /// Append a message and bump the conversation's activity time.
    fn add_message(&self, message: &Message) -> impl Future<Output = DbResult<Message>> + Send;

    /// Messages of a conversation, newest first.
    fn list_messages(
        &self,
        conversation_id: &str,
        page: &PageSort,
    ) -> impl Future<Output = DbResult<ListResult<Message>>> + Send;

    /// Mark every unread message not sent by `reader_id` as read.
    /// Returns the number of messages updated.
    fn mark_read(
        &self,
        conversation_id: &str,
        reader_id: &str,
    ) -> impl Future<Output = DbResult<u64>> + Send;

    /// Unread messages addressed to the user across all conversations.
    fn unread_count(&self, user_id: &str) -> impl Future<Output = DbResult<u64>> + Send;
}

/// Repository for collaboration requests.
pub trait CollaborationRepository: Send + Sync {
    /// Create a collaboration request.
    fn create(
        &self,
        request: &CollaborationRequest,
    ) -> impl Future<Output = DbResult<CollaborationRequest>> + Send;

    /// Get a request by ID.
    fn get(&self, id: &str) -> impl Future<Output = DbResult<CollaborationRequest>> + Send;

    /// List requests, newest first.
    fn list(
        &self,
        query: &CollaborationQuery,
    ) -> impl Future<Output = DbResult<ListResult<CollaborationRequest>>> + Send;

    /// Find a pending request from sender to recipient.
    fn find_pending(
        &self,
        sender_id: &str,
        recipient_id: &str,
    ) -> impl Future<Output = DbResult<Option<CollaborationRequest>>> + Send;

    /// Move a pending request to `status` and stamp `responded_at`.
    /// A request that is no longer pending is a `Constraint` error.
    fn update_status(
        &self,
        id: &str,
        status: CollaborationStatus,
    ) -> impl Future<Output = DbResult<()>> + Send;

    /// Accept a pending request and create its shared project in one
    /// transaction. The project's owner, partner and request id are taken
    /// from the request.
    fn accept(
        &self,
        id: &str,
        project: &SharedProject,
    ) -> impl Future<Output = DbResult<SharedProject>> + Send;
}

/// Repository for shared projects, their tasks and links.
pub trait SharedProjectRepository: Send + Sync {
    /// Create a shared project. When a project already exists for the
    /// same collaboration request, that project is returned instead and
    /// the boolean is false.
    fn create_or_get(
        &self,
        project: &SharedProject,
    ) -> impl Future<Output = DbResult<(SharedProject, bool)>> + Send;

    /// Get a project with its tasks and links.
    fn get(&self, id: &str) -> impl Future<Output = DbResult<SharedProject>> + Send;

    /// Get the project created from a collaboration request, if any.
    fn get_by_request(
        &self,
        request_id: &str,
    ) -> impl Future<Output = DbResult<Option<SharedProject>>> + Send;

    /// Projects the user participates in, most recently updated first.
    fn list_for_user(
        &self,
        user_id: &str,
    ) -> impl Future<Output = DbResult<Vec<SharedProject>>> + Send;

    /// Update title, description and status.
    fn update(&self, project: &SharedProject) -> impl Future<Output = DbResult<()>> + Send;

    /// Add a task.
    fn add_task(
        &self,
        task: &SharedProjectTask,
    ) -> impl Future<Output = DbResult<SharedProjectTask>> + Send;

    /// Get a task scoped to its project.
    fn get_task(
        &self,
        project_id: &str,
        task_id: &str,
    ) -> impl Future<Output = DbResult<SharedProjectTask>> + Send;

    /// Update a task.
    fn update_task(&self, task: &SharedProjectTask) -> impl Future<Output = DbResult<()>> + Send;

    /// Delete a task scoped to its project.
    fn delete_task(
        &self,
        project_id: &str,
        task_id: &str,
    ) -> impl Future<Output = DbResult<()>> + Send;

    /// Add a link.
    fn add_link(
        &self,
        link: &SharedProjectLink,
    ) -> impl Future<Output = DbResult<SharedProjectLink>> + Send;

    /// Delete a link scoped to its project.
    fn delete_link(
        &self,
        project_id: &str,
        link_id: &str,
    ) -> impl Future<Output = DbResult<()>> + Send;
}

/// Combined database interface.
///
/// Repositories are exposed through associated types, avoiding dynamic
/// dispatch.
pub trait Database: Send + Sync {
    type Users<'a>: UserRepository
    where
        Self: 'a;
    type Teams<'a>: TeamRepository
    where
        Self: 'a;
    type Content<'a>: ContentRepository
    where
        Self: 'a;
    type Approvals<'a>: ApprovalRepository
    where
        Self: 'a;
    type Assignments<'a>: AssignmentRepository
    where
        Self: 'a;
    type Messaging<'a>: MessagingRepository
    where
        Self: 'a;
    type Collaborations<'a>: CollaborationRepository
    where
        Self: 'a;
    type SharedProjects<'a>: SharedProjectRepository
    where
        Self: 'a;

    /// Run pending migrations.
    fn migrate(&self) -> impl Future<Output = DbResult<()>> + Send;

    fn users(&self) -> Self::Users<'_>;
    fn teams(&self) -> Self::Teams<'_>;
    fn content(&self) -> Self::Content<'_>;
    fn approvals(&self) -> Self::Approvals<'_>;
    fn assignments(&self) -> Self::Assignments<'_>;
    fn messaging(&self) -> Self::Messaging<'_>;
    fn collaborations(&self) -> Self::Collaborations<'_>;
    fn shared_projects(&self) -> Self::SharedProjects<'_>;
}
