//! Content status machine.
//!
//! ```text
//! idea      -> draft | archived
//! draft     -> idea | in_review | scheduled | published | archived
//! in_review -> draft | approved
//! approved  -> draft | scheduled | published | archived
//! scheduled -> draft | published | archived
//! published -> archived
//! archived  -> idea
//! ```

use tracing::debug;

use crate::db::{ContentItem, ContentStatus};

use super::{WorkflowError, WorkflowResult};

impl ContentStatus {
    /// Statuses reachable in one step.
    pub fn allowed_targets(&self) -> &'static [ContentStatus] {
        use ContentStatus::*;
        match self {
            Idea => &[Draft, Archived],
            Draft => &[Idea, InReview, Scheduled, Published, Archived],
            InReview => &[Draft, Approved],
            Approved => &[Draft, Scheduled, Published, Archived],
            Scheduled => &[Draft, Published, Archived],
            Published => &[Archived],
            Archived => &[Idea],
        }
    }

    pub fn can_transition_to(&self, target: ContentStatus) -> bool {
        self.allowed_targets().contains(&target)
    }
}

/// What is driving a status change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeOrigin {
    /// The status endpoint.
    Direct,
    /// Submitting content for approval.
    Submission,
    /// An approver's decision.
    ApprovalDecision,
}

/// A requested status change and its context.
#[derive(Debug, Clone)]
pub struct StatusChange<'a> {
    pub target: ContentStatus,
    pub origin: ChangeOrigin,
    /// New schedule, required when entering `scheduled` without one.
    pub scheduled_at: Option<String>,
    /// The content's team requires approval before publication.
    pub approval_required: bool,
    pub now: &'a str,
}

fn invalid(item: &ContentItem, target: ContentStatus, reason: &str) -> WorkflowError {
    WorkflowError::InvalidTransition {
        entity: "content",
        from: item.status.to_string(),
        to: target.to_string(),
        reason: reason.to_string(),
    }
}

/// Validate a status change against the machine and its guards, then apply
/// it, stamping `scheduled_at` and `published_at` as needed.
pub fn apply_status_change(item: &mut ContentItem, change: StatusChange<'_>) -> WorkflowResult<()> {
    let from = item.status;
    let target = change.target;

    // Rescheduling keeps the status and only moves the date.
    let rescheduling = from == ContentStatus::Scheduled
        && target == ContentStatus::Scheduled
        && change.scheduled_at.is_some();

    if !rescheduling && !from.can_transition_to(target) {
        return Err(invalid(item, target, "transition not allowed"));
    }

    if target == ContentStatus::InReview && change.origin != ChangeOrigin::Submission {
        return Err(invalid(
            item,
            target,
            "content enters review by being submitted for approval",
        ));
    }

    if from == ContentStatus::InReview
        && target == ContentStatus::Approved
        && change.origin != ChangeOrigin::ApprovalDecision
    {
        return Err(invalid(
            item,
            target,
            "only an approver's decision can approve content",
        ));
    }

    if change.approval_required
        && from == ContentStatus::Draft
        && matches!(target, ContentStatus::Scheduled | ContentStatus::Published)
    {
        return Err(invalid(
            item,
            target,
            "this team requires approval before scheduling or publishing",
        ));
    }

    if target == ContentStatus::Scheduled {
        let scheduled_at = change.scheduled_at.or_else(|| item.scheduled_at.clone());
        match scheduled_at {
            Some(at) => item.scheduled_at = Some(at),
            None => {
                return Err(WorkflowError::validation(
                    "scheduled_at is required to schedule content",
                ));
            }
        }
    }

    if target == ContentStatus::Published {
        item.published_at = Some(change.now.to_string());
    }

    debug!(content_id = %item.id, from = %from, to = %target, "content status change");
    item.status = target;
    Ok(())
}
