//! Task assignment status bookkeeping.

use crate::db::{AssignmentStatus, SharedProjectTask, TaskAssignment};

use super::{WorkflowError, WorkflowResult};

/// Set a task's status and maintain its timestamps.
///
/// `started_at` is stamped the first time work starts and never cleared;
/// `completed_at` tracks whether the task is currently completed.
pub fn apply_status(task: &mut TaskAssignment, status: AssignmentStatus, now: &str) {
    if status == AssignmentStatus::InProgress && task.started_at.is_none() {
        task.started_at = Some(now.to_string());
    }

    match status {
        AssignmentStatus::Completed => {
            if task.completed_at.is_none() {
                task.completed_at = Some(now.to_string());
            }
        }
        _ => task.completed_at = None,
    }

    task.status = status;
}

/// Priority is 1 (highest) to 5 (lowest).
pub fn validate_priority(priority: Option<i32>) -> WorkflowResult<()> {
    match priority {
        Some(p) if !(1..=5).contains(&p) => Err(WorkflowError::validation(format!(
            "priority must be between 1 and 5, got {}",
            p
        ))),
        _ => Ok(()),
    }
}

/// Toggle completion of a shared project checklist item.
pub fn set_shared_task_completion(task: &mut SharedProjectTask, completed: bool, now: &str) {
    if completed && !task.is_completed {
        task.completed_at = Some(now.to_string());
    } else if !completed {
        task.completed_at = None;
    }
    task.is_completed = completed;
}
