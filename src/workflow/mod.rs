//! Workflow rules for teams, content, approvals, tasks and collaborations.
//!
//! Everything in here is pure: functions take already-loaded entities and
//! either mutate them in place or return a [`WorkflowError`]. Handlers load,
//! call into these rules, then persist.

pub mod access;
pub mod assignment;
pub mod collaboration;
pub mod content;
mod error;

#[cfg(test)]
mod access_test;
#[cfg(test)]
mod collaboration_test;

pub use error::{WorkflowError, WorkflowResult};
