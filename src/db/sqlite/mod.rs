//! SQLite implementation of the database traits.
//!
//! This module provides a SQLx-backed implementation of the repository
//! traits defined in the parent module.

mod approval;
mod assignment;
mod collaboration;
mod connection;
mod content;
mod helpers;
mod messaging;
mod shared_project;
mod team;
mod user;

#[cfg(test)]
mod connection_test;
#[cfg(test)]
mod messaging_test;
#[cfg(test)]
mod shared_project_test;
#[cfg(test)]
mod team_test;
#[cfg(test)]
mod test_support;
#[cfg(test)]
mod user_test;

pub use approval::SqliteApprovalRepository;
pub use assignment::SqliteAssignmentRepository;
pub use collaboration::SqliteCollaborationRepository;
pub use connection::SqliteDatabase;
pub use content::SqliteContentRepository;
pub use messaging::SqliteMessagingRepository;
pub use shared_project::SqliteSharedProjectRepository;
pub use team::SqliteTeamRepository;
pub use user::SqliteUserRepository;
