//! V1 API handlers.

mod approvals;
mod collaborations;
mod content;
mod messaging;
mod shared_projects;
mod system;
mod tasks;
mod teams;
mod users;
mod workflow;

#[cfg(test)]
mod shared_projects_test;
#[cfg(test)]
pub(crate) mod test_support;

pub use approvals::*;
pub use collaborations::*;
pub use content::*;
pub use messaging::*;
pub use shared_projects::*;
pub use system::*;
pub use tasks::*;
pub use teams::*;
pub use users::*;
pub use workflow::*;

use crate::api::ApiError;
use crate::db::{Database, PageSort, SortOrder, TeamMember, TeamRepository, TeamRole};

/// Page size when a list request gives no `limit`.
pub const DEFAULT_LIMIT: usize = 50;
/// Largest accepted `limit`.
pub const MAX_LIMIT: usize = 200;

/// Largest accepted `offset`; SQLite offsets are signed 64-bit.
pub const MAX_OFFSET: usize = i64::MAX as usize;

/// Build pagination from list query parameters.
pub(crate) fn page_sort(
    limit: Option<usize>,
    offset: Option<usize>,
    sort: Option<String>,
    order: Option<&str>,
) -> Result<PageSort, ApiError> {
    if offset.is_some_and(|o| o > MAX_OFFSET) {
        return Err(ApiError::validation(format!(
            "offset must be at most {}",
            MAX_OFFSET
        )));
    }

    Ok(PageSort {
        limit: Some(limit.unwrap_or(DEFAULT_LIMIT).min(MAX_LIMIT)),
        offset,
        sort_by: sort,
        sort_order: SortOrder::from_param(order),
    })
}

/// The caller's role in a team, `None` when not a member.
pub(crate) async fn team_role<D: Database>(
    db: &D,
    team_id: &str,
    user_id: &str,
) -> Result<Option<TeamRole>, ApiError> {
    let member: Option<TeamMember> = db.teams().get_member(team_id, user_id).await?;
    Ok(member.map(|m| m.role))
}
