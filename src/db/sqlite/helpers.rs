//! Shared helper functions for SQLite repositories.

use crate::db::{DbError, DbResult, PageSort, SortOrder};

/// Validate a requested sort field against the allowed column names.
/// Returns None for invalid fields (caller falls back to its default).
pub fn validate_sort_field(field: &str, allowed: &[&'static str]) -> Option<&'static str> {
    allowed.iter().copied().find(|&allowed_field| allowed_field == field)
}

/// Build ORDER BY clause from PageSort parameters.
///
/// `id` is appended as a tiebreaker so pagination is stable when many rows
/// share a timestamp.
pub fn build_order_clause(
    page: &PageSort,
    allowed_fields: &[&'static str],
    default_field: &str,
    default_order: SortOrder,
) -> String {
    let sort_field = page
        .sort_by
        .as_deref()
        .and_then(|f| validate_sort_field(f, allowed_fields))
        .unwrap_or(default_field);

    let order = match page.sort_order.unwrap_or(default_order) {
        SortOrder::Asc => "ASC",
        SortOrder::Desc => "DESC",
    };

    format!("ORDER BY {} {}, id {}", sort_field, order, order)
}

/// Build LIMIT/OFFSET clause from PageSort parameters.
/// Note: SQL requires LIMIT when using OFFSET. If offset is provided without limit,
/// we use LIMIT -1 (SQLite's "no limit" value).
pub fn build_limit_offset_clause(page: &PageSort) -> String {
    let mut clause = String::new();

    // SQLite reads OFFSET as a signed 64-bit integer.
    let offset = page
        .offset
        .filter(|o| *o > 0)
        .map(|o| o.min(i64::MAX as usize));

    if let Some(limit) = page.limit {
        clause.push_str(&format!(" LIMIT {}", limit));
    } else if offset.is_some() {
        clause.push_str(" LIMIT -1");
    }

    if let Some(offset) = offset {
        clause.push_str(&format!(" OFFSET {}", offset));
    }

    clause
}

/// Join filter conditions into a WHERE clause (empty when no conditions).
pub fn build_where_clause(conditions: &[String]) -> String {
    if conditions.is_empty() {
        String::new()
    } else {
        format!("WHERE {}", conditions.join(" AND "))
    }
}

/// Serialize a string list for a JSON text column.
pub fn to_json_list(values: &[String]) -> DbResult<String> {
    serde_json::to_string(values).map_err(|e| DbError::InvalidData {
        message: format!("Failed to serialize list: {}", e),
        help: "list values must be plain strings".to_string(),
    })
}

/// Parse a JSON text column back into a string list.
/// Malformed or NULL columns read as an empty list.
pub fn from_json_list(raw: Option<String>) -> Vec<String> {
    raw.and_then(|s| serde_json::from_str(&s).ok())
        .unwrap_or_default()
}
