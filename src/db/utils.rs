//! Database utility functions.

use chrono::{NaiveDateTime, Utc};

/// Storage format for every timestamp column.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Generate an 8-character hex ID for database entities
pub fn generate_entity_id() -> String {
    let id = uuid::Uuid::new_v4().simple().to_string();
    id[..8].to_string()
}

/// Get current datetime as string in SQLite format
pub fn current_timestamp() -> String {
    Utc::now().format(TIMESTAMP_FORMAT).to_string()
}

/// Normalize a user-supplied timestamp into storage format.
///
/// Accepts `YYYY-MM-DD HH:MM:SS`, RFC 3339 (`2025-03-01T10:00:00Z`) and a
/// bare date (`2025-03-01`, read as midnight). Returns None when unparseable.
pub fn normalize_timestamp(input: &str) -> Option<String> {
    let input = input.trim();
    if let Ok(dt) = NaiveDateTime::parse_from_str(input, TIMESTAMP_FORMAT) {
        return Some(dt.format(TIMESTAMP_FORMAT).to_string());
    }
    if let Ok(dt) = chrono::DateTime::parse_from_rfc3339(input) {
        return Some(dt.with_timezone(&Utc).format(TIMESTAMP_FORMAT).to_string());
    }
    if let Ok(date) = chrono::NaiveDate::parse_from_str(input, "%Y-%m-%d") {
        return date
            .and_hms_opt(0, 0, 0)
            .map(|dt| dt.format(TIMESTAMP_FORMAT).to_string());
    }
    None
}

/// Like [`normalize_timestamp`], but a bare date is read as the last
/// second of that day so it can close an inclusive range.
pub fn normalize_range_end(input: &str) -> Option<String> {
    match chrono::NaiveDate::parse_from_str(input.trim(), "%Y-%m-%d") {
        Ok(date) => date
            .and_hms_opt(23, 59, 59)
            .map(|dt| dt.format(TIMESTAMP_FORMAT).to_string()),
        Err(_) => normalize_timestamp(input),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn entity_ids_are_eight_hex_chars() {
        let id = generate_entity_id();
        assert_eq!(id.len(), 8);
        assert!(id.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn normalize_accepts_storage_format() {
        assert_eq!(
            normalize_timestamp("2025-03-01 10:30:00").as_deref(),
            Some("2025-03-01 10:30:00")
        );
    }

    #[test]
    fn normalize_converts_rfc3339_to_utc() {
        assert_eq!(
            normalize_timestamp("2025-03-01T12:30:00+02:00").as_deref(),
            Some("2025-03-01 10:30:00")
        );
    }

    #[test]
    fn normalize_reads_bare_date_as_midnight() {
        assert_eq!(
            normalize_timestamp("2025-03-01").as_deref(),
            Some("2025-03-01 00:00:00")
        );
    }

    #[test]
    fn range_end_reads_bare_date_as_end_of_day() {
        assert_eq!(
            normalize_range_end("2025-06-30").as_deref(),
            Some("2025-06-30 23:59:59")
        );
        assert_eq!(
            normalize_range_end("2025-06-30 12:00:00").as_deref(),
            Some("2025-06-30 12:00:00")
        );
        assert!(normalize_range_end("end of june").is_none());
    }

    #[test]
    fn normalize_rejects_garbage() {
        assert!(normalize_timestamp("next tuesday").is_none());
    }
}
