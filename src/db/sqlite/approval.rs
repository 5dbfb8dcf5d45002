//! SQLite ApprovalRepository implementation.

use std::str::FromStr;

use sqlx::{Row, SqliteConnection, SqlitePool};

use super::helpers::{build_limit_offset_clause, build_order_clause, build_where_clause};
use crate::db::utils::{current_timestamp, generate_entity_id};
use crate::db::{
    ApprovalQuery, ApprovalRecord, ApprovalRepository, ApprovalStatus, ContentStatus, DbError,
    DbResult, ListResult, SortOrder,
};

/// SQLx-backed approval repository.
pub struct SqliteApprovalRepository<'a> {
    pub(crate) pool: &'a SqlitePool,
}

const APPROVAL_COLUMNS: &str = "id, content_id, team_id, submitted_by, note, status, decided_by, feedback, created_at, decided_at";

impl<'a> ApprovalRepository for SqliteApprovalRepository<'a> {
    async fn create(&self, record: &ApprovalRecord) -> DbResult<ApprovalRecord> {
        let mut conn = self.pool.acquire().await?;
        insert_record(&mut conn, record).await
    }

    async fn get(&self, id: &str) -> DbResult<ApprovalRecord> {
        let row = sqlx::query(&format!(
            "SELECT {} FROM approval_record WHERE id = ?",
            APPROVAL_COLUMNS
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        row.as_ref()
            .map(row_to_approval)
            .ok_or_else(|| DbError::not_found("ApprovalRecord", id))
    }

    async fn list(&self, query: &ApprovalQuery) -> DbResult<ListResult<ApprovalRecord>> {
        let allowed_fields = ["status", "created_at", "decided_at"];
        let order_clause =
            build_order_clause(&query.page, &allowed_fields, "created_at", SortOrder::Desc);
        let limit_clause = build_limit_offset_clause(&query.page);

        let mut conditions: Vec<String> = Vec::new();
        let mut bind_values: Vec<String> = Vec::new();

        if let Some(team_id) = &query.team_id {
            conditions.push("team_id = ?".to_string());
            bind_values.push(team_id.clone());
        }
        if let Some(content_id) = &query.content_id {
            conditions.push("content_id = ?".to_string());
            bind_values.push(content_id.clone());
        }
        if let Some(status) = &query.status {
            conditions.push("status = ?".to_string());
            bind_values.push(status.to_string());
        }

        let where_clause = build_where_clause(&conditions);
        let sql = format!(
            "SELECT {} FROM approval_record {} {} {}",
            APPROVAL_COLUMNS, where_clause, order_clause, limit_clause
        );
        let count_sql = format!("SELECT COUNT(*) FROM approval_record {}", where_clause);

        let mut query_builder = sqlx::query(&sql);
        for value in &bind_values {
            query_builder = query_builder.bind(value);
        }
        let rows = query_builder.fetch_all(self.pool).await?;

        let mut count_query = sqlx::query_scalar(&count_sql);
        for value in &bind_values {
            count_query = count_query.bind(value);
        }
        let total: i64 = count_query.fetch_one(self.pool).await?;

        Ok(ListResult {
            items: rows.iter().map(row_to_approval).collect(),
            total: total as usize,
            limit: query.page.limit,
            offset: query.page.offset.unwrap_or(0),
        })
    }

    async fn pending_for_content(&self, content_id: &str) -> DbResult<Option<ApprovalRecord>> {
        let row = sqlx::query(&format!(
            "SELECT {} FROM approval_record WHERE content_id = ? AND status = 'pending'
             ORDER BY created_at DESC LIMIT 1",
            APPROVAL_COLUMNS
        ))
        .bind(content_id)
        .fetch_optional(self.pool)
        .await?;

        Ok(row.as_ref().map(row_to_approval))
    }

    async fn submit(
        &self,
        record: &ApprovalRecord,
        content_from: ContentStatus,
    ) -> DbResult<ApprovalRecord> {
        let mut tx = self.pool.begin().await?;

        let moved = sqlx::query(
            "UPDATE content_item SET status = ?, updated_at = ?
             WHERE id = ? AND status = ? AND deleted_at IS NULL",
        )
        .bind(ContentStatus::InReview.as_str())
        .bind(current_timestamp())
        .bind(&record.content_id)
        .bind(content_from.as_str())
        .execute(&mut *tx)
        .await?;

        if moved.rows_affected() == 0 {
            return Err(content_conflict(&mut tx, &record.content_id).await);
        }

        let created = insert_record(&mut tx, record).await?;
        tx.commit().await?;

        Ok(created)
    }

    async fn decide(&self, record: &ApprovalRecord, content_status: ContentStatus) -> DbResult<()> {
        let mut tx = self.pool.begin().await?;

        let decided = sqlx::query(
            "UPDATE approval_record SET status = ?, decided_by = ?, feedback = ?, decided_at = ?
             WHERE id = ? AND status = 'pending'",
        )
        .bind(record.status.as_str())
        .bind(&record.decided_by)
        .bind(&record.feedback)
        .bind(&record.decided_at)
        .bind(&record.id)
        .execute(&mut *tx)
        .await?;

        if decided.rows_affected() == 0 {
            let exists: Option<String> =
                sqlx::query_scalar("SELECT status FROM approval_record WHERE id = ?")
                    .bind(&record.id)
                    .fetch_optional(&mut *tx)
                    .await?;
            return Err(match exists {
                Some(status) => DbError::Constraint {
                    message: format!("approval '{}' was already decided ({})", record.id, status),
                },
                None => DbError::not_found("ApprovalRecord", &record.id),
            });
        }

        let moved = sqlx::query(
            "UPDATE content_item SET status = ?, updated_at = ?
             WHERE id = ? AND status = 'in_review' AND deleted_at IS NULL",
        )
        .bind(content_status.as_str())
        .bind(current_timestamp())
        .bind(&record.content_id)
        .execute(&mut *tx)
        .await?;

        if moved.rows_affected() == 0 {
            return Err(content_conflict(&mut tx, &record.content_id).await);
        }

        tx.commit().await?;
        Ok(())
    }
}

/// Insert an approval record. A second pending record for the same
/// content trips the partial unique index and is reported as
/// `AlreadyExists`.
async fn insert_record(
    conn: &mut SqliteConnection,
    record: &ApprovalRecord,
) -> DbResult<ApprovalRecord> {
    let id = if record.id.is_empty() {
        generate_entity_id()
    } else {
        record.id.clone()
    };
    let created_at = current_timestamp();

    sqlx::query(
        "INSERT INTO approval_record (id, content_id, team_id, submitted_by, note, status, decided_by, feedback, created_at, decided_at)
         VALUES (?, ?, ?, ?, ?, ?, NULL, NULL, ?, NULL)",
    )
    .bind(&id)
    .bind(&record.content_id)
    .bind(&record.team_id)
    .bind(&record.submitted_by)
    .bind(&record.note)
    .bind(record.status.as_str())
    .bind(&created_at)
    .execute(&mut *conn)
    .await
    .map_err(|e| match &e {
        sqlx::Error::Database(db_err) if db_err.is_unique_violation() => DbError::AlreadyExists {
            entity_type: "pending ApprovalRecord for content".to_string(),
            id: record.content_id.clone(),
        },
        _ => DbError::from(e),
    })?;

    Ok(ApprovalRecord {
        id,
        decided_by: None,
        feedback: None,
        decided_at: None,
        created_at,
        ..record.clone()
    })
}

/// Withdraw the pending approval of a content item, if there is one.
/// Runs on the caller's connection so it joins the caller's transaction.
pub(super) async fn withdraw_pending(
    conn: &mut SqliteConnection,
    content_id: &str,
    actor_id: &str,
    now: &str,
) -> DbResult<Option<ApprovalRecord>> {
    let row = sqlx::query(&format!(
        "SELECT {} FROM approval_record WHERE content_id = ? AND status = 'pending'",
        APPROVAL_COLUMNS
    ))
    .bind(content_id)
    .fetch_optional(&mut *conn)
    .await?;

    let Some(record) = row.as_ref().map(row_to_approval) else {
        return Ok(None);
    };

    let record = ApprovalRecord {
        status: ApprovalStatus::ChangesRequested,
        decided_by: Some(actor_id.to_string()),
        feedback: Some(WITHDRAWN_FEEDBACK.to_string()),
        decided_at: Some(now.to_string()),
        ..record
    };

    sqlx::query(
        "UPDATE approval_record SET status = ?, decided_by = ?, feedback = ?, decided_at = ?
         WHERE id = ? AND status = 'pending'",
    )
    .bind(record.status.as_str())
    .bind(&record.decided_by)
    .bind(&record.feedback)
    .bind(&record.decided_at)
    .bind(&record.id)
    .execute(&mut *conn)
    .await?;

    Ok(Some(record))
}

/// Feedback stamped on approvals closed because their content left review.
const WITHDRAWN_FEEDBACK: &str = "withdrawn from review";

/// Explain why a guarded content update touched no rows.
pub(super) async fn content_conflict(conn: &mut SqliteConnection, content_id: &str) -> DbError {
    let status: Result<Option<String>, sqlx::Error> = sqlx::query_scalar(
        "SELECT status FROM content_item WHERE id = ? AND deleted_at IS NULL",
    )
    .bind(content_id)
    .fetch_optional(&mut *conn)
    .await;

    match status {
        Ok(Some(status)) => DbError::Constraint {
            message: format!("content '{}' is now {}", content_id, status),
        },
        Ok(None) => DbError::not_found("ContentItem", content_id),
        Err(e) => DbError::from(e),
    }
}

fn row_to_approval(row: &sqlx::sqlite::SqliteRow) -> ApprovalRecord {
    ApprovalRecord {
        id: row.get("id"),
        content_id: row.get("content_id"),
        team_id: row.get("team_id"),
        submitted_by: row.get("submitted_by"),
        note: row.get("note"),
        status: {
            let status: String = row.get("status");
            ApprovalStatus::from_str(&status).unwrap_or_default()
        },
        decided_by: row.get("decided_by"),
        feedback: row.get("feedback"),
        created_at: row.get("created_at"),
        decided_at: row.get("decided_at"),
    }
}
