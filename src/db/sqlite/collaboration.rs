//! SQLite CollaborationRepository implementation.

use std::str::FromStr;

use sqlx::{Row, SqliteConnection, SqlitePool};

use super::helpers::{build_limit_offset_clause, build_order_clause, build_where_clause};
use super::shared_project::insert_project;
use crate::db::utils::{current_timestamp, generate_entity_id};
use crate::db::{
    CollaborationQuery, CollaborationRepository, CollaborationRequest, CollaborationStatus,
    DbError, DbResult, ListResult, SharedProject, SortOrder,
};

/// SQLx-backed collaboration request repository.
pub struct SqliteCollaborationRepository<'a> {
    pub(crate) pool: &'a SqlitePool,
}

const REQUEST_COLUMNS: &str =
    "id, sender_id, recipient_id, title, message, status, created_at, responded_at";

impl<'a> CollaborationRepository for SqliteCollaborationRepository<'a> {
    async fn create(&self, request: &CollaborationRequest) -> DbResult<CollaborationRequest> {
        let id = if request.id.is_empty() {
            generate_entity_id()
        } else {
            request.id.clone()
        };
        let created_at = current_timestamp();

        sqlx::query(
            "INSERT INTO collaboration_request (id, sender_id, recipient_id, title, message, status, created_at, responded_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, NULL)",
        )
        .bind(&id)
        .bind(&request.sender_id)
        .bind(&request.recipient_id)
        .bind(&request.title)
        .bind(&request.message)
        .bind(request.status.as_str())
        .bind(&created_at)
        .execute(self.pool)
        .await
        .map_err(|e| match &e {
            sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
                DbError::AlreadyExists {
                    entity_type: "pending CollaborationRequest to recipient".to_string(),
                    id: request.recipient_id.clone(),
                }
            }
            _ => DbError::from(e),
        })?;

        Ok(CollaborationRequest {
            id,
            created_at,
            responded_at: None,
            ..request.clone()
        })
    }

    async fn get(&self, id: &str) -> DbResult<CollaborationRequest> {
        let row = sqlx::query(&format!(
            "SELECT {} FROM collaboration_request WHERE id = ?",
            REQUEST_COLUMNS
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        row.as_ref()
            .map(row_to_request)
            .ok_or_else(|| DbError::not_found("CollaborationRequest", id))
    }

    async fn list(
        &self,
        query: &CollaborationQuery,
    ) -> DbResult<ListResult<CollaborationRequest>> {
        let allowed_fields = ["title", "status", "created_at", "responded_at"];
        let order_clause =
            build_order_clause(&query.page, &allowed_fields, "created_at", SortOrder::Desc);
        let limit_clause = build_limit_offset_clause(&query.page);

        let mut conditions: Vec<String> = Vec::new();
        let mut bind_values: Vec<String> = Vec::new();

        if let Some(sender_id) = &query.sender_id {
            conditions.push("sender_id = ?".to_string());
            bind_values.push(sender_id.clone());
        }
        if let Some(recipient_id) = &query.recipient_id {
            conditions.push("recipient_id = ?".to_string());
            bind_values.push(recipient_id.clone());
        }
        if let Some(status) = &query.status {
            conditions.push("status = ?".to_string());
            bind_values.push(status.to_string());
        }

        let where_clause = build_where_clause(&conditions);
        let sql = format!(
            "SELECT {} FROM collaboration_request {} {} {}",
            REQUEST_COLUMNS, where_clause, order_clause, limit_clause
        );
        let count_sql = format!("SELECT COUNT(*) FROM collaboration_request {}", where_clause);

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
            items: rows.iter().map(row_to_request).collect(),
            total: total as usize,
            limit: query.page.limit,
            offset: query.page.offset.unwrap_or(0),
        })
    }

    async fn find_pending(
        &self,
        sender_id: &str,
        recipient_id: &str,
    ) -> DbResult<Option<CollaborationRequest>> {
        let row = sqlx::query(&format!(
            "SELECT {} FROM collaboration_request
             WHERE sender_id = ? AND recipient_id = ? AND status = 'pending'
             LIMIT 1",
            REQUEST_COLUMNS
        ))
        .bind(sender_id)
        .bind(recipient_id)
        .fetch_optional(self.pool)
        .await?;

        Ok(row.as_ref().map(row_to_request))
    }

    async fn update_status(&self, id: &str, status: CollaborationStatus) -> DbResult<()> {
        let mut conn = self.pool.acquire().await?;
        respond_pending(&mut conn, id, status).await
    }

    async fn accept(&self, id: &str, project: &SharedProject) -> DbResult<SharedProject> {
        let mut tx = self.pool.begin().await?;

        respond_pending(&mut tx, id, CollaborationStatus::Accepted).await?;

        let (sender_id, recipient_id): (String, String) = sqlx::query_as(
            "SELECT sender_id, recipient_id FROM collaboration_request WHERE id = ?",
        )
        .bind(id)
        .fetch_one(&mut *tx)
        .await?;

        let created = insert_project(
            &mut tx,
            &SharedProject {
                collaboration_request_id: id.to_string(),
                owner_id: sender_id,
                partner_id: recipient_id,
                ..project.clone()
            },
        )
        .await?;

        tx.commit().await?;
        Ok(created)
    }
}

/// Move a request out of `pending`. Zero rows means it is missing or was
/// answered by someone else first.
async fn respond_pending(
    conn: &mut SqliteConnection,
    id: &str,
    status: CollaborationStatus,
) -> DbResult<()> {
    let result = sqlx::query(
        "UPDATE collaboration_request SET status = ?, responded_at = ?
         WHERE id = ? AND status = 'pending'",
    )
    .bind(status.as_str())
    .bind(current_timestamp())
    .bind(id)
    .execute(&mut *conn)
    .await?;

    if result.rows_affected() == 0 {
        let current: Option<String> =
            sqlx::query_scalar("SELECT status FROM collaboration_request WHERE id = ?")
                .bind(id)
                .fetch_optional(&mut *conn)
                .await?;
        return Err(match current {
            Some(current) => DbError::Constraint {
                message: format!("collaboration request '{}' is already {}", id, current),
            },
            None => DbError::not_found("CollaborationRequest", id),
        });
    }

    Ok(())
}

fn row_to_request(row: &sqlx::sqlite::SqliteRow) -> CollaborationRequest {
    CollaborationRequest {
        id: row.get("id"),
        sender_id: row.get("sender_id"),
        recipient_id: row.get("recipient_id"),
        title: row.get("title"),
        message: row.get("message"),
        status: {
            let status: String = row.get("status");
            CollaborationStatus::from_str(&status).unwrap_or_default()
        },
        created_at: row.get("created_at"),
        responded_at: row.get("responded_at"),
    }
}
