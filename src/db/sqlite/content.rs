//! SQLite ContentRepository implementation.

use std::str::FromStr;

use sqlx::{Row, SqlitePool};

use super::approval::{content_conflict, withdraw_pending};
use super::helpers::{
    build_limit_offset_clause, build_order_clause, build_where_clause, from_json_list,
    to_json_list,
};
use crate::db::utils::{current_timestamp, generate_entity_id};
use crate::db::{
    ApprovalRecord, ContentItem, ContentQuery, ContentRepository, ContentStatus, DbError, DbResult, ListResult,
    SortOrder,
};

/// SQLx-backed content repository.
pub struct SqliteContentRepository<'a> {
    pub(crate) pool: &'a SqlitePool,
}

const CONTENT_COLUMNS: &str = "id, owner_id, team_id, title, description, notes, platform, tags, status, \
     scheduled_at, published_at, deleted_at, created_at, updated_at";

/// Visibility rule: the viewer owns the item or is a member of its team.
const VISIBLE_TO_CONDITION: &str =
    "(owner_id = ? OR team_id IN (SELECT team_id FROM team_member WHERE user_id = ?))";

impl<'a> ContentRepository for SqliteContentRepository<'a> {
    async fn create(&self, item: &ContentItem) -> DbResult<ContentItem> {
        let id = if item.id.is_empty() {
            generate_entity_id()
        } else {
            item.id.clone()
        };
        let created_at = current_timestamp();
        let tags_json = to_json_list(&item.tags)?;

        sqlx::query(
            "INSERT INTO content_item (id, owner_id, team_id, title, description, notes, platform, tags, status,
                                       scheduled_at, published_at, deleted_at, created_at, updated_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, NULL, ?, ?)",
        )
        .bind(&id)
        .bind(&item.owner_id)
        .bind(&item.team_id)
        .bind(&item.title)
        .bind(&item.description)
        .bind(&item.notes)
        .bind(&item.platform)
        .bind(&tags_json)
        .bind(item.status.as_str())
        .bind(&item.scheduled_at)
        .bind(&item.published_at)
        .bind(&created_at)
        .bind(&created_at)
        .execute(self.pool)
        .await?;

        Ok(ContentItem {
            id,
            deleted_at: None,
            created_at: created_at.clone(),
            updated_at: created_at,
            ..item.clone()
        })
    }

    async fn get(&self, id: &str) -> DbResult<ContentItem> {
        let row = sqlx::query(&format!(
            "SELECT {} FROM content_item WHERE id = ? AND deleted_at IS NULL",
            CONTENT_COLUMNS
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        row.as_ref()
            .map(row_to_content)
            .ok_or_else(|| DbError::not_found("ContentItem", id))
    }

    async fn list(&self, query: &ContentQuery) -> DbResult<ListResult<ContentItem>> {
        let allowed_fields = ["title", "status", "scheduled_at", "created_at", "updated_at"];
        let order_clause =
            build_order_clause(&query.page, &allowed_fields, "updated_at", SortOrder::Desc);
        let limit_clause = build_limit_offset_clause(&query.page);

        let mut conditions: Vec<String> = vec!["deleted_at IS NULL".to_string()];
        let mut bind_values: Vec<String> = Vec::new();

        if let Some(viewer) = &query.visible_to {
            conditions.push(VISIBLE_TO_CONDITION.to_string());
            bind_values.push(viewer.clone());
            bind_values.push(viewer.clone());
        }

        if let Some(team_id) = &query.team_id {
            conditions.push("team_id = ?".to_string());
            bind_values.push(team_id.clone());
        }

        if let Some(status) = &query.status {
            conditions.push("status = ?".to_string());
            bind_values.push(status.to_string());
        }

        if let Some(from) = &query.scheduled_from {
            conditions.push("scheduled_at >= ?".to_string());
            bind_values.push(from.clone());
        }

        if let Some(to) = &query.scheduled_to {
            conditions.push("scheduled_at <= ?".to_string());
            bind_values.push(to.clone());
        }

        let where_clause = build_where_clause(&conditions);

        let sql = format!(
            "SELECT {} FROM content_item {} {} {}",
            CONTENT_COLUMNS, where_clause, order_clause, limit_clause
        );
        let count_sql = format!("SELECT COUNT(*) FROM content_item {}", where_clause);

        let mut query_builder = sqlx::query(&sql);
        for value in &bind_values {
            query_builder = query_builder.bind(value);
        }
        let rows = query_builder.fetch_all(self.pool).await?;
        let items: Vec<ContentItem> = rows.iter().map(row_to_content).collect();

        let mut count_query = sqlx::query_scalar(&count_sql);
        for value in &bind_values {
            count_query = count_query.bind(value);
        }
        let total: i64 = count_query.fetch_one(self.pool).await?;

        Ok(ListResult {
            items,
            total: total as usize,
            limit: query.page.limit,
            offset: query.page.offset.unwrap_or(0),
        })
    }

    async fn update(&self, item: &ContentItem) -> DbResult<()> {
        let tags_json = to_json_list(&item.tags)?;

        let result = sqlx::query(
            "UPDATE content_item
             SET team_id = ?, title = ?, description = ?, notes = ?, platform = ?, tags = ?, status = ?,
                 scheduled_at = ?, published_at = ?, updated_at = ?
             WHERE id = ? AND deleted_at IS NULL",
        )
        .bind(&item.team_id)
        .bind(&item.title)
        .bind(&item.description)
        .bind(&item.notes)
        .bind(&item.platform)
        .bind(&tags_json)
        .bind(item.status.as_str())
        .bind(&item.scheduled_at)
        .bind(&item.published_at)
        .bind(current_timestamp())
        .bind(&item.id)
        .execute(self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("ContentItem", &item.id));
        }

        Ok(())
    }

    async fn change_status(
        &self,
        item: &ContentItem,
        from: ContentStatus,
        actor_id: &str,
    ) -> DbResult<Option<ApprovalRecord>> {
        let now = current_timestamp();
        let mut tx = self.pool.begin().await?;

        let result = sqlx::query(
            "UPDATE content_item SET status = ?, scheduled_at = ?, published_at = ?, updated_at = ?
             WHERE id = ? AND status = ? AND deleted_at IS NULL",
        )
        .bind(item.status.as_str())
        .bind(&item.scheduled_at)
        .bind(&item.published_at)
        .bind(&now)
        .bind(&item.id)
        .bind(from.as_str())
        .execute(&mut *tx)
        .await?;

        if result.rows_affected() == 0 {
            return Err(content_conflict(&mut tx, &item.id).await);
        }

        let withdrawn = if from == ContentStatus::InReview && item.status != from {
            withdraw_pending(&mut tx, &item.id, actor_id, &now).await?
        } else {
            None
        };

        tx.commit().await?;
        Ok(withdrawn)
    }

    async fn soft_delete(&self, id: &str, actor_id: &str) -> DbResult<Option<ApprovalRecord>> {
        let now = current_timestamp();
        let mut tx = self.pool.begin().await?;

        let result = sqlx::query(
            "UPDATE content_item SET deleted_at = ?, updated_at = ? WHERE id = ? AND deleted_at IS NULL",
        )
        .bind(&now)
        .bind(&now)
        .bind(id)
        .execute(&mut *tx)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("ContentItem", id));
        }

        let withdrawn = withdraw_pending(&mut tx, id, actor_id, &now).await?;
        tx.commit().await?;

        Ok(withdrawn)
    }

    async fn count_by_status(&self, viewer_id: &str) -> DbResult<Vec<(ContentStatus, usize)>> {
        let rows = sqlx::query(&format!(
            "SELECT status, COUNT(*) AS total FROM content_item
             WHERE deleted_at IS NULL AND {}
             GROUP BY status",
            VISIBLE_TO_CONDITION
        ))
        .bind(viewer_id)
        .bind(viewer_id)
        .fetch_all(self.pool)
        .await?;

        let mut counts: Vec<(ContentStatus, usize)> = ContentStatus::all()
            .iter()
            .map(|status| (*status, 0usize))
            .collect();

        for row in &rows {
            let status: String = row.get("status");
            let total: i64 = row.get("total");
            if let Ok(status) = ContentStatus::from_str(&status)
                && let Some(entry) = counts.iter_mut().find(|(s, _)| *s == status)
            {
                entry.1 = total as usize;
            }
        }

        Ok(counts)
    }
}

fn row_to_content(row: &sqlx::sqlite::SqliteRow) -> ContentItem {
    ContentItem {
        id: row.get("id"),
        owner_id: row.get("owner_id"),
        team_id: row.get("team_id"),
        title: row.get("title"),
        description: row.get("description"),
        notes: row.get("notes"),
        platform: row.get("platform"),
        tags: from_json_list(row.get("tags")),
        status: {
            let status: String = row.get("status");
            ContentStatus::from_str(&status).unwrap_or_default()
        },
        scheduled_at: row.get("scheduled_at"),
        published_at: row.get("published_at"),
        deleted_at: row.get("deleted_at"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    }
}
