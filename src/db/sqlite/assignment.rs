//! SQLite AssignmentRepository implementation.

use std::str::FromStr;

use sqlx::{Row, SqlitePool};

use super::helpers::{build_limit_offset_clause, build_order_clause, build_where_clause};
use crate::db::utils::{current_timestamp, generate_entity_id};
use crate::db::{
    AssignmentQuery, AssignmentRepository, AssignmentStatus, DbError, DbResult, ListResult,
    SortOrder, TaskAssignment, TaskComment,
};

/// SQLx-backed task assignment repository.
pub struct SqliteAssignmentRepository<'a> {
    pub(crate) pool: &'a SqlitePool,
}

const TASK_COLUMNS: &str = "id, team_id, content_id, title, description, assignee_id, created_by, status, priority, \
     due_date, created_at, updated_at, started_at, completed_at";

impl<'a> AssignmentRepository for SqliteAssignmentRepository<'a> {
    async fn create(&self, task: &TaskAssignment) -> DbResult<TaskAssignment> {
        let id = if task.id.is_empty() {
            generate_entity_id()
        } else {
            task.id.clone()
        };
        let created_at = current_timestamp();

        sqlx::query(
            "INSERT INTO task_assignment (id, team_id, content_id, title, description, assignee_id, created_by,
                                          status, priority, due_date, created_at, updated_at, started_at, completed_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&id)
        .bind(&task.team_id)
        .bind(&task.content_id)
        .bind(&task.title)
        .bind(&task.description)
        .bind(&task.assignee_id)
        .bind(&task.created_by)
        .bind(task.status.as_str())
        .bind(task.priority)
        .bind(&task.due_date)
        .bind(&created_at)
        .bind(&created_at)
        .bind(&task.started_at)
        .bind(&task.completed_at)
        .execute(self.pool)
        .await?;

        Ok(TaskAssignment {
            id,
            created_at: created_at.clone(),
            updated_at: created_at,
            ..task.clone()
        })
    }

    async fn get(&self, id: &str) -> DbResult<TaskAssignment> {
        let row = sqlx::query(&format!(
            "SELECT {} FROM task_assignment WHERE id = ?",
            TASK_COLUMNS
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        row.as_ref()
            .map(row_to_task)
            .ok_or_else(|| DbError::not_found("TaskAssignment", id))
    }

    async fn list(&self, query: &AssignmentQuery) -> DbResult<ListResult<TaskAssignment>> {
        let allowed_fields = [
            "title",
            "status",
            "priority",
            "due_date",
            "created_at",
            "updated_at",
        ];
        let order_clause =
            build_order_clause(&query.page, &allowed_fields, "created_at", SortOrder::Desc);
        let limit_clause = build_limit_offset_clause(&query.page);

        let mut conditions: Vec<String> = Vec::new();
        let mut bind_values: Vec<String> = Vec::new();

        if let Some(team_id) = &query.team_id {
            conditions.push("team_id = ?".to_string());
            bind_values.push(team_id.clone());
        }
        if let Some(assignee_id) = &query.assignee_id {
            conditions.push("assignee_id = ?".to_string());
            bind_values.push(assignee_id.clone());
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
            "SELECT {} FROM task_assignment {} {} {}",
            TASK_COLUMNS, where_clause, order_clause, limit_clause
        );
        let count_sql = format!("SELECT COUNT(*) FROM task_assignment {}", where_clause);

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
            items: rows.iter().map(row_to_task).collect(),
            total: total as usize,
            limit: query.page.limit,
            offset: query.page.offset.unwrap_or(0),
        })
    }

    async fn update(&self, task: &TaskAssignment) -> DbResult<()> {
        let result = sqlx::query(
            "UPDATE task_assignment
             SET content_id = ?, title = ?, description = ?, assignee_id = ?, status = ?, priority = ?,
                 due_date = ?, updated_at = ?, started_at = ?, completed_at = ?
             WHERE id = ?",
        )
        .bind(&task.content_id)
        .bind(&task.title)
        .bind(&task.description)
        .bind(&task.assignee_id)
        .bind(task.status.as_str())
        .bind(task.priority)
        .bind(&task.due_date)
        .bind(current_timestamp())
        .bind(&task.started_at)
        .bind(&task.completed_at)
        .bind(&task.id)
        .execute(self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("TaskAssignment", &task.id));
        }

        Ok(())
    }

    async fn delete(&self, id: &str) -> DbResult<()> {
        let result = sqlx::query("DELETE FROM task_assignment WHERE id = ?")
            .bind(id)
            .execute(self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("TaskAssignment", id));
        }

        Ok(())
    }

    async fn add_comment(&self, comment: &TaskComment) -> DbResult<TaskComment> {
        let id = if comment.id.is_empty() {
            generate_entity_id()
        } else {
            comment.id.clone()
        };
        let created_at = current_timestamp();

        sqlx::query(
            "INSERT INTO task_comment (id, task_id, author_id, content, created_at) VALUES (?, ?, ?, ?, ?)",
        )
        .bind(&id)
        .bind(&comment.task_id)
        .bind(&comment.author_id)
        .bind(&comment.content)
        .bind(&created_at)
        .execute(self.pool)
        .await?;

        Ok(TaskComment {
            id,
            created_at,
            ..comment.clone()
        })
    }

    async fn list_comments(&self, task_id: &str) -> DbResult<Vec<TaskComment>> {
        let rows = sqlx::query(
            "SELECT id, task_id, author_id, content, created_at FROM task_comment
             WHERE task_id = ? ORDER BY created_at ASC, rowid ASC",
        )
        .bind(task_id)
        .fetch_all(self.pool)
        .await?;

        Ok(rows
            .iter()
            .map(|row| TaskComment {
                id: row.get("id"),
                task_id: row.get("task_id"),
                author_id: row.get("author_id"),
                content: row.get("content"),
                created_at: row.get("created_at"),
            })
            .collect())
    }
}

fn row_to_task(row: &sqlx::sqlite::SqliteRow) -> TaskAssignment {
    TaskAssignment {
        id: row.get("id"),
        team_id: row.get("team_id"),
        content_id: row.get("content_id"),
        title: row.get("title"),
        description: row.get("description"),
        assignee_id: row.get("assignee_id"),
        created_by: row.get("created_by"),
        status: {
            let status: String = row.get("status");
            AssignmentStatus::from_str(&status).unwrap_or_default()
        },
        priority: row.get("priority"),
        due_date: row.get("due_date"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
        started_at: row.get("started_at"),
        completed_at: row.get("completed_at"),
    }
}
