//! SQLite SharedProjectRepository implementation.

use std::str::FromStr;

use sqlx::{Row, SqliteConnection, SqlitePool};
use tracing::debug;

use crate::db::utils::{current_timestamp, generate_entity_id};
use crate::db::{
    DbError, DbResult, SharedProject, SharedProjectLink, SharedProjectRepository,
    SharedProjectStatus, SharedProjectTask,
};

/// SQLx-backed shared project repository.
pub struct SqliteSharedProjectRepository<'a> {
    pub(crate) pool: &'a SqlitePool,
}

const PROJECT_COLUMNS: &str = "id, collaboration_request_id, title, description, owner_id, partner_id, status, created_at, updated_at";
const TASK_COLUMNS: &str =
    "id, project_id, title, assignee_id, is_completed, due_date, created_at, completed_at";

impl<'a> SqliteSharedProjectRepository<'a> {
    /// Load tasks and links into a project read without them.
    async fn hydrate(&self, mut project: SharedProject) -> DbResult<SharedProject> {
        let task_rows = sqlx::query(&format!(
            "SELECT {} FROM shared_project_task WHERE project_id = ? ORDER BY created_at ASC, rowid ASC",
            TASK_COLUMNS
        ))
        .bind(&project.id)
        .fetch_all(self.pool)
        .await?;
        project.tasks = task_rows.iter().map(row_to_task).collect();

        let link_rows = sqlx::query(
            "SELECT id, project_id, url, label, added_by, created_at FROM shared_project_link
             WHERE project_id = ? ORDER BY created_at ASC, rowid ASC",
        )
        .bind(&project.id)
        .fetch_all(self.pool)
        .await?;
        project.links = link_rows
            .iter()
            .map(|row| SharedProjectLink {
                id: row.get("id"),
                project_id: row.get("project_id"),
                url: row.get("url"),
                label: row.get("label"),
                added_by: row.get("added_by"),
                created_at: row.get("created_at"),
            })
            .collect();

        Ok(project)
    }
}

impl<'a> SharedProjectRepository for SqliteSharedProjectRepository<'a> {
    async fn create_or_get(&self, project: &SharedProject) -> DbResult<(SharedProject, bool)> {
        if let Some(existing) = self.get_by_request(&project.collaboration_request_id).await? {
            return Ok((existing, false));
        }

        // The connection goes back to the pool before the fallback read.
        let result = {
            let mut conn = self.pool.acquire().await?;
            insert_project(&mut conn, project).await
        };

        match result {
            Ok(created) => Ok((created, true)),
            // Lost a race with a concurrent create for the same request.
            Err(sqlx::Error::Database(e)) if e.is_unique_violation() => {
                debug!(
                    request_id = %project.collaboration_request_id,
                    "shared project already created, returning existing"
                );
                let message = e.message().to_string();
                let existing = self
                    .get_by_request(&project.collaboration_request_id)
                    .await?
                    .ok_or(DbError::Constraint { message })?;
                Ok((existing, false))
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn get(&self, id: &str) -> DbResult<SharedProject> {
        let row = sqlx::query(&format!(
            "SELECT {} FROM shared_project WHERE id = ?",
            PROJECT_COLUMNS
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await?
        .ok_or_else(|| DbError::not_found("SharedProject", id))?;

        self.hydrate(row_to_project(&row)).await
    }

    async fn get_by_request(&self, request_id: &str) -> DbResult<Option<SharedProject>> {
        let row = sqlx::query(&format!(
            "SELECT {} FROM shared_project WHERE collaboration_request_id = ?",
            PROJECT_COLUMNS
        ))
        .bind(request_id)
        .fetch_optional(self.pool)
        .await?;

        match row {
            Some(row) => Ok(Some(self.hydrate(row_to_project(&row)).await?)),
            None => Ok(None),
        }
    }

    async fn list_for_user(&self, user_id: &str) -> DbResult<Vec<SharedProject>> {
        let rows = sqlx::query(&format!(
            "SELECT {} FROM shared_project
             WHERE owner_id = ? OR partner_id = ?
             ORDER BY updated_at DESC, id DESC",
            PROJECT_COLUMNS
        ))
        .bind(user_id)
        .bind(user_id)
        .fetch_all(self.pool)
        .await?;

        Ok(rows.iter().map(row_to_project).collect())
    }

    async fn update(&self, project: &SharedProject) -> DbResult<()> {
        let result = sqlx::query(
            "UPDATE shared_project SET title = ?, description = ?, status = ?, updated_at = ? WHERE id = ?",
        )
        .bind(&project.title)
        .bind(&project.description)
        .bind(project.status.as_str())
        .bind(current_timestamp())
        .bind(&project.id)
        .execute(self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("SharedProject", &project.id));
        }

        Ok(())
    }

    async fn add_task(&self, task: &SharedProjectTask) -> DbResult<SharedProjectTask> {
        let id = if task.id.is_empty() {
            generate_entity_id()
        } else {
            task.id.clone()
        };
        let created_at = current_timestamp();

        sqlx::query(
            "INSERT INTO shared_project_task (id, project_id, title, assignee_id, is_completed, due_date, created_at, completed_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&id)
        .bind(&task.project_id)
        .bind(&task.title)
        .bind(&task.assignee_id)
        .bind(task.is_completed)
        .bind(&task.due_date)
        .bind(&created_at)
        .bind(&task.completed_at)
        .execute(self.pool)
        .await?;

        touch_project(self.pool, &task.project_id).await?;

        Ok(SharedProjectTask {
            id,
            created_at,
            ..task.clone()
        })
    }

    async fn get_task(&self, project_id: &str, task_id: &str) -> DbResult<SharedProjectTask> {
        let row = sqlx::query(&format!(
            "SELECT {} FROM shared_project_task WHERE id = ? AND project_id = ?",
            TASK_COLUMNS
        ))
        .bind(task_id)
        .bind(project_id)
        .fetch_optional(self.pool)
        .await?;

        row.as_ref()
            .map(row_to_task)
            .ok_or_else(|| DbError::not_found("SharedProjectTask", task_id))
    }

    async fn update_task(&self, task: &SharedProjectTask) -> DbResult<()> {
        let result = sqlx::query(
            "UPDATE shared_project_task SET title = ?, assignee_id = ?, is_completed = ?, due_date = ?, completed_at = ?
             WHERE id = ? AND project_id = ?",
        )
        .bind(&task.title)
        .bind(&task.assignee_id)
        .bind(task.is_completed)
        .bind(&task.due_date)
        .bind(&task.completed_at)
        .bind(&task.id)
        .bind(&task.project_id)
        .execute(self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("SharedProjectTask", &task.id));
        }

        touch_project(self.pool, &task.project_id).await
    }

    async fn delete_task(&self, project_id: &str, task_id: &str) -> DbResult<()> {
        let result = sqlx::query("DELETE FROM shared_project_task WHERE id = ? AND project_id = ?")
            .bind(task_id)
            .bind(project_id)
            .execute(self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("SharedProjectTask", task_id));
        }

        touch_project(self.pool, project_id).await
    }

    async fn add_link(&self, link: &SharedProjectLink) -> DbResult<SharedProjectLink> {
        let id = if link.id.is_empty() {
            generate_entity_id()
        } else {
            link.id.clone()
        };
        let created_at = current_timestamp();

        sqlx::query(
            "INSERT INTO shared_project_link (id, project_id, url, label, added_by, created_at)
             VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(&id)
        .bind(&link.project_id)
        .bind(&link.url)
        .bind(&link.label)
        .bind(&link.added_by)
        .bind(&created_at)
        .execute(self.pool)
        .await?;

        touch_project(self.pool, &link.project_id).await?;

        Ok(SharedProjectLink {
            id,
            created_at,
            ..link.clone()
        })
    }

    async fn delete_link(&self, project_id: &str, link_id: &str) -> DbResult<()> {
        let result = sqlx::query("DELETE FROM shared_project_link WHERE id = ? AND project_id = ?")
            .bind(link_id)
            .bind(project_id)
            .execute(self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("SharedProjectLink", link_id));
        }

        touch_project(self.pool, project_id).await
    }
}

async fn touch_project(pool: &SqlitePool, project_id: &str) -> DbResult<()> {
    sqlx::query("UPDATE shared_project SET updated_at = ? WHERE id = ?")
        .bind(current_timestamp())
        .bind(project_id)
        .execute(pool)
        .await?;
    Ok(())
}

/// Insert a project row on the given connection, so callers can run it
/// inside their own transaction.
pub(super) async fn insert_project(
    conn: &mut SqliteConnection,
    project: &SharedProject,
) -> Result<SharedProject, sqlx::Error> {
    let id = if project.id.is_empty() {
        generate_entity_id()
    } else {
        project.id.clone()
    };
    let created_at = current_timestamp();

    sqlx::query(
        "INSERT INTO shared_project (id, collaboration_request_id, title, description, owner_id, partner_id, status, created_at, updated_at)
         VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(&id)
    .bind(&project.collaboration_request_id)
    .bind(&project.title)
    .bind(&project.description)
    .bind(&project.owner_id)
    .bind(&project.partner_id)
    .bind(project.status.as_str())
    .bind(&created_at)
    .bind(&created_at)
    .execute(&mut *conn)
    .await?;

    Ok(SharedProject {
        id,
        tasks: vec![],
        links: vec![],
        created_at: created_at.clone(),
        updated_at: created_at,
        ..project.clone()
    })
}

fn row_to_project(row: &sqlx::sqlite::SqliteRow) -> SharedProject {
    SharedProject {
        id: row.get("id"),
        collaboration_request_id: row.get("collaboration_request_id"),
        title: row.get("title"),
        description: row.get("description"),
        owner_id: row.get("owner_id"),
        partner_id: row.get("partner_id"),
        status: {
            let status: String = row.get("status");
            SharedProjectStatus::from_str(&status).unwrap_or_default()
        },
        tasks: vec![],
        links: vec![],
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    }
}

fn row_to_task(row: &sqlx::sqlite::SqliteRow) -> SharedProjectTask {
    SharedProjectTask {
        id: row.get("id"),
        project_id: row.get("project_id"),
        title: row.get("title"),
        assignee_id: row.get("assignee_id"),
        is_completed: row.get("is_completed"),
        due_date: row.get("due_date"),
        created_at: row.get("created_at"),
        completed_at: row.get("completed_at"),
    }
}
