//! SQLite UserRepository implementation.

use sqlx::{Row, SqlitePool};

use crate::db::utils::{current_timestamp, generate_entity_id};
use crate::db::{DbError, DbResult, User, UserRepository};

/// SQLx-backed user repository.
pub struct SqliteUserRepository<'a> {
    pub(crate) pool: &'a SqlitePool,
}

const USER_COLUMNS: &str = "id, email, display_name, bio, niche, created_at, updated_at";

impl<'a> UserRepository for SqliteUserRepository<'a> {
    async fn create(&self, user: &User) -> DbResult<User> {
        let id = if user.id.is_empty() {
            generate_entity_id()
        } else {
            user.id.clone()
        };
        let created_at = current_timestamp();

        let result = sqlx::query(
            "INSERT INTO user (id, email, display_name, bio, niche, created_at, updated_at)
             VALUES (?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&id)
        .bind(&user.email)
        .bind(&user.display_name)
        .bind(&user.bio)
        .bind(&user.niche)
        .bind(&created_at)
        .bind(&created_at)
        .execute(self.pool)
        .await;

        match result {
            Ok(_) => {}
            Err(sqlx::Error::Database(e)) if e.is_unique_violation() => {
                return Err(DbError::AlreadyExists {
                    entity_type: "User".to_string(),
                    id: user.email.clone(),
                });
            }
            Err(e) => return Err(e.into()),
        }

        Ok(User {
            id,
            created_at: created_at.clone(),
            updated_at: created_at,
            ..user.clone()
        })
    }

    async fn get(&self, id: &str) -> DbResult<User> {
        let row = sqlx::query(&format!("SELECT {} FROM user WHERE id = ?", USER_COLUMNS))
            .bind(id)
            .fetch_optional(self.pool)
            .await?;

        row.as_ref()
            .map(row_to_user)
            .ok_or_else(|| DbError::not_found("User", id))
    }

    async fn get_by_email(&self, email: &str) -> DbResult<Option<User>> {
        let row = sqlx::query(&format!(
            "SELECT {} FROM user WHERE email = ? COLLATE NOCASE",
            USER_COLUMNS
        ))
        .bind(email)
        .fetch_optional(self.pool)
        .await?;

        Ok(row.as_ref().map(row_to_user))
    }

    async fn update(&self, user: &User) -> DbResult<()> {
        let result = sqlx::query(
            "UPDATE user SET display_name = ?, bio = ?, niche = ?, updated_at = ? WHERE id = ?",
        )
        .bind(&user.display_name)
        .bind(&user.bio)
        .bind(&user.niche)
        .bind(current_timestamp())
        .bind(&user.id)
        .execute(self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("User", &user.id));
        }

        Ok(())
    }
}

fn row_to_user(row: &sqlx::sqlite::SqliteRow) -> User {
    User {
        id: row.get("id"),
        email: row.get("email"),
        display_name: row.get("display_name"),
        bio: row.get("bio"),
        niche: row.get("niche"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    }
}
