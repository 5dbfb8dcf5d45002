//! SQLite TeamRepository implementation.

use std::str::FromStr;

use sqlx::{Row, SqlitePool};

use super::helpers::{from_json_list, to_json_list};
use crate::db::utils::{current_timestamp, generate_entity_id};
use crate::db::{DbError, DbResult, Team, TeamMember, TeamRepository, TeamRole};

/// SQLx-backed team repository.
pub struct SqliteTeamRepository<'a> {
    pub(crate) pool: &'a SqlitePool,
}

const TEAM_COLUMNS: &str =
    "t.id, t.name, t.description, t.owner_id, t.approval_required, t.approver_ids, t.created_at, t.updated_at";

impl<'a> TeamRepository for SqliteTeamRepository<'a> {
    async fn create(&self, team: &Team) -> DbResult<Team> {
        let id = if team.id.is_empty() {
            generate_entity_id()
        } else {
            team.id.clone()
        };
        let created_at = current_timestamp();
        let approvers_json = to_json_list(&team.approver_ids)?;

        let mut tx = self.pool.begin().await?;

        sqlx::query(
            "INSERT INTO team (id, name, description, owner_id, approval_required, approver_ids, created_at, updated_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&id)
        .bind(&team.name)
        .bind(&team.description)
        .bind(&team.owner_id)
        .bind(team.approval_required)
        .bind(&approvers_json)
        .bind(&created_at)
        .bind(&created_at)
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            "INSERT INTO team_member (team_id, user_id, role, joined_at) VALUES (?, ?, 'owner', ?)",
        )
        .bind(&id)
        .bind(&team.owner_id)
        .bind(&created_at)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(Team {
            id,
            created_at: created_at.clone(),
            updated_at: created_at,
            ..team.clone()
        })
    }

    async fn get(&self, id: &str) -> DbResult<Team> {
        let row = sqlx::query(&format!("SELECT {} FROM team t WHERE t.id = ?", TEAM_COLUMNS))
            .bind(id)
            .fetch_optional(self.pool)
            .await?;

        row.as_ref()
            .map(row_to_team)
            .ok_or_else(|| DbError::not_found("Team", id))
    }

    async fn list_for_user(&self, user_id: &str) -> DbResult<Vec<Team>> {
        let rows = sqlx::query(&format!(
            "SELECT {} FROM team t
             JOIN team_member m ON m.team_id = t.id
             WHERE m.user_id = ?
             ORDER BY t.name ASC, t.id ASC",
            TEAM_COLUMNS
        ))
        .bind(user_id)
        .fetch_all(self.pool)
        .await?;

        Ok(rows.iter().map(row_to_team).collect())
    }

    async fn update(&self, team: &Team) -> DbResult<()> {
        let approvers_json = to_json_list(&team.approver_ids)?;

        let result = sqlx::query(
            "UPDATE team SET name = ?, description = ?, approval_required = ?, approver_ids = ?, updated_at = ?
             WHERE id = ?",
        )
        .bind(&team.name)
        .bind(&team.description)
        .bind(team.approval_required)
        .bind(&approvers_json)
        .bind(current_timestamp())
        .bind(&team.id)
        .execute(self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Team", &team.id));
        }

        Ok(())
    }

    async fn delete(&self, id: &str) -> DbResult<()> {
        let result = sqlx::query("DELETE FROM team WHERE id = ?")
            .bind(id)
            .execute(self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Team", id));
        }

        Ok(())
    }

    async fn add_member(&self, member: &TeamMember) -> DbResult<TeamMember> {
        let joined_at = current_timestamp();

        let result = sqlx::query(
            "INSERT INTO team_member (team_id, user_id, role, joined_at) VALUES (?, ?, ?, ?)",
        )
        .bind(&member.team_id)
        .bind(&member.user_id)
        .bind(member.role.as_str())
        .bind(&joined_at)
        .execute(self.pool)
        .await;

        match result {
            Ok(_) => Ok(TeamMember {
                joined_at,
                ..member.clone()
            }),
            Err(sqlx::Error::Database(e)) if e.is_unique_violation() => {
                Err(DbError::AlreadyExists {
                    entity_type: "TeamMember".to_string(),
                    id: format!("{}/{}", member.team_id, member.user_id),
                })
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn get_member(&self, team_id: &str, user_id: &str) -> DbResult<Option<TeamMember>> {
        let row = sqlx::query(
            "SELECT team_id, user_id, role, joined_at FROM team_member WHERE team_id = ? AND user_id = ?",
        )
        .bind(team_id)
        .bind(user_id)
        .fetch_optional(self.pool)
        .await?;

        Ok(row.as_ref().map(row_to_member))
    }

    async fn list_members(&self, team_id: &str) -> DbResult<Vec<TeamMember>> {
        let rows = sqlx::query(
            "SELECT team_id, user_id, role, joined_at FROM team_member
             WHERE team_id = ?
             ORDER BY CASE role WHEN 'owner' THEN 0 WHEN 'admin' THEN 1 ELSE 2 END, joined_at ASC, user_id ASC",
        )
        .bind(team_id)
        .fetch_all(self.pool)
        .await?;

        Ok(rows.iter().map(row_to_member).collect())
    }

    async fn update_member_role(&self, team_id: &str, user_id: &str, role: TeamRole) -> DbResult<()> {
        let result =
            sqlx::query("UPDATE team_member SET role = ? WHERE team_id = ? AND user_id = ?")
                .bind(role.as_str())
                .bind(team_id)
                .bind(user_id)
                .execute(self.pool)
                .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("TeamMember", &format!("{}/{}", team_id, user_id)));
        }

        Ok(())
    }

    async fn remove_member(&self, team_id: &str, user_id: &str) -> DbResult<()> {
        let mut tx = self.pool.begin().await?;

        let result = sqlx::query("DELETE FROM team_member WHERE team_id = ? AND user_id = ?")
            .bind(team_id)
            .bind(user_id)
            .execute(&mut *tx)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("TeamMember", &format!("{}/{}", team_id, user_id)));
        }

        let approvers: Option<String> =
            sqlx::query_scalar("SELECT approver_ids FROM team WHERE id = ?")
                .bind(team_id)
                .fetch_optional(&mut *tx)
                .await?;

        let mut approver_ids = from_json_list(approvers);
        if approver_ids.iter().any(|id| id == user_id) {
            approver_ids.retain(|id| id != user_id);
            sqlx::query("UPDATE team SET approver_ids = ?, updated_at = ? WHERE id = ?")
                .bind(to_json_list(&approver_ids)?)
                .bind(current_timestamp())
                .bind(team_id)
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;
        Ok(())
    }
}

fn row_to_team(row: &sqlx::sqlite::SqliteRow) -> Team {
    Team {
        id: row.get("id"),
        name: row.get("name"),
        description: row.get("description"),
        owner_id: row.get("owner_id"),
        approval_required: row.get("approval_required"),
        approver_ids: from_json_list(row.get("approver_ids")),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    }
}

fn row_to_member(row: &sqlx::sqlite::SqliteRow) -> TeamMember {
    TeamMember {
        team_id: row.get("team_id"),
        user_id: row.get("user_id"),
        role: {
            let role: String = row.get("role");
            TeamRole::from_str(&role).unwrap_or_default()
        },
        joined_at: row.get("joined_at"),
    }
}
