//! SQLite MessagingRepository implementation.

use sqlx::{Row, SqlitePool};

use super::helpers::build_limit_offset_clause;
use crate::db::utils::{current_timestamp, generate_entity_id};
use crate::db::{
    Conversation, ConversationSummary, DbError, DbResult, ListResult, Message,
    MessagingRepository, PageSort,
};

/// SQLx-backed messaging repository.
pub struct SqliteMessagingRepository<'a> {
    pub(crate) pool: &'a SqlitePool,
}

const MESSAGE_COLUMNS: &str = "id, conversation_id, sender_id, content, created_at, read_at";

impl<'a> SqliteMessagingRepository<'a> {
    async fn participants(&self, conversation_id: &str) -> DbResult<Vec<String>> {
        let ids: Vec<String> = sqlx::query_scalar(
            "SELECT user_id FROM conversation_participant WHERE conversation_id = ? ORDER BY user_id",
        )
        .bind(conversation_id)
        .fetch_all(self.pool)
        .await?;
        Ok(ids)
    }
}

impl<'a> MessagingRepository for SqliteMessagingRepository<'a> {
    async fn find_direct(&self, user_a: &str, user_b: &str) -> DbResult<Option<Conversation>> {
        let id: Option<String> = sqlx::query_scalar(
            "SELECT c.id FROM conversation c
             WHERE (SELECT COUNT(*) FROM conversation_participant p WHERE p.conversation_id = c.id) = 2
               AND EXISTS (SELECT 1 FROM conversation_participant p WHERE p.conversation_id = c.id AND p.user_id = ?)
               AND EXISTS (SELECT 1 FROM conversation_participant p WHERE p.conversation_id = c.id AND p.user_id = ?)
             ORDER BY c.created_at ASC
             LIMIT 1",
        )
        .bind(user_a)
        .bind(user_b)
        .fetch_optional(self.pool)
        .await?;

        match id {
            Some(id) => Ok(Some(self.get_conversation(&id).await?)),
            None => Ok(None),
        }
    }

    async fn create_conversation(&self, participant_ids: &[String]) -> DbResult<Conversation> {
        let id = generate_entity_id();
        let created_at = current_timestamp();

        let mut tx = self.pool.begin().await?;

        sqlx::query("INSERT INTO conversation (id, created_at, updated_at) VALUES (?, ?, ?)")
            .bind(&id)
            .bind(&created_at)
            .bind(&created_at)
            .execute(&mut *tx)
            .await?;

        for user_id in participant_ids {
            sqlx::query(
                "INSERT OR IGNORE INTO conversation_participant (conversation_id, user_id) VALUES (?, ?)",
            )
            .bind(&id)
            .bind(user_id)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;

        let mut participant_ids = participant_ids.to_vec();
        participant_ids.sort();
        participant_ids.dedup();

        Ok(Conversation {
            id,
            participant_ids,
            created_at: created_at.clone(),
            updated_at: created_at,
        })
    }

    async fn get_conversation(&self, id: &str) -> DbResult<Conversation> {
        let row = sqlx::query("SELECT id, created_at, updated_at FROM conversation WHERE id = ?")
            .bind(id)
            .fetch_optional(self.pool)
            .await?
            .ok_or_else(|| DbError::not_found("Conversation", id))?;

        Ok(Conversation {
            id: row.get("id"),
            participant_ids: self.participants(id).await?,
            created_at: row.get("created_at"),
            updated_at: row.get("updated_at"),
        })
    }

    async fn list_for_user(&self, user_id: &str) -> DbResult<Vec<ConversationSummary>> {
        let ids: Vec<String> = sqlx::query_scalar(
            "SELECT c.id FROM conversation c
             JOIN conversation_participant p ON p.conversation_id = c.id
             WHERE p.user_id = ?
             ORDER BY c.updated_at DESC, c.rowid DESC",
        )
        .bind(user_id)
        .fetch_all(self.pool)
        .await?;

        let mut summaries = Vec::with_capacity(ids.len());
        for id in ids {
            let conversation = self.get_conversation(&id).await?;

            let unread: i64 = sqlx::query_scalar(
                "SELECT COUNT(*) FROM message
                 WHERE conversation_id = ? AND sender_id != ? AND read_at IS NULL",
            )
            .bind(&id)
            .bind(user_id)
            .fetch_one(self.pool)
            .await?;

            let last_message = sqlx::query(&format!(
                "SELECT {} FROM message WHERE conversation_id = ? ORDER BY created_at DESC, rowid DESC LIMIT 1",
                MESSAGE_COLUMNS
            ))
            .bind(&id)
            .fetch_optional(self.pool)
            .await?
            .as_ref()
            .map(row_to_message);

            summaries.push(ConversationSummary {
                conversation,
                unread_count: unread as usize,
                last_message,
            });
        }

        Ok(summaries)
    }

    async fn add_message(&self, message: &Message) -> DbResult<Message> {
        let id = if message.id.is_empty() {
            generate_entity_id()
        } else {
            message.id.clone()
        };
        let created_at = current_timestamp();

        let mut tx = self.pool.begin().await?;

        let bumped = sqlx::query("UPDATE conversation SET updated_at = ? WHERE id = ?")
            .bind(&created_at)
            .bind(&message.conversation_id)
            .execute(&mut *tx)
            .await?;

        if bumped.rows_affected() == 0 {
            return Err(DbError::not_found("Conversation", &message.conversation_id));
        }

        sqlx::query(
            "INSERT INTO message (id, conversation_id, sender_id, content, created_at, read_at)
             VALUES (?, ?, ?, ?, ?, NULL)",
        )
        .bind(&id)
        .bind(&message.conversation_id)
        .bind(&message.sender_id)
        .bind(&message.content)
        .bind(&created_at)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(Message {
            id,
            created_at,
            read_at: None,
            ..message.clone()
        })
    }

    async fn list_messages(
        &self,
        conversation_id: &str,
        page: &PageSort,
    ) -> DbResult<ListResult<Message>> {
        let limit_clause = build_limit_offset_clause(page);

        let rows = sqlx::query(&format!(
            "SELECT {} FROM message WHERE conversation_id = ?
             ORDER BY created_at DESC, rowid DESC {}",
            MESSAGE_COLUMNS, limit_clause
        ))
        .bind(conversation_id)
        .fetch_all(self.pool)
        .await?;

        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM message WHERE conversation_id = ?")
            .bind(conversation_id)
            .fetch_one(self.pool)
            .await?;

        Ok(ListResult {
            items: rows.iter().map(row_to_message).collect(),
            total: total as usize,
            limit: page.limit,
            offset: page.offset.unwrap_or(0),
        })
    }

    async fn mark_read(&self, conversation_id: &str, reader_id: &str) -> DbResult<u64> {
        let result = sqlx::query(
            "UPDATE message SET read_at = ?
             WHERE conversation_id = ? AND sender_id != ? AND read_at IS NULL",
        )
        .bind(current_timestamp())
        .bind(conversation_id)
        .bind(reader_id)
        .execute(self.pool)
        .await?;

        Ok(result.rows_affected())
    }

    async fn unread_count(&self, user_id: &str) -> DbResult<u64> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM message m
             JOIN conversation_participant p ON p.conversation_id = m.conversation_id
             WHERE p.user_id = ? AND m.sender_id != ? AND m.read_at IS NULL",
        )
        .bind(user_id)
        .bind(user_id)
        .fetch_one(self.pool)
        .await?;

        Ok(count as u64)
    }
}

fn row_to_message(row: &sqlx::sqlite::SqliteRow) -> Message {
    Message {
        id: row.get("id"),
        conversation_id: row.get("conversation_id"),
        sender_id: row.get("sender_id"),
        content: row.get("content"),
        created_at: row.get("created_at"),
        read_at: row.get("read_at"),
    }
}
