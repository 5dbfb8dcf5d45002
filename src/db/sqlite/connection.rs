//! SQLite database connection and migration management.

use std::path::Path;
use std::str::FromStr;

use sqlx::SqlitePool;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use tracing::{debug, info};

use super::{
    SqliteApprovalRepository, SqliteAssignmentRepository, SqliteCollaborationRepository,
    SqliteContentRepository, SqliteMessagingRepository, SqliteSharedProjectRepository,
    SqliteTeamRepository, SqliteUserRepository,
};
use crate::db::{Database, DbError, DbResult};

/// SQLite database implementation.
///
/// Provides access to repositories via associated types, avoiding dynamic dispatch.
pub struct SqliteDatabase {
    pool: SqlitePool,
}

impl SqliteDatabase {
    /// Open (or create) a database file at the given path.
    pub async fn open<P: AsRef<Path>>(path: P) -> DbResult<Self> {
        let options = SqliteConnectOptions::new()
            .filename(path.as_ref())
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .foreign_keys(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(8)
            .connect_with(options)
            .await
            .map_err(|e| DbError::Connection {
                message: e.to_string(),
            })?;

        debug!(path = %path.as_ref().display(), "opened sqlite database");
        Ok(Self { pool })
    }

    /// Create an in-memory database (useful for testing).
    ///
    /// Uses a single connection so every query sees the same memory store.
    pub async fn in_memory() -> DbResult<Self> {
        let options = SqliteConnectOptions::from_str("sqlite::memory:")
            .map_err(|e| DbError::Connection {
                message: e.to_string(),
            })?
            .foreign_keys(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await
            .map_err(|e| DbError::Connection {
                message: e.to_string(),
            })?;

        Ok(Self { pool })
    }

    /// Direct access to the pool, for tests and advanced operations.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

impl Database for SqliteDatabase {
    type Users<'a> = SqliteUserRepository<'a>;
    type Teams<'a> = SqliteTeamRepository<'a>;
    type Content<'a> = SqliteContentRepository<'a>;
    type Approvals<'a> = SqliteApprovalRepository<'a>;
    type Assignments<'a> = SqliteAssignmentRepository<'a>;
    type Messaging<'a> = SqliteMessagingRepository<'a>;
    type Collaborations<'a> = SqliteCollaborationRepository<'a>;
    type SharedProjects<'a> = SqliteSharedProjectRepository<'a>;

    async fn migrate(&self) -> DbResult<()> {
        sqlx::migrate!("./data/sql/sqlite")
            .run(&self.pool)
            .await
            .map_err(|e| DbError::Migration {
                message: e.to_string(),
            })?;

        info!("database migrations applied");
        Ok(())
    }

    fn users(&self) -> Self::Users<'_> {
        SqliteUserRepository { pool: &self.pool }
    }

    fn teams(&self) -> Self::Teams<'_> {
        SqliteTeamRepository { pool: &self.pool }
    }

    fn content(&self) -> Self::Content<'_> {
        SqliteContentRepository { pool: &self.pool }
    }

    fn approvals(&self) -> Self::Approvals<'_> {
        SqliteApprovalRepository { pool: &self.pool }
    }

    fn assignments(&self) -> Self::Assignments<'_> {
        SqliteAssignmentRepository { pool: &self.pool }
    }

    fn messaging(&self) -> Self::Messaging<'_> {
        SqliteMessagingRepository { pool: &self.pool }
    }

    fn collaborations(&self) -> Self::Collaborations<'_> {
        SqliteCollaborationRepository { pool: &self.pool }
    }

    fn shared_projects(&self) -> Self::SharedProjects<'_> {
        SqliteSharedProjectRepository { pool: &self.pool }
    }
}
