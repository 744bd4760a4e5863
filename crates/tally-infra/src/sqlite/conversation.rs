//! SQLite conversation store implementation.
//!
//! Implements `ConversationStore` from `tally-core`. Turns live in
//! `chat_turns` with an autoincrement `seq` that gives the per-user order;
//! the rolling summary is one upserted row in `memory_summaries`.

use chrono::{DateTime, Utc};
use sqlx::Row;

use tally_core::chat::store::ConversationStore;
use tally_types::chat::{ChatTurn, MemorySummary, TurnRole};
use tally_types::error::RepositoryError;
use tally_types::user::UserId;

use super::pool::DatabasePool;

/// SQLite-backed implementation of `ConversationStore`.
#[derive(Clone)]
pub struct SqliteConversationStore {
    pool: DatabasePool,
}

impl SqliteConversationStore {
    /// Create a new store backed by the given database pool.
    pub fn new(pool: DatabasePool) -> Self {
        Self { pool }
    }
}

/// Internal row type for mapping SQLite rows to domain ChatTurn.
struct TurnRow {
    seq: i64,
    user_id: String,
    role: String,
    content: String,
    created_at: String,
}

impl TurnRow {
    fn from_row(row: &sqlx::sqlite::SqliteRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            seq: row.try_get("seq")?,
            user_id: row.try_get("user_id")?,
            role: row.try_get("role")?,
            content: row.try_get("content")?,
            created_at: row.try_get("created_at")?,
        })
    }

    fn into_turn(self) -> Result<ChatTurn, RepositoryError> {
        let user_id = self
            .user_id
            .parse::<UserId>()
            .map_err(|e| RepositoryError::Query(format!("invalid user id: {e}")))?;
        let role: TurnRole = self
            .role
            .parse()
            .map_err(|e: String| RepositoryError::Query(e))?;

        Ok(ChatTurn {
            seq: self.seq,
            user_id,
            role,
            content: self.content,
            created_at: parse_datetime(&self.created_at)?,
        })
    }
}

fn parse_datetime(s: &str) -> Result<DateTime<Utc>, RepositoryError> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| RepositoryError::Query(format!("invalid datetime: {e}")))
}

fn format_datetime(dt: &DateTime<Utc>) -> String {
    dt.to_rfc3339()
}

fn rows_to_turns(rows: &[sqlx::sqlite::SqliteRow]) -> Result<Vec<ChatTurn>, RepositoryError> {
    let mut turns = Vec::with_capacity(rows.len());
    for row in rows {
        let turn_row = TurnRow::from_row(row).map_err(|e| RepositoryError::Query(e.to_string()))?;
        turns.push(turn_row.into_turn()?);
    }
    Ok(turns)
}

impl ConversationStore for SqliteConversationStore {
    async fn append(
        &self,
        user_id: &UserId,
        role: TurnRole,
        content: &str,
    ) -> Result<ChatTurn, RepositoryError> {
        let created_at = Utc::now();

        let result = sqlx::query(
            "INSERT INTO chat_turns (user_id, role, content, created_at) VALUES (?, ?, ?, ?)",
        )
        .bind(user_id.to_string())
        .bind(role.to_string())
        .bind(content)
        .bind(format_datetime(&created_at))
        .execute(&self.pool.writer)
        .await
        .map_err(|e| RepositoryError::Query(e.to_string()))?;

        Ok(ChatTurn {
            seq: result.last_insert_rowid(),
            user_id: *user_id,
            role,
            content: content.to_string(),
            created_at,
        })
    }

    async fn recent(&self, user_id: &UserId, limit: usize) -> Result<Vec<ChatTurn>, RepositoryError> {
        if limit == 0 {
            return Ok(Vec::new());
        }

        let limit = i64::try_from(limit).unwrap_or(i64::MAX);
        let rows = sqlx::query(
            "SELECT * FROM chat_turns WHERE user_id = ? ORDER BY seq DESC LIMIT ?",
        )
        .bind(user_id.to_string())
        .bind(limit)
        .fetch_all(&self.pool.reader)
        .await
        .map_err(|e| RepositoryError::Query(e.to_string()))?;

        // Newest-first from the query; callers want chronological order.
        let mut turns = rows_to_turns(&rows)?;
        turns.reverse();
        Ok(turns)
    }

    async fn count(&self, user_id: &UserId) -> Result<usize, RepositoryError> {
        let row = sqlx::query("SELECT COUNT(*) as cnt FROM chat_turns WHERE user_id = ?")
            .bind(user_id.to_string())
            .fetch_one(&self.pool.reader)
            .await
            .map_err(|e| RepositoryError::Query(e.to_string()))?;

        let count: i64 = row
            .try_get("cnt")
            .map_err(|e| RepositoryError::Query(e.to_string()))?;
        Ok(usize::try_from(count).unwrap_or_default())
    }

    async fn all_ordered(&self, user_id: &UserId) -> Result<Vec<ChatTurn>, RepositoryError> {
        let rows = sqlx::query("SELECT * FROM chat_turns WHERE user_id = ? ORDER BY seq ASC")
            .bind(user_id.to_string())
            .fetch_all(&self.pool.reader)
            .await
            .map_err(|e| RepositoryError::Query(e.to_string()))?;

        rows_to_turns(&rows)
    }

    async fn purge(&self, user_id: &UserId) -> Result<u64, RepositoryError> {
        let result = sqlx::query("DELETE FROM chat_turns WHERE user_id = ?")
            .bind(user_id.to_string())
            .execute(&self.pool.writer)
            .await
            .map_err(|e| RepositoryError::Query(e.to_string()))?;

        Ok(result.rows_affected())
    }

    async fn get_summary(&self, user_id: &UserId) -> Result<Option<MemorySummary>, RepositoryError> {
        let row = sqlx::query("SELECT * FROM memory_summaries WHERE user_id = ?")
            .bind(user_id.to_string())
            .fetch_optional(&self.pool.reader)
            .await
            .map_err(|e| RepositoryError::Query(e.to_string()))?;

        match row {
            Some(row) => {
                let summary: String = row
                    .try_get("summary")
                    .map_err(|e| RepositoryError::Query(e.to_string()))?;
                let updated_at: String = row
                    .try_get("updated_at")
                    .map_err(|e| RepositoryError::Query(e.to_string()))?;
                Ok(Some(MemorySummary {
                    user_id: *user_id,
                    summary,
                    updated_at: parse_datetime(&updated_at)?,
                }))
            }
            None => Ok(None),
        }
    }

    async fn put_summary(&self, user_id: &UserId, summary: &str) -> Result<(), RepositoryError> {
        // A blank summary never replaces an existing one.
        if summary.trim().is_empty() {
            return Ok(());
        }

        sqlx::query(
            "INSERT INTO memory_summaries (user_id, summary, updated_at) VALUES (?, ?, ?) \
             ON CONFLICT(user_id) DO UPDATE SET summary = excluded.summary, updated_at = excluded.updated_at",
        )
        .bind(user_id.to_string())
        .bind(summary)
        .bind(format_datetime(&Utc::now()))
        .execute(&self.pool.writer)
        .await
        .map_err(|e| RepositoryError::Query(e.to_string()))?;

        Ok(())
    }

    async fn clear_summary(&self, user_id: &UserId) -> Result<(), RepositoryError> {
        sqlx::query("DELETE FROM memory_summaries WHERE user_id = ?")
            .bind(user_id.to_string())
            .execute(&self.pool.writer)
            .await
            .map_err(|e| RepositoryError::Query(e.to_string()))?;

        Ok(())
    }
}
