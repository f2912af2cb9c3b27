//! Conversation log repository implementation

use chrono::{DateTime, Utc};
use sqlx::FromRow;
use crate::database::DatabasePool;
use crate::models::ConversationEntry;
use crate::utils::errors::PjotinhaError;

#[derive(Debug, Clone, FromRow)]
pub struct ConversationRow {
    pub id: i64,
    pub sender_id: String,
    pub role: String,
    pub text: String,
    pub created_at: DateTime<Utc>,
}

impl TryFrom<ConversationRow> for ConversationEntry {
    type Error = PjotinhaError;

    fn try_from(row: ConversationRow) -> Result<Self, Self::Error> {
        Ok(ConversationEntry {
            sender_id: row.sender_id,
            role: row.role.parse()?,
            text: row.text,
            timestamp: row.created_at,
        })
    }
}

#[derive(Clone, Debug)]
pub struct ConversationRepository {
    pool: DatabasePool,
}

impl ConversationRepository {
    pub fn new(pool: DatabasePool) -> Self {
        Self { pool }
    }

    /// Append an entry to the log
    pub async fn append(&self, entry: &ConversationEntry) -> Result<(), PjotinhaError> {
        sqlx::query(
            "INSERT INTO conversation_entries (sender_id, role, text, created_at) VALUES (?, ?, ?, ?)",
        )
        .bind(&entry.sender_id)
        .bind(entry.role.as_str())
        .bind(&entry.text)
        .bind(entry.timestamp)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Last `limit` entries for a sender in insertion order
    pub async fn recent(&self, sender_id: &str, limit: usize) -> Result<Vec<ConversationEntry>, PjotinhaError> {
        let rows = sqlx::query_as::<_, ConversationRow>(
            r#"
            SELECT id, sender_id, role, text, created_at
            FROM conversation_entries
            WHERE sender_id = ?
            ORDER BY id DESC
            LIMIT ?
            "#,
        )
        .bind(sender_id)
        .bind(i64::try_from(limit).unwrap_or(i64::MAX))
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter()
            .rev()
            .map(ConversationEntry::try_from)
            .collect()
    }

    /// Count entries for a sender
    pub async fn count_for_sender(&self, sender_id: &str) -> Result<i64, PjotinhaError> {
        let count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM conversation_entries WHERE sender_id = ?")
            .bind(sender_id)
            .fetch_one(&self.pool)
            .await?;

        Ok(count.0)
    }
}
