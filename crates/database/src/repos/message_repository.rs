//! Repository for the append-only message history.

use sqlx::{Row, SqlitePool};
use tracing::info;

use crate::entities::{MessageType, StoredMessage};
use crate::types::DatabaseResult;

#[derive(Clone)]
pub struct MessageRepository {
    pool: SqlitePool,
}

impl MessageRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Append one message to a chat. The timestamp is supplied by the
    /// router so delivery and history always agree.
    pub async fn append(
        &self,
        chat_id: i64,
        sender: &str,
        content: &str,
        message_type: MessageType,
        timestamp: &str,
    ) -> DatabaseResult<StoredMessage> {
        let public_id = cuid2::cuid();

        let result = sqlx::query(
            "INSERT INTO messages (public_id, chat_id, sender, content, message_type, timestamp)
             VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(&public_id)
        .bind(chat_id)
        .bind(sender)
        .bind(content)
        .bind(message_type.as_str())
        .bind(timestamp)
        .execute(&self.pool)
        .await?;

        info!(%public_id, chat_id, sender, "appended message");

        Ok(StoredMessage {
            id: result.last_insert_rowid(),
            public_id,
            chat_id,
            sender: sender.to_string(),
            content: content.to_string(),
            message_type,
            timestamp: timestamp.to_string(),
        })
    }

    /// Messages of a chat, newest first.
    pub async fn list_by_chat(
        &self,
        chat_id: i64,
        limit: i64,
        offset: i64,
    ) -> DatabaseResult<Vec<StoredMessage>> {
        let rows = sqlx::query(
            "SELECT id, public_id, chat_id, sender, content, message_type, timestamp
             FROM messages WHERE chat_id = ?
             ORDER BY timestamp DESC LIMIT ? OFFSET ?",
        )
        .bind(chat_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(map_message).collect()
    }

    pub async fn count_by_chat(&self, chat_id: i64) -> DatabaseResult<i64> {
        let row = sqlx::query("SELECT COUNT(*) AS n FROM messages WHERE chat_id = ?")
            .bind(chat_id)
            .fetch_one(&self.pool)
            .await?;
        Ok(row.try_get("n")?)
    }
}

fn map_message(row: sqlx::sqlite::SqliteRow) -> DatabaseResult<StoredMessage> {
    let message_type: String = row.try_get("message_type")?;
    Ok(StoredMessage {
        id: row.try_get("id")?,
        public_id: row.try_get("public_id")?,
        chat_id: row.try_get("chat_id")?,
        sender: row.try_get("sender")?,
        content: row.try_get("content")?,
        message_type: MessageType::from(message_type.as_str()),
        timestamp: row.try_get("timestamp")?,
    })
}
