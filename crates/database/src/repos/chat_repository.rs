//! Repository for chat and membership data access.

use sqlx::{Row, SqlitePool};
use tracing::info;

use crate::entities::{Chat, ChatRoster};
use crate::types::DatabaseResult;

#[derive(Clone)]
pub struct ChatRepository {
    pool: SqlitePool,
}

impl ChatRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn find_by_public_id(&self, public_id: &str) -> DatabaseResult<Option<Chat>> {
        let row = sqlx::query(
            "SELECT id, public_id, is_direct, name, description, created_at
             FROM chats WHERE public_id = ?",
        )
        .bind(public_id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(map_chat).transpose()
    }

    /// The direct chat between two users, if one exists. Direct chats have
    /// exactly these two members by construction. The two joins must hit
    /// distinct membership rows, so asking with the same user on both
    /// sides finds nothing instead of matching any chat that user is in.
    pub async fn find_direct_between(
        &self,
        user_a: i64,
        user_b: i64,
    ) -> DatabaseResult<Option<Chat>> {
        let row = sqlx::query(
            "SELECT c.id, c.public_id, c.is_direct, c.name, c.description, c.created_at
             FROM chats c
             JOIN chat_members ma ON ma.chat_id = c.id AND ma.user_id = ?
             JOIN chat_members mb ON mb.chat_id = c.id AND mb.user_id = ?
             WHERE c.is_direct = 1 AND ma.user_id <> mb.user_id",
        )
        .bind(user_a)
        .bind(user_b)
        .fetch_optional(&self.pool)
        .await?;

        row.map(map_chat).transpose()
    }

    /// Create the 1:1 chat between two users. The member set is fixed for
    /// the chat's lifetime.
    pub async fn create_direct(&self, user_a: i64, user_b: i64) -> DatabaseResult<Chat> {
        let public_id = cuid2::cuid();
        let now = chrono::Utc::now().to_rfc3339();

        let mut tx = self.pool.begin().await?;

        let result = sqlx::query(
            "INSERT INTO chats (public_id, is_direct, name, description, created_at)
             VALUES (?, 1, NULL, NULL, ?)",
        )
        .bind(&public_id)
        .bind(&now)
        .execute(&mut *tx)
        .await?;
        let chat_id = result.last_insert_rowid();

        for user_id in [user_a, user_b] {
            sqlx::query("INSERT INTO chat_members (chat_id, user_id, is_admin) VALUES (?, ?, 0)")
                .bind(chat_id)
                .bind(user_id)
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;

        info!(%public_id, user_a, user_b, "created direct chat");

        Ok(Chat {
            id: chat_id,
            public_id,
            is_direct: true,
            name: None,
            description: None,
            created_at: now,
        })
    }

    /// Create a group chat. The creator becomes a member and an admin.
    pub async fn create_group(
        &self,
        name: &str,
        description: &str,
        creator_id: i64,
        member_ids: &[i64],
    ) -> DatabaseResult<Chat> {
        let public_id = cuid2::cuid();
        let now = chrono::Utc::now().to_rfc3339();

        let mut tx = self.pool.begin().await?;

        let result = sqlx::query(
            "INSERT INTO chats (public_id, is_direct, name, description, created_at)
             VALUES (?, 0, ?, ?, ?)",
        )
        .bind(&public_id)
        .bind(name)
        .bind(description)
        .bind(&now)
        .execute(&mut *tx)
        .await?;
        let chat_id = result.last_insert_rowid();

        sqlx::query("INSERT INTO chat_members (chat_id, user_id, is_admin) VALUES (?, ?, 1)")
            .bind(chat_id)
            .bind(creator_id)
            .execute(&mut *tx)
            .await?;

        for member_id in member_ids.iter().filter(|id| **id != creator_id) {
            sqlx::query("INSERT INTO chat_members (chat_id, user_id, is_admin) VALUES (?, ?, 0)")
                .bind(chat_id)
                .bind(member_id)
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;

        info!(%public_id, name, "created group chat");

        Ok(Chat {
            id: chat_id,
            public_id,
            is_direct: false,
            name: Some(name.to_string()),
            description: Some(description.to_string()),
            created_at: now,
        })
    }

    /// Member and admin usernames of the group with `public_id`, or `None`
    /// if the id is unknown or names a direct chat.
    pub async fn group_roster_of(&self, public_id: &str) -> DatabaseResult<Option<ChatRoster>> {
        let chat = match self.find_by_public_id(public_id).await? {
            Some(chat) if !chat.is_direct => chat,
            _ => return Ok(None),
        };

        let rows = sqlx::query(
            "SELECT u.username, m.is_admin FROM chat_members m
             JOIN users u ON u.id = m.user_id
             WHERE m.chat_id = ?
             ORDER BY u.username",
        )
        .bind(chat.id)
        .fetch_all(&self.pool)
        .await?;

        let mut roster = ChatRoster::default();
        for row in rows {
            let username: String = row.try_get("username")?;
            let is_admin: bool = row.try_get("is_admin")?;
            if is_admin {
                roster.admins.push(username.clone());
            }
            roster.members.push(username);
        }

        Ok(Some(roster))
    }
}

fn map_chat(row: sqlx::sqlite::SqliteRow) -> DatabaseResult<Chat> {
    Ok(Chat {
        id: row.try_get("id")?,
        public_id: row.try_get("public_id")?,
        is_direct: row.try_get("is_direct")?,
        name: row.try_get("name")?,
        description: row.try_get("description")?,
        created_at: row.try_get("created_at")?,
    })
}
