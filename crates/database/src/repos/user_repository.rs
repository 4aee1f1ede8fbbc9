//! Repository for user and contact data access.

use sqlx::{Row, SqlitePool};
use tracing::info;

use crate::entities::User;
use crate::types::{DatabaseError, DatabaseResult};

#[derive(Clone)]
pub struct UserRepository {
    pool: SqlitePool,
}

impl UserRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Create a user. Registration itself lives in the account service;
    /// this exists for seeding and tests.
    pub async fn create(&self, username: &str) -> DatabaseResult<User> {
        let public_id = cuid2::cuid();
        let now = chrono::Utc::now().to_rfc3339();

        let result = sqlx::query(
            "INSERT INTO users (public_id, username, disabled, created_at) VALUES (?, ?, 0, ?)",
        )
        .bind(&public_id)
        .bind(username)
        .bind(&now)
        .execute(&self.pool)
        .await?;

        info!(username, %public_id, "created user");

        Ok(User {
            id: result.last_insert_rowid(),
            public_id,
            username: username.to_string(),
            disabled: false,
            created_at: now,
        })
    }

    pub async fn find_by_public_id(&self, public_id: &str) -> DatabaseResult<Option<User>> {
        let row = sqlx::query(
            "SELECT id, public_id, username, disabled, created_at FROM users WHERE public_id = ?",
        )
        .bind(public_id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(map_user).transpose()
    }

    pub async fn find_by_username(&self, username: &str) -> DatabaseResult<Option<User>> {
        let row = sqlx::query(
            "SELECT id, public_id, username, disabled, created_at FROM users WHERE username = ?",
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;

        row.map(map_user).transpose()
    }

    /// Flip the disabled flag. Disabled users cannot authenticate.
    pub async fn set_disabled(&self, public_id: &str, disabled: bool) -> DatabaseResult<()> {
        let result = sqlx::query("UPDATE users SET disabled = ? WHERE public_id = ?")
            .bind(disabled)
            .bind(public_id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DatabaseError::UserNotFound(public_id.to_string()));
        }
        Ok(())
    }

    /// Add `contact_id` to `user_id`'s contact list (one direction).
    pub async fn add_contact(&self, user_id: i64, contact_id: i64) -> DatabaseResult<()> {
        sqlx::query("INSERT OR IGNORE INTO contacts (user_id, contact_id) VALUES (?, ?)")
            .bind(user_id)
            .bind(contact_id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    /// Contact usernames of the user with `public_id`. Errors if no such
    /// user exists.
    pub async fn contacts_of(&self, public_id: &str) -> DatabaseResult<Vec<String>> {
        let user = self
            .find_by_public_id(public_id)
            .await?
            .ok_or_else(|| DatabaseError::UserNotFound(public_id.to_string()))?;

        let rows = sqlx::query(
            "SELECT u.username FROM contacts c
             JOIN users u ON u.id = c.contact_id
             WHERE c.user_id = ?
             ORDER BY u.username",
        )
        .bind(user.id)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter()
            .map(|row| row.try_get("username").map_err(DatabaseError::from))
            .collect()
    }
}

fn map_user(row: sqlx::sqlite::SqliteRow) -> DatabaseResult<User> {
    Ok(User {
        id: row.try_get("id")?,
        public_id: row.try_get("public_id")?,
        username: row.try_get("username")?,
        disabled: row.try_get("disabled")?,
        created_at: row.try_get("created_at")?,
    })
}
