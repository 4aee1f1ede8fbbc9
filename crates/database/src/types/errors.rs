//! Error types for the persistence layer.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum DatabaseError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("connection error: {0}")]
    Connection(String),

    #[error("migration error: {0}")]
    Migration(String),

    #[error("user not found: {0}")]
    UserNotFound(String),

    #[error("chat not found: {0}")]
    ChatNotFound(String),
}
