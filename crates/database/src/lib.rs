//! Courier Database Crate
//!
//! SQLite persistence for the Courier backend: connection management,
//! migrations, and the repositories behind the relationship directory and
//! the chat history store.

use sqlx::SqlitePool;

pub mod connection;
pub mod entities;
pub mod migrations;
pub mod repos;
pub mod types;

pub use connection::prepare_database;
pub use migrations::run_migrations;

pub use repos::{ChatRepository, MessageRepository, UserRepository};

pub use entities::{
    chat::{Chat, ChatRoster},
    message::{MessageType, StoredMessage},
    user::User,
};

pub use types::{errors::DatabaseError, DatabaseResult};

/// Connect to the configured database and bring the schema up to date.
pub async fn initialize_database(
    config: &courier_config::DatabaseConfig,
) -> DatabaseResult<SqlitePool> {
    let pool = prepare_database(config)
        .await
        .map_err(|e| DatabaseError::Connection(e.to_string()))?;

    run_migrations(&pool)
        .await
        .map_err(|e| DatabaseError::Migration(e.to_string()))?;

    Ok(pool)
}

/// In-memory database for tests.
pub async fn initialize_test_database() -> DatabaseResult<SqlitePool> {
    initialize_database(&courier_config::DatabaseConfig {
        url: "sqlite::memory:".to_string(),
        max_connections: 1,
    })
    .await
}
