//! Shared application state for the gateway

use std::sync::Arc;

use sqlx::SqlitePool;

use courier_auth::TokenVerifier;
use courier_config::AuthConfig;
use courier_presence::ConnectionRegistry;

use crate::adapters::{SqliteDirectory, SqliteHistory};

/// Everything a connection task needs, cloned cheaply via `Arc`.
pub struct GatewayState {
    /// Online handles mapped to live connections.
    pub registry: ConnectionRegistry,
    /// Handshake token verifier.
    pub verifier: TokenVerifier,
    /// User/contact/group lookups.
    pub directory: Arc<SqliteDirectory>,
    /// Chat and message persistence.
    pub history: Arc<SqliteHistory>,
}

impl GatewayState {
    pub fn new(pool: SqlitePool, auth: &AuthConfig) -> Self {
        Self {
            registry: ConnectionRegistry::new(),
            verifier: TokenVerifier::new(auth),
            directory: Arc::new(SqliteDirectory::new(pool.clone())),
            history: Arc::new(SqliteHistory::new(pool)),
        }
    }
}
