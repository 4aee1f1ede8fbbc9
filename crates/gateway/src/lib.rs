//! Courier Gateway Crate
//!
//! Binds the transport-agnostic routing core to the outside world: the
//! `/ws` WebSocket endpoint, the SQLite-backed implementations of the
//! core's directory and history seams, and a couple of read-only
//! diagnostic routes.

use std::sync::Arc;

use axum::{routing::get, Router};

pub mod adapters;
pub mod rest;
pub mod state;
pub mod websocket;

pub use adapters::{SqliteDirectory, SqliteHistory};
pub use state::GatewayState;

/// Assemble the public router.
pub fn create_router(state: Arc<GatewayState>) -> Router {
    Router::new()
        .route("/health", get(rest::health))
        .route("/api/presence", get(rest::presence_snapshot))
        .route("/ws", get(websocket::websocket_handler))
        .with_state(state)
}
