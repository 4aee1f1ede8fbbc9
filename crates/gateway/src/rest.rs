//! Read-only diagnostic routes.

use std::sync::Arc;

use axum::{extract::State, Json};
use serde::Serialize;
use serde_json::{json, Value};

use crate::state::GatewayState;

/// Liveness probe.
pub async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

#[derive(Debug, Serialize)]
pub struct PresenceResponse {
    pub online: Vec<String>,
    pub count: usize,
}

/// Handles currently connected, from the registry snapshot.
pub async fn presence_snapshot(State(state): State<Arc<GatewayState>>) -> Json<PresenceResponse> {
    let online = state.registry.snapshot().await;
    let count = online.len();
    Json(PresenceResponse { online, count })
}
