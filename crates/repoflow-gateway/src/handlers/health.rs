//! Health check endpoint

use axum::{extract::State, Json};
use serde_json::{json, Value};

use crate::state::AppState;

/// Liveness probe; exposes whether basic auth is active
pub async fn health(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "status": "healthy",
        "service": "gateway",
        "auth_enabled": state.auth_enabled(),
        "version": env!("CARGO_PKG_VERSION"),
    }))
}
