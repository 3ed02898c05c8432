//! Health check endpoint

use axum::Json;
use serde_json::{json, Value};

/// Liveness probe
pub async fn health() -> Json<Value> {
    Json(json!({
        "status": "healthy",
        "service": "pr-review",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}
