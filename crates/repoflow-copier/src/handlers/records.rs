//! Read-only record API

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Deserialize;
use serde_json::json;

use crate::state::AppState;

/// Paging parameters
#[derive(Debug, Deserialize)]
pub struct Paging {
    /// Page size, capped at 200
    #[serde(default = "default_limit")]
    pub limit: i64,
    /// Offset into the listing
    #[serde(default)]
    pub offset: i64,
}

fn default_limit() -> i64 {
    50
}

/// List copy records
pub async fn list_copies(State(state): State<AppState>, Query(paging): Query<Paging>) -> Response {
    let limit = paging.limit.clamp(1, 200);
    let offset = paging.offset.max(0);
    match state.store.list_copy_records(limit, offset).await {
        Ok(records) => Json(json!({
            "copies": records,
            "limit": limit,
            "offset": offset,
        }))
        .into_response(),
        Err(err) => store_error(err),
    }
}

/// Counts of copy records by outcome
pub async fn copy_stats(State(state): State<AppState>) -> Response {
    match state.store.copy_counts().await {
        Ok(counts) => Json(counts).into_response(),
        Err(err) => store_error(err),
    }
}

/// List mirrored comments
pub async fn list_comment_syncs(
    State(state): State<AppState>,
    Query(paging): Query<Paging>,
) -> Response {
    let limit = paging.limit.clamp(1, 200);
    let offset = paging.offset.max(0);
    match state.store.list_comment_syncs(limit, offset).await {
        Ok(records) => Json(json!({
            "comment_syncs": records,
            "limit": limit,
            "offset": offset,
        }))
        .into_response(),
        Err(err) => store_error(err),
    }
}

fn store_error(err: repoflow_store::StoreError) -> Response {
    tracing::error!(error = %err, "store query failed");
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({"error": "store"})),
    )
        .into_response()
}
