//! Read-only score API

use axum::{
    extract::{Path, Query, State},
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

/// List score records with counts by status
pub async fn list(State(state): State<AppState>, Query(paging): Query<Paging>) -> Response {
    let limit = paging.limit.clamp(1, 200);
    let offset = paging.offset.max(0);
    let scores = match state.store.list_scores(limit, offset).await {
        Ok(scores) => scores,
        Err(err) => return store_error(err),
    };
    let counts = match state.store.score_counts().await {
        Ok(counts) => counts,
        Err(err) => return store_error(err),
    };
    Json(json!({
        "scores": scores,
        "counts": counts,
        "limit": limit,
        "offset": offset,
    }))
    .into_response()
}

/// Fetch one score record
pub async fn get(State(state): State<AppState>, Path(score_id): Path<String>) -> Response {
    match state.store.get_score(&score_id).await {
        Ok(score) => Json(score).into_response(),
        Err(repoflow_store::StoreError::NotFound(_)) => (
            StatusCode::NOT_FOUND,
            Json(json!({"error": "score not found"})),
        )
            .into_response(),
        Err(err) => store_error(err),
    }
}

/// Counts by status
pub async fn stats(State(state): State<AppState>) -> Response {
    match state.store.score_counts().await {
        Ok(counts) => Json(counts).into_response(),
        Err(err) => store_error(err),
    }
}

pub(crate) fn store_error(err: repoflow_store::StoreError) -> Response {
    tracing::error!(error = %err, "store query failed");
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({"error": "store"})),
    )
        .into_response()
}
