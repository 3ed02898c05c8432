//! Read-only task API

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

/// List tasks with counts by status
pub async fn list(State(state): State<AppState>, Query(paging): Query<Paging>) -> Response {
    let limit = paging.limit.clamp(1, 200);
    let offset = paging.offset.max(0);
    let tasks = match state.store.list_review_tasks(limit, offset).await {
        Ok(tasks) => tasks,
        Err(err) => return store_error(err),
    };
    let counts = match state.store.review_task_counts().await {
        Ok(counts) => counts,
        Err(err) => return store_error(err),
    };
    Json(json!({
        "tasks": tasks,
        "counts": counts,
        "limit": limit,
        "offset": offset,
    }))
    .into_response()
}

/// Fetch one task
pub async fn get(State(state): State<AppState>, Path(task_id): Path<String>) -> Response {
    match state.store.get_review_task(&task_id).await {
        Ok(task) => Json(task).into_response(),
        Err(repoflow_store::StoreError::NotFound(_)) => (
            StatusCode::NOT_FOUND,
            Json(json!({"error": "task not found"})),
        )
            .into_response(),
        Err(err) => store_error(err),
    }
}

/// Counts by status
pub async fn stats(State(state): State<AppState>) -> Response {
    match state.store.review_task_counts().await {
        Ok(counts) => Json(counts).into_response(),
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
