//! Feedback ingestion and analytics API

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Deserialize;
use serde_json::json;
use tracing::{info, warn};

use crate::{handlers::scores::store_error, service::ScoreJob, state::AppState};

/// Body of a feedback submission
#[derive(Debug, Deserialize)]
pub struct FeedbackBody {
    /// Free-text feedback on the score
    pub feedback: String,
}

/// Accept user feedback on a score
///
/// The text is appended to the record synchronously; analysis runs on the
/// pool so the response never waits for the model.
pub async fn submit(
    State(state): State<AppState>,
    Path(score_id): Path<String>,
    Json(body): Json<FeedbackBody>,
) -> Response {
    let text = body.feedback.trim().to_string();
    if text.is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({"error": "feedback must not be empty"})),
        )
            .into_response();
    }

    match state.store.append_user_feedback(&score_id, &text).await {
        Ok(()) => {}
        Err(repoflow_store::StoreError::NotFound(_)) => {
            return (
                StatusCode::NOT_FOUND,
                Json(json!({"error": "score not found"})),
            )
                .into_response();
        }
        Err(err) => return store_error(err),
    }

    let job = ScoreJob::Feedback {
        score_id: score_id.clone(),
        text,
    };
    if state.pool.try_submit(&score_id, job).is_err() {
        // the raw feedback is saved; analysis can be redone later
        warn!(score_id = %score_id, "feedback analyzer queue full");
        return (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(json!({"error": "analyzer queue full"})),
        )
            .into_response();
    }
    info!(score_id = %score_id, "feedback accepted");
    (
        StatusCode::ACCEPTED,
        Json(json!({"status": "accepted", "score_id": score_id})),
    )
        .into_response()
}

/// List feedback patterns, most frequent first
pub async fn patterns(State(state): State<AppState>) -> Response {
    match state.store.list_patterns().await {
        Ok(patterns) => Json(json!({"patterns": patterns})).into_response(),
        Err(err) => store_error(err),
    }
}

/// Compute and persist a snapshot over the last 24 hours
pub async fn snapshot(State(state): State<AppState>) -> Response {
    match state.service.take_snapshot().await {
        Ok(snapshot) => Json(snapshot).into_response(),
        Err(err) => {
            warn!(error = %err, "snapshot failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({"error": "snapshot failed"})),
            )
                .into_response()
        }
    }
}
