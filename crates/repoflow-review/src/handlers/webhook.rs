//! Webhook intake

use axum::{
    body::Bytes,
    extract::State,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use repoflow_github::{PullRequestEvent, WebhookEventType};
use repoflow_store::NewReviewTask;
use serde_json::json;
use tracing::{info, warn};

use crate::{
    gate::gate_event,
    service::ReviewJob,
    state::AppState,
};

/// Accept a `pull_request` webhook, gate it, and enqueue a review task
pub async fn receive(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let event_name = headers
        .get("x-github-event")
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default();

    match WebhookEventType::from_header(event_name) {
        WebhookEventType::Ping => {
            (StatusCode::OK, Json(json!({"status": "success", "event": "ping"}))).into_response()
        }
        WebhookEventType::PullRequest => handle_pull_request(&state, &body).await,
        other => (
            StatusCode::OK,
            Json(json!({"status": "ignored", "event": other.to_string()})),
        )
            .into_response(),
    }
}

async fn handle_pull_request(state: &AppState, body: &[u8]) -> Response {
    let event: PullRequestEvent = match serde_json::from_slice(body) {
        Ok(event) => event,
        Err(err) => {
            warn!(error = %err, "dropping malformed pull_request payload");
            return (
                StatusCode::OK,
                Json(json!({"status": "ignored", "reason": "malformed payload"})),
            )
                .into_response();
        }
    };

    let decision = gate_event(&event, &state.config);
    if !decision.is_accept() {
        return (
            StatusCode::OK,
            Json(json!({"status": "ignored", "reason": decision.reason()})),
        )
            .into_response();
    }

    let new = NewReviewTask {
        repo: event.repository.full_name.clone(),
        pr_number: event.pull_request.number,
        pr_title: event.pull_request.title.clone(),
        pr_author: event.pull_request.user.login.clone(),
        pr_url: event.pull_request.html_url.clone(),
    };
    let task_id = new.task_id();

    let outcome = match state.store.upsert_review_task(&new).await {
        Ok(outcome) => outcome,
        Err(err) => {
            warn!(task_id = %task_id, error = %err, "failed to persist review task");
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({"error": "store"})),
            )
                .into_response();
        }
    };

    if outcome.should_enqueue() {
        let job = ReviewJob {
            task_id: task_id.clone(),
        };
        if state.pool.try_submit(&task_id, job).is_err() {
            // surface the overflow so GitHub redelivers; the failed status
            // lets the redelivery revive the task
            let _ = state
                .store
                .fail_review_task(&task_id, "worker queue full")
                .await;
            return (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({"error": "queue full"})),
            )
                .into_response();
        }
        info!(task_id = %task_id, action = %event.action, "review task enqueued");
    }

    (
        StatusCode::ACCEPTED,
        Json(json!({"status": "accepted", "task_id": task_id})),
    )
        .into_response()
}
