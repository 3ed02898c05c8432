//! Webhook verification and fan-out

use axum::{
    body::Bytes,
    extract::State,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use repoflow_github::{repo_full_name, verify_signature, WebhookEventType};
use serde_json::json;
use tracing::{info, warn};

use crate::state::AppState;

/// Headers preserved when forwarding to a worker
const FORWARDED_HEADERS: &[&str] = &["x-github-event", "x-github-delivery", "x-hub-signature-256"];

/// Verify a webhook delivery and dispatch it to the owning workers
///
/// 200 is only returned once every targeted worker has acknowledged the
/// enqueue; an unreachable worker turns into a 5xx so GitHub redelivers.
pub async fn receive(State(state): State<AppState>, headers: HeaderMap, body: Bytes) -> Response {
    let signature = headers
        .get("x-hub-signature-256")
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default();
    if !verify_signature(&state.webhook_secret, &body, signature) {
        // no body details in the log on a signature failure
        warn!("webhook signature mismatch");
        return (StatusCode::UNAUTHORIZED, Json(json!({"error": "signature"}))).into_response();
    }

    let event_name = headers
        .get("x-github-event")
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default();
    let delivery = headers
        .get("x-github-delivery")
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default();
    let event = WebhookEventType::from_header(event_name);

    if event == WebhookEventType::Ping {
        return (StatusCode::OK, Json(json!({"status": "success", "event": "ping"})))
            .into_response();
    }

    let targets = route_targets(&state, event, &body);
    if targets.is_empty() {
        return (
            StatusCode::OK,
            Json(json!({"status": "ignored", "event": event_name})),
        )
            .into_response();
    }

    let mut dispatched = Vec::new();
    for (name, base_url) in targets {
        match forward(&state, base_url, &headers, &body).await {
            Ok(status) if status.is_success() => dispatched.push(name),
            Ok(status) if status == StatusCode::SERVICE_UNAVAILABLE => {
                warn!(worker = name, "worker queue full, asking GitHub to retry");
                return (
                    StatusCode::SERVICE_UNAVAILABLE,
                    Json(json!({"error": "worker overloaded", "worker": name})),
                )
                    .into_response();
            }
            Ok(status) => {
                warn!(worker = name, status = %status, "worker rejected delivery");
                return (
                    StatusCode::BAD_GATEWAY,
                    Json(json!({"error": "worker rejected delivery", "worker": name})),
                )
                    .into_response();
            }
            Err(err) => {
                warn!(worker = name, error = %err, "worker unreachable");
                return (
                    StatusCode::BAD_GATEWAY,
                    Json(json!({"error": "worker unreachable", "worker": name})),
                )
                    .into_response();
            }
        }
    }

    info!(event = event_name, delivery = delivery, dispatched = ?dispatched, "webhook dispatched");
    (
        StatusCode::ACCEPTED,
        Json(json!({"status": "accepted", "event": event_name, "dispatched": dispatched})),
    )
        .into_response()
}

/// Decide which workers own this delivery
fn route_targets<'a>(
    state: &'a AppState,
    event: WebhookEventType,
    body: &[u8],
) -> Vec<(&'static str, &'a str)> {
    let repo = repo_full_name(body).unwrap_or_default();
    let mut targets: Vec<(&'static str, &str)> = Vec::new();
    match event {
        WebhookEventType::PullRequest => {
            targets.push(("pr_reviewer", state.workers.review.as_str()));
            if state.config.issue_scoring.enabled && state.config.issue_scoring.is_target(&repo) {
                targets.push(("issue_scorer", state.workers.scorer.as_str()));
            }
        }
        WebhookEventType::Issues | WebhookEventType::IssueComment => {
            if state.config.issue_copy.enabled && repo == state.config.issue_copy.source_repo {
                targets.push(("issue_copier", state.workers.copier.as_str()));
            }
            if state.config.issue_scoring.enabled && state.config.issue_scoring.is_target(&repo) {
                targets.push(("issue_scorer", state.workers.scorer.as_str()));
            }
        }
        WebhookEventType::Ping | WebhookEventType::Unknown => {}
    }
    targets
}

async fn forward(
    state: &AppState,
    base_url: &str,
    headers: &HeaderMap,
    body: &Bytes,
) -> Result<StatusCode, reqwest::Error> {
    let mut request = state
        .http
        .post(format!("{}/webhook", base_url.trim_end_matches('/')))
        .header("content-type", "application/json")
        .body(body.to_vec());
    for name in FORWARDED_HEADERS {
        if let Some(value) = headers.get(*name).and_then(|v| v.to_str().ok()) {
            request = request.header(*name, value);
        }
    }
    let response = request.send().await?;
    Ok(StatusCode::from_u16(response.status().as_u16()).unwrap_or(StatusCode::BAD_GATEWAY))
}
