//! Webhook intake

use std::sync::Once;

use axum::{
    body::Bytes,
    extract::State,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use repoflow_github::{IssueCommentEvent, IssuesEvent, WebhookEventType};
use serde_json::json;
use tracing::{info, warn};

use crate::{service::CopyJob, state::AppState};

static SOURCE_UNSET_WARNING: Once = Once::new();

/// Accept `issues` and `issue_comment` webhooks for the source repository
pub async fn receive(State(state): State<AppState>, headers: HeaderMap, body: Bytes) -> Response {
    let event_name = headers
        .get("x-github-event")
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default();

    match WebhookEventType::from_header(event_name) {
        WebhookEventType::Ping => {
            (StatusCode::OK, Json(json!({"status": "success", "event": "ping"}))).into_response()
        }
        WebhookEventType::Issues => handle_issues(&state, &body).await,
        WebhookEventType::IssueComment => handle_comment(&state, &body).await,
        other => ignored(&other.to_string()),
    }
}

async fn handle_issues(state: &AppState, body: &[u8]) -> Response {
    if let Some(response) = gate_common(state) {
        return response;
    }
    let event: IssuesEvent = match serde_json::from_slice(body) {
        Ok(event) => event,
        Err(err) => {
            warn!(error = %err, "dropping malformed issues payload");
            return ignored("malformed payload");
        }
    };
    if event.repository.full_name != state.config.source_repo {
        return ignored("not the source repository");
    }
    if !state.config.triggers.iter().any(|t| t == &event.action) {
        return ignored("action not in triggers");
    }

    let issue = event.issue.number;
    let job = CopyJob::Issue(Box::new(event));
    submit(state, job, &format!("issue {} queued for replication", issue))
}

async fn handle_comment(state: &AppState, body: &[u8]) -> Response {
    if let Some(response) = gate_common(state) {
        return response;
    }
    let event: IssueCommentEvent = match serde_json::from_slice(body) {
        Ok(event) => event,
        Err(err) => {
            warn!(error = %err, "dropping malformed issue_comment payload");
            return ignored("malformed payload");
        }
    };
    if event.repository.full_name != state.config.source_repo {
        return ignored("not the source repository");
    }
    if event.action != "created" {
        return ignored("only created comments are mirrored");
    }

    let comment = event.comment.id;
    let job = CopyJob::Comment(Box::new(event));
    submit(state, job, &format!("comment {} queued for mirroring", comment))
}

fn gate_common(state: &AppState) -> Option<Response> {
    if !state.config.enabled {
        return Some(ignored("issue copying disabled"));
    }
    if state.config.source_repo.is_empty() {
        SOURCE_UNSET_WARNING.call_once(|| {
            warn!("issue_copy.source_repo is not configured; all events are no-ops");
        });
        return Some(ignored("source repository not configured"));
    }
    None
}

fn submit(state: &AppState, job: CopyJob, note: &str) -> Response {
    let key = job.shard_key();
    if state.pool.try_submit(&key, job).is_err() {
        return (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(json!({"error": "queue full"})),
        )
            .into_response();
    }
    info!(key = %key, "{}", note);
    (
        StatusCode::ACCEPTED,
        Json(json!({"status": "accepted"})),
    )
        .into_response()
}

fn ignored(reason: &str) -> Response {
    (
        StatusCode::OK,
        Json(json!({"status": "ignored", "reason": reason})),
    )
        .into_response()
}
