//! Webhook intake

use axum::{
    body::Bytes,
    extract::State,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use repoflow_github::{IssueCommentEvent, IssuesEvent, WebhookEventType};
use repoflow_store::{ContentType, NewScoreRecord};
use serde_json::json;
use tracing::{info, warn};

use crate::{classify::classify_issue, prompt::SCORE_COMMENT_HEADER, service::ScoreJob, state::AppState};

/// Accept `issues` and `issue_comment` webhooks for scored repositories
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
        // pull_request events reach us when a scored repo also has reviews
        // enabled; PR scoring is not a thing, so they fall through
        other => ignored(&other.to_string()),
    }
}

async fn handle_issues(state: &AppState, body: &[u8]) -> Response {
    if !state.config.enabled {
        return ignored("scoring disabled");
    }
    let event: IssuesEvent = match serde_json::from_slice(body) {
        Ok(event) => event,
        Err(err) => {
            warn!(error = %err, "dropping malformed issues payload");
            return ignored("malformed payload");
        }
    };
    if !state.config.is_target(&event.repository.full_name) {
        return ignored("repository not scored");
    }
    if !state.config.triggers.iter().any(|t| t == &event.action) {
        return ignored("action not in triggers");
    }

    let issue = &event.issue;
    let new = NewScoreRecord {
        repo: event.repository.full_name.clone(),
        issue_number: issue.number,
        comment_id: None,
        content_type: classify_issue(
            &issue.title,
            issue.body.as_deref().unwrap_or_default(),
            &issue.label_names(),
        ),
        title: issue.title.clone(),
        body: issue.body.clone().unwrap_or_default(),
        author: issue.user.login.clone(),
        issue_url: issue.html_url.clone(),
    };
    enqueue_score(state, new).await
}

async fn handle_comment(state: &AppState, body: &[u8]) -> Response {
    if !state.config.enabled {
        return ignored("scoring disabled");
    }
    let event: IssueCommentEvent = match serde_json::from_slice(body) {
        Ok(event) => event,
        Err(err) => {
            warn!(error = %err, "dropping malformed issue_comment payload");
            return ignored("malformed payload");
        }
    };
    if !state.config.is_target(&event.repository.full_name) {
        return ignored("repository not scored");
    }
    if !state.config.comment_triggers.iter().any(|t| t == &event.action) {
        return ignored("action not in comment triggers");
    }
    let comment_body = event.comment.body.clone().unwrap_or_default();
    // never score our own score comments or other bots; that way lies a loop
    if comment_body.starts_with(SCORE_COMMENT_HEADER)
        || event.comment.user.login.ends_with("[bot]")
    {
        return ignored("automated comment");
    }
    if comment_body.trim().is_empty() {
        return ignored("empty comment");
    }

    let new = NewScoreRecord {
        repo: event.repository.full_name.clone(),
        issue_number: event.issue.number,
        comment_id: Some(event.comment.id),
        content_type: ContentType::Comment,
        title: event.issue.title.clone(),
        body: comment_body,
        author: event.comment.user.login.clone(),
        issue_url: event.issue.html_url.clone(),
    };
    enqueue_score(state, new).await
}

async fn enqueue_score(state: &AppState, new: NewScoreRecord) -> Response {
    let (outcome, score_id) = match state.store.upsert_score(&new).await {
        Ok(result) => result,
        Err(err) => {
            warn!(error = %err, "failed to persist score record");
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({"error": "store"})),
            )
                .into_response();
        }
    };

    if outcome.should_enqueue() {
        let job = ScoreJob::Score {
            score_id: score_id.clone(),
        };
        if state.pool.try_submit(&score_id, job).is_err() {
            let _ = state.store.fail_score(&score_id, "worker queue full").await;
            return (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({"error": "queue full"})),
            )
                .into_response();
        }
        info!(score_id = %score_id, key = %new.dedupe_key(), "score enqueued");
    }

    (
        StatusCode::ACCEPTED,
        Json(json!({"status": "accepted", "score_id": score_id})),
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
