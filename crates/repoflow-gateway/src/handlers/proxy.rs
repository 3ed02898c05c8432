//! Reverse proxy for the worker UIs
//!
//! `/pr-tasks`, `/issue-copies`, `/issue-scores`, and `/feedback-analytics`
//! are served by the workers on the private network; the gateway fronts
//! them so one authenticated origin exposes everything.

use axum::{
    extract::{Path, RawQuery, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};
use tracing::debug;

use crate::state::AppState;

/// Proxy the PR-review worker UI
pub async fn pr_tasks(
    State(state): State<AppState>,
    path: Option<Path<String>>,
    RawQuery(query): RawQuery,
) -> Response {
    let review = state.workers.review.clone();
    proxy(&state, &review, path, query).await
}

/// Proxy the issue-copier worker UI
pub async fn issue_copies(
    State(state): State<AppState>,
    path: Option<Path<String>>,
    RawQuery(query): RawQuery,
) -> Response {
    let copier = state.workers.copier.clone();
    proxy(&state, &copier, path, query).await
}

/// Proxy the issue-scorer worker UI
pub async fn issue_scores(
    State(state): State<AppState>,
    path: Option<Path<String>>,
    RawQuery(query): RawQuery,
) -> Response {
    let scorer = state.workers.scorer.clone();
    proxy(&state, &scorer, path, query).await
}

async fn proxy(
    state: &AppState,
    base_url: &str,
    path: Option<Path<String>>,
    query: Option<String>,
) -> Response {
    let rest = path.map(|Path(p)| p).unwrap_or_default();
    let mut url = format!("{}/{}", base_url.trim_end_matches('/'), rest);
    if let Some(query) = query {
        url.push('?');
        url.push_str(&query);
    }
    debug!(url = %url, "proxying UI request");

    match state.http.get(&url).send().await {
        Ok(response) => {
            let status =
                StatusCode::from_u16(response.status().as_u16()).unwrap_or(StatusCode::BAD_GATEWAY);
            let content_type = response
                .headers()
                .get(header::CONTENT_TYPE)
                .and_then(|v| v.to_str().ok())
                .unwrap_or("text/plain")
                .to_string();
            match response.bytes().await {
                Ok(body) => {
                    (status, [(header::CONTENT_TYPE, content_type)], body).into_response()
                }
                Err(_) => (StatusCode::BAD_GATEWAY, "upstream read failed").into_response(),
            }
        }
        Err(_) => (StatusCode::BAD_GATEWAY, "worker unreachable").into_response(),
    }
}
