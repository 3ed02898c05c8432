//! Route definitions

use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::{handlers, middleware::auth_middleware, state::AppState};

/// Build the gateway router
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::dashboard::index))
        .route("/health", get(handlers::health::health))
        .route("/webhook", post(handlers::webhook::receive))
        .route("/api/dashboard", get(handlers::dashboard::dashboard))
        .route("/pr-tasks", get(handlers::proxy::pr_tasks))
        .route("/pr-tasks/", get(handlers::proxy::pr_tasks))
        .route("/pr-tasks/*path", get(handlers::proxy::pr_tasks))
        .route("/issue-copies", get(handlers::proxy::issue_copies))
        .route("/issue-copies/", get(handlers::proxy::issue_copies))
        .route("/issue-copies/*path", get(handlers::proxy::issue_copies))
        .route("/issue-scores", get(handlers::proxy::issue_scores))
        .route("/issue-scores/", get(handlers::proxy::issue_scores))
        .route("/issue-scores/*path", get(handlers::proxy::issue_scores))
        .route("/feedback-analytics", get(handlers::proxy::issue_scores))
        .route("/feedback-analytics/", get(handlers::proxy::issue_scores))
        .route("/feedback-analytics/*path", get(handlers::proxy::issue_scores))
        .layer(middleware::from_fn_with_state(state.clone(), auth_middleware))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
