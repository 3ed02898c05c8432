//! Route definitions

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::trace::TraceLayer;

use crate::{handlers, state::AppState};

/// Build the review worker's router
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::ui::index))
        .route("/health", get(handlers::health::health))
        .route("/webhook", post(handlers::webhook::receive))
        .route("/api/tasks", get(handlers::tasks::list))
        .route("/api/tasks/:task_id", get(handlers::tasks::get))
        .route("/api/stats", get(handlers::tasks::stats))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
