//! Route definitions

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::trace::TraceLayer;

use crate::{handlers, state::AppState};

/// Build the copier worker's router
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::ui::index))
        .route("/health", get(handlers::health::health))
        .route("/webhook", post(handlers::webhook::receive))
        .route("/api/issue-copies", get(handlers::records::list_copies))
        .route("/api/issue-copies/stats", get(handlers::records::copy_stats))
        .route("/api/comment-syncs", get(handlers::records::list_comment_syncs))
        .route("/api/stats", get(handlers::records::copy_stats))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
