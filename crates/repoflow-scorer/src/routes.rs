//! Route definitions

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::trace::TraceLayer;

use crate::{handlers, state::AppState};

/// Build the scorer worker's router
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::ui::index))
        .route("/health", get(handlers::health::health))
        .route("/webhook", post(handlers::webhook::receive))
        .route("/api/scores", get(handlers::scores::list))
        .route("/api/scores/:score_id", get(handlers::scores::get))
        .route("/api/scores/:score_id/feedback", post(handlers::feedback::submit))
        .route("/api/feedback/patterns", get(handlers::feedback::patterns))
        .route("/api/feedback/snapshot", post(handlers::feedback::snapshot))
        .route("/api/stats", get(handlers::scores::stats))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
