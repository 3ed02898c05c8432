//! Server entrypoint

use std::net::SocketAddr;

use tracing::info;

use crate::{routes, state::AppState};

/// Serve the gateway until ctrl-c
pub async fn serve(state: AppState, addr: SocketAddr) -> std::io::Result<()> {
    let app = routes::router(state);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(addr = %addr, "gateway listening");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
}

async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
    info!("shutdown signal received");
}
