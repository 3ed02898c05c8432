//! Application state for the gateway

use std::sync::Arc;
use std::time::Duration;

use repoflow_config::AppConfig;

/// Per-worker base URLs
#[derive(Debug, Clone)]
pub struct WorkerEndpoints {
    /// PR-review worker
    pub review: String,
    /// Issue-copier worker
    pub copier: String,
    /// Issue-scorer worker
    pub scorer: String,
}

/// State shared across all gateway handlers
#[derive(Clone)]
pub struct AppState {
    /// Webhook shared secret; every delivery is verified against it
    pub webhook_secret: Arc<String>,
    /// Basic-auth credentials; None disables auth (visible in /health)
    pub auth: Option<Arc<(String, String)>>,
    /// Worker base URLs
    pub workers: Arc<WorkerEndpoints>,
    /// Routing inputs from the shared config
    pub config: Arc<AppConfig>,
    /// Client used for forwarding and proxying
    pub http: reqwest::Client,
}

impl AppState {
    /// Create the state
    pub fn new(
        webhook_secret: String,
        auth: Option<(String, String)>,
        workers: WorkerEndpoints,
        config: AppConfig,
    ) -> Self {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .user_agent(concat!("repoflow-gateway/", env!("CARGO_PKG_VERSION")))
            .build()
            .unwrap_or_default();
        Self {
            webhook_secret: Arc::new(webhook_secret),
            auth: auth.map(Arc::new),
            workers: Arc::new(workers),
            config: Arc::new(config),
            http,
        }
    }

    /// Whether basic auth is active
    pub fn auth_enabled(&self) -> bool {
        self.auth.is_some()
    }
}
