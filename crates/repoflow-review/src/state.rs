//! Application state for the review worker

use std::sync::Arc;

use repoflow_config::ReviewConfig;
use repoflow_pool::{JobHandler, WorkerPool};
use repoflow_store::Store;

use crate::service::{ReviewJob, ReviewService};

/// State shared across all review-worker handlers
#[derive(Clone)]
pub struct AppState {
    /// Task store
    pub store: Store,
    /// Review configuration
    pub config: Arc<ReviewConfig>,
    /// Bounded worker pool executing review jobs
    pub pool: Arc<WorkerPool<ReviewJob>>,
}

impl AppState {
    /// Create the state and spawn the worker pool
    pub fn new(store: Store, config: ReviewConfig, service: Arc<ReviewService>) -> Self {
        let pool = WorkerPool::new(
            config.pool_size,
            config.queue_capacity,
            service as Arc<dyn JobHandler<ReviewJob>>,
        );
        Self {
            store,
            config: Arc::new(config),
            pool: Arc::new(pool),
        }
    }
}
