//! Application state for the scorer worker

use std::sync::Arc;

use repoflow_config::IssueScoringConfig;
use repoflow_pool::{JobHandler, WorkerPool};
use repoflow_store::Store;

use crate::service::{ScoreJob, ScorerService};

/// State shared across all scorer handlers
#[derive(Clone)]
pub struct AppState {
    /// Task store
    pub store: Store,
    /// Scorer configuration
    pub config: Arc<IssueScoringConfig>,
    /// The service, reachable from handlers for snapshots
    pub service: Arc<ScorerService>,
    /// Bounded worker pool executing score and feedback jobs
    pub pool: Arc<WorkerPool<ScoreJob>>,
}

impl AppState {
    /// Create the state and spawn the worker pool
    pub fn new(store: Store, config: IssueScoringConfig, service: Arc<ScorerService>) -> Self {
        let pool = WorkerPool::new(
            config.pool_size,
            config.queue_capacity,
            service.clone() as Arc<dyn JobHandler<ScoreJob>>,
        );
        Self {
            store,
            config: Arc::new(config),
            service,
            pool: Arc::new(pool),
        }
    }
}
