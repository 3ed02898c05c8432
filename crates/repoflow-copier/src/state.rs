//! Application state for the copier worker

use std::sync::Arc;

use repoflow_config::IssueCopyConfig;
use repoflow_pool::{JobHandler, WorkerPool};
use repoflow_store::Store;

use crate::service::{CopierService, CopyJob};

/// State shared across all copier handlers
#[derive(Clone)]
pub struct AppState {
    /// Task store
    pub store: Store,
    /// Copier configuration
    pub config: Arc<IssueCopyConfig>,
    /// Bounded worker pool executing copy jobs
    pub pool: Arc<WorkerPool<CopyJob>>,
}

impl AppState {
    /// Create the state and spawn the worker pool
    pub fn new(store: Store, config: IssueCopyConfig, service: Arc<CopierService>) -> Self {
        let pool = WorkerPool::new(
            config.pool_size,
            config.queue_capacity,
            service as Arc<dyn JobHandler<CopyJob>>,
        );
        Self {
            store,
            config: Arc::new(config),
            pool: Arc::new(pool),
        }
    }
}
