//! Bounded worker pool
//!
//! A fixed set of workers, each owning a bounded FIFO queue. Jobs carry a
//! shard key and are dispatched by key hash, so every job for one lifecycle
//! record runs on the same worker in arrival order; there is no ordering
//! across keys. Overflow is surfaced to the caller (workers answer 503 so
//! GitHub redelivers) instead of buffering unboundedly.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, error};

/// Errors that can occur when submitting a job
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PoolError {
    /// The target worker's queue is full
    #[error("Worker queue is full")]
    QueueFull,

    /// The pool has been shut down
    #[error("Worker pool is closed")]
    Closed,
}

/// Processes jobs pulled off a worker queue
#[async_trait]
pub trait JobHandler<J>: Send + Sync + 'static {
    /// Handle one job; failures are the handler's business (recorded on the
    /// task, never propagated to the queue)
    async fn handle(&self, job: J);
}

/// Fixed pool of workers with bounded per-worker FIFO queues
pub struct WorkerPool<J> {
    shards: Vec<mpsc::Sender<J>>,
    handles: Vec<JoinHandle<()>>,
}

impl<J: Send + 'static> WorkerPool<J> {
    /// Spawn `size` workers, each with a queue of `capacity`
    pub fn new(size: usize, capacity: usize, handler: Arc<dyn JobHandler<J>>) -> Self {
        let size = size.max(1);
        let capacity = capacity.max(1);
        let mut shards = Vec::with_capacity(size);
        let mut handles = Vec::with_capacity(size);
        for worker in 0..size {
            let (tx, mut rx) = mpsc::channel::<J>(capacity);
            let handler = Arc::clone(&handler);
            handles.push(tokio::spawn(async move {
                while let Some(job) = rx.recv().await {
                    handler.handle(job).await;
                }
                debug!(worker, "pool worker drained");
            }));
            shards.push(tx);
        }
        Self { shards, handles }
    }

    /// Submit a job without blocking
    ///
    /// Jobs with equal keys land on the same worker, preserving their
    /// relative order.
    pub fn try_submit(&self, key: &str, job: J) -> Result<(), PoolError> {
        let shard = self.shard_for(key);
        match self.shards[shard].try_send(job) {
            Ok(()) => Ok(()),
            Err(mpsc::error::TrySendError::Full(_)) => {
                error!(shard, key, "worker queue overflow");
                Err(PoolError::QueueFull)
            }
            Err(mpsc::error::TrySendError::Closed(_)) => Err(PoolError::Closed),
        }
    }

    /// Number of workers
    pub fn size(&self) -> usize {
        self.shards.len()
    }

    /// Close the queues and wait for in-flight jobs to finish
    pub async fn shutdown(mut self) {
        self.shards.clear();
        for handle in self.handles.drain(..) {
            let _ = handle.await;
        }
    }

    fn shard_for(&self, key: &str) -> usize {
        let mut hasher = DefaultHasher::new();
        key.hash(&mut hasher);
        (hasher.finish() % self.shards.len() as u64) as usize
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;
    use std::time::Duration;
    use tokio::sync::Notify;

    struct Recorder {
        seen: Mutex<Vec<u32>>,
    }

    #[async_trait]
    impl JobHandler<u32> for Recorder {
        async fn handle(&self, job: u32) {
            // yield so interleaving would show up if ordering were broken
            tokio::time::sleep(Duration::from_millis(2)).await;
            self.seen.lock().unwrap().push(job);
        }
    }

    #[tokio::test]
    async fn same_key_jobs_run_in_arrival_order() {
        let recorder = Arc::new(Recorder { seen: Mutex::new(Vec::new()) });
        let pool = WorkerPool::new(4, 16, recorder.clone() as Arc<dyn JobHandler<u32>>);
        for job in 0..8 {
            pool.try_submit("acme/foo#42", job).unwrap();
        }
        pool.shutdown().await;
        assert_eq!(*recorder.seen.lock().unwrap(), (0..8).collect::<Vec<_>>());
    }

    struct Blocker {
        release: Arc<Notify>,
    }

    #[async_trait]
    impl JobHandler<u32> for Blocker {
        async fn handle(&self, _job: u32) {
            self.release.notified().await;
        }
    }

    #[tokio::test]
    async fn overflow_is_reported_not_buffered() {
        let release = Arc::new(Notify::new());
        let handler = Arc::new(Blocker { release: release.clone() });
        let pool = WorkerPool::new(1, 1, handler as Arc<dyn JobHandler<u32>>);

        // first job occupies the worker, second fills the queue
        pool.try_submit("k", 1).unwrap();
        tokio::time::sleep(Duration::from_millis(20)).await;
        pool.try_submit("k", 2).unwrap();
        assert_eq!(pool.try_submit("k", 3), Err(PoolError::QueueFull));

        release.notify_waiters();
        release.notify_one();
        pool.shutdown().await;
    }

    #[tokio::test]
    async fn zero_size_is_clamped() {
        let recorder = Arc::new(Recorder { seen: Mutex::new(Vec::new()) });
        let pool = WorkerPool::new(0, 0, recorder.clone() as Arc<dyn JobHandler<u32>>);
        assert_eq!(pool.size(), 1);
        pool.try_submit("k", 7).unwrap();
        pool.shutdown().await;
        assert_eq!(*recorder.seen.lock().unwrap(), vec![7]);
    }
}
