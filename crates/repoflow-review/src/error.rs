//! Review worker error types

use thiserror::Error;

/// Errors that can occur while processing a review task
#[derive(Debug, Error)]
pub enum ReviewError {
    /// Store failure
    #[error("Store error: {0}")]
    Store(#[from] repoflow_store::StoreError),

    /// GitHub failure
    #[error("GitHub error: {0}")]
    GitHub(#[from] repoflow_github::GitHubError),

    /// AI CLI failure
    #[error("Engine error: {0}")]
    Engine(#[from] repoflow_engine::EngineError),
}

/// Result alias for review operations
pub type Result<T> = std::result::Result<T, ReviewError>;
