//! Copier error types

use thiserror::Error;

/// Errors that can occur while replicating issues
#[derive(Debug, Error)]
pub enum CopierError {
    /// Store failure
    #[error("Store error: {0}")]
    Store(#[from] repoflow_store::StoreError),

    /// GitHub failure
    #[error("GitHub error: {0}")]
    GitHub(#[from] repoflow_github::GitHubError),
}

/// Result alias for copier operations
pub type Result<T> = std::result::Result<T, CopierError>;
