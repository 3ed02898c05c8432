//! Scorer error types

use thiserror::Error;

/// Errors that can occur while scoring
#[derive(Debug, Error)]
pub enum ScorerError {
    /// Store failure
    #[error("Store error: {0}")]
    Store(#[from] repoflow_store::StoreError),

    /// GitHub failure
    #[error("GitHub error: {0}")]
    GitHub(#[from] repoflow_github::GitHubError),

    /// AI CLI failure
    #[error("Engine error: {0}")]
    Engine(#[from] repoflow_engine::EngineError),

    /// Model output could not be parsed into a score
    #[error("Score parse error: {0}")]
    Parse(String),
}

impl ScorerError {
    /// Create a new parse error
    pub fn parse(msg: impl Into<String>) -> Self {
        ScorerError::Parse(msg.into())
    }
}

/// Result alias for scorer operations
pub type Result<T> = std::result::Result<T, ScorerError>;
