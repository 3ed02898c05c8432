//! GitHub integration error types

use thiserror::Error;

/// Errors that can occur during GitHub operations
#[derive(Debug, Error)]
pub enum GitHubError {
    /// API error with an HTTP status from GitHub
    #[error("GitHub API error ({status}): {message}")]
    Api {
        /// HTTP status code
        status: u16,
        /// GitHub's error message
        message: String,
    },

    /// Resource not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Rate limit exceeded
    #[error("Rate limit exceeded")]
    RateLimited,

    /// Transport-level failure
    #[error("Network error: {0}")]
    Network(String),

    /// A call exceeded its timeout
    #[error("GitHub call timed out")]
    Timeout,

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Payload shape did not match the expected schema
    #[error("Payload error: {0}")]
    Payload(#[from] serde_json::Error),
}

impl GitHubError {
    /// Create a new invalid-input error
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        GitHubError::InvalidInput(msg.into())
    }

    /// Whether retrying may help
    ///
    /// 5xx, 429, timeouts, and transport failures are transient; other 4xx
    /// are permanent.
    pub fn is_transient(&self) -> bool {
        match self {
            GitHubError::Api { status, .. } => *status >= 500,
            GitHubError::RateLimited | GitHubError::Network(_) | GitHubError::Timeout => true,
            _ => false,
        }
    }
}

impl From<octocrab::Error> for GitHubError {
    fn from(err: octocrab::Error) -> Self {
        match err {
            octocrab::Error::GitHub { source, .. } => {
                let status = source.status_code.as_u16();
                match status {
                    404 | 410 => GitHubError::NotFound(source.message),
                    429 => GitHubError::RateLimited,
                    _ => GitHubError::Api {
                        status,
                        message: source.message,
                    },
                }
            }
            other => GitHubError::Network(other.to_string()),
        }
    }
}

impl From<reqwest::Error> for GitHubError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            GitHubError::Timeout
        } else if let Some(status) = err.status() {
            GitHubError::Api {
                status: status.as_u16(),
                message: err.to_string(),
            }
        } else {
            GitHubError::Network(err.to_string())
        }
    }
}

/// Result alias for GitHub operations
pub type Result<T> = std::result::Result<T, GitHubError>;
