//! Engine error types

use thiserror::Error;

/// Errors that can occur while running the AI CLI
#[derive(Debug, Error)]
pub enum EngineError {
    /// The executable could not be spawned
    #[error("Failed to spawn AI CLI: {0}")]
    Spawn(std::io::Error),

    /// IO failure while feeding the prompt or collecting output
    #[error("AI CLI IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The invocation exceeded its timeout and was killed
    #[error("AI CLI timed out after {seconds}s")]
    Timeout {
        /// Budget that was exceeded
        seconds: u64,
    },

    /// The CLI exited non-zero
    #[error("AI CLI exited with {code:?}: {stderr}")]
    NonZeroExit {
        /// Exit code, if one was reported
        code: Option<i32>,
        /// Truncated stderr
        stderr: String,
    },

    /// The CLI exited zero but produced no output
    #[error("AI CLI produced no output: {stderr}")]
    EmptyOutput {
        /// Truncated stderr
        stderr: String,
    },
}

/// Result alias for engine operations
pub type Result<T> = std::result::Result<T, EngineError>;
