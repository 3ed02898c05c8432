//! Configuration error types

use thiserror::Error;

/// Errors that can occur while loading or validating configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Underlying loader error (file or environment source)
    #[error("Configuration load error: {0}")]
    Load(#[from] config::ConfigError),

    /// A config value failed validation
    #[error("Invalid configuration: {0}")]
    Validation(String),

    /// A required environment variable is missing or malformed
    #[error("Environment error: {0}")]
    Environment(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl ConfigError {
    /// Create a new validation error
    pub fn validation(msg: impl Into<String>) -> Self {
        ConfigError::Validation(msg.into())
    }

    /// Create a new environment error
    pub fn environment(msg: impl Into<String>) -> Self {
        ConfigError::Environment(msg.into())
    }
}

/// Result alias for configuration operations
pub type Result<T> = std::result::Result<T, ConfigError>;
