//! Store error types

use thiserror::Error;

/// Errors that can occur during store operations
#[derive(Debug, Error)]
pub enum StoreError {
    /// Underlying database error
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// JSON column could not be encoded or decoded
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Record not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// A lifecycle update was refused by a transition guard
    #[error("Invalid transition: {0}")]
    InvalidTransition(String),
}

impl StoreError {
    /// Create a new not-found error
    pub fn not_found(what: impl Into<String>) -> Self {
        StoreError::NotFound(what.into())
    }

    /// Create a new invalid-transition error
    pub fn invalid_transition(msg: impl Into<String>) -> Self {
        StoreError::InvalidTransition(msg.into())
    }
}

/// Result alias for store operations
pub type Result<T> = std::result::Result<T, StoreError>;
