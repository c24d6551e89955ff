//! Error types for Project Saga.

use thiserror::Error;

/// Top-level error type for Saga operations.
#[derive(Debug, Error)]
pub enum SagaError {
    /// Durable store errors
    #[error("Store error: {0}")]
    Store(String),

    /// Serialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Configuration errors
    #[error("Config error: {0}")]
    Config(String),
}

/// Result type alias for Saga operations.
pub type SagaResult<T> = Result<T, SagaError>;
