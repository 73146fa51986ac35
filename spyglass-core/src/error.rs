//! Core error types for Spyglass.

use thiserror::Error;

/// Core error type for Spyglass model operations.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Payload did not have the expected shape.
    #[error("Invalid data: {0}")]
    InvalidData(String),

    /// Serialization/deserialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
