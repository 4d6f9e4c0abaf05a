//! Error types for the Flowforge runtime
//!
//! This module contains the error types used by the persistence bridge
//! and the execution coordinator.

use thiserror::Error;

use flowforge_core::GraphError;

/// Runtime error types
#[derive(Error, Debug)]
pub enum RuntimeError {
    /// Resource not found
    #[error("{0} not found")]
    NotFound(String),

    /// Precondition failed before any network call was made
    #[error("Precondition failed: {0}")]
    PreconditionError(String),

    /// Persistence API call failed
    #[error("Persistence error: {0}")]
    PersistenceError(String),

    /// Execution submission was rejected
    #[error("Submission error: {0}")]
    SubmissionError(String),

    /// Streaming channel failed
    #[error("Streaming error: {0}")]
    StreamingError(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    SerializationError(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    ConfigurationError(String),

    /// Graph-level error surfaced through the bridge
    #[error("Graph error: {0}")]
    GraphError(String),

    /// Internal error
    #[error("Internal error: {0}")]
    InternalError(String),
}

/// Result type for runtime operations
pub type RuntimeResult<T> = Result<T, RuntimeError>;

impl From<serde_json::Error> for RuntimeError {
    fn from(err: serde_json::Error) -> Self {
        RuntimeError::SerializationError(err.to_string())
    }
}

impl From<GraphError> for RuntimeError {
    fn from(err: GraphError) -> Self {
        RuntimeError::GraphError(err.to_string())
    }
}
