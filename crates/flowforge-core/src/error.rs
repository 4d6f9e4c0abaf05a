use thiserror::Error;

/// Error type for graph editor operations
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GraphError {
    /// A node with the same id already exists in the graph
    #[error("Duplicate node id: {0}")]
    DuplicateNode(String),

    /// Node not found
    #[error("Node not found: {0}")]
    NodeNotFound(String),

    /// Edge not found
    #[error("Edge not found: {0}")]
    EdgeNotFound(String),

    /// Validation error
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    SerializationError(String),

    /// Generic error
    #[error("{0}")]
    Other(String),
}

impl From<serde_json::Error> for GraphError {
    fn from(err: serde_json::Error) -> Self {
        GraphError::SerializationError(err.to_string())
    }
}

impl From<String> for GraphError {
    fn from(err: String) -> Self {
        GraphError::Other(err)
    }
}

/// Result type for graph editor operations
pub type GraphResult<T> = Result<T, GraphError>;
