use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::node::NodeId;

/// Value object: Edge ID
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EdgeId(pub String);

impl EdgeId {
    /// Create an edge id from anything string-like
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Mint a guaranteed-unique edge id
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }
}

impl std::fmt::Display for EdgeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A directed connection between two nodes
///
/// `source` and `target` must reference nodes in the same graph; an
/// edge whose endpoint is deleted is deleted with it (cascading).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Edge {
    /// Unique identifier within the graph
    pub id: EdgeId,

    /// Source node id
    pub source: NodeId,

    /// Target node id
    pub target: NodeId,

    /// Named output port on the source node, e.g. `"true"` on a condition node
    #[serde(
        rename = "sourceHandle",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub source_handle: Option<String>,

    /// Named input port on the target node
    #[serde(
        rename = "targetHandle",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub target_handle: Option<String>,
}

/// An id-less connect request; the graph store mints the edge id
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Connection {
    /// Source node id
    pub source: NodeId,

    /// Target node id
    pub target: NodeId,

    /// Named output port on the source node
    #[serde(rename = "sourceHandle", default)]
    pub source_handle: Option<String>,

    /// Named input port on the target node
    #[serde(rename = "targetHandle", default)]
    pub target_handle: Option<String>,
}

impl Connection {
    /// Create a plain connection between two nodes
    pub fn new(source: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            source: NodeId::new(source),
            target: NodeId::new(target),
            source_handle: None,
            target_handle: None,
        }
    }

    /// Set the source handle
    pub fn with_source_handle(mut self, handle: impl Into<String>) -> Self {
        self.source_handle = Some(handle.into());
        self
    }

    /// Set the target handle
    pub fn with_target_handle(mut self, handle: impl Into<String>) -> Self {
        self.target_handle = Some(handle.into());
        self
    }

    /// Materialize the connection into an edge with a freshly minted id
    pub fn into_edge(self) -> Edge {
        Edge {
            id: EdgeId::generate(),
            source: self.source,
            target: self.target,
            source_handle: self.source_handle,
            target_handle: self.target_handle,
        }
    }
}
