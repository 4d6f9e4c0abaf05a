//! Domain layer - graph model and invariant-preserving operations

/// Branch-edge reconciler hooks
pub mod branch;

/// Edge and connection types
pub mod edge;

/// The graph store
pub mod graph;

/// Node types and kinds
pub mod node;
