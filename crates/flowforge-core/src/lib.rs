//!
//! Flowforge Core - workflow graph editor state machine
//!
//! This crate holds the in-memory model behind the visual workflow
//! editor: a directed graph of typed nodes and edges, the atomic
//! mutation operations performed on it, snapshot-based undo/redo,
//! selection and clipboard handling, and the branch-edge bookkeeping
//! that keeps condition/loop nodes consistent with their outgoing
//! edges. Everything is synchronous and free of I/O; the async
//! collaborators (persistence, execution) live in flowforge-runtime.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

/// Domain layer - graph model and operations
pub mod domain;

/// Undo/redo history
pub mod history;

/// Selection and clipboard
pub mod clipboard;

/// Editor session composition root
pub mod session;

/// Error types
pub mod error;

// Re-export key types
pub use clipboard::{Clipboard, Selection};
pub use domain::edge::{Connection, Edge, EdgeId};
pub use domain::graph::{GraphSnapshot, WorkflowGraph};
pub use domain::node::{Node, NodeId, NodeKind, Position};
pub use error::{GraphError, GraphResult};
pub use history::HistoryManager;
pub use session::EditorSession;
