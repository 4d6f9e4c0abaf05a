//!
//! Test utilities for the Flowforge workspace
//!
//! Graph and wire-type builders, canned engine messages, and a
//! scripted execution transport that replays a prepared sequence of
//! frames instead of opening a network connection.

#![forbid(unsafe_code)]

/// Graph, record, and message builders
pub mod builders;

/// Scripted execution transport
pub mod transport;

pub use builders::{
    condition_node, execution_completed_message, execution_failed_message,
    execution_started_message, linear_snapshot, logic_node, node_at, node_completed_message,
    node_failed_message, node_started_message, workflow_record,
};
pub use transport::{ScriptedFrame, ScriptedTransport};

// The in-memory repository lives next to the HTTP one, behind the
// runtime's testing feature; re-exported here for convenience.
pub use flowforge_runtime::persistence::memory::MemoryWorkflowRepository;
