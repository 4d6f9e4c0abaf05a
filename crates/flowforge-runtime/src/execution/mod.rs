//! Workflow test-run execution: transport seam, per-node log, and the
//! coordinator that drives a streaming run.

/// Run coordination and lifecycle
pub mod coordinator;

/// Ordered per-node execution log
pub mod log;

/// Transport traits and the HTTP/websocket implementation
pub mod transport;

pub use coordinator::{ExecutionCoordinator, ExecutionEvent, RunHandle, RunOutcome, RunState};
pub use log::{ExecutionLog, ExecutionLogEntry, NodeRunStatus, SYSTEM_NODE_ID};
pub use transport::{EventStream, ExecutionTransport, HttpExecutionTransport};
