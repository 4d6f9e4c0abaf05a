//!
//! Flowforge Runtime - async collaborators of the workflow editor
//!
//! Two concerns live here, both built around trait seams so tests can
//! swap the network out: the persistence bridge, which loads and saves
//! workflow documents over a REST-like JSON API, and the execution
//! coordinator, which submits test runs to the execution engine and
//! streams per-node progress events back into an ordered log.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

/// Runtime configuration
pub mod config;

/// Error types
pub mod error;

/// Execution coordinator, log, and transport
pub mod execution;

/// Persistence bridge and workflow repository
pub mod persistence;

/// Wire types shared with the remote services
pub mod wire;

// Re-export key types
pub use config::RuntimeConfig;
pub use error::{RuntimeError, RuntimeResult};
pub use execution::{
    EventStream, ExecutionCoordinator, ExecutionEvent, ExecutionLog, ExecutionLogEntry,
    ExecutionTransport, HttpExecutionTransport, NodeRunStatus, RunHandle, RunOutcome, RunState,
    SYSTEM_NODE_ID,
};
pub use persistence::{HttpWorkflowRepository, PersistenceBridge, WorkflowRepository};
pub use wire::{
    EngineEvent, EngineMessage, ExecuteRequest, ExecuteResponse, RunInput, WorkflowPayload,
    WorkflowRecord,
};
