//! Ordered per-node execution log
//!
//! One entry per node, in first-seen order. Later events for the same
//! node update the existing entry in place rather than appending.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Synthetic node id for failures that are not tied to a workflow node
pub const SYSTEM_NODE_ID: &str = "system";

/// Per-node run status
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum NodeRunStatus {
    /// Queued, not yet started
    Pending,
    /// Currently executing
    Running,
    /// Finished successfully
    Completed,
    /// Finished with an error
    Error,
}

/// One node's entry in the execution log
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ExecutionLogEntry {
    /// Workflow node id (or [`SYSTEM_NODE_ID`])
    pub node_id: String,

    /// Display name
    pub node_name: String,

    /// Node kind tag, when the engine reported one
    pub node_kind: Option<String>,

    /// Current status
    pub status: NodeRunStatus,

    /// Time of the most recent update
    pub timestamp: DateTime<Utc>,

    /// Execution duration, reported on completion
    pub duration_ms: Option<u64>,

    /// Node output, reported on completion
    pub output: Option<Value>,

    /// Error description, reported on failure
    pub error: Option<String>,
}

impl ExecutionLogEntry {
    /// Create an entry with the given status and no result fields
    pub fn new(node_id: impl Into<String>, node_name: impl Into<String>, status: NodeRunStatus) -> Self {
        Self {
            node_id: node_id.into(),
            node_name: node_name.into(),
            node_kind: None,
            status,
            timestamp: Utc::now(),
            duration_ms: None,
            output: None,
            error: None,
        }
    }

    /// Create the synthetic entry used for submission and channel failures
    pub fn system_error(message: impl Into<String>) -> Self {
        let mut entry = Self::new(SYSTEM_NODE_ID, "System", NodeRunStatus::Error);
        entry.error = Some(message.into());
        entry
    }
}

/// Ordered, keyed-by-node execution log
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExecutionLog {
    entries: Vec<ExecutionLogEntry>,
}

impl ExecutionLog {
    /// Create an empty log
    pub fn new() -> Self {
        Self::default()
    }

    /// All entries in first-seen order
    pub fn entries(&self) -> &[ExecutionLogEntry] {
        &self.entries
    }

    /// Look up a node's entry
    pub fn entry(&self, node_id: &str) -> Option<&ExecutionLogEntry> {
        self.entries.iter().find(|e| e.node_id == node_id)
    }

    /// Number of entries
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the log is empty
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Append a new entry, or replace the existing entry for the same
    /// node in place (last write wins, position preserved)
    pub fn upsert(&mut self, entry: ExecutionLogEntry) {
        match self.entries.iter_mut().find(|e| e.node_id == entry.node_id) {
            Some(existing) => *existing = entry,
            None => self.entries.push(entry),
        }
    }

    /// Drop all entries (done at the start of each run)
    pub fn clear(&mut self) {
        self.entries.clear();
    }
}
