//! Wire types shared with the persistence API and the execution engine
//!
//! Field names follow the JSON shapes of the remote services exactly;
//! the graph node and edge types already serialize in wire form, so
//! the records here embed them directly.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use flowforge_core::{Edge, GraphSnapshot, Node};

/// A persisted workflow document
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WorkflowRecord {
    /// Document id as stored by the persistence API
    #[serde(rename = "_id")]
    pub id: String,

    /// Human-readable workflow name
    pub name: String,

    /// Workflow nodes
    #[serde(default)]
    pub nodes: Vec<Node>,

    /// Workflow edges
    #[serde(default)]
    pub edges: Vec<Edge>,

    /// Last modification time, set by the server
    #[serde(
        rename = "updatedAt",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub updated_at: Option<DateTime<Utc>>,
}

impl WorkflowRecord {
    /// Build a record from a graph snapshot
    pub fn from_snapshot(id: impl Into<String>, name: impl Into<String>, snapshot: GraphSnapshot) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            nodes: snapshot.nodes,
            edges: snapshot.edges,
            updated_at: None,
        }
    }
}

/// Simulated request input for a test run
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct RunInput {
    /// Request body
    #[serde(default)]
    pub body: Value,

    /// Query parameters
    #[serde(default)]
    pub query: Map<String, Value>,

    /// Request headers
    #[serde(default)]
    pub headers: Map<String, Value>,
}

/// The workflow portion of an execution submission
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkflowPayload {
    /// Workflow nodes
    pub nodes: Vec<Node>,

    /// Workflow edges
    pub edges: Vec<Edge>,
}

/// Execution submission request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecuteRequest {
    /// The full workflow graph
    pub workflow: WorkflowPayload,

    /// Simulated request input
    pub input: RunInput,
}

impl ExecuteRequest {
    /// Build a submission from a graph snapshot and run input
    pub fn new(snapshot: GraphSnapshot, input: RunInput) -> Self {
        Self {
            workflow: WorkflowPayload {
                nodes: snapshot.nodes,
                edges: snapshot.edges,
            },
            input,
        }
    }
}

/// Response to an execution submission
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecuteResponse {
    /// Engine-assigned execution id
    #[serde(rename = "executionId")]
    pub execution_id: String,

    /// Initial execution status as reported by the engine
    #[serde(default)]
    pub status: Option<String>,

    /// URL of the streaming channel for this execution
    #[serde(rename = "websocketUrl")]
    pub websocket_url: String,
}

/// Event types emitted by the execution engine
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum EngineEvent {
    /// The run was accepted and started
    ExecutionStarted,
    /// A node began executing
    NodeStarted,
    /// A node finished successfully
    NodeCompleted,
    /// A node failed
    NodeFailed,
    /// The whole run finished successfully
    ExecutionCompleted,
    /// The whole run failed
    ExecutionFailed,
}

/// A single message from the execution engine's streaming channel
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineMessage {
    /// Event discriminator
    pub event: EngineEvent,

    /// Event payload; shape varies per event type
    #[serde(default)]
    pub data: Value,

    /// Execution id, present on all post-submission events
    #[serde(
        rename = "executionId",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub execution_id: Option<String>,

    /// Engine-side event time
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<DateTime<Utc>>,
}

impl EngineMessage {
    fn data_str(&self, key: &str) -> Option<&str> {
        self.data.get(key).and_then(Value::as_str)
    }

    /// Node id from the payload, for node-scoped events
    pub fn node_id(&self) -> Option<&str> {
        self.data_str("nodeId")
    }

    /// Node display name from the payload
    pub fn node_name(&self) -> Option<&str> {
        self.data_str("nodeName")
    }

    /// Node kind tag from the payload
    pub fn node_kind(&self) -> Option<&str> {
        self.data_str("nodeType")
    }

    /// Node output value, for `node_completed`
    pub fn output(&self) -> Option<&Value> {
        self.data.get("output")
    }

    /// Error description, for `node_failed` / `execution_failed`
    pub fn error(&self) -> Option<&str> {
        self.data_str("error")
    }

    /// Node execution duration in milliseconds
    pub fn duration_ms(&self) -> Option<u64> {
        self.data.get("durationMs").and_then(Value::as_u64)
    }

    /// Final response payload, for `execution_completed`
    pub fn response(&self) -> Option<&Value> {
        self.data.get("response")
    }
}
