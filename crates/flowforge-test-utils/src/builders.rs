//! Builders for graphs, records, and engine messages

use serde_json::{json, Value};

use flowforge_core::{Connection, GraphSnapshot, Node, NodeKind, Position, WorkflowGraph};
use flowforge_runtime::wire::{EngineEvent, EngineMessage, WorkflowRecord};

/// A logic node at the origin
pub fn logic_node(id: &str) -> Node {
    Node::new(id, NodeKind::Logic, Position::default())
}

/// A condition node at the origin
pub fn condition_node(id: &str) -> Node {
    Node::new(id, NodeKind::Condition, Position::default())
}

/// A node of the given kind at a position
pub fn node_at(id: &str, kind: NodeKind, x: f64, y: f64) -> Node {
    Node::new(id, kind, Position::new(x, y))
}

/// A linear api-entry → logic → ... → response chain with `middle`
/// logic nodes, node ids "1".."n", fully connected
pub fn linear_snapshot(middle: usize) -> GraphSnapshot {
    let mut graph = WorkflowGraph::new();
    let total = middle + 2;
    for i in 1..=total {
        let kind = if i == 1 {
            NodeKind::ApiEntry
        } else if i == total {
            NodeKind::Response
        } else {
            NodeKind::Logic
        };
        let _ = graph.add_node(node_at(&i.to_string(), kind, (i as f64) * 100.0, 0.0));
    }
    for i in 1..total {
        let _ = graph.add_edge(Connection::new(i.to_string(), (i + 1).to_string()));
    }
    graph.snapshot()
}

/// A workflow record wrapping a snapshot
pub fn workflow_record(id: &str, name: &str, snapshot: GraphSnapshot) -> WorkflowRecord {
    WorkflowRecord::from_snapshot(id, name, snapshot)
}

fn message(event: EngineEvent, data: Value) -> EngineMessage {
    EngineMessage {
        event,
        data,
        execution_id: Some("exec-scripted".to_string()),
        timestamp: None,
    }
}

/// An `execution_started` message
pub fn execution_started_message() -> EngineMessage {
    message(EngineEvent::ExecutionStarted, json!({}))
}

/// A `node_started` message for a node
pub fn node_started_message(node_id: &str, node_name: &str) -> EngineMessage {
    message(
        EngineEvent::NodeStarted,
        json!({ "nodeId": node_id, "nodeName": node_name }),
    )
}

/// A `node_completed` message with output and duration
pub fn node_completed_message(node_id: &str, node_name: &str, output: Value) -> EngineMessage {
    message(
        EngineEvent::NodeCompleted,
        json!({ "nodeId": node_id, "nodeName": node_name, "output": output, "durationMs": 10 }),
    )
}

/// A `node_failed` message with an error description
pub fn node_failed_message(node_id: &str, node_name: &str, error: &str) -> EngineMessage {
    message(
        EngineEvent::NodeFailed,
        json!({ "nodeId": node_id, "nodeName": node_name, "error": error }),
    )
}

/// An `execution_completed` message with the final response payload
pub fn execution_completed_message(response: Value) -> EngineMessage {
    message(EngineEvent::ExecutionCompleted, json!({ "response": response }))
}

/// An `execution_failed` message with an error description
pub fn execution_failed_message(error: &str) -> EngineMessage {
    message(EngineEvent::ExecutionFailed, json!({ "error": error }))
}
