use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::HashSet;
use tracing::debug;

use super::branch;
use super::edge::{Connection, Edge, EdgeId};
use super::node::{Node, NodeId, Position, FALSE_EDGE_FIELD, TRUE_EDGE_FIELD};
use crate::error::{GraphError, GraphResult};

/// Positional delta applied to duplicated nodes on both axes
pub const DUPLICATE_OFFSET: f64 = 50.0;

/// An immutable deep copy of the full node/edge set at one point in time
///
/// Snapshots are what the history manager stacks and what external
/// consumers receive; they share no storage with the live graph.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct GraphSnapshot {
    /// Nodes at capture time
    pub nodes: Vec<Node>,
    /// Edges at capture time
    pub edges: Vec<Edge>,
}

/// The canonical store for a workflow's nodes and edges
///
/// All mutation goes through these operations. Lookups that miss are
/// silent no-ops; callers needing failure feedback must pre-validate.
/// Insertion order of nodes and edges is preserved.
#[derive(Debug, Clone, Default)]
pub struct WorkflowGraph {
    nodes: Vec<Node>,
    edges: Vec<Edge>,
}

impl WorkflowGraph {
    /// Create an empty graph
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a graph from loaded parts, validating consistency
    pub fn from_parts(nodes: Vec<Node>, edges: Vec<Edge>) -> GraphResult<Self> {
        let graph = Self { nodes, edges };
        graph.validate()?;
        Ok(graph)
    }

    /// Look up a node by id
    pub fn node(&self, id: &NodeId) -> Option<&Node> {
        self.nodes.iter().find(|n| n.id == *id)
    }

    fn node_mut(&mut self, id: &NodeId) -> Option<&mut Node> {
        self.nodes.iter_mut().find(|n| n.id == *id)
    }

    /// Look up an edge by id
    pub fn edge(&self, id: &EdgeId) -> Option<&Edge> {
        self.edges.iter().find(|e| e.id == *id)
    }

    /// All nodes in insertion order
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    /// All edges in insertion order
    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    /// Number of nodes
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Number of edges
    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// Whether a node with the given id exists
    pub fn contains_node(&self, id: &NodeId) -> bool {
        self.node(id).is_some()
    }

    /// Whether the graph has no nodes
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Ids of every edge whose source or target is the given node
    pub fn incident_edges(&self, id: &NodeId) -> Vec<EdgeId> {
        self.edges
            .iter()
            .filter(|e| e.source == *id || e.target == *id)
            .map(|e| e.id.clone())
            .collect()
    }

    /// Add a node; the id must not already exist
    pub fn add_node(&mut self, node: Node) -> GraphResult<()> {
        if self.contains_node(&node.id) {
            return Err(GraphError::DuplicateNode(node.id.0.clone()));
        }
        debug!(node_id = %node.id, kind = ?node.kind, "Adding node");
        self.nodes.push(node);
        Ok(())
    }

    /// Remove a node, cascading removal of every incident edge
    ///
    /// Returns whether anything changed. Branch references held by
    /// surviving nodes are cleared through the reconciler as their
    /// edges are cascaded away.
    pub fn remove_node(&mut self, id: &NodeId) -> bool {
        if !self.contains_node(id) {
            return false;
        }

        for edge_id in self.incident_edges(id) {
            self.remove_edge(&edge_id);
        }

        debug!(node_id = %id, "Removing node");
        self.nodes.retain(|n| n.id != *id);
        true
    }

    /// Shallow-merge a partial payload into a node's data
    ///
    /// Top-level keys of `partial` overwrite existing keys; position
    /// is untouched. No-op if the node does not exist.
    pub fn update_node_data(&mut self, id: &NodeId, partial: Map<String, Value>) -> bool {
        match self.node_mut(id) {
            Some(node) => {
                for (key, value) in partial {
                    node.data.insert(key, value);
                }
                true
            }
            None => false,
        }
    }

    /// Move a node; the one mutation excluded from history capture
    pub fn update_node_position(&mut self, id: &NodeId, position: Position) -> bool {
        match self.node_mut(id) {
            Some(node) => {
                node.position = position;
                true
            }
            None => false,
        }
    }

    /// Connect two nodes, minting a fresh edge id
    ///
    /// Returns the new edge id, or `None` when either endpoint is
    /// missing. Branch handles on condition/loop sources are recorded
    /// synchronously through the reconciler.
    pub fn add_edge(&mut self, connection: Connection) -> Option<EdgeId> {
        self.attach_edge(connection.into_edge(), true)
    }

    /// Insert an edge that already carries an id (load, paste, duplicate)
    pub fn insert_edge(&mut self, edge: Edge) -> Option<EdgeId> {
        self.attach_edge(edge, true)
    }

    fn attach_edge(&mut self, edge: Edge, reconcile: bool) -> Option<EdgeId> {
        if !self.contains_node(&edge.source) || !self.contains_node(&edge.target) {
            debug!(edge_id = %edge.id, "Dropping edge with missing endpoint");
            return None;
        }
        if self.edge(&edge.id).is_some() {
            return None;
        }

        if reconcile {
            let source_id = edge.source.clone();
            if let Some(source) = self.node_mut(&source_id) {
                branch::on_edge_added(source, &edge);
            }
        }

        let id = edge.id.clone();
        self.edges.push(edge);
        Some(id)
    }

    /// Remove an edge by id, clearing any branch reference to it
    pub fn remove_edge(&mut self, id: &EdgeId) -> bool {
        let Some(index) = self.edges.iter().position(|e| e.id == *id) else {
            return false;
        };
        let edge = self.edges.remove(index);

        // The source node may already be gone on the cascade path
        if let Some(source) = self.node_mut(&edge.source) {
            branch::on_edge_removed(source, &edge);
        }
        true
    }

    /// Duplicate a node and every edge incident to it
    ///
    /// The clone gets a fresh id, a fixed positional offset, and a deep
    /// copy of the original's data. Mirrored edges get fresh ids with
    /// endpoints remapped onto the clone; no original edge is reused.
    pub fn duplicate_node(&mut self, id: &NodeId) -> Option<NodeId> {
        let original = self.node(id)?.clone();

        let new_id = NodeId::generate();
        let mut clone = original.clone();
        clone.id = new_id.clone();
        clone.position = original.position.offset(DUPLICATE_OFFSET, DUPLICATE_OFFSET);
        self.nodes.push(clone);

        let incident: Vec<Edge> = self
            .edges
            .iter()
            .filter(|e| e.source == *id || e.target == *id)
            .cloned()
            .collect();

        for edge in incident {
            let outgoing = edge.source == *id;
            let mirrored = Edge {
                id: EdgeId::generate(),
                source: if outgoing { new_id.clone() } else { edge.source },
                target: if edge.target == *id {
                    new_id.clone()
                } else {
                    edge.target
                },
                source_handle: edge.source_handle,
                target_handle: edge.target_handle,
            };
            // Only outgoing branch edges re-route through the reconciler;
            // reconciling an incoming mirror would steal the original
            // source node's branch reference.
            let _ = self.attach_edge(mirrored, outgoing);
        }

        debug!(original = %id, clone = %new_id, "Duplicated node");
        Some(new_id)
    }

    /// Capture a deep copy of the current state
    pub fn snapshot(&self) -> GraphSnapshot {
        GraphSnapshot {
            nodes: self.nodes.clone(),
            edges: self.edges.clone(),
        }
    }

    /// Replace the graph contents wholesale from a snapshot
    pub fn restore(&mut self, snapshot: GraphSnapshot) {
        self.nodes = snapshot.nodes;
        self.edges = snapshot.edges;
    }

    /// Check structural consistency
    ///
    /// Verifies node/edge id uniqueness, edge endpoint existence, and
    /// that every branch reference points at a live edge leaving the
    /// matching handle of its node.
    pub fn validate(&self) -> GraphResult<()> {
        let mut node_ids = HashSet::new();
        for node in &self.nodes {
            if !node_ids.insert(&node.id) {
                return Err(GraphError::ValidationError(format!(
                    "Duplicate node id: {}",
                    node.id
                )));
            }
        }

        let mut edge_ids = HashSet::new();
        for edge in &self.edges {
            if !edge_ids.insert(&edge.id) {
                return Err(GraphError::ValidationError(format!(
                    "Duplicate edge id: {}",
                    edge.id
                )));
            }
            if !node_ids.contains(&edge.source) {
                return Err(GraphError::ValidationError(format!(
                    "Edge {} references missing source node: {}",
                    edge.id, edge.source
                )));
            }
            if !node_ids.contains(&edge.target) {
                return Err(GraphError::ValidationError(format!(
                    "Edge {} references missing target node: {}",
                    edge.id, edge.target
                )));
            }
        }

        for node in self.nodes.iter().filter(|n| n.kind.has_branches()) {
            for field in [TRUE_EDGE_FIELD, FALSE_EDGE_FIELD] {
                let Some(edge_id) = node.branch_ref(field) else {
                    continue;
                };
                let Some(edge) = self.edge(&EdgeId::new(edge_id)) else {
                    return Err(GraphError::ValidationError(format!(
                        "Node {} holds dangling branch reference {}: {}",
                        node.id, field, edge_id
                    )));
                };
                let handle_field = edge
                    .source_handle
                    .as_deref()
                    .and_then(|h| node.kind.branch_field(h));
                if edge.source != node.id || handle_field != Some(field) {
                    return Err(GraphError::ValidationError(format!(
                        "Node {} branch reference {} does not match edge {}",
                        node.id, field, edge.id
                    )));
                }
            }
        }

        Ok(())
    }
}
