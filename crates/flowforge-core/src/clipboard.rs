//! Selection tracking and copy/paste clipboard
//!
//! Nodes are single-select; edges support multi-select via toggle. The
//! clipboard holds deep copies of nodes only - edges between clipboard
//! members are recomputed at paste time, never stored.

use std::collections::{HashMap, HashSet};
use uuid::Uuid;

use crate::domain::edge::{Edge, EdgeId};
use crate::domain::graph::WorkflowGraph;
use crate::domain::node::{Node, NodeId, Position, FALSE_EDGE_FIELD, TRUE_EDGE_FIELD};

/// Canvas-center fallback when no pointer position is known
pub const PASTE_FALLBACK: Position = Position { x: 400.0, y: 300.0 };

/// Incremental offset applied per pasted node so pastes do not stack
pub const PASTE_STAGGER: f64 = 30.0;

/// The active node and edge selection
#[derive(Debug, Clone, Default)]
pub struct Selection {
    node: Option<NodeId>,
    edges: HashSet<EdgeId>,
}

impl Selection {
    /// Create an empty selection
    pub fn new() -> Self {
        Self::default()
    }

    /// Select a node, replacing any previous node selection
    pub fn select_node(&mut self, id: NodeId) {
        self.node = Some(id);
    }

    /// The currently selected node, if any
    pub fn selected_node(&self) -> Option<&NodeId> {
        self.node.as_ref()
    }

    /// Toggle an edge in or out of the multi-selection
    pub fn toggle_edge(&mut self, id: EdgeId) {
        if !self.edges.remove(&id) {
            self.edges.insert(id);
        }
    }

    /// Whether an edge is currently selected
    pub fn is_edge_selected(&self, id: &EdgeId) -> bool {
        self.edges.contains(id)
    }

    /// The selected edge set
    pub fn selected_edges(&self) -> &HashSet<EdgeId> {
        &self.edges
    }

    /// Clear the whole selection
    pub fn clear(&mut self) {
        self.node = None;
        self.edges.clear();
    }

    /// Drop selected ids that no longer exist in the graph
    pub fn prune(&mut self, graph: &WorkflowGraph) {
        if let Some(id) = &self.node {
            if !graph.contains_node(id) {
                self.node = None;
            }
        }
        self.edges.retain(|id| graph.edge(id).is_some());
    }
}

/// Clipboard payload of deep-copied nodes
#[derive(Debug, Clone, Default)]
pub struct Clipboard {
    nodes: Vec<Node>,
}

impl Clipboard {
    /// Create an empty clipboard
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the clipboard contents wholesale
    pub fn set(&mut self, nodes: Vec<Node>) {
        self.nodes = nodes;
    }

    /// Whether the clipboard holds nothing
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// The copied nodes, in copy order
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    /// Paste the clipboard into a graph
    ///
    /// Each node gets a fresh id (original id plus a uniqueness
    /// suffix) and a staggered position from `at`, falling back to the
    /// canvas center. Edges that exist between any two clipboard
    /// members are rebuilt with both endpoints remapped through an
    /// id-translation table; edges to nodes outside the clipboard set
    /// are not. Paste may be repeated - every call mints disjoint ids.
    pub fn paste_into(&self, graph: &mut WorkflowGraph, at: Option<Position>) -> Vec<NodeId> {
        let anchor = at.unwrap_or(PASTE_FALLBACK);
        let mut translation: HashMap<NodeId, NodeId> = HashMap::new();
        let mut pasted = Vec::new();

        for (index, original) in self.nodes.iter().enumerate() {
            let new_id = NodeId::new(format!("{}-{}", original.id, Uuid::new_v4()));
            let mut clone = original.clone();
            clone.id = new_id.clone();
            clone.position = anchor.offset(
                PASTE_STAGGER * index as f64,
                PASTE_STAGGER * index as f64,
            );
            // Branch references point at edges the clone does not own;
            // the reconciler re-records them for rebuilt edges below.
            if clone.kind.has_branches() {
                clone.data.remove(TRUE_EDGE_FIELD);
                clone.data.remove(FALSE_EDGE_FIELD);
            }

            if graph.add_node(clone).is_ok() {
                translation.insert(original.id.clone(), new_id.clone());
                pasted.push(new_id);
            }
        }

        let rebuilt: Vec<Edge> = graph
            .edges()
            .iter()
            .filter(|e| translation.contains_key(&e.source) && translation.contains_key(&e.target))
            .cloned()
            .collect();
        for edge in rebuilt {
            let _ = graph.insert_edge(Edge {
                id: EdgeId::generate(),
                source: translation[&edge.source].clone(),
                target: translation[&edge.target].clone(),
                source_handle: edge.source_handle,
                target_handle: edge.target_handle,
            });
        }

        pasted
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::edge::Connection;
    use crate::domain::node::NodeKind;

    fn node(id: &str, kind: NodeKind) -> Node {
        Node::new(id, kind, Position::default())
    }

    #[test]
    fn test_node_selection_is_single() {
        let mut selection = Selection::new();
        selection.select_node(NodeId::new("1"));
        selection.select_node(NodeId::new("2"));
        assert_eq!(selection.selected_node(), Some(&NodeId::new("2")));
    }

    #[test]
    fn test_edge_toggle() {
        let mut selection = Selection::new();
        let id = EdgeId::new("e1");
        selection.toggle_edge(id.clone());
        assert!(selection.is_edge_selected(&id));
        selection.toggle_edge(id.clone());
        assert!(!selection.is_edge_selected(&id));
    }

    #[test]
    fn test_prune_drops_stale_ids() {
        let mut graph = WorkflowGraph::new();
        graph.add_node(node("1", NodeKind::Logic)).unwrap();

        let mut selection = Selection::new();
        selection.select_node(NodeId::new("gone"));
        selection.toggle_edge(EdgeId::new("gone-edge"));
        selection.prune(&graph);

        assert!(selection.selected_node().is_none());
        assert!(selection.selected_edges().is_empty());
    }

    #[test]
    fn test_paste_rebuilds_edges_between_clipboard_members_only() {
        let mut graph = WorkflowGraph::new();
        graph.add_node(node("a", NodeKind::Logic)).unwrap();
        graph.add_node(node("b", NodeKind::Logic)).unwrap();
        graph.add_node(node("outside", NodeKind::Response)).unwrap();
        graph.add_edge(Connection::new("a", "b")).unwrap();
        graph.add_edge(Connection::new("b", "outside")).unwrap();

        let mut clipboard = Clipboard::new();
        clipboard.set(vec![
            graph.node(&NodeId::new("a")).unwrap().clone(),
            graph.node(&NodeId::new("b")).unwrap().clone(),
        ]);

        let pasted = clipboard.paste_into(&mut graph, Some(Position::new(100.0, 100.0)));
        assert_eq!(pasted.len(), 2);
        assert_eq!(graph.node_count(), 5);
        // One internal edge rebuilt, the edge to "outside" is not
        assert_eq!(graph.edge_count(), 3);

        let pasted_edge = graph
            .edges()
            .iter()
            .find(|e| e.source == pasted[0] && e.target == pasted[1]);
        assert!(pasted_edge.is_some());
    }

    #[test]
    fn test_repeated_paste_mints_disjoint_ids() {
        let mut graph = WorkflowGraph::new();
        graph.add_node(node("a", NodeKind::Logic)).unwrap();

        let mut clipboard = Clipboard::new();
        clipboard.set(vec![graph.node(&NodeId::new("a")).unwrap().clone()]);

        let first = clipboard.paste_into(&mut graph, Some(Position::new(10.0, 10.0)));
        let second = clipboard.paste_into(&mut graph, Some(Position::new(200.0, 50.0)));

        assert_eq!(graph.node_count(), 3);
        assert_ne!(first[0], second[0]);
        assert_ne!(first[0], NodeId::new("a"));
        assert_eq!(graph.node(&first[0]).unwrap().position, Position::new(10.0, 10.0));
        assert_eq!(
            graph.node(&second[0]).unwrap().position,
            Position::new(200.0, 50.0)
        );
    }

    #[test]
    fn test_paste_staggers_multiple_nodes() {
        let mut graph = WorkflowGraph::new();
        graph.add_node(node("a", NodeKind::Logic)).unwrap();
        graph.add_node(node("b", NodeKind::Logic)).unwrap();

        let mut clipboard = Clipboard::new();
        clipboard.set(vec![
            graph.node(&NodeId::new("a")).unwrap().clone(),
            graph.node(&NodeId::new("b")).unwrap().clone(),
        ]);

        let pasted = clipboard.paste_into(&mut graph, None);
        let first = graph.node(&pasted[0]).unwrap().position;
        let second = graph.node(&pasted[1]).unwrap().position;
        assert_eq!(first, PASTE_FALLBACK);
        assert_eq!(second, PASTE_FALLBACK.offset(PASTE_STAGGER, PASTE_STAGGER));
    }

    #[test]
    fn test_paste_strips_branch_refs_then_remaps_internal_ones() {
        let mut graph = WorkflowGraph::new();
        graph.add_node(node("c1", NodeKind::Condition)).unwrap();
        graph.add_node(node("r1", NodeKind::Response)).unwrap();
        let original_edge = graph
            .add_edge(Connection::new("c1", "r1").with_source_handle("true"))
            .unwrap();

        let mut clipboard = Clipboard::new();
        clipboard.set(vec![
            graph.node(&NodeId::new("c1")).unwrap().clone(),
            graph.node(&NodeId::new("r1")).unwrap().clone(),
        ]);

        let pasted = clipboard.paste_into(&mut graph, None);
        let pasted_condition = graph.node(&pasted[0]).unwrap();
        let branch_ref = pasted_condition.branch_ref(TRUE_EDGE_FIELD).unwrap();
        assert_ne!(branch_ref, original_edge.0.as_str());
        assert!(graph.validate().is_ok());
    }
}
