//! Editor session - the composition root for the graph editor state
//!
//! The session owns the graph store, history manager, selection, and
//! clipboard as one explicit state object passed by reference; nothing
//! here is ambient or global, so the whole state machine is testable
//! in isolation. Every history-worthy mutation funnels through
//! [`EditorSession::commit`], which records a snapshot and raises the
//! dirty flag. Position drags stream through a separate, non-historied
//! channel.

use serde_json::{Map, Value};
use tracing::debug;

use crate::clipboard::Clipboard;
use crate::clipboard::Selection;
use crate::domain::edge::{Connection, Edge, EdgeId};
use crate::domain::graph::{GraphSnapshot, WorkflowGraph};
use crate::domain::node::{Node, NodeId, Position};
use crate::error::GraphResult;
use crate::history::HistoryManager;

/// Mutable editor state for one loaded workflow
#[derive(Debug, Clone, Default)]
pub struct EditorSession {
    graph: WorkflowGraph,
    history: HistoryManager,
    selection: Selection,
    clipboard: Clipboard,
    dirty: bool,
}

impl EditorSession {
    /// Create a session over an empty graph
    pub fn new() -> Self {
        Self::default()
    }

    /// Read-only view of the graph store
    pub fn graph(&self) -> &WorkflowGraph {
        &self.graph
    }

    /// The current selection
    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    /// Whether the in-memory graph differs from the last persisted version
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Whether an undo step is available
    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    /// Whether a redo step is available
    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    /// Deep copy of the current graph state for external consumers
    pub fn snapshot(&self) -> GraphSnapshot {
        self.graph.snapshot()
    }

    // Record the mutated state into history and raise the dirty flag.
    // During undo/redo replay the record is suppressed exactly once by
    // the history manager itself.
    fn commit(&mut self) {
        self.history.record(self.graph.snapshot());
        self.dirty = true;
    }

    /// Add a node; fails on a duplicate id
    pub fn add_node(&mut self, node: Node) -> GraphResult<()> {
        self.graph.add_node(node)?;
        self.commit();
        Ok(())
    }

    /// Remove a node and its incident edges
    pub fn remove_node(&mut self, id: &NodeId) -> bool {
        if !self.graph.remove_node(id) {
            return false;
        }
        self.selection.prune(&self.graph);
        self.commit();
        true
    }

    /// Shallow-merge a partial payload into a node's data
    pub fn update_node_data(&mut self, id: &NodeId, partial: Map<String, Value>) -> bool {
        if !self.graph.update_node_data(id, partial) {
            return false;
        }
        self.commit();
        true
    }

    /// Stream a position update without touching history or the dirty flag
    ///
    /// Continuous drag coordinates go through here; only the
    /// end-of-drag position should be committed via
    /// [`EditorSession::commit_position`].
    pub fn update_node_position(&mut self, id: &NodeId, position: Position) -> bool {
        self.graph.update_node_position(id, position)
    }

    /// Commit an end-of-drag position as a history-worthy mutation
    pub fn commit_position(&mut self, id: &NodeId, position: Position) -> bool {
        if !self.graph.update_node_position(id, position) {
            return false;
        }
        self.commit();
        true
    }

    /// Connect two nodes
    pub fn add_edge(&mut self, connection: Connection) -> Option<EdgeId> {
        let id = self.graph.add_edge(connection)?;
        self.commit();
        Some(id)
    }

    /// Remove an edge by id
    pub fn remove_edge(&mut self, id: &EdgeId) -> bool {
        if !self.graph.remove_edge(id) {
            return false;
        }
        self.selection.prune(&self.graph);
        self.commit();
        true
    }

    /// Duplicate a node together with its incident edges
    pub fn duplicate_node(&mut self, id: &NodeId) -> Option<NodeId> {
        let new_id = self.graph.duplicate_node(id)?;
        self.commit();
        Some(new_id)
    }

    /// Select a node (single-select)
    pub fn select_node(&mut self, id: NodeId) {
        self.selection.select_node(id);
    }

    /// Toggle an edge in the multi-selection
    pub fn toggle_edge_selection(&mut self, id: EdgeId) {
        self.selection.toggle_edge(id);
    }

    /// Clear the selection
    pub fn clear_selection(&mut self) {
        self.selection.clear();
    }

    /// Copy the selected node into the clipboard
    pub fn copy(&mut self) -> bool {
        let Some(id) = self.selection.selected_node().cloned() else {
            return false;
        };
        let Some(node) = self.graph.node(&id).cloned() else {
            return false;
        };
        self.clipboard.set(vec![node]);
        true
    }

    /// Copy the selected node, then remove it from the graph
    pub fn cut(&mut self) -> bool {
        let Some(id) = self.selection.selected_node().cloned() else {
            return false;
        };
        if !self.copy() {
            return false;
        }
        self.remove_node(&id)
    }

    /// Paste the clipboard at a pointer position (or the canvas center)
    pub fn paste(&mut self, at: Option<Position>) -> Vec<NodeId> {
        if self.clipboard.is_empty() {
            return Vec::new();
        }
        let pasted = self.clipboard.paste_into(&mut self.graph, at);
        if !pasted.is_empty() {
            if let Some(last) = pasted.last() {
                self.selection.select_node(last.clone());
            }
            self.commit();
        }
        pasted
    }

    /// Step back one history state
    pub fn undo(&mut self) -> bool {
        let Some(snapshot) = self.history.undo() else {
            return false;
        };
        self.graph.restore(snapshot);
        self.selection.prune(&self.graph);
        self.commit();
        debug!("Undo applied");
        true
    }

    /// Step forward one history state
    pub fn redo(&mut self) -> bool {
        let Some(snapshot) = self.history.redo() else {
            return false;
        };
        self.graph.restore(snapshot);
        self.selection.prune(&self.graph);
        self.commit();
        debug!("Redo applied");
        true
    }

    /// Replace the whole graph from persisted parts
    ///
    /// History restarts around the loaded state and the dirty flag is
    /// cleared; used by the persistence bridge on load.
    pub fn replace_graph(&mut self, nodes: Vec<Node>, edges: Vec<Edge>) -> GraphResult<()> {
        let graph = WorkflowGraph::from_parts(nodes, edges)?;
        self.history = HistoryManager::new(graph.snapshot());
        self.graph = graph;
        self.selection.clear();
        self.clipboard = Clipboard::new();
        self.dirty = false;
        Ok(())
    }

    /// Mark the current state as persisted
    pub fn mark_saved(&mut self) {
        self.dirty = false;
    }
}
