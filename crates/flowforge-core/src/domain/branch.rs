//! Branch-edge reconciler
//!
//! Condition and loop nodes carry back-references to their outgoing
//! branch edges (`trueEdgeId` / `falseEdgeId`) in their data payload.
//! The graph store invokes these hooks from its edge operations so a
//! broken reference can never survive a store operation.

use serde_json::Value;

use super::edge::Edge;
use super::node::{Node, FALSE_EDGE_FIELD, TRUE_EDGE_FIELD};

/// Record a newly created branch edge on its source node
///
/// If the edge leaves a recognized branch handle of a condition/loop
/// node, the matching data field is set to the edge id, replacing any
/// previous value. Each handle accepts a single outgoing connection at
/// the editor layer; this hook does not enforce that as a hard
/// constraint. Returns whether a reference was written.
pub fn on_edge_added(source: &mut Node, edge: &Edge) -> bool {
    debug_assert_eq!(source.id, edge.source);

    let Some(handle) = edge.source_handle.as_deref() else {
        return false;
    };
    let Some(field) = source.kind.branch_field(handle) else {
        return false;
    };

    source
        .data
        .insert(field.to_string(), Value::String(edge.id.0.clone()));
    true
}

/// Clear a branch reference when its edge is removed
///
/// Any field on the source node that references the removed edge's id
/// is cleared, so the node never keeps a dangling reference. Returns
/// whether a reference was cleared.
pub fn on_edge_removed(source: &mut Node, edge: &Edge) -> bool {
    if !source.kind.has_branches() {
        return false;
    }

    let mut cleared = false;
    for field in [TRUE_EDGE_FIELD, FALSE_EDGE_FIELD] {
        if source.branch_ref(field) == Some(edge.id.0.as_str()) {
            source.data.remove(field);
            cleared = true;
        }
    }
    cleared
}
