//! Snapshot-based undo/redo history
//!
//! The manager keeps three stacks of deep graph snapshots: `past`
//! (oldest to newest), `present` (mirrors the live store except during
//! an in-flight replay), and `future` (nearest undone state first).
//! Any non-replay recording clears `future` - linear undo, no
//! redo branching.

use tracing::trace;

use crate::domain::graph::GraphSnapshot;

/// Undo/redo stack over graph snapshots
#[derive(Debug, Clone, Default)]
pub struct HistoryManager {
    past: Vec<GraphSnapshot>,
    present: GraphSnapshot,
    future: Vec<GraphSnapshot>,
    replaying: bool,
}

impl HistoryManager {
    /// Create a history manager seeded with an initial state
    pub fn new(initial: GraphSnapshot) -> Self {
        Self {
            past: Vec::new(),
            present: initial,
            future: Vec::new(),
            replaying: false,
        }
    }

    /// Record a new present state
    ///
    /// Called after every history-worthy mutation. While the replaying
    /// flag is set this call is suppressed exactly once and the flag is
    /// cleared, which keeps undo/redo transitions from re-entering the
    /// history as fresh mutations.
    pub fn record(&mut self, snapshot: GraphSnapshot) {
        if self.replaying {
            self.replaying = false;
            trace!("Suppressing history record during replay");
            return;
        }

        let previous = std::mem::replace(&mut self.present, snapshot);
        self.past.push(previous);
        self.future.clear();
    }

    /// Step back one state, returning the snapshot to restore
    ///
    /// No-op returning `None` when there is nothing to undo. Sets the
    /// replaying flag so the caller's follow-up `record` is suppressed.
    pub fn undo(&mut self) -> Option<GraphSnapshot> {
        let restored = self.past.pop()?;
        let current = std::mem::replace(&mut self.present, restored);
        self.future.insert(0, current);
        self.replaying = true;
        Some(self.present.clone())
    }

    /// Step forward one state, returning the snapshot to restore
    pub fn redo(&mut self) -> Option<GraphSnapshot> {
        if self.future.is_empty() {
            return None;
        }
        let restored = self.future.remove(0);
        let current = std::mem::replace(&mut self.present, restored);
        self.past.push(current);
        self.replaying = true;
        Some(self.present.clone())
    }

    /// Whether an undo step is available
    pub fn can_undo(&self) -> bool {
        !self.past.is_empty()
    }

    /// Whether a redo step is available
    pub fn can_redo(&self) -> bool {
        !self.future.is_empty()
    }

    /// Number of recorded past states
    pub fn depth(&self) -> usize {
        self.past.len()
    }

    /// Drop the oldest past entries beyond `limit`
    pub fn truncate(&mut self, limit: usize) {
        if self.past.len() > limit {
            let excess = self.past.len() - limit;
            self.past.drain(0..excess);
        }
    }
}
