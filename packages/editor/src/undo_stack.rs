//! # Undo/Redo Stack
//!
//! Snapshot history for a block tree.
//!
//! ## Design
//!
//! - Each committed change records the serialized tree from *before* it
//! - Undo pops the last snapshot and stashes the current tree for redo
//! - Redo is the mirror image
//! - New changes clear the redo stack
//! - Both stacks hold at most `max_levels` entries, oldest dropped first
//!
//! ## Example
//!
//! ```rust
//! use storefront_editor::UndoStack;
//!
//! let mut stack = UndoStack::new();
//! stack.record("[]".to_string(), Some("Add row"));
//!
//! let previous = stack.undo("[{\"id\":\"a\"}]".to_string());
//! assert_eq!(previous.as_deref(), Some("[]"));
//! assert!(stack.can_redo());
//! ```

/// Default history depth
pub const DEFAULT_MAX_LEVELS: usize = 80;

/// One immutable serialized tree
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryEntry {
    pub snapshot: String,

    /// What the change that followed this snapshot did
    pub description: Option<String>,
}

#[derive(Debug)]
pub struct UndoStack {
    /// Snapshots before each applied change (most recent last)
    undo_stack: Vec<HistoryEntry>,

    /// Snapshots of undone states (most recent last)
    redo_stack: Vec<HistoryEntry>,

    /// Maximum entries per stack (0 = unlimited)
    max_levels: usize,
}

impl UndoStack {
    pub fn new() -> Self {
        Self::with_max_levels(DEFAULT_MAX_LEVELS)
    }

    pub fn with_max_levels(max_levels: usize) -> Self {
        Self {
            undo_stack: Vec::new(),
            redo_stack: Vec::new(),
            max_levels,
        }
    }

    fn trim(stack: &mut Vec<HistoryEntry>, max_levels: usize) {
        if max_levels > 0 && stack.len() > max_levels {
            let excess = stack.len() - max_levels;
            stack.drain(..excess);
        }
    }

    /// Record the state before a committed change
    pub fn record(&mut self, before: String, description: Option<&str>) {
        self.undo_stack.push(HistoryEntry {
            snapshot: before,
            description: description.map(str::to_string),
        });
        Self::trim(&mut self.undo_stack, self.max_levels);

        // New action invalidates the future
        self.redo_stack.clear();
    }

    /// Step back; returns the snapshot to restore, or `None` if empty
    pub fn undo(&mut self, current: String) -> Option<String> {
        let entry = self.undo_stack.pop()?;
        self.redo_stack.push(HistoryEntry {
            snapshot: current,
            description: entry.description.clone(),
        });
        Self::trim(&mut self.redo_stack, self.max_levels);
        Some(entry.snapshot)
    }

    /// Step forward; returns the snapshot to restore, or `None` if empty
    pub fn redo(&mut self, current: String) -> Option<String> {
        let entry = self.redo_stack.pop()?;
        self.undo_stack.push(HistoryEntry {
            snapshot: current,
            description: entry.description.clone(),
        });
        Self::trim(&mut self.undo_stack, self.max_levels);
        Some(entry.snapshot)
    }

    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    pub fn undo_levels(&self) -> usize {
        self.undo_stack.len()
    }

    pub fn redo_levels(&self) -> usize {
        self.redo_stack.len()
    }

    pub fn max_levels(&self) -> usize {
        self.max_levels
    }

    pub fn clear(&mut self) {
        self.undo_stack.clear();
        self.redo_stack.clear();
    }

    /// Description of the change the next undo reverts
    pub fn undo_description(&self) -> Option<&str> {
        self.undo_stack
            .last()
            .and_then(|entry| entry.description.as_deref())
    }

    /// Description of the change the next redo reapplies
    pub fn redo_description(&self) -> Option<&str> {
        self.redo_stack
            .last()
            .and_then(|entry| entry.description.as_deref())
    }
}

impl Default for UndoStack {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_undo_stack_creation() {
        let stack = UndoStack::new();
        assert_eq!(stack.undo_levels(), 0);
        assert_eq!(stack.redo_levels(), 0);
        assert_eq!(stack.max_levels(), 80);
        assert!(!stack.can_undo());
        assert!(!stack.can_redo());
    }

    #[test]
    fn test_undo_and_redo() {
        let mut stack = UndoStack::new();
        stack.record("s0".into(), Some("first"));
        assert_eq!(stack.undo_description(), Some("first"));
        assert_eq!(stack.redo_description(), None);

        assert_eq!(stack.undo("s1".into()), Some("s0".to_string()));
        assert_eq!(stack.undo_description(), None);
        assert_eq!(stack.undo_levels(), 0);
        assert_eq!(stack.redo_levels(), 1);
        assert_eq!(stack.redo_description(), Some("first"));

        assert_eq!(stack.redo("s0".into()), Some("s1".to_string()));
        assert_eq!(stack.undo_levels(), 1);
        assert_eq!(stack.redo_levels(), 0);
    }

    #[test]
    fn test_empty_stacks_are_noops() {
        let mut stack = UndoStack::new();
        assert_eq!(stack.undo("s".into()), None);
        assert_eq!(stack.redo("s".into()), None);
        assert_eq!(stack.redo_levels(), 0);
    }

    #[test]
    fn test_new_record_clears_redo() {
        let mut stack = UndoStack::new();
        stack.record("s0".into(), None);
        stack.undo("s1".into());
        assert_eq!(stack.redo_levels(), 1);

        stack.record("s0".into(), None);
        assert_eq!(stack.redo_levels(), 0);
    }

    #[test]
    fn test_max_levels_enforced() {
        let mut stack = UndoStack::with_max_levels(2);
        for i in 0..3 {
            stack.record(format!("s{}", i), None);
        }

        assert_eq!(stack.undo_levels(), 2);
        assert_eq!(stack.undo("s3".into()), Some("s2".to_string()));
        assert_eq!(stack.undo("s2".into()), Some("s1".to_string()));
        assert_eq!(stack.undo("s1".into()), None);
    }
}
