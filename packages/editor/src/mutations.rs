//! # Editor Actions
//!
//! Discrete user intents against a block tree edit session.
//!
//! ## Semantics
//!
//! ### Structural actions
//! - Resolve ids to paths against the *current* tree at dispatch time
//! - Stale ids, self-drops and drops into the node's own subtree are
//!   silently ignored
//! - Each applied structural change records one history entry
//!
//! ### Clipboard actions
//! - `Copy` and `CopyStyle` only fill a slot; the tree is untouched
//! - `Paste` and `PasteStyle` are no-ops with an empty slot or no selection
//!   (paste falls back to appending at root)
//!
//! ### History actions
//! - `Undo` / `Redo` never record history themselves

use serde::{Deserialize, Serialize};
use serde_json::Value;
use storefront_blocks::Zone;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "action", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum Mutation {
    /// Change (or clear) the selection
    Select { id: Option<String> },

    Copy,
    Paste,
    CopyStyle,
    PasteStyle,

    /// Clone the selection with fresh ids, insert after it and select it
    Duplicate,

    DeleteSelected,

    /// Shift the selection among its siblings, clamped at the ends
    MoveSelected { delta: isize },

    Undo,
    Redo,

    /// Pointer drag of an existing node ended over a drop zone or node
    DragEnd { active_id: String, over_id: String },

    /// A palette widget was dropped onto the tree
    ExternalDrop {
        block_type: String,
        over_id: Option<String>,
    },

    /// Append a new top-level node
    AddTopLevel { block_type: String, zone: Zone },

    /// Append a new child under a node, coercing leaves to containers
    AddChild { parent_id: String, block_type: String },

    SetProp { id: String, key: String, value: Value },

    /// Replace a node's props with a raw JSON object
    SetRawProps { id: String, json: String },

    SetZone { id: String, zone: Zone },

    SavePreset { name: String },

    InsertPreset { name: String },
}

impl Mutation {
    /// Label recorded alongside the history entry
    pub fn description(&self) -> &'static str {
        match self {
            Mutation::Select { .. } => "Select",
            Mutation::Copy => "Copy",
            Mutation::Paste => "Paste",
            Mutation::CopyStyle => "Copy style",
            Mutation::PasteStyle => "Paste style",
            Mutation::Duplicate => "Duplicate",
            Mutation::DeleteSelected => "Delete",
            Mutation::MoveSelected { .. } => "Move",
            Mutation::Undo => "Undo",
            Mutation::Redo => "Redo",
            Mutation::DragEnd { .. } => "Drag",
            Mutation::ExternalDrop { .. } => "Drop widget",
            Mutation::AddTopLevel { .. } => "Add block",
            Mutation::AddChild { .. } => "Add child",
            Mutation::SetProp { .. } => "Edit prop",
            Mutation::SetRawProps { .. } => "Edit props JSON",
            Mutation::SetZone { .. } => "Change zone",
            Mutation::SavePreset { .. } => "Save preset",
            Mutation::InsertPreset { .. } => "Insert preset",
        }
    }

    /// Whether applying this action can change the tree
    pub fn is_structural(&self) -> bool {
        !matches!(
            self,
            Mutation::Select { .. }
                | Mutation::Copy
                | Mutation::CopyStyle
                | Mutation::Undo
                | Mutation::Redo
                | Mutation::SavePreset { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_wire_format() {
        let mutation = Mutation::DragEnd {
            active_id: "a".into(),
            over_id: "edge-before-b".into(),
        };
        let value = serde_json::to_value(&mutation).unwrap();
        assert_eq!(
            value,
            json!({ "action": "dragEnd", "activeId": "a", "overId": "edge-before-b" })
        );

        let parsed: Mutation = serde_json::from_value(json!({ "action": "paste" })).unwrap();
        assert_eq!(parsed, Mutation::Paste);
    }

    #[test]
    fn test_structural_classification() {
        assert!(Mutation::Paste.is_structural());
        assert!(Mutation::MoveSelected { delta: 1 }.is_structural());
        assert!(!Mutation::Copy.is_structural());
        assert!(!Mutation::Undo.is_structural());
    }
}
