//! Keyboard shortcuts for the block tree editor

use crate::Mutation;
use serde::{Deserialize, Serialize};

/// A key press as reported by the host surface
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KeyPress {
    pub key: String,
    #[serde(default)]
    pub ctrl: bool,
    #[serde(default)]
    pub meta: bool,
    #[serde(default)]
    pub shift: bool,
    #[serde(default)]
    pub alt: bool,
    /// Focus is inside a text input, textarea or contenteditable
    #[serde(default)]
    pub in_text_input: bool,
}

impl KeyPress {
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            ..Self::default()
        }
    }

    pub fn ctrl(mut self) -> Self {
        self.ctrl = true;
        self
    }

    pub fn meta(mut self) -> Self {
        self.meta = true;
        self
    }

    pub fn shift(mut self) -> Self {
        self.shift = true;
        self
    }

    pub fn alt(mut self) -> Self {
        self.alt = true;
        self
    }

    pub fn in_text_input(mut self) -> Self {
        self.in_text_input = true;
        self
    }

    fn command(&self) -> bool {
        self.ctrl || self.meta
    }
}

/// Map a key press to an editor action
///
/// Nothing fires while a text input has focus. Delete and backspace only
/// fire with a selection so they keep their default meaning otherwise.
pub fn shortcut_for(press: &KeyPress, has_selection: bool) -> Option<Mutation> {
    if press.in_text_input {
        return None;
    }

    let key = press.key.to_lowercase();

    if press.command() {
        return match (key.as_str(), press.shift) {
            ("z", false) => Some(Mutation::Undo),
            ("z", true) | ("y", _) => Some(Mutation::Redo),
            ("c", false) => Some(Mutation::Copy),
            ("c", true) => Some(Mutation::CopyStyle),
            ("v", false) => Some(Mutation::Paste),
            ("v", true) => Some(Mutation::PasteStyle),
            ("d", _) => Some(Mutation::Duplicate),
            _ => None,
        };
    }

    if press.alt {
        return match key.as_str() {
            "arrowup" => Some(Mutation::MoveSelected { delta: -1 }),
            "arrowdown" => Some(Mutation::MoveSelected { delta: 1 }),
            _ => None,
        };
    }

    match key.as_str() {
        "delete" | "backspace" if has_selection => Some(Mutation::DeleteSelected),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_history_shortcuts() {
        assert_eq!(shortcut_for(&KeyPress::new("z").ctrl(), false), Some(Mutation::Undo));
        assert_eq!(shortcut_for(&KeyPress::new("Z").meta().shift(), false), Some(Mutation::Redo));
        assert_eq!(shortcut_for(&KeyPress::new("y").ctrl(), false), Some(Mutation::Redo));
    }

    #[test]
    fn test_clipboard_shortcuts() {
        assert_eq!(shortcut_for(&KeyPress::new("c").ctrl(), true), Some(Mutation::Copy));
        assert_eq!(shortcut_for(&KeyPress::new("C").ctrl().shift(), true), Some(Mutation::CopyStyle));
        assert_eq!(shortcut_for(&KeyPress::new("v").meta(), true), Some(Mutation::Paste));
        assert_eq!(shortcut_for(&KeyPress::new("v").meta().shift(), true), Some(Mutation::PasteStyle));
        assert_eq!(shortcut_for(&KeyPress::new("d").ctrl(), true), Some(Mutation::Duplicate));
    }

    #[test]
    fn test_move_and_delete() {
        assert_eq!(
            shortcut_for(&KeyPress::new("ArrowUp").alt(), true),
            Some(Mutation::MoveSelected { delta: -1 })
        );
        assert_eq!(
            shortcut_for(&KeyPress::new("ArrowDown").alt(), true),
            Some(Mutation::MoveSelected { delta: 1 })
        );
        assert_eq!(shortcut_for(&KeyPress::new("Delete"), true), Some(Mutation::DeleteSelected));
        assert_eq!(shortcut_for(&KeyPress::new("Backspace"), false), None);
    }

    #[test]
    fn test_text_input_swallows_everything() {
        assert_eq!(shortcut_for(&KeyPress::new("z").ctrl().in_text_input(), true), None);
        assert_eq!(shortcut_for(&KeyPress::new("Delete").in_text_input(), true), None);
    }
}
