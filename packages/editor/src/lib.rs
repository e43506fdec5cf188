//! # Storefront Editor
//!
//! Interactive editing for the storefront visual builder.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │ host surface: clicks, drags, key presses    │
//! └─────────────────────────────────────────────┘
//!                     ↓ Mutation / KeyPress
//! ┌─────────────────────────────────────────────┐
//! │ EditSession: one block forest               │
//! │  - selection, clipboard, style clipboard    │
//! │  - snapshot undo/redo                       │
//! │  - drag/drop + edge-drop, auto-expand       │
//! │  - presets over a KeyValueStore             │
//! └─────────────────────────────────────────────┘
//!                     ↓ commit_blocks
//! ┌─────────────────────────────────────────────┐
//! │ VisualEditor: sections, theme, branding     │
//! │  - save / schedule / publish via layout     │
//! └─────────────────────────────────────────────┘
//!                     ↓ PreviewUpdate (debounced)
//! ┌─────────────────────────────────────────────┐
//! │ live preview                                │
//! └─────────────────────────────────────────────┘
//! ```
//!
//! ## Core Principles
//!
//! 1. **Pure tree, stateful session**: tree algorithms live in
//!    `storefront-blocks`; this crate owns selection and history
//! 2. **Stale input is ignored**: unresolved ids and illegal drops are
//!    no-ops, never errors
//! 3. **Full-state preview**: every update carries whole fields, so the
//!    latest one always wins
//!
//! ## Usage
//!
//! ```rust
//! use storefront_editor::{EditSession, MemoryKv, Mutation, PresetStore};
//! use storefront_blocks::IdGenerator;
//!
//! let presets = PresetStore::open(MemoryKv::new()).unwrap();
//! let raw = serde_json::json!([
//!     { "id": "a", "type": "text" },
//!     { "id": "b", "type": "container" },
//! ]);
//! let mut session = EditSession::from_json(&raw, presets, IdGenerator::new("docs"));
//!
//! let now = chrono::Utc::now();
//! let drop = Mutation::DragEnd { active_id: "a".into(), over_id: "drop-b".into() };
//! assert!(session.dispatch(drop, now).unwrap());
//! assert_eq!(session.tree()[0].children[0].id, "a");
//!
//! assert!(session.undo().unwrap());
//! assert_eq!(session.tree().len(), 2);
//! ```

mod clipboard;
pub mod drag_drop;
mod errors;
mod mutations;
mod page;
mod presets;
mod preview;
mod session;
mod shortcuts;
mod storage;
mod undo_stack;

pub use clipboard::Clipboard;
pub use drag_drop::{AutoExpand, DropTarget, MovePlan, AUTO_EXPAND_DELAY};
pub use errors::EditorError;
pub use mutations::Mutation;
pub use page::VisualEditor;
pub use presets::{Preset, PresetExport, PresetStore, PRESETS_KEY};
pub use preview::{PreviewDebouncer, PreviewMessage, PreviewSink, PreviewUpdate, SectionClick, PREVIEW_DEBOUNCE};
pub use session::EditSession;
pub use shortcuts::{shortcut_for, KeyPress};
pub use storage::{FileKv, KeyValueStore, MemoryKv};
pub use undo_stack::{HistoryEntry, UndoStack, DEFAULT_MAX_LEVELS};
