//! # Edit Session
//!
//! One user's editing state for a block forest: the tree, selection,
//! clipboards, undo history, presets and the expanded-container set.
//!
//! Every structural change goes through [`EditSession::commit`], which
//! normalizes the candidate tree, skips it when nothing changed and
//! otherwise records the previous tree for undo.
//!
//! Stale ids and illegal drops are ignored and reported as `Ok(false)`.
//! Errors are reserved for bad input (malformed JSON, unknown presets)
//! and storage failures.

use crate::clipboard::Clipboard;
use crate::drag_drop::{self, AutoExpand, DropTarget};
use crate::presets::PresetStore;
use crate::shortcuts::{shortcut_for, KeyPress};
use crate::storage::KeyValueStore;
use crate::undo_stack::UndoStack;
use crate::{EditorError, Mutation};
use chrono::{DateTime, Utc};
use serde::de::Error as _;
use serde_json::Value;
use std::collections::BTreeSet;
use std::time::{Duration, Instant};
use storefront_blocks::tree::{self, DropPosition};
use storefront_blocks::{
    analyze_performance, create_node, filter_outline, flatten, normalize_nodes, normalize_tree, BlockNode, IdGenerator,
    OutlineItem, PerformanceReport, Props, Zone,
};
use tracing::{debug, info};

fn snapshot(tree: &[BlockNode]) -> Result<String, EditorError> {
    Ok(serde_json::to_string(tree)?)
}

pub struct EditSession<S: KeyValueStore> {
    tree: Vec<BlockNode>,
    selected: Option<String>,
    clipboard: Clipboard,
    history: UndoStack,
    presets: PresetStore<S>,
    ids: IdGenerator,
    expanded: BTreeSet<String>,
    auto_expand: AutoExpand,
}

impl<S: KeyValueStore> EditSession<S> {
    pub fn new(tree: Vec<BlockNode>, presets: PresetStore<S>) -> Self {
        Self::with_ids(tree, presets, IdGenerator::session())
    }

    pub fn with_ids(tree: Vec<BlockNode>, presets: PresetStore<S>, mut ids: IdGenerator) -> Self {
        let tree = normalize_nodes(&tree, &mut ids);
        let mut session = Self {
            tree,
            selected: None,
            clipboard: Clipboard::new(),
            history: UndoStack::new(),
            presets,
            ids,
            expanded: BTreeSet::new(),
            auto_expand: AutoExpand::default(),
        };
        session.expand_containers();
        session
    }

    /// Session over a raw (possibly malformed) JSON forest
    pub fn from_json(raw: &Value, presets: PresetStore<S>, mut ids: IdGenerator) -> Self {
        let tree = normalize_tree(raw, &mut ids);
        Self::with_ids(tree, presets, ids)
    }

    pub fn with_history_limit(mut self, max_levels: usize) -> Self {
        self.history = UndoStack::with_max_levels(max_levels);
        self
    }

    pub fn with_auto_expand_delay(mut self, delay: Duration) -> Self {
        self.auto_expand = AutoExpand::new(delay);
        self
    }

    pub fn tree(&self) -> &[BlockNode] {
        &self.tree
    }

    pub fn into_tree(self) -> Vec<BlockNode> {
        self.tree
    }

    pub fn history(&self) -> &UndoStack {
        &self.history
    }

    pub fn clipboard(&self) -> &Clipboard {
        &self.clipboard
    }

    pub fn presets(&self) -> &PresetStore<S> {
        &self.presets
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    // Selection

    pub fn selected(&self) -> Option<&str> {
        self.selected.as_deref()
    }

    pub fn selected_node(&self) -> Option<&BlockNode> {
        self.selected
            .as_deref()
            .and_then(|id| tree::find_node_by_id(&self.tree, id))
    }

    fn selected_path(&self) -> Option<Vec<usize>> {
        self.selected
            .as_deref()
            .and_then(|id| tree::find_path_by_id(&self.tree, id))
    }

    /// Select a node by id, or clear with `None`; unknown ids are ignored
    pub fn select(&mut self, id: Option<&str>) -> bool {
        match id {
            None => {
                self.selected = None;
                true
            }
            Some(id) if tree::find_path_by_id(&self.tree, id).is_some() => {
                self.selected = Some(id.to_string());
                true
            }
            Some(id) => {
                debug!(id, "ignoring selection of unknown node");
                false
            }
        }
    }

    // Commit and history

    fn expand_containers(&mut self) {
        let expanded = &mut self.expanded;
        tree::walk(&self.tree, &mut |node| {
            if node.is_container() {
                expanded.insert(node.id.clone());
            }
        });
    }

    /// Replace the tree with a normalized `next`, recording history
    ///
    /// Returns `false` when `next` is identical to the current tree.
    pub fn commit(&mut self, next: Vec<BlockNode>, description: &str) -> Result<bool, EditorError> {
        let next = normalize_nodes(&next, &mut self.ids);
        let before = snapshot(&self.tree)?;
        if before == snapshot(&next)? {
            debug!(description, "skipping unchanged commit");
            return Ok(false);
        }

        self.history.record(before, Some(description));
        self.tree = next;
        self.expand_containers();
        debug!(description, undo_levels = self.history.undo_levels(), "committed");
        Ok(true)
    }

    pub fn undo(&mut self) -> Result<bool, EditorError> {
        let current = snapshot(&self.tree)?;
        let reverting = self.history.undo_description().unwrap_or_default().to_string();
        let Some(previous) = self.history.undo(current) else {
            debug!("nothing to undo");
            return Ok(false);
        };
        self.tree = serde_json::from_str(&previous)?;
        self.expand_containers();
        info!(action = %reverting, undo_levels = self.history.undo_levels(), "undo");
        Ok(true)
    }

    pub fn redo(&mut self) -> Result<bool, EditorError> {
        let current = snapshot(&self.tree)?;
        let reapplying = self.history.redo_description().unwrap_or_default().to_string();
        let Some(next) = self.history.redo(current) else {
            debug!("nothing to redo");
            return Ok(false);
        };
        self.tree = serde_json::from_str(&next)?;
        self.expand_containers();
        info!(action = %reapplying, redo_levels = self.history.redo_levels(), "redo");
        Ok(true)
    }

    // Clipboard

    pub fn copy(&mut self) -> bool {
        let Some(node) = self.selected_node().cloned() else {
            return false;
        };
        self.clipboard.copy(&node);
        true
    }

    /// Insert a fresh-id copy of the clipboard after the selection, or at
    /// root without one, and select it
    pub fn paste(&mut self) -> Result<bool, EditorError> {
        let Some(node) = self.clipboard.paste(&mut self.ids) else {
            return Ok(false);
        };
        let id = node.id.clone();

        let next = match self.selected_path() {
            Some(path) => self.insert_after(&path, node),
            None => {
                let mut next = self.tree.clone();
                next.push(node);
                next
            }
        };

        let changed = self.commit(next, "Paste")?;
        if changed {
            self.selected = Some(id);
        }
        Ok(changed)
    }

    fn insert_after(&self, path: &[usize], node: BlockNode) -> Vec<BlockNode> {
        match path.split_last() {
            Some((index, parent)) => tree::insert_at(&self.tree, parent, index + 1, node),
            None => self.tree.clone(),
        }
    }

    pub fn copy_style(&mut self) -> bool {
        let Some(props) = self.selected_node().map(|node| node.props.clone()) else {
            return false;
        };
        self.clipboard.copy_style(&props)
    }

    pub fn paste_style(&mut self) -> Result<bool, EditorError> {
        let Some(path) = self.selected_path() else {
            return Ok(false);
        };
        let Some(payload) = self.clipboard.style().cloned() else {
            return Ok(false);
        };

        let next = tree::update_at_path(&self.tree, &path, |mut node| {
            node.props = storefront_blocks::apply_style_payload(&node.props, &payload);
            node
        });
        self.commit(next, "Paste style")
    }

    // Structure

    /// Clone the selection with fresh ids right after it and select the copy
    pub fn duplicate(&mut self) -> Result<bool, EditorError> {
        let Some(path) = self.selected_path() else {
            return Ok(false);
        };
        let Some(source) = tree::node_at_path(&self.tree, &path) else {
            return Ok(false);
        };

        let copy = tree::clone_with_new_ids(source, &mut self.ids);
        let id = copy.id.clone();
        let next = self.insert_after(&path, copy);

        let changed = self.commit(next, "Duplicate")?;
        if changed {
            self.selected = Some(id);
        }
        Ok(changed)
    }

    pub fn delete_selected(&mut self) -> Result<bool, EditorError> {
        let Some(path) = self.selected_path() else {
            return Ok(false);
        };
        let next = tree::remove_at_path(&self.tree, &path);
        let changed = self.commit(next, "Delete")?;
        if changed {
            self.selected = None;
        }
        Ok(changed)
    }

    pub fn move_selected(&mut self, delta: isize) -> Result<bool, EditorError> {
        let Some(path) = self.selected_path() else {
            return Ok(false);
        };
        let next = tree::move_by_delta(&self.tree, &path, delta);
        self.commit(next, "Move")
    }

    /// Move `id` next to or into another node
    pub fn move_node(&mut self, id: &str, target_id: &str, position: DropPosition) -> Result<bool, EditorError> {
        let (Some(source), Some(target)) = (
            tree::find_path_by_id(&self.tree, id),
            tree::find_path_by_id(&self.tree, target_id),
        ) else {
            return Ok(false);
        };
        let next = tree::extract_and_reinsert(&self.tree, &source, &target, position);
        self.commit(next, "Move")
    }

    /// Pointer drag of an existing node ended over `over_id`
    pub fn drag_end(&mut self, active_id: &str, over_id: &str) -> Result<bool, EditorError> {
        self.auto_expand.cancel();
        let next = drag_drop::apply_drag_end(&self.tree, active_id, over_id);
        self.commit(next, "Drag")
    }

    /// A palette widget of `block_type` was dropped over `over_id`
    pub fn external_drop(&mut self, block_type: &str, over_id: Option<&str>) -> Result<Option<String>, EditorError> {
        self.auto_expand.cancel();
        let node = create_node(block_type, &mut self.ids);
        let id = node.id.clone();
        let over = over_id.map(DropTarget::decode);
        let next = drag_drop::insert_at_target(&self.tree, over.as_ref(), node);
        self.commit_new(next, id, "Drop widget")
    }

    pub fn add_top_level(&mut self, block_type: &str, zone: Zone) -> Result<Option<String>, EditorError> {
        let node = create_node(block_type, &mut self.ids).with_zone(zone);
        let id = node.id.clone();
        let mut next = self.tree.clone();
        next.push(node);
        self.commit_new(next, id, "Add block")
    }

    pub fn add_child(&mut self, parent_id: &str, block_type: &str) -> Result<Option<String>, EditorError> {
        let Some(path) = tree::find_path_by_id(&self.tree, parent_id) else {
            return Ok(None);
        };
        let (next, created) = tree::add_child(&self.tree, &path, block_type, &mut self.ids);
        match created {
            Some(id) => self.commit_new(next, id, "Add child"),
            None => Ok(None),
        }
    }

    fn commit_new(&mut self, next: Vec<BlockNode>, id: String, description: &str) -> Result<Option<String>, EditorError> {
        if !self.commit(next, description)? {
            return Ok(None);
        }
        self.selected = Some(id.clone());
        Ok(Some(id))
    }

    // Props

    fn update_node<F>(&mut self, id: &str, description: &str, updater: F) -> Result<bool, EditorError>
    where
        F: FnOnce(BlockNode) -> BlockNode,
    {
        let Some(path) = tree::find_path_by_id(&self.tree, id) else {
            debug!(id, "ignoring edit of unknown node");
            return Ok(false);
        };
        let next = tree::update_at_path(&self.tree, &path, updater);
        self.commit(next, description)
    }

    pub fn set_prop(&mut self, id: &str, key: &str, value: Value) -> Result<bool, EditorError> {
        self.update_node(id, "Edit prop", |node| node.with_prop(key, value))
    }

    /// Replace a node's props from JSON text; anything but an object is
    /// rejected and the tree is left as is
    pub fn set_raw_props(&mut self, id: &str, json: &str) -> Result<bool, EditorError> {
        let props: Props = match serde_json::from_str(json)? {
            Value::Object(map) => map,
            _ => return Err(serde_json::Error::custom("props must be a JSON object").into()),
        };
        self.update_node(id, "Edit props JSON", |mut node| {
            node.props = props;
            node
        })
    }

    pub fn set_zone(&mut self, id: &str, zone: Zone) -> Result<bool, EditorError> {
        self.update_node(id, "Change zone", |node| node.with_zone(zone))
    }

    // Presets

    /// Save the selected subtree as a preset; returns the stored name
    pub fn save_preset(&mut self, name: &str, now: DateTime<Utc>) -> Result<Option<String>, EditorError> {
        let Some(node) = self.selected_node().cloned() else {
            return Ok(None);
        };
        self.presets.save(name, &node, now).map(Some)
    }

    /// Append a fresh-id copy of a preset at root and select it
    pub fn insert_preset(&mut self, name: &str) -> Result<Option<String>, EditorError> {
        let preset = self
            .presets
            .get(name)
            .ok_or_else(|| EditorError::PresetNotFound(name.to_string()))?;
        let node = tree::clone_with_new_ids(&preset.node, &mut self.ids);
        let id = node.id.clone();

        let mut next = self.tree.clone();
        next.push(node);
        self.commit_new(next, id, "Insert preset")
    }

    pub fn export_presets(&self, now: DateTime<Utc>) -> Result<String, EditorError> {
        self.presets.export(now)
    }

    pub fn import_presets(&mut self, json: &str, now: DateTime<Utc>) -> Result<usize, EditorError> {
        self.presets.import(json, now)
    }

    // Dispatch

    /// Apply one action; returns whether anything changed
    pub fn dispatch(&mut self, mutation: Mutation, now: DateTime<Utc>) -> Result<bool, EditorError> {
        let description = mutation.description();
        let structural = mutation.is_structural();
        let changed = self.apply(mutation, now)?;
        if structural && !changed {
            debug!(action = description, "action left the tree unchanged");
        }
        Ok(changed)
    }

    fn apply(&mut self, mutation: Mutation, now: DateTime<Utc>) -> Result<bool, EditorError> {
        match mutation {
            Mutation::Select { id } => Ok(self.select(id.as_deref())),
            Mutation::Copy => Ok(self.copy()),
            Mutation::Paste => self.paste(),
            Mutation::CopyStyle => Ok(self.copy_style()),
            Mutation::PasteStyle => self.paste_style(),
            Mutation::Duplicate => self.duplicate(),
            Mutation::DeleteSelected => self.delete_selected(),
            Mutation::MoveSelected { delta } => self.move_selected(delta),
            Mutation::Undo => self.undo(),
            Mutation::Redo => self.redo(),
            Mutation::DragEnd { active_id, over_id } => self.drag_end(&active_id, &over_id),
            Mutation::ExternalDrop { block_type, over_id } => {
                Ok(self.external_drop(&block_type, over_id.as_deref())?.is_some())
            }
            Mutation::AddTopLevel { block_type, zone } => Ok(self.add_top_level(&block_type, zone)?.is_some()),
            Mutation::AddChild { parent_id, block_type } => Ok(self.add_child(&parent_id, &block_type)?.is_some()),
            Mutation::SetProp { id, key, value } => self.set_prop(&id, &key, value),
            Mutation::SetRawProps { id, json } => self.set_raw_props(&id, &json),
            Mutation::SetZone { id, zone } => self.set_zone(&id, zone),
            Mutation::SavePreset { name } => Ok(self.save_preset(&name, now)?.is_some()),
            Mutation::InsertPreset { name } => Ok(self.insert_preset(&name)?.is_some()),
        }
    }

    /// Run the shortcut bound to `press`, if any
    pub fn handle_key(&mut self, press: &KeyPress, now: DateTime<Utc>) -> Result<bool, EditorError> {
        match shortcut_for(press, self.selected.is_some()) {
            Some(mutation) => {
                debug!(key = %press.key, action = mutation.description(), "shortcut");
                self.dispatch(mutation, now)
            }
            None => Ok(false),
        }
    }

    // Views

    pub fn outline(&self) -> Vec<OutlineItem> {
        flatten(&self.tree)
    }

    pub fn search(&self, query: &str) -> Vec<OutlineItem> {
        let items = self.outline();
        filter_outline(&items, query).into_iter().cloned().collect()
    }

    pub fn performance(&self) -> PerformanceReport {
        analyze_performance(&self.tree)
    }

    // Expansion

    pub fn is_expanded(&self, id: &str) -> bool {
        self.expanded.contains(id)
    }

    pub fn toggle_expanded(&mut self, id: &str) {
        if !self.expanded.remove(id) {
            self.expanded.insert(id.to_string());
        }
    }

    /// Drag pointer entered the child-drop zone of `id`
    pub fn hover_child_drop(&mut self, id: &str, now: Instant) {
        self.auto_expand.enter(id, now);
    }

    pub fn leave_child_drop(&mut self, id: &str) {
        self.auto_expand.leave(id);
    }

    /// Expand the hovered container once its dwell has elapsed
    pub fn poll_auto_expand(&mut self, now: Instant) -> Option<String> {
        let id = self.auto_expand.poll(now)?;
        debug!(id = %id, "auto-expanding");
        self.expanded.insert(id.clone());
        Some(id)
    }
}
