//! # Drag and Drop
//!
//! Turns pointer drop events into tree moves.
//!
//! Every node exposes two kinds of drop zone besides itself:
//!
//! ```text
//! edge-before-<id>   insert as the sibling before <id>
//! edge-after-<id>    insert as the sibling after <id>
//! drop-<id>          insert as the last child of <id>
//! <id>               plain sortable target
//! ```
//!
//! A plain target within the same parent reorders (after when moving
//! down, before when moving up); across parents it inserts before.
//! Containers hovered through their child-drop zone open after a short
//! dwell, tracked by [`AutoExpand`].

use std::time::{Duration, Instant};
use storefront_blocks::tree::{self, DropPosition};
use storefront_blocks::BlockNode;
use tracing::debug;

const EDGE_BEFORE_PREFIX: &str = "edge-before-";
const EDGE_AFTER_PREFIX: &str = "edge-after-";
const CHILD_DROP_PREFIX: &str = "drop-";

/// Hover time before a container opens during a drag
pub const AUTO_EXPAND_DELAY: Duration = Duration::from_millis(280);

/// Decoded `over` id of a drop event
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DropTarget {
    Edge { id: String, position: DropPosition },
    Inside { id: String },
    Node { id: String },
}

impl DropTarget {
    pub fn decode(over_id: &str) -> Self {
        if let Some(id) = over_id.strip_prefix(EDGE_BEFORE_PREFIX) {
            return DropTarget::Edge {
                id: id.to_string(),
                position: DropPosition::Before,
            };
        }
        if let Some(id) = over_id.strip_prefix(EDGE_AFTER_PREFIX) {
            return DropTarget::Edge {
                id: id.to_string(),
                position: DropPosition::After,
            };
        }
        if let Some(id) = over_id.strip_prefix(CHILD_DROP_PREFIX) {
            return DropTarget::Inside { id: id.to_string() };
        }
        DropTarget::Node {
            id: over_id.to_string(),
        }
    }

    pub fn encode(&self) -> String {
        match self {
            DropTarget::Edge {
                id,
                position: DropPosition::Before,
            } => format!("{}{}", EDGE_BEFORE_PREFIX, id),
            DropTarget::Edge {
                id,
                position: DropPosition::After,
            } => format!("{}{}", EDGE_AFTER_PREFIX, id),
            DropTarget::Edge {
                id,
                position: DropPosition::Inside,
            }
            | DropTarget::Inside { id } => format!("{}{}", CHILD_DROP_PREFIX, id),
            DropTarget::Node { id } => id.clone(),
        }
    }

    pub fn id(&self) -> &str {
        match self {
            DropTarget::Edge { id, .. } | DropTarget::Inside { id } | DropTarget::Node { id } => id,
        }
    }
}

/// Resolved arguments for [`tree::extract_and_reinsert`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MovePlan {
    pub source: Vec<usize>,
    pub target: Vec<usize>,
    pub position: DropPosition,
}

/// Resolve a drag of `active_id` onto `over`; `None` means ignore the drop
pub fn plan_move(tree: &[BlockNode], active_id: &str, over: &DropTarget) -> Option<MovePlan> {
    if over.id() == active_id {
        return None;
    }
    let source = tree::find_path_by_id(tree, active_id)?;
    let target = tree::find_path_by_id(tree, over.id())?;
    if source == target {
        return None;
    }

    let position = match over {
        DropTarget::Edge { position, .. } => *position,
        DropTarget::Inside { .. } => DropPosition::Inside,
        DropTarget::Node { .. } => {
            let same_parent = source[..source.len() - 1] == target[..target.len() - 1];
            if same_parent && source.last() < target.last() {
                DropPosition::After
            } else {
                DropPosition::Before
            }
        }
    };

    Some(MovePlan {
        source,
        target,
        position,
    })
}

/// Move an existing node per a drop event
pub fn apply_drag_end(tree: &[BlockNode], active_id: &str, over_id: &str) -> Vec<BlockNode> {
    let over = DropTarget::decode(over_id);
    match plan_move(tree, active_id, &over) {
        Some(plan) => tree::extract_and_reinsert(tree, &plan.source, &plan.target, plan.position),
        None => {
            debug!(active_id, over_id, "drop ignored");
            tree.to_vec()
        }
    }
}

/// Insert a new node relative to a drop target
///
/// Without a target, or with one that no longer resolves, the node is
/// appended at root. A plain node target inserts after it.
pub fn insert_at_target(tree: &[BlockNode], over: Option<&DropTarget>, node: BlockNode) -> Vec<BlockNode> {
    let resolved = over.and_then(|target| Some((target, tree::find_path_by_id(tree, target.id())?)));
    let Some((target, path)) = resolved else {
        let mut next = tree.to_vec();
        next.push(node);
        return next;
    };

    let position = match target {
        DropTarget::Edge { position, .. } => *position,
        DropTarget::Inside { .. } => DropPosition::Inside,
        DropTarget::Node { .. } => DropPosition::After,
    };

    match (position, path.split_last()) {
        (DropPosition::Inside, _) => tree::append_child(tree, &path, node),
        (DropPosition::Before, Some((index, parent))) => tree::insert_at(tree, parent, *index, node),
        (DropPosition::After, Some((index, parent))) => tree::insert_at(tree, parent, index + 1, node),
        (_, None) => tree.to_vec(),
    }
}

/// Dwell timer that opens a container hovered during a drag
#[derive(Debug, Clone)]
pub struct AutoExpand {
    delay: Duration,
    pending: Option<(String, Instant)>,
}

impl AutoExpand {
    pub fn new(delay: Duration) -> Self {
        Self { delay, pending: None }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Pointer entered the child-drop zone of `id`
    pub fn enter(&mut self, id: &str, now: Instant) {
        match &self.pending {
            Some((current, _)) if current == id => {}
            _ => self.pending = Some((id.to_string(), now)),
        }
    }

    /// Pointer left the child-drop zone of `id`
    pub fn leave(&mut self, id: &str) {
        if matches!(&self.pending, Some((current, _)) if current == id) {
            self.pending = None;
        }
    }

    pub fn cancel(&mut self) {
        self.pending = None;
    }

    /// Id to expand once the dwell has elapsed; fires at most once per hover
    pub fn poll(&mut self, now: Instant) -> Option<String> {
        let (_, since) = self.pending.as_ref()?;
        if now.saturating_duration_since(*since) < self.delay {
            return None;
        }
        self.pending.take().map(|(id, _)| id)
    }
}

impl Default for AutoExpand {
    fn default() -> Self {
        Self::new(AUTO_EXPAND_DELAY)
    }
}
