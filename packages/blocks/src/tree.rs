//! # Tree Algorithms
//!
//! Pure, path-addressed operations on a block forest.
//!
//! A path is the list of child indices from the root list down to a node:
//! `[2, 0, 1]` is the second child of the first child of the third root.
//!
//! ## Semantics
//!
//! ### Lookups
//! - Return `None` when any index along the path is out of range
//!
//! ### Updates
//! - Take the forest by reference and return a new forest
//! - The empty path addresses the forest itself
//! - An unresolved path returns an unchanged copy (no error)
//!
//! ### Moves
//! - The source must not be an ancestor of (or equal to) the target
//! - The target is re-resolved by id after the source is extracted, since
//!   sibling indices shift on removal
//! - Any failed step leaves the forest unchanged

use crate::{create_node, BlockNode, BlockType, IdGenerator};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Where to put a node relative to a drop target
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DropPosition {
    Before,
    After,
    Inside,
}

/// Node at `path`, if it resolves
pub fn node_at_path<'a>(tree: &'a [BlockNode], path: &[usize]) -> Option<&'a BlockNode> {
    let (first, rest) = path.split_first()?;
    let mut node = tree.get(*first)?;
    for index in rest {
        node = node.children.get(*index)?;
    }
    Some(node)
}

/// Children of the node at `parent_path`; the empty path is the root list
pub fn children_at_path<'a>(tree: &'a [BlockNode], parent_path: &[usize]) -> Option<&'a [BlockNode]> {
    if parent_path.is_empty() {
        return Some(tree);
    }
    node_at_path(tree, parent_path).map(|node| node.children.as_slice())
}

fn node_at_path_mut<'a>(tree: &'a mut [BlockNode], path: &[usize]) -> Option<&'a mut BlockNode> {
    let (first, rest) = path.split_first()?;
    let mut node = tree.get_mut(*first)?;
    for index in rest {
        node = node.children.get_mut(*index)?;
    }
    Some(node)
}

fn children_at_path_mut<'a>(
    tree: &'a mut Vec<BlockNode>,
    parent_path: &[usize],
) -> Option<&'a mut Vec<BlockNode>> {
    if parent_path.is_empty() {
        return Some(tree);
    }
    node_at_path_mut(tree, parent_path).map(|node| &mut node.children)
}

/// Id of the synthetic container that stands in for the forest
pub const FOREST_ROOT_ID: &str = "__forest__";

/// Replace the node at `path` with `updater(node)`
///
/// With the empty path the updater receives the whole forest as the
/// children of a synthetic [`FOREST_ROOT_ID`] container, and the children
/// it returns become the new forest. Anything else set on that container
/// is discarded.
pub fn update_at_path<F>(tree: &[BlockNode], path: &[usize], updater: F) -> Vec<BlockNode>
where
    F: FnOnce(BlockNode) -> BlockNode,
{
    if path.is_empty() {
        let root = BlockNode::new(FOREST_ROOT_ID, BlockType::Container).with_children(tree.to_vec());
        return updater(root).children;
    }

    let mut next = tree.to_vec();
    if let Some(node) = node_at_path_mut(&mut next, path) {
        *node = updater(node.clone());
    }
    next
}

/// Replace the child list under `parent_path` with `updater(children)`
pub fn update_children_at_path<F>(tree: &[BlockNode], parent_path: &[usize], updater: F) -> Vec<BlockNode>
where
    F: FnOnce(Vec<BlockNode>) -> Vec<BlockNode>,
{
    let mut next = tree.to_vec();
    if let Some(children) = children_at_path_mut(&mut next, parent_path) {
        let current = std::mem::take(children);
        *children = updater(current);
    }
    next
}

/// Remove the node at `path` and return it with the remaining forest
pub fn extract_at_path(tree: &[BlockNode], path: &[usize]) -> Option<(BlockNode, Vec<BlockNode>)> {
    let (index, parent_path) = path.split_last()?;
    let mut next = tree.to_vec();
    let siblings = children_at_path_mut(&mut next, parent_path)?;
    if *index >= siblings.len() {
        return None;
    }
    let node = siblings.remove(*index);
    Some((node, next))
}

/// Excise the node at `path` from its parent
pub fn remove_at_path(tree: &[BlockNode], path: &[usize]) -> Vec<BlockNode> {
    extract_at_path(tree, path)
        .map(|(_, rest)| rest)
        .unwrap_or_else(|| tree.to_vec())
}

/// Insert `node` into the child list at `parent_path`, clamping `index`
pub fn insert_at(tree: &[BlockNode], parent_path: &[usize], index: usize, node: BlockNode) -> Vec<BlockNode> {
    update_children_at_path(tree, parent_path, |mut children| {
        let at = index.min(children.len());
        children.insert(at, node);
        children
    })
}

/// Depth-first pre-order search for a node id
pub fn find_path_by_id(tree: &[BlockNode], id: &str) -> Option<Vec<usize>> {
    for (index, node) in tree.iter().enumerate() {
        if node.id == id {
            return Some(vec![index]);
        }
        if let Some(mut nested) = find_path_by_id(&node.children, id) {
            nested.insert(0, index);
            return Some(nested);
        }
    }
    None
}

pub fn find_node_by_id<'a>(tree: &'a [BlockNode], id: &str) -> Option<&'a BlockNode> {
    find_path_by_id(tree, id).and_then(|path| node_at_path(tree, &path))
}

/// True if `ancestor` is a prefix of `descendant` (equal paths included)
pub fn is_ancestor_path(ancestor: &[usize], descendant: &[usize]) -> bool {
    ancestor.len() <= descendant.len() && descendant.starts_with(ancestor)
}

/// Move the node at `source` next to, or into, the node at `target`
pub fn extract_and_reinsert(
    tree: &[BlockNode],
    source: &[usize],
    target: &[usize],
    position: DropPosition,
) -> Vec<BlockNode> {
    if is_ancestor_path(source, target) {
        debug!(?source, ?target, "ignoring move into own subtree");
        return tree.to_vec();
    }

    let Some(target_id) = node_at_path(tree, target).map(|node| node.id.clone()) else {
        debug!(?target, "ignoring move to unresolved target");
        return tree.to_vec();
    };

    let Some((node, remaining)) = extract_at_path(tree, source) else {
        debug!(?source, "ignoring move of unresolved source");
        return tree.to_vec();
    };

    let Some(target_path) = find_path_by_id(&remaining, &target_id) else {
        return tree.to_vec();
    };

    match position {
        DropPosition::Before | DropPosition::After => {
            let Some((index, parent_path)) = target_path.split_last() else {
                return tree.to_vec();
            };
            let at = if position == DropPosition::After { index + 1 } else { *index };
            insert_at(&remaining, parent_path, at, node)
        }
        DropPosition::Inside => append_child(&remaining, &target_path, node),
    }
}

/// Append `child` to the node at `path`, turning a leaf into a container
pub fn append_child(tree: &[BlockNode], path: &[usize], child: BlockNode) -> Vec<BlockNode> {
    update_at_path(tree, path, |mut parent| {
        if !parent.kind.is_container() {
            parent.kind = BlockType::Container;
        }
        parent.children.push(child);
        parent
    })
}

/// Create a node of `kind` and append it under the node at `path`
///
/// Returns the new forest and the id of the created node.
pub fn add_child(tree: &[BlockNode], path: &[usize], kind: &str, ids: &mut IdGenerator) -> (Vec<BlockNode>, Option<String>) {
    if node_at_path(tree, path).is_none() {
        return (tree.to_vec(), None);
    }
    let child = create_node(kind, ids);
    let id = child.id.clone();
    (append_child(tree, path, child), Some(id))
}

/// Move an item within one sibling list (remove, then insert at `to`)
pub fn reorder_siblings(list: &[BlockNode], from: usize, to: usize) -> Vec<BlockNode> {
    let mut next = list.to_vec();
    if from == to || from >= next.len() || to >= next.len() {
        return next;
    }
    let moved = next.remove(from);
    next.insert(to, moved);
    next
}

/// Shift the node at `path` by `delta` places among its siblings, clamped
pub fn move_by_delta(tree: &[BlockNode], path: &[usize], delta: isize) -> Vec<BlockNode> {
    let Some((index, parent_path)) = path.split_last() else {
        return tree.to_vec();
    };
    let Some(siblings) = children_at_path(tree, parent_path) else {
        return tree.to_vec();
    };
    if *index >= siblings.len() {
        return tree.to_vec();
    }

    let last = siblings.len() as isize - 1;
    let target = (*index as isize + delta).clamp(0, last) as usize;
    if target == *index {
        return tree.to_vec();
    }

    let reordered = reorder_siblings(siblings, *index, target);
    update_children_at_path(tree, parent_path, |_| reordered)
}

/// Deep copy that mints a fresh id for the node and every descendant
pub fn clone_with_new_ids(node: &BlockNode, ids: &mut IdGenerator) -> BlockNode {
    BlockNode {
        id: ids.new_id(),
        kind: node.kind,
        zone: node.zone,
        props: node.props.clone(),
        children: node
            .children
            .iter()
            .map(|child| clone_with_new_ids(child, ids))
            .collect(),
    }
}

/// All ids in depth-first pre-order
pub fn collect_ids(tree: &[BlockNode]) -> Vec<String> {
    let mut ids = Vec::new();
    walk(tree, &mut |node| ids.push(node.id.clone()));
    ids
}

/// Visit every node in depth-first pre-order
pub fn walk<F>(tree: &[BlockNode], visit: &mut F)
where
    F: FnMut(&BlockNode),
{
    for node in tree {
        visit(node);
        walk(&node.children, visit);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn leaf(id: &str) -> BlockNode {
        BlockNode::new(id, BlockType::Text)
    }

    fn container(id: &str, children: Vec<BlockNode>) -> BlockNode {
        BlockNode::new(id, BlockType::Container).with_children(children)
    }

    fn ids_of(tree: &[BlockNode]) -> Vec<&str> {
        tree.iter().map(|node| node.id.as_str()).collect()
    }

    /// [R(children:[X, Y(children:[Z])]), S]
    fn sample() -> Vec<BlockNode> {
        vec![
            container("R", vec![leaf("X"), container("Y", vec![leaf("Z")])]),
            leaf("S"),
        ]
    }

    #[test]
    fn test_node_at_path() {
        let tree = sample();
        assert_eq!(node_at_path(&tree, &[0, 1, 0]).unwrap().id, "Z");
        assert!(node_at_path(&tree, &[0, 5]).is_none());
        assert!(node_at_path(&tree, &[]).is_none());
    }

    #[test]
    fn test_update_at_path_is_pure() {
        let tree = sample();
        let next = update_at_path(&tree, &[1], |node| node.with_prop("text", "Changed".into()));

        assert_eq!(next[1].props["text"], "Changed");
        assert_eq!(tree[1].props["text"], "Text block");
    }

    #[test]
    fn test_update_at_empty_path_updates_forest() {
        let tree = sample();

        let reversed = update_at_path(&tree, &[], |mut root| {
            assert_eq!(root.id, FOREST_ROOT_ID);
            root.children.reverse();
            root
        });
        assert_eq!(ids_of(&reversed), vec!["S", "R"]);

        let grown = update_at_path(&tree, &[], |root| {
            let mut children = root.children.clone();
            children.push(BlockNode::new("N", BlockType::Text));
            root.with_prop("ignored", true.into()).with_children(children)
        });
        assert_eq!(ids_of(&grown), vec!["R", "S", "N"]);
        assert_eq!(ids_of(&tree), vec!["R", "S"]);
    }

    #[test]
    fn test_update_children_at_root() {
        let tree = sample();
        let next = update_children_at_path(&tree, &[], |mut roots| {
            roots.reverse();
            roots
        });
        assert_eq!(ids_of(&next), vec!["S", "R"]);
    }

    #[test]
    fn test_remove_at_path() {
        let tree = sample();
        let next = remove_at_path(&tree, &[0, 1]);
        assert_eq!(ids_of(&next[0].children), vec!["X"]);

        let roots = remove_at_path(&tree, &[0]);
        assert_eq!(ids_of(&roots), vec!["S"]);

        assert_eq!(remove_at_path(&tree, &[9]), tree);
    }

    #[test]
    fn test_find_path_by_id() {
        let tree = sample();
        assert_eq!(find_path_by_id(&tree, "Z"), Some(vec![0, 1, 0]));
        assert_eq!(find_path_by_id(&tree, "S"), Some(vec![1]));
        assert_eq!(find_path_by_id(&tree, "missing"), None);
    }

    #[test]
    fn test_is_ancestor_path() {
        assert!(is_ancestor_path(&[0], &[0, 1, 0]));
        assert!(is_ancestor_path(&[0, 1], &[0, 1]));
        assert!(!is_ancestor_path(&[0, 1], &[0]));
        assert!(!is_ancestor_path(&[1], &[0, 1]));
    }

    #[test]
    fn test_reparent_inside() {
        let tree = vec![container("A", vec![]), container("B", vec![])];
        let next = extract_and_reinsert(&tree, &[0], &[1], DropPosition::Inside);

        assert_eq!(ids_of(&next), vec!["B"]);
        assert_eq!(ids_of(&next[0].children), vec!["A"]);
    }

    #[test]
    fn test_sibling_insert_before() {
        let tree = vec![leaf("A"), leaf("B"), leaf("C")];
        let next = extract_and_reinsert(&tree, &[2], &[0], DropPosition::Before);
        assert_eq!(ids_of(&next), vec!["C", "A", "B"]);
    }

    #[test]
    fn test_sibling_insert_after_with_index_shift() {
        let tree = vec![leaf("A"), leaf("B"), leaf("C")];
        let next = extract_and_reinsert(&tree, &[0], &[2], DropPosition::After);
        assert_eq!(ids_of(&next), vec!["B", "C", "A"]);
    }

    #[test]
    fn test_cross_parent_move() {
        let tree = sample();
        let next = extract_and_reinsert(&tree, &[1], &[0, 1, 0], DropPosition::Before);

        assert_eq!(ids_of(&next), vec!["R"]);
        assert_eq!(ids_of(&next[0].children[1].children), vec!["S", "Z"]);
    }

    #[test]
    fn test_move_into_descendant_is_noop() {
        let tree = sample();
        for target in [vec![0], vec![0, 0], vec![0, 1], vec![0, 1, 0]] {
            for position in [DropPosition::Before, DropPosition::After, DropPosition::Inside] {
                assert_eq!(extract_and_reinsert(&tree, &[0], &target, position), tree);
            }
        }
    }

    #[test]
    fn test_unresolved_paths_are_noops() {
        let tree = sample();
        assert_eq!(extract_and_reinsert(&tree, &[7], &[1], DropPosition::Before), tree);
        assert_eq!(extract_and_reinsert(&tree, &[1], &[0, 9], DropPosition::Inside), tree);
    }

    #[test]
    fn test_inside_coerces_leaf_to_container() {
        let tree = vec![leaf("A"), leaf("B")];
        let next = extract_and_reinsert(&tree, &[0], &[1], DropPosition::Inside);

        assert_eq!(next[0].kind, BlockType::Container);
        assert_eq!(ids_of(&next[0].children), vec!["A"]);
    }

    #[test]
    fn test_reorder_siblings() {
        let list = vec![leaf("A"), leaf("B"), leaf("C")];
        assert_eq!(ids_of(&reorder_siblings(&list, 0, 2)), vec!["B", "C", "A"]);
        assert_eq!(ids_of(&reorder_siblings(&list, 2, 0)), vec!["C", "A", "B"]);
        assert_eq!(reorder_siblings(&list, 0, 3), list);
    }

    #[test]
    fn test_move_by_delta_clamps() {
        let tree = vec![leaf("A"), leaf("B"), leaf("C")];
        assert_eq!(ids_of(&move_by_delta(&tree, &[1], -1)), vec!["B", "A", "C"]);
        assert_eq!(ids_of(&move_by_delta(&tree, &[1], 1)), vec!["A", "C", "B"]);
        assert_eq!(move_by_delta(&tree, &[0], -1), tree);
        assert_eq!(ids_of(&move_by_delta(&tree, &[0], 10)), vec!["B", "C", "A"]);
    }

    #[test]
    fn test_clone_with_new_ids() {
        let mut ids = IdGenerator::new("clone");
        let original = sample().remove(0);
        let copy = clone_with_new_ids(&original, &mut ids);

        let before = collect_ids(std::slice::from_ref(&original));
        let after = collect_ids(std::slice::from_ref(&copy));
        assert_eq!(before.len(), after.len());
        assert!(after.iter().all(|id| !before.contains(id)));

        let unique: std::collections::HashSet<_> = after.iter().collect();
        assert_eq!(unique.len(), after.len());

        assert_eq!(copy.kind, original.kind);
        assert_eq!(copy.children[1].children[0].props, original.children[1].children[0].props);
    }

    #[test]
    fn test_add_child_coerces_leaf() {
        let mut ids = IdGenerator::new("add");
        let tree = vec![leaf("A")];
        let (next, id) = add_child(&tree, &[0], "image", &mut ids);

        assert_eq!(next[0].kind, BlockType::Container);
        assert_eq!(next[0].children[0].kind, BlockType::Image);
        assert_eq!(next[0].children[0].id, id.unwrap());

        let (same, none) = add_child(&tree, &[4], "image", &mut ids);
        assert_eq!(same, tree);
        assert!(none.is_none());
    }

    #[test]
    fn test_insert_at_clamps_index() {
        let tree = vec![leaf("A")];
        let next = insert_at(&tree, &[], 10, leaf("B"));
        assert_eq!(ids_of(&next), vec!["A", "B"]);
    }
}
