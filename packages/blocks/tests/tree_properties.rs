//! Whole-tree properties checked over a handful of generated forests

use serde_json::{json, Value};
use std::collections::HashSet;
use storefront_blocks::tree::{self, collect_ids, extract_and_reinsert};
use storefront_blocks::{normalize_nodes, normalize_tree, BlockNode, BlockType, DropPosition, IdGenerator};

fn all_paths(nodes: &[BlockNode], prefix: &mut Vec<usize>, out: &mut Vec<Vec<usize>>) {
    for (index, node) in nodes.iter().enumerate() {
        prefix.push(index);
        out.push(prefix.clone());
        all_paths(&node.children, prefix, out);
        prefix.pop();
    }
}

fn paths(forest: &[BlockNode]) -> Vec<Vec<usize>> {
    let mut out = Vec::new();
    all_paths(forest, &mut Vec::new(), &mut out);
    out
}

fn fixtures() -> Vec<Value> {
    vec![
        json!([]),
        json!([{ "type": "text" }]),
        json!([
            { "id": "a", "type": "row", "children": [
                { "id": "b", "type": "column", "children": [{ "id": "c", "type": "text" }] },
                { "id": "d", "type": "column", "children": null },
            ]},
            { "id": "a", "type": "mystery", "zone": "before" },
        ]),
        json!([
            { "type": "container", "children": [
                { "type": "container", "children": [
                    { "type": "container", "children": [{ "type": "image" }] },
                ]},
            ]},
            "junk",
            { "type": "button", "props": { "text": "Go", "animation": "pulse" } },
        ]),
    ]
}

fn assert_invariants(forest: &[BlockNode]) {
    let ids = collect_ids(forest);
    let unique: HashSet<_> = ids.iter().collect();
    assert_eq!(ids.len(), unique.len(), "duplicate ids in {ids:?}");
    assert!(ids.iter().all(|id| !id.trim().is_empty()));
}

#[test]
fn normalization_is_idempotent_and_valid() {
    for raw in fixtures() {
        let mut ids = IdGenerator::new("props");
        let once = normalize_tree(&raw, &mut ids);
        assert_invariants(&once);

        let reparsed = normalize_tree(&serde_json::to_value(&once).unwrap(), &mut ids);
        assert_eq!(reparsed, once);
        assert_eq!(normalize_nodes(&once, &mut ids), once);
    }
}

#[test]
fn clone_ids_never_collide() {
    for raw in fixtures() {
        let mut ids = IdGenerator::new("props");
        let forest = normalize_tree(&raw, &mut ids);

        for node in &forest {
            let copy = tree::clone_with_new_ids(node, &mut ids);
            let original = collect_ids(std::slice::from_ref(node));
            let cloned = collect_ids(std::slice::from_ref(&copy));

            assert!(cloned.iter().all(|id| !original.contains(id)));
            let unique: HashSet<_> = cloned.iter().collect();
            assert_eq!(unique.len(), cloned.len());
        }
    }
}

#[test]
fn moves_into_own_subtree_are_noops() {
    for raw in fixtures() {
        let mut ids = IdGenerator::new("props");
        let forest = normalize_tree(&raw, &mut ids);
        let every = paths(&forest);

        for source in &every {
            for target in every.iter().filter(|t| t.starts_with(source)) {
                for position in [DropPosition::Before, DropPosition::After, DropPosition::Inside] {
                    assert_eq!(extract_and_reinsert(&forest, source, target, position), forest);
                }
            }
        }
    }
}

#[test]
fn legal_moves_preserve_every_node() {
    for raw in fixtures() {
        let mut ids = IdGenerator::new("props");
        let forest = normalize_tree(&raw, &mut ids);
        let mut before = collect_ids(&forest);
        before.sort();
        let every = paths(&forest);

        for source in &every {
            for target in &every {
                for position in [DropPosition::Before, DropPosition::After, DropPosition::Inside] {
                    let moved = extract_and_reinsert(&forest, source, target, position);
                    let mut after = collect_ids(&moved);
                    after.sort();
                    assert_eq!(after, before);
                }
            }
        }
    }
}

#[test]
fn drop_inside_reparents() {
    let forest = vec![
        BlockNode::new("A", BlockType::Container),
        BlockNode::new("B", BlockType::Container),
    ];
    let moved = extract_and_reinsert(&forest, &[0], &[1], DropPosition::Inside);

    assert_eq!(moved.len(), 1);
    assert_eq!(moved[0].id, "B");
    assert_eq!(moved[0].children[0].id, "A");
}
