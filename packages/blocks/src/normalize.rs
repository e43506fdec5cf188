//! # Normalization
//!
//! Turns arbitrary JSON into a forest that satisfies the block invariants:
//!
//! - every node has a non-empty id, unique within the forest
//! - `type` is in the catalogue (unknown tags become `text`)
//! - `zone` is `before` or `after`
//! - `props` is an object with the type's defaults filled in
//! - `children` is always a list
//!
//! Nothing is rejected. Null and non-object entries are dropped, everything
//! else is sanitized. Running it twice yields the same forest.

use crate::{BlockError, BlockNode, BlockType, IdGenerator, Props, Zone};
use serde_json::Value;
use std::collections::HashSet;

struct Normalizer<'a> {
    ids: &'a mut IdGenerator,
    reserved: HashSet<String>,
    seen: HashSet<String>,
}

impl Normalizer<'_> {
    fn assign_id(&mut self, candidate: Option<&str>) -> String {
        let candidate = candidate.map(str::trim).filter(|id| !id.is_empty());

        let id = match candidate {
            Some(id) if !self.seen.contains(id) => id.to_string(),
            _ => loop {
                let minted = self.ids.new_id();
                if !self.reserved.contains(&minted) && !self.seen.contains(&minted) {
                    break minted;
                }
            },
        };

        self.seen.insert(id.clone());
        id
    }

    fn raw_forest(&mut self, raw: &Value) -> Vec<BlockNode> {
        match raw {
            Value::Array(items) => items
                .iter()
                .filter(|item| item.is_object())
                .map(|item| self.raw_node(item))
                .collect(),
            _ => Vec::new(),
        }
    }

    fn raw_node(&mut self, raw: &Value) -> BlockNode {
        let kind = raw
            .get("type")
            .and_then(Value::as_str)
            .map(BlockType::coerce)
            .unwrap_or_default();

        let zone = raw
            .get("zone")
            .and_then(Value::as_str)
            .map(Zone::coerce)
            .unwrap_or_default();

        let id = self.assign_id(raw.get("id").and_then(Value::as_str));

        let mut props = kind.default_props();
        if let Some(Value::Object(supplied)) = raw.get("props") {
            props.extend(supplied.clone());
        }

        let children = raw
            .get("children")
            .map(|children| self.raw_forest(children))
            .unwrap_or_default();

        BlockNode {
            id,
            kind,
            zone,
            props,
            children,
        }
    }

    fn typed_forest(&mut self, nodes: &[BlockNode]) -> Vec<BlockNode> {
        nodes.iter().map(|node| self.typed_node(node)).collect()
    }

    fn typed_node(&mut self, node: &BlockNode) -> BlockNode {
        let id = self.assign_id(Some(node.id.as_str()));

        let mut props: Props = node.kind.default_props();
        props.extend(node.props.clone());

        BlockNode {
            id,
            kind: node.kind,
            zone: node.zone,
            props,
            children: self.typed_forest(&node.children),
        }
    }
}

fn collect_raw_ids(raw: &Value, into: &mut HashSet<String>) {
    if let Value::Array(items) = raw {
        for item in items {
            if let Some(id) = item.get("id").and_then(Value::as_str) {
                into.insert(id.trim().to_string());
            }
            if let Some(children) = item.get("children") {
                collect_raw_ids(children, into);
            }
        }
    }
}

fn collect_typed_ids(nodes: &[BlockNode], into: &mut HashSet<String>) {
    for node in nodes {
        into.insert(node.id.trim().to_string());
        collect_typed_ids(&node.children, into);
    }
}

/// Normalize an arbitrary JSON value into a block forest
pub fn normalize_tree(raw: &Value, ids: &mut IdGenerator) -> Vec<BlockNode> {
    let mut reserved = HashSet::new();
    collect_raw_ids(raw, &mut reserved);

    let mut normalizer = Normalizer {
        ids,
        reserved,
        seen: HashSet::new(),
    };
    normalizer.raw_forest(raw)
}

/// Re-establish the invariants on an already typed forest
///
/// Fills default props and re-mints empty or duplicate ids.
pub fn normalize_nodes(nodes: &[BlockNode], ids: &mut IdGenerator) -> Vec<BlockNode> {
    let mut reserved = HashSet::new();
    collect_typed_ids(nodes, &mut reserved);

    let mut normalizer = Normalizer {
        ids,
        reserved,
        seen: HashSet::new(),
    };
    normalizer.typed_forest(nodes)
}

/// Parse JSON text and normalize it
pub fn parse_tree(json: &str, ids: &mut IdGenerator) -> Result<Vec<BlockNode>, BlockError> {
    let raw: Value = serde_json::from_str(json)?;
    Ok(normalize_tree(&raw, ids))
}
