//! Flat, searchable outline of a block forest

use crate::{BlockNode, BlockType};
use serde::{Deserialize, Serialize};

/// One row in the navigator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutlineItem {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: BlockType,
    pub label: String,
    pub path: Vec<usize>,
    pub locked: bool,
    pub hidden: bool,
}

impl OutlineItem {
    pub fn depth(&self) -> usize {
        self.path.len().saturating_sub(1)
    }

    fn haystack(&self) -> String {
        format!("{} {}", self.kind, self.label).to_lowercase()
    }
}

/// Flatten a forest in depth-first pre-order
pub fn flatten(tree: &[BlockNode]) -> Vec<OutlineItem> {
    let mut items = Vec::new();
    flatten_into(tree, &mut Vec::new(), &mut items);
    items
}

fn flatten_into(nodes: &[BlockNode], parent_path: &mut Vec<usize>, items: &mut Vec<OutlineItem>) {
    for (index, node) in nodes.iter().enumerate() {
        parent_path.push(index);
        items.push(OutlineItem {
            id: node.id.clone(),
            kind: node.kind,
            label: node.label(),
            path: parent_path.clone(),
            locked: node.is_locked(),
            hidden: node.is_hidden(),
        });
        flatten_into(&node.children, parent_path, items);
        parent_path.pop();
    }
}

/// Keep items whose `"<type> <label>"` contains `query`, ignoring case
///
/// A blank query keeps everything.
pub fn filter_outline<'a>(items: &'a [OutlineItem], query: &str) -> Vec<&'a OutlineItem> {
    let query = query.trim().to_lowercase();
    if query.is_empty() {
        return items.iter().collect();
    }
    items
        .iter()
        .filter(|item| item.haystack().contains(&query))
        .collect()
}
