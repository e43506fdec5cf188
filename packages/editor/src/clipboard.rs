//! Single-slot node clipboard plus a style-only clipboard

use storefront_blocks::{apply_style_payload, extract_style_payload, tree, BlockNode, IdGenerator, Props};
use tracing::debug;

#[derive(Debug, Clone, Default)]
pub struct Clipboard {
    node: Option<BlockNode>,
    style: Option<Props>,
}

impl Clipboard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Keep a deep copy of `node`; ids are minted on paste
    pub fn copy(&mut self, node: &BlockNode) {
        debug!(id = %node.id, "copied node");
        self.node = Some(node.clone());
    }

    /// Fresh-id copy of the clipboard node, if any
    pub fn paste(&self, ids: &mut IdGenerator) -> Option<BlockNode> {
        self.node.as_ref().map(|node| tree::clone_with_new_ids(node, ids))
    }

    /// Keep the style keys of `props`. Returns `false` (slot unchanged)
    /// when there are none.
    pub fn copy_style(&mut self, props: &Props) -> bool {
        let payload = extract_style_payload(props);
        if payload.is_empty() {
            return false;
        }
        self.style = Some(payload);
        true
    }

    /// `props` with the style clipboard merged in
    pub fn paste_style(&self, props: &Props) -> Option<Props> {
        self.style.as_ref().map(|payload| apply_style_payload(props, payload))
    }

    pub fn node(&self) -> Option<&BlockNode> {
        self.node.as_ref()
    }

    pub fn style(&self) -> Option<&Props> {
        self.style.as_ref()
    }

    pub fn has_node(&self) -> bool {
        self.node.is_some()
    }

    pub fn has_style(&self) -> bool {
        self.style.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use storefront_blocks::BlockType;

    #[test]
    fn test_paste_mints_new_ids() {
        let mut ids = IdGenerator::new("clipboard");
        let mut clipboard = Clipboard::new();
        assert!(clipboard.paste(&mut ids).is_none());

        let node = BlockNode::new("a", BlockType::Row).with_children(vec![BlockNode::new("b", BlockType::Text)]);
        clipboard.copy(&node);

        let first = clipboard.paste(&mut ids).unwrap();
        let second = clipboard.paste(&mut ids).unwrap();
        assert_ne!(first.id, "a");
        assert_ne!(first.id, second.id);
        assert_ne!(first.children[0].id, "b");
        assert_eq!(clipboard.node().unwrap().id, "a");
    }

    #[test]
    fn test_copy_style_without_style_keys_keeps_slot() {
        let mut clipboard = Clipboard::new();
        let styled = BlockNode::new("a", BlockType::Text).with_prop("color", json!("red"));
        assert!(clipboard.copy_style(&styled.props));

        let plain = BlockNode::new("b", BlockType::Text);
        assert!(!clipboard.copy_style(&plain.props));
        assert_eq!(clipboard.style().unwrap()["color"], "red");
    }

    #[test]
    fn test_paste_style_merges_only_style_keys() {
        let mut clipboard = Clipboard::new();
        let source = BlockNode::new("a", BlockType::Button)
            .with_prop("className", json!("btn btn-dark"))
            .with_prop("padding", json!("12px"));
        clipboard.copy_style(&source.props);

        let target = BlockNode::new("b", BlockType::Button).with_prop("text", json!("Buy"));
        let merged = clipboard.paste_style(&target.props).unwrap();

        assert_eq!(merged["className"], "btn btn-dark");
        assert_eq!(merged["padding"], "12px");
        assert_eq!(merged["text"], "Buy");
        assert_eq!(merged["link"], "/products");
    }
}
