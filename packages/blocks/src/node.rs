//! # Block Nodes
//!
//! A block tree is an ordered forest of [`BlockNode`]s. Layout types
//! (`row`, `column`, `container`) hold children; widget types are leaves
//! whose `children` list is kept but normally empty.

use crate::{BlockError, IdGenerator};
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use std::fmt;
use std::str::FromStr;

/// Open key-value map of node properties
pub type Props = Map<String, Value>;

/// The object inside `value`, or an empty map for anything else
pub fn props_from(value: Value) -> Props {
    match value {
        Value::Object(map) => map,
        _ => Props::new(),
    }
}

/// Closed catalogue of block types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BlockType {
    Row,
    Column,
    Container,
    Heading,
    #[default]
    Text,
    Button,
    Image,
    Video,
    Gallery,
    Accordion,
    Tabs,
    Carousel,
    Form,
    Divider,
    Spacer,
}

impl BlockType {
    /// Types that can hold children
    pub const LAYOUT: [BlockType; 3] = [BlockType::Row, BlockType::Column, BlockType::Container];

    /// Leaf widget types
    pub const WIDGETS: [BlockType; 12] = [
        BlockType::Heading,
        BlockType::Text,
        BlockType::Button,
        BlockType::Image,
        BlockType::Video,
        BlockType::Gallery,
        BlockType::Accordion,
        BlockType::Tabs,
        BlockType::Carousel,
        BlockType::Form,
        BlockType::Divider,
        BlockType::Spacer,
    ];

    pub fn is_container(self) -> bool {
        Self::LAYOUT.contains(&self)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            BlockType::Row => "row",
            BlockType::Column => "column",
            BlockType::Container => "container",
            BlockType::Heading => "heading",
            BlockType::Text => "text",
            BlockType::Button => "button",
            BlockType::Image => "image",
            BlockType::Video => "video",
            BlockType::Gallery => "gallery",
            BlockType::Accordion => "accordion",
            BlockType::Tabs => "tabs",
            BlockType::Carousel => "carousel",
            BlockType::Form => "form",
            BlockType::Divider => "divider",
            BlockType::Spacer => "spacer",
        }
    }

    /// Parse a raw type tag, falling back to the default leaf type
    pub fn coerce(raw: &str) -> Self {
        raw.parse().unwrap_or_default()
    }

    /// Props every new node of this type starts with
    pub fn default_props(self) -> Props {
        let value = match self {
            BlockType::Text => json!({ "text": "Text block" }),
            BlockType::Heading => json!({ "text": "Heading block" }),
            BlockType::Button => json!({
                "text": "Button",
                "link": "/products",
                "className": "btn btn-primary",
            }),
            BlockType::Image => json!({ "src": "", "alt": "Image" }),
            BlockType::Video => json!({ "src": "", "posterUrl": "", "controls": true }),
            BlockType::Gallery => json!({ "images": [], "columns": 3 }),
            BlockType::Accordion => json!({
                "items": [{ "title": "Accordion item", "content": "Accordion content" }],
            }),
            BlockType::Tabs => json!({
                "items": [
                    { "label": "Tab 1", "content": "Tab content" },
                    { "label": "Tab 2", "content": "Another tab" },
                ],
            }),
            BlockType::Carousel => json!({
                "items": [{ "image": "", "title": "Slide title", "description": "Slide description" }],
            }),
            BlockType::Form => json!({ "submitText": "Submit" }),
            BlockType::Row => json!({ "columns": 2 }),
            BlockType::Spacer => json!({ "height": 24 }),
            BlockType::Column | BlockType::Container | BlockType::Divider => json!({}),
        };

        props_from(value)
    }
}

impl FromStr for BlockType {
    type Err = BlockError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        Self::LAYOUT
            .iter()
            .chain(Self::WIDGETS.iter())
            .copied()
            .find(|kind| kind.as_str() == trimmed)
            .ok_or_else(|| BlockError::UnknownType(trimmed.to_string()))
    }
}

impl fmt::Display for BlockType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Placement of a top-level node relative to its owning page section
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Zone {
    Before,
    #[default]
    After,
}

impl Zone {
    pub fn coerce(raw: &str) -> Self {
        match raw.trim() {
            "before" => Zone::Before,
            _ => Zone::After,
        }
    }
}

/// Node in the block tree
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlockNode {
    pub id: String,

    #[serde(rename = "type")]
    pub kind: BlockType,

    #[serde(default)]
    pub zone: Zone,

    #[serde(default)]
    pub props: Props,

    #[serde(default)]
    pub children: Vec<BlockNode>,
}

impl BlockNode {
    /// Node with the type's default props and no children
    pub fn new(id: impl Into<String>, kind: BlockType) -> Self {
        Self {
            id: id.into(),
            kind,
            zone: Zone::default(),
            props: kind.default_props(),
            children: Vec::new(),
        }
    }

    /// Merge `props` over the current props
    pub fn with_props(mut self, props: Props) -> Self {
        self.props.extend(props);
        self
    }

    pub fn with_prop(mut self, key: impl Into<String>, value: Value) -> Self {
        self.props.insert(key.into(), value);
        self
    }

    pub fn with_children(mut self, children: Vec<BlockNode>) -> Self {
        self.children = children;
        self
    }

    pub fn with_zone(mut self, zone: Zone) -> Self {
        self.zone = zone;
        self
    }

    pub fn is_container(&self) -> bool {
        self.kind.is_container()
    }

    /// Display label: `text`, then `title`, then the type tag
    pub fn label(&self) -> String {
        ["text", "title"]
            .iter()
            .filter_map(|key| self.props.get(*key))
            .find(|value| is_truthy(value))
            .map(|value| match value {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            })
            .unwrap_or_else(|| self.kind.as_str().to_string())
    }

    /// Whether a prop holds a truthy value
    pub fn flag(&self, key: &str) -> bool {
        self.props.get(key).map(is_truthy).unwrap_or(false)
    }

    pub fn is_locked(&self) -> bool {
        self.flag("locked")
    }

    pub fn is_hidden(&self) -> bool {
        self.flag("hidden")
    }
}

/// Loose truthiness used for prop flags
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map(|f| f != 0.0 && !f.is_nan()).unwrap_or(false),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// Create a fresh node from a raw type tag (unknown tags become `text`)
pub fn create_node(kind: &str, ids: &mut IdGenerator) -> BlockNode {
    BlockNode::new(ids.new_id(), BlockType::coerce(kind))
}
