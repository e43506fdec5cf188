//! # Page Sections
//!
//! The page layout is a flat, ordered list of [`Section`]s. Each section
//! carries an open `data` payload whose shape depends on its type; the
//! optional `blocks` field of that payload holds a block forest.
//!
//! Layout JSON from older saves stored section fields inline instead of
//! under `data`. [`normalize_layout`] accepts both shapes.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{json, Value};
use std::fmt;
use storefront_blocks::{normalize_tree, props_from, BlockNode, IdGenerator, Props};

pub const CURRENT_LAYOUT_SCHEMA_VERSION: u32 = 2;

/// Data key holding a section's block forest
pub const BLOCKS_KEY: &str = "blocks";

/// Keys that are section bookkeeping rather than content
const BOOKKEEPING_KEYS: [&str; 8] = [
    "id",
    "type",
    "enabled",
    "order",
    "createdAt",
    "updatedAt",
    "_id",
    "__v",
];

const FALLBACK_TYPE: &str = "text";

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum SectionType {
    Hero,
    Products,
    MadeToOrder,
    Newsletter,
    /// Any other tag, kept verbatim
    Custom(String),
}

impl SectionType {
    pub fn as_str(&self) -> &str {
        match self {
            SectionType::Hero => "hero",
            SectionType::Products => "products",
            SectionType::MadeToOrder => "madeToOrder",
            SectionType::Newsletter => "newsletter",
            SectionType::Custom(tag) => tag,
        }
    }

    /// Key of the legacy `homeSections` group this type maps onto
    pub fn home_section_key(&self) -> Option<&'static str> {
        match self {
            SectionType::Hero => Some("heroSection"),
            SectionType::Products => Some("featuredProducts"),
            SectionType::MadeToOrder => Some("madeToOrder"),
            SectionType::Newsletter => Some("newsletter"),
            SectionType::Custom(_) => None,
        }
    }
}

impl From<String> for SectionType {
    fn from(tag: String) -> Self {
        match tag.as_str() {
            "hero" => SectionType::Hero,
            "products" => SectionType::Products,
            "madeToOrder" => SectionType::MadeToOrder,
            "newsletter" => SectionType::Newsletter,
            _ => SectionType::Custom(tag),
        }
    }
}

impl From<&str> for SectionType {
    fn from(tag: &str) -> Self {
        SectionType::from(tag.to_string())
    }
}

impl From<SectionType> for String {
    fn from(kind: SectionType) -> Self {
        kind.as_str().to_string()
    }
}

impl fmt::Display for SectionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Section {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: SectionType,
    pub enabled: bool,
    #[serde(default)]
    pub data: Props,
}

impl Section {
    pub fn new(id: impl Into<String>, kind: SectionType, data: Props) -> Self {
        let mut section = Self {
            id: id.into(),
            kind,
            enabled: true,
            data,
        };
        section.sync_enabled();
        section
    }

    /// Mirror `enabled` into `data.enabled`
    fn sync_enabled(&mut self) {
        self.data.insert("enabled".to_string(), Value::Bool(self.enabled));
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
        self.sync_enabled();
    }

    /// Block forest stored under `data.blocks`, normalized
    pub fn blocks(&self, ids: &mut IdGenerator) -> Vec<BlockNode> {
        self.data
            .get(BLOCKS_KEY)
            .map(|raw| normalize_tree(raw, ids))
            .unwrap_or_default()
    }

    pub fn set_blocks(&mut self, blocks: &[BlockNode]) -> Result<(), serde_json::Error> {
        let value = serde_json::to_value(blocks)?;
        self.data.insert(BLOCKS_KEY.to_string(), value);
        Ok(())
    }
}

fn as_object(value: &Value) -> Option<&Props> {
    value.as_object()
}

fn non_empty_str(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn section_data(raw: &Value) -> Props {
    if let Some(data) = raw.get("data").and_then(as_object) {
        return data.clone();
    }
    raw.as_object()
        .map(|fields| {
            fields
                .iter()
                .filter(|(key, _)| !BOOKKEEPING_KEYS.contains(&key.as_str()))
                .map(|(key, value)| (key.clone(), value.clone()))
                .collect()
        })
        .unwrap_or_default()
}

/// Normalize one raw layout entry at `index`
pub fn normalize_section(raw: &Value, index: usize) -> Section {
    let data = section_data(raw);

    let kind = non_empty_str(raw.get("type"))
        .or_else(|| non_empty_str(data.get("type")))
        .unwrap_or_else(|| FALLBACK_TYPE.to_string());

    let enabled = raw
        .get("enabled")
        .and_then(Value::as_bool)
        .or_else(|| data.get("enabled").and_then(Value::as_bool))
        .unwrap_or(true);

    let id = non_empty_str(raw.get("id")).unwrap_or_else(|| format!("{}-{}", kind, index + 1));

    let mut section = Section {
        id,
        kind: SectionType::from(kind),
        enabled,
        data,
    };
    section.sync_enabled();
    section
}

/// Normalize a raw layout; anything but an array yields an empty layout
pub fn normalize_layout(raw: &Value) -> Vec<Section> {
    match raw {
        Value::Array(entries) => entries
            .iter()
            .enumerate()
            .map(|(index, entry)| normalize_section(entry, index))
            .collect(),
        _ => Vec::new(),
    }
}

/// Serde adapter that runs stored layouts through [`normalize_layout`]
pub fn deserialize_layout<'de, D>(deserializer: D) -> Result<Vec<Section>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Value::deserialize(deserializer)?;
    Ok(normalize_layout(&raw))
}

/// Merge each mapped section over its legacy `homeSections` group
pub fn derive_home_sections(layout: &[Section], base: &Props) -> Props {
    let mut merged = base.clone();

    for section in layout {
        let Some(key) = section.kind.home_section_key() else {
            continue;
        };

        let mut group = base.get(key).and_then(as_object).cloned().unwrap_or_default();
        group.extend(section.data.clone());
        group.insert("enabled".to_string(), Value::Bool(section.enabled));
        merged.insert(key.to_string(), Value::Object(group));
    }

    merged
}

/// Starting content for a newly added section
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SectionTemplate {
    #[serde(rename = "type")]
    pub kind: SectionType,
    pub label: String,
    pub default_data: Props,
}

/// Templates offered by the "add section" picker
pub fn section_templates() -> Vec<SectionTemplate> {
    vec![
        SectionTemplate {
            kind: SectionType::Hero,
            label: "Hero Banner".into(),
            default_data: props_from(json!({
                "title": "New Collections 2026",
                "subtitle": "Experience comfort and style like never before.",
                "buttonText": "Shop Now",
                "buttonLink": "/products",
                "secondaryButtonText": "Our Story",
                "secondaryButtonLink": "/about",
                "imageUrl": "/hero-placeholder.jpg",
                "alignment": "center",
                "blocks": [],
            })),
        },
        SectionTemplate {
            kind: SectionType::Products,
            label: "Featured Products".into(),
            default_data: props_from(json!({
                "title": "Featured Collection",
                "description": "Explore our handpicked selection of premium shoes.",
                "productLimit": 8,
                "viewAllButtonText": "View All Products",
                "viewAllButtonLink": "/products",
                "blocks": [],
            })),
        },
        SectionTemplate {
            kind: SectionType::MadeToOrder,
            label: "Made To Order".into(),
            default_data: props_from(json!({
                "title": "Made to Order",
                "description": "All our shoes are crafted to order for perfect fit and quality.",
                "features": ["Custom Crafted", "Premium Leather", "Expert Artisans", "7-10 Days Delivery"],
                "blocks": [],
            })),
        },
        SectionTemplate {
            kind: SectionType::Newsletter,
            label: "Newsletter".into(),
            default_data: props_from(json!({
                "title": "Subscribe to our newsletter",
                "description": "Get updates on new products and exclusive offers",
                "placeholder": "Enter your email",
                "buttonText": "Subscribe",
                "blocks": [],
            })),
        },
        SectionTemplate {
            kind: SectionType::Custom("custom".into()),
            label: "Custom Content".into(),
            default_data: props_from(json!({
                "content": "## Our Story\nWe started with a simple idea...",
                "blocks": [],
            })),
        },
    ]
}

pub fn template_for(kind: &SectionType) -> Option<SectionTemplate> {
    section_templates().into_iter().find(|template| &template.kind == kind)
}

/// Layout a fresh site starts with
pub fn default_layout() -> Vec<Section> {
    section_templates()
        .into_iter()
        .filter(|template| template.kind.home_section_key().is_some())
        .map(|template| {
            let id = template.kind.as_str().to_string();
            Section::new(id, template.kind, template.default_data)
        })
        .collect()
}

/// Base `homeSections` groups that layout sections are merged over
pub fn default_home_sections() -> Props {
    props_from(json!({
        "heroSection": {
            "enabled": true,
            "title": "Step Into",
            "subtitle": "Timeless Elegance",
            "primaryButtonText": "Explore Collection",
            "primaryButtonLink": "/products",
        },
        "featuredProducts": {
            "enabled": true,
            "title": "Featured Collection",
            "productLimit": 8,
            "productSelection": "latest",
        },
        "madeToOrder": {
            "enabled": true,
            "title": "Made to Order",
            "features": [],
        },
        "newsletter": {
            "enabled": true,
            "title": "Join Our Newsletter",
            "buttonText": "Subscribe",
        },
    }))
}

// Layout list operations. Each returns a new list; unknown ids leave it
// unchanged.

pub fn position_of(layout: &[Section], id: &str) -> Option<usize> {
    layout.iter().position(|section| section.id == id)
}

pub fn add_section(layout: &[Section], template: &SectionTemplate, id: impl Into<String>) -> Vec<Section> {
    let mut next = layout.to_vec();
    next.push(Section::new(id, template.kind.clone(), template.default_data.clone()));
    next
}

pub fn toggle_section(layout: &[Section], id: &str) -> Vec<Section> {
    layout
        .iter()
        .cloned()
        .map(|mut section| {
            if section.id == id {
                let enabled = !section.enabled;
                section.set_enabled(enabled);
            }
            section
        })
        .collect()
}

pub fn remove_section(layout: &[Section], id: &str) -> Vec<Section> {
    layout.iter().filter(|section| section.id != id).cloned().collect()
}

/// Replace a section's data wholesale
pub fn update_section_data(layout: &[Section], id: &str, data: Props) -> Vec<Section> {
    layout
        .iter()
        .cloned()
        .map(|mut section| {
            if section.id == id {
                section.data = data.clone();
                section.sync_enabled();
            }
            section
        })
        .collect()
}

/// Merge `partial` into the data of every section of `kind`
pub fn merge_section_data(layout: &[Section], kind: &SectionType, partial: &Props) -> Vec<Section> {
    layout
        .iter()
        .cloned()
        .map(|mut section| {
            if &section.kind == kind {
                section.data.extend(partial.clone());
                section.sync_enabled();
            }
            section
        })
        .collect()
}

/// Move `active_id` to the position held by `over_id` (remove, then splice)
pub fn reorder_sections(layout: &[Section], active_id: &str, over_id: &str) -> Vec<Section> {
    let mut next = layout.to_vec();
    let (Some(from), Some(to)) = (position_of(layout, active_id), position_of(layout, over_id)) else {
        return next;
    };
    if from != to {
        let moved = next.remove(from);
        next.insert(to, moved);
    }
    next
}
