//! # Block Presets
//!
//! Named, reusable block subtrees kept in a [`KeyValueStore`] under one key.
//!
//! - Names are unique; saving an existing name replaces that entry and
//!   moves it to the end
//! - Import merges by name: matching entries are replaced in place, new
//!   ones are appended, entries without a name or node are skipped
//! - Nodes are normalized on the way in, so legacy or hand-edited entries
//!   with unknown types or missing ids are repaired rather than dropped
//! - Unreadable stored data loads as an empty list

use crate::storage::KeyValueStore;
use crate::EditorError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use storefront_blocks::{normalize_nodes, normalize_tree, BlockNode, IdGenerator};
use tracing::{debug, info, warn};

/// Storage key for the preset list
pub const PRESETS_KEY: &str = "visual-builder-block-presets-v1";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Preset {
    pub name: String,
    pub node: BlockNode,
    pub updated_at: DateTime<Utc>,
}

/// Downloadable preset document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PresetExport {
    pub exported_at: DateTime<Utc>,
    pub presets: Vec<Preset>,
}

struct IncomingPreset {
    name: Option<String>,
    node: Option<Value>,
    updated_at: Option<DateTime<Utc>>,
}

impl IncomingPreset {
    fn from_value(entry: &Value) -> Self {
        let name = entry
            .get("name")
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .map(str::to_string);
        let updated_at = entry
            .get("updatedAt")
            .and_then(|raw| serde_json::from_value(raw.clone()).ok());

        Self {
            name,
            node: entry.get("node").cloned(),
            updated_at,
        }
    }
}

/// Entries of a bare list or of an `{ presets: [...] }` envelope
fn incoming_entries(raw: &Value) -> Vec<IncomingPreset> {
    let list = match raw {
        Value::Array(items) => items.as_slice(),
        other => match other.get("presets") {
            Some(Value::Array(items)) => items.as_slice(),
            _ => &[],
        },
    };

    list.iter().map(IncomingPreset::from_value).collect()
}

/// Normalize a raw preset node; `None` when it is not an object
fn sanitize_node(raw: Value, ids: &mut IdGenerator) -> Option<BlockNode> {
    normalize_tree(&Value::Array(vec![raw]), ids).into_iter().next()
}

pub struct PresetStore<S: KeyValueStore> {
    kv: S,
    presets: Vec<Preset>,
    ids: IdGenerator,
}

impl<S: KeyValueStore> PresetStore<S> {
    pub fn open(kv: S) -> Result<Self, EditorError> {
        let mut ids = IdGenerator::session();
        let loaded_at = Utc::now();
        let presets = match kv.get(PRESETS_KEY)? {
            Some(raw) => incoming_entries(&raw)
                .into_iter()
                .filter_map(|entry| {
                    let name = entry.name?;
                    let node = sanitize_node(entry.node?, &mut ids)?;
                    Some(Preset {
                        name,
                        node,
                        updated_at: entry.updated_at.unwrap_or(loaded_at),
                    })
                })
                .collect(),
            None => Vec::new(),
        };
        debug!(count = presets.len(), "presets loaded");
        Ok(Self { kv, presets, ids })
    }

    pub fn presets(&self) -> &[Preset] {
        &self.presets
    }

    pub fn names(&self) -> Vec<&str> {
        self.presets.iter().map(|preset| preset.name.as_str()).collect()
    }

    pub fn get(&self, name: &str) -> Option<&Preset> {
        self.presets.iter().find(|preset| preset.name == name)
    }

    pub fn len(&self) -> usize {
        self.presets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.presets.is_empty()
    }

    pub fn kv(&self) -> &S {
        &self.kv
    }

    fn persist(&mut self) -> Result<(), EditorError> {
        let value = serde_json::to_value(&self.presets)?;
        self.kv.set(PRESETS_KEY, &value)
    }

    /// Store a copy of `node` under `name` and return the name used
    ///
    /// A blank name becomes `Preset N`.
    pub fn save(&mut self, name: &str, node: &BlockNode, now: DateTime<Utc>) -> Result<String, EditorError> {
        let name = match name.trim() {
            "" => format!("Preset {}", self.presets.len() + 1),
            trimmed => trimmed.to_string(),
        };

        let node = normalize_nodes(std::slice::from_ref(node), &mut self.ids)
            .into_iter()
            .next()
            .unwrap_or_else(|| node.clone());

        self.presets.retain(|preset| preset.name != name);
        self.presets.push(Preset {
            name: name.clone(),
            node,
            updated_at: now,
        });
        info!(name = %name, "preset saved");
        self.persist()?;
        Ok(name)
    }

    pub fn export(&self, now: DateTime<Utc>) -> Result<String, EditorError> {
        let export = PresetExport {
            exported_at: now,
            presets: self.presets.clone(),
        };
        Ok(serde_json::to_string_pretty(&export)?)
    }

    /// Merge presets from an exported document; returns how many were taken
    pub fn import(&mut self, json: &str, now: DateTime<Utc>) -> Result<usize, EditorError> {
        let raw: Value = serde_json::from_str(json)?;

        let mut imported = 0;
        for entry in incoming_entries(&raw) {
            let (Some(name), Some(raw)) = (entry.name, entry.node) else {
                continue;
            };
            let Some(node) = sanitize_node(raw, &mut self.ids) else {
                continue;
            };
            let preset = Preset {
                name,
                node,
                updated_at: entry.updated_at.unwrap_or(now),
            };
            match self.presets.iter_mut().find(|existing| existing.name == preset.name) {
                Some(existing) => *existing = preset,
                None => self.presets.push(preset),
            }
            imported += 1;
        }

        if imported == 0 {
            warn!("preset import contained no usable entries");
            return Ok(0);
        }
        info!(imported, "presets imported");
        self.persist()?;
        Ok(imported)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryKv;
    use chrono::TimeZone;
    use serde_json::json;
    use storefront_blocks::BlockType;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 1, 9, 0, 0).unwrap()
    }

    fn store() -> PresetStore<MemoryKv> {
        PresetStore::open(MemoryKv::new()).unwrap()
    }

    #[test]
    fn test_save_replaces_same_name() {
        let mut presets = store();
        presets.save("Hero", &BlockNode::new("a", BlockType::Row), now()).unwrap();
        presets.save("Card", &BlockNode::new("b", BlockType::Container), now()).unwrap();
        presets.save("Hero", &BlockNode::new("c", BlockType::Text), now()).unwrap();

        assert_eq!(presets.names(), vec!["Card", "Hero"]);
        assert_eq!(presets.get("Hero").unwrap().node.id, "c");
    }

    #[test]
    fn test_blank_name_is_numbered() {
        let mut presets = store();
        let name = presets.save("  ", &BlockNode::new("a", BlockType::Row), now()).unwrap();
        assert_eq!(name, "Preset 1");
    }

    #[test]
    fn test_persisted_under_key() {
        let mut presets = store();
        presets.save("Hero", &BlockNode::new("a", BlockType::Row), now()).unwrap();

        let stored = presets.kv().get(PRESETS_KEY).unwrap().unwrap();
        assert_eq!(stored[0]["name"], "Hero");

        let reopened = PresetStore::open(presets.kv().clone()).unwrap();
        assert_eq!(reopened.presets(), presets.presets());
    }

    #[test]
    fn test_import_merges_by_name() {
        let mut presets = store();
        presets.save("Hero", &BlockNode::new("a", BlockType::Row), now()).unwrap();
        presets.save("Card", &BlockNode::new("b", BlockType::Row), now()).unwrap();

        let incoming = json!({
            "presets": [
                { "name": "Card", "node": { "id": "x", "type": "text" } },
                { "name": "Footer", "node": { "id": "y", "type": "row" } },
                { "name": "Broken" },
                { "node": { "id": "z", "type": "row" } },
            ]
        });
        let count = presets.import(&incoming.to_string(), now()).unwrap();

        assert_eq!(count, 2);
        assert_eq!(presets.names(), vec!["Hero", "Card", "Footer"]);
        assert_eq!(presets.get("Card").unwrap().node.id, "x");
    }

    #[test]
    fn test_import_rejects_malformed_json() {
        let mut presets = store();
        presets.save("Hero", &BlockNode::new("a", BlockType::Row), now()).unwrap();

        assert!(matches!(presets.import("{ not json", now()), Err(EditorError::InvalidJson(_))));
        assert_eq!(presets.import("{}", now()).unwrap(), 0);
        assert_eq!(presets.names(), vec!["Hero"]);
    }

    #[test]
    fn test_import_repairs_legacy_nodes() {
        let mut presets = store();
        let incoming = json!({
            "presets": [
                { "name": "Legacy", "node": { "type": "hero-banner", "props": { "text": "Hi" } } },
                { "name": "Loose", "node": { "id": "l", "type": "row", "props": "nope", "children": [{ "type": "text" }] } },
                { "name": "Scalar", "node": 42 },
            ]
        });

        assert_eq!(presets.import(&incoming.to_string(), now()).unwrap(), 2);
        assert_eq!(presets.names(), vec!["Legacy", "Loose"]);

        let legacy = &presets.get("Legacy").unwrap().node;
        assert_eq!(legacy.kind, BlockType::Text);
        assert_eq!(legacy.props["text"], "Hi");
        assert!(!legacy.id.is_empty());

        let loose = &presets.get("Loose").unwrap().node;
        assert_eq!(loose.id, "l");
        assert_eq!(loose.children.len(), 1);
        assert!(!loose.children[0].id.is_empty());
    }

    #[test]
    fn test_stored_legacy_entries_survive_reopen() {
        let mut kv = MemoryKv::new();
        kv.set(PRESETS_KEY, &json!([{ "name": "Old", "node": { "type": "banner" } }])).unwrap();

        let presets = PresetStore::open(kv).unwrap();
        assert_eq!(presets.names(), vec!["Old"]);
        assert_eq!(presets.get("Old").unwrap().node.kind, BlockType::Text);
    }

    #[test]
    fn test_corrupt_storage_loads_empty() {
        let mut kv = MemoryKv::new();
        kv.set(PRESETS_KEY, &json!("garbage")).unwrap();
        assert!(PresetStore::open(kv).unwrap().is_empty());
    }
}
