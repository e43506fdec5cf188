//! # Site Settings
//!
//! The payload exchanged with the settings backend: the page layout, theme,
//! branding and announcement bar, plus the publish workflow, the last
//! published snapshot and a bounded version history.

use crate::section::{default_home_sections, default_layout, derive_home_sections, deserialize_layout};
use crate::workflow::{PublishCheck, PublishWorkflow};
use crate::{diff_layouts, LayoutDiff, Section, CURRENT_LAYOUT_SCHEMA_VERSION};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use storefront_blocks::{props_from, Props};

pub const MAX_VERSION_HISTORY: usize = 50;

pub fn default_theme() -> Props {
    props_from(json!({
        "primaryColor": "#3B2F2F",
        "secondaryColor": "#E5D3B3",
        "fontFamily": "var(--font-inter)",
        "borderRadius": "0.5rem",
    }))
}

pub fn default_branding() -> Props {
    props_from(json!({
        "siteName": "weBazaar",
        "logo": { "url": "", "alt": "Logo" },
        "favicon": { "url": "" },
    }))
}

pub fn default_announcement_bar() -> Props {
    props_from(json!({
        "enabled": true,
        "text": "Welcome to our store!",
        "link": "",
        "backgroundColor": "#10b981",
        "textColor": "#ffffff",
        "dismissible": true,
    }))
}

/// Everything a publish makes visible
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SettingsSnapshot {
    #[serde(default, deserialize_with = "deserialize_layout")]
    pub layout: Vec<Section>,
    #[serde(default)]
    pub theme: Props,
    #[serde(default)]
    pub branding: Props,
    #[serde(default)]
    pub announcement_bar: Props,
}

impl Default for SettingsSnapshot {
    fn default() -> Self {
        Self {
            layout: default_layout(),
            theme: default_theme(),
            branding: default_branding(),
            announcement_bar: default_announcement_bar(),
        }
    }
}

/// Partial snapshot; absent parts are left as they are
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SnapshotPatch {
    #[serde(default)]
    pub layout: Option<Value>,
    #[serde(default)]
    pub theme: Option<Props>,
    #[serde(default)]
    pub branding: Option<Props>,
    #[serde(default)]
    pub announcement_bar: Option<Props>,
}

impl SnapshotPatch {
    pub fn is_empty(&self) -> bool {
        self.layout.is_none() && self.theme.is_none() && self.branding.is_none() && self.announcement_bar.is_none()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VersionEntry {
    pub id: String,
    pub label: String,
    pub saved_at: DateTime<Utc>,
    pub snapshot: SettingsSnapshot,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SiteSettings {
    #[serde(default = "default_layout", deserialize_with = "deserialize_layout")]
    pub layout: Vec<Section>,
    #[serde(default = "current_schema_version")]
    pub layout_schema_version: u32,
    #[serde(default = "default_theme")]
    pub theme: Props,
    #[serde(default = "default_branding")]
    pub branding: Props,
    #[serde(default = "default_announcement_bar")]
    pub announcement_bar: Props,
    #[serde(default)]
    pub publish_workflow: PublishWorkflow,
    #[serde(default)]
    pub published_snapshot: Option<SettingsSnapshot>,
    #[serde(default)]
    pub version_history: Vec<VersionEntry>,
    #[serde(default)]
    pub current_version: u64,
}

fn current_schema_version() -> u32 {
    CURRENT_LAYOUT_SCHEMA_VERSION
}

impl Default for SiteSettings {
    fn default() -> Self {
        let snapshot = SettingsSnapshot::default();
        Self {
            layout: snapshot.layout,
            layout_schema_version: CURRENT_LAYOUT_SCHEMA_VERSION,
            theme: snapshot.theme,
            branding: snapshot.branding,
            announcement_bar: snapshot.announcement_bar,
            publish_workflow: PublishWorkflow::default(),
            published_snapshot: None,
            version_history: Vec::new(),
            current_version: 0,
        }
    }
}

impl SiteSettings {
    pub fn snapshot(&self) -> SettingsSnapshot {
        SettingsSnapshot {
            layout: self.layout.clone(),
            theme: self.theme.clone(),
            branding: self.branding.clone(),
            announcement_bar: self.announcement_bar.clone(),
        }
    }

    /// Replace the editable parts wholesale
    pub fn apply_snapshot(&mut self, snapshot: SettingsSnapshot) {
        self.layout = snapshot.layout;
        self.theme = snapshot.theme;
        self.branding = snapshot.branding;
        self.announcement_bar = snapshot.announcement_bar;
        self.layout_schema_version = CURRENT_LAYOUT_SCHEMA_VERSION;
    }

    /// Replace only the parts present in `patch`
    pub fn apply_patch(&mut self, patch: SnapshotPatch) {
        if let Some(layout) = patch.layout {
            self.layout = crate::normalize_layout(&layout);
            self.layout_schema_version = CURRENT_LAYOUT_SCHEMA_VERSION;
        }
        if let Some(theme) = patch.theme {
            self.theme = theme;
        }
        if let Some(branding) = patch.branding {
            self.branding = branding;
        }
        if let Some(announcement_bar) = patch.announcement_bar {
            self.announcement_bar = announcement_bar;
        }
    }

    /// Legacy `homeSections` view derived from the layout
    pub fn home_sections(&self) -> Props {
        derive_home_sections(&self.layout, &default_home_sections())
    }

    /// Go live with the current content
    pub fn publish(&mut self, now: DateTime<Utc>) {
        self.publish_workflow.publish(now);
        self.published_snapshot = Some(self.snapshot());
    }

    /// Re-publish in place if already live (after a restore or import)
    pub fn refresh_live(&mut self, now: DateTime<Utc>) {
        if self.publish_workflow.is_live() {
            self.publish(now);
        }
    }

    pub fn run_publish_check(&mut self, now: DateTime<Utc>) -> PublishCheck {
        let outcome = self.publish_workflow.check(now);
        if outcome.promoted() {
            self.published_snapshot = Some(self.snapshot());
        }
        outcome
    }

    /// The snapshot to diff against; the current content if never published
    pub fn live_snapshot(&self) -> SettingsSnapshot {
        self.published_snapshot.clone().unwrap_or_else(|| self.snapshot())
    }

    pub fn diff_against_live(&self) -> LayoutDiff {
        diff_layouts(&self.layout, &self.live_snapshot().layout)
    }

    /// Record the current content in the version history
    pub fn append_version(&mut self, label: &str, now: DateTime<Utc>) -> &VersionEntry {
        self.current_version += 1;
        self.version_history.push(VersionEntry {
            id: format!("v{}", self.current_version),
            label: if label.trim().is_empty() { "Snapshot".to_string() } else { label.to_string() },
            saved_at: now,
            snapshot: self.snapshot(),
        });

        if self.version_history.len() > MAX_VERSION_HISTORY {
            let excess = self.version_history.len() - MAX_VERSION_HISTORY;
            self.version_history.drain(..excess);
        }

        &self.version_history[self.version_history.len() - 1]
    }

    pub fn find_version(&self, id: &str) -> Option<&VersionEntry> {
        self.version_history.iter().find(|entry| entry.id == id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workflow::PublishStatus;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 1, 9, 0, 0).unwrap()
    }

    #[test]
    fn test_defaults() {
        let settings = SiteSettings::default();
        assert_eq!(settings.layout.len(), 4);
        assert_eq!(settings.layout_schema_version, 2);
        assert_eq!(settings.publish_workflow.status, PublishStatus::Draft);
        assert!(settings.published_snapshot.is_none());
    }

    #[test]
    fn test_sparse_payload_gets_defaults() {
        let settings: SiteSettings = serde_json::from_value(json!({
            "layout": [{ "type": "hero", "title": "Inline" }],
            "theme": { "primaryColor": "#000" },
        }))
        .unwrap();

        assert_eq!(settings.layout[0].id, "hero-1");
        assert_eq!(settings.layout[0].data["title"], "Inline");
        assert_eq!(settings.branding["siteName"], "weBazaar");
        assert_eq!(settings.current_version, 0);
    }

    #[test]
    fn test_publish_snapshots_content() {
        let mut settings = SiteSettings::default();
        settings.publish(now());

        assert_eq!(settings.published_snapshot, Some(settings.snapshot()));
        assert!(settings.diff_against_live().is_empty());
    }

    #[test]
    fn test_version_history_is_bounded() {
        let mut settings = SiteSettings::default();
        for i in 0..(MAX_VERSION_HISTORY + 5) {
            settings.append_version(&format!("save {i}"), now());
        }

        assert_eq!(settings.version_history.len(), MAX_VERSION_HISTORY);
        assert_eq!(settings.current_version, (MAX_VERSION_HISTORY + 5) as u64);
        assert_eq!(settings.version_history[0].label, "save 5");
        assert!(settings.find_version("v1").is_none());
        assert!(settings.find_version("v55").is_some());
    }

    #[test]
    fn test_apply_patch_keeps_missing_parts() {
        let mut settings = SiteSettings::default();
        let branding = settings.branding.clone();

        let patch: SnapshotPatch = serde_json::from_value(json!({ "theme": { "primaryColor": "#111" } })).unwrap();
        settings.apply_patch(patch);

        assert_eq!(settings.theme["primaryColor"], "#111");
        assert_eq!(settings.branding, branding);
    }

    #[test]
    fn test_home_sections_view() {
        let mut settings = SiteSettings::default();
        settings.layout[0].set_enabled(false);

        let home = settings.home_sections();
        assert_eq!(home["heroSection"]["enabled"], false);
        assert_eq!(home["heroSection"]["title"], "New Collections 2026");
    }
}
