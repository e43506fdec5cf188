//! # Settings Service
//!
//! Drives the publish workflow, version history and theme import/export
//! over a [`SettingsStore`].
//!
//! Every operation that changes settings persists them. If the store fails,
//! the in-memory settings keep the change so the caller can retry.
//! Validation failures (missing schedule, unconfirmed reset, malformed
//! import) return before anything is touched.

use crate::settings::{SettingsSnapshot, SnapshotPatch, VersionEntry};
use crate::store::SettingsStore;
use crate::workflow::PublishCheck;
use crate::{LayoutError, Result, SiteSettings};
use chrono::{DateTime, Utc};
use serde::de::Error as _;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info};

/// Text a user must type to reset everything
pub const RESET_CONFIRMATION: &str = "RESET";

const DEFAULT_SAVE_LABEL: &str = "Manual save";

/// History listing row, newest first
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryItem {
    pub id: String,
    pub label: String,
    pub saved_at: DateTime<Utc>,
}

impl From<&VersionEntry> for HistoryItem {
    fn from(entry: &VersionEntry) -> Self {
        Self {
            id: entry.id.clone(),
            label: entry.label.clone(),
            saved_at: entry.saved_at,
        }
    }
}

/// Downloadable theme document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ThemeExport {
    pub exported_at: DateTime<Utc>,
    pub version: u64,
    pub settings: SettingsSnapshot,
}

pub struct SettingsService<S: SettingsStore> {
    store: S,
    settings: SiteSettings,
}

impl<S: SettingsStore> SettingsService<S> {
    pub fn open(store: S) -> Result<Self> {
        let settings = store.load()?;
        debug!(
            version = settings.current_version,
            status = settings.publish_workflow.status.as_str(),
            "settings loaded"
        );
        Ok(Self { store, settings })
    }

    pub fn settings(&self) -> &SiteSettings {
        &self.settings
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Replace in-memory settings with what the store holds now
    pub fn reload(&mut self) -> Result<()> {
        self.settings = self.store.load()?;
        Ok(())
    }

    fn persist(&mut self) -> Result<()> {
        self.store.save(&self.settings)
    }

    fn record(&mut self, label: &str, now: DateTime<Utc>) -> Result<()> {
        self.settings.append_version(label, now);
        self.persist()
    }

    /// Save editor content as a draft; the live snapshot is untouched
    pub fn save_draft(&mut self, draft: SettingsSnapshot, label: Option<&str>, now: DateTime<Utc>) -> Result<()> {
        self.settings.apply_snapshot(draft);
        self.settings.publish_workflow.mark_draft(now);
        info!("draft saved");
        self.record(label.unwrap_or(DEFAULT_SAVE_LABEL), now)
    }

    pub fn schedule_publish(&mut self, at: Option<DateTime<Utc>>, now: DateTime<Utc>) -> Result<()> {
        self.settings.publish_workflow.schedule(at, now)?;
        self.record("Scheduled publish", now)
    }

    pub fn publish_now(&mut self, now: DateTime<Utc>) -> Result<()> {
        self.settings.publish(now);
        info!(published_at = %now, "published");
        self.record("Publish", now)
    }

    /// Safe to call repeatedly; persists only on promotion
    pub fn run_publish_check(&mut self, now: DateTime<Utc>) -> Result<PublishCheck> {
        let outcome = self.settings.run_publish_check(now);
        if outcome.promoted() {
            self.persist()?;
        } else {
            debug!(?outcome, "publish check");
        }
        Ok(outcome)
    }

    /// Restore factory content and go live, gated on [`RESET_CONFIRMATION`]
    pub fn reset_to_defaults(&mut self, confirmation: &str, now: DateTime<Utc>) -> Result<()> {
        if confirmation != RESET_CONFIRMATION {
            return Err(LayoutError::ResetNotConfirmed {
                expected: RESET_CONFIRMATION,
            });
        }

        self.settings.apply_snapshot(SettingsSnapshot::default());
        self.settings.publish(now);
        info!("settings reset to defaults");
        self.record("Reset to defaults", now)
    }

    pub fn history(&self) -> Vec<HistoryItem> {
        self.settings
            .version_history
            .iter()
            .rev()
            .map(HistoryItem::from)
            .collect()
    }

    pub fn restore(&mut self, id: &str, now: DateTime<Utc>) -> Result<()> {
        let entry = self
            .settings
            .find_version(id)
            .cloned()
            .ok_or_else(|| LayoutError::HistoryEntryNotFound(id.to_string()))?;

        self.settings.apply_snapshot(entry.snapshot);
        self.settings.refresh_live(now);
        info!(id, label = %entry.label, "version restored");
        self.record(&format!("Restore: {}", entry.label), now)
    }

    pub fn export_theme(&self, now: DateTime<Utc>) -> Result<String> {
        let export = ThemeExport {
            exported_at: now,
            version: self.settings.current_version.max(1),
            settings: self.settings.snapshot(),
        };
        Ok(serde_json::to_string_pretty(&export)?)
    }

    /// Import an exported document or a bare snapshot
    pub fn import_theme(&mut self, json: &str, now: DateTime<Utc>) -> Result<()> {
        let raw: Value = serde_json::from_str(json)?;
        let label = raw
            .get("label")
            .and_then(Value::as_str)
            .unwrap_or("Imported JSON")
            .to_string();
        let body = match raw.get("settings") {
            Some(settings) if settings.is_object() => settings.clone(),
            _ => raw,
        };
        if !body.is_object() {
            return Err(serde_json::Error::custom("expected a settings object").into());
        }
        let patch: SnapshotPatch = serde_json::from_value(body)?;

        self.settings.apply_patch(patch);
        self.settings.refresh_live(now);
        info!(label = %label, "theme imported");
        self.record(&label, now)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use crate::workflow::PublishStatus;
    use chrono::{Duration, TimeZone};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 1, 9, 0, 0).unwrap()
    }

    fn service() -> SettingsService<MemoryStore> {
        SettingsService::open(MemoryStore::new()).unwrap()
    }

    #[test]
    fn test_save_draft_leaves_live_snapshot() {
        let mut svc = service();
        svc.publish_now(now()).unwrap();
        let live = svc.settings().published_snapshot.clone();

        let mut draft = svc.settings().snapshot();
        draft.theme.insert("primaryColor".into(), "#123456".into());
        svc.save_draft(draft, None, now()).unwrap();

        assert_eq!(svc.settings().publish_workflow.status, PublishStatus::Draft);
        assert_eq!(svc.settings().published_snapshot, live);
        assert_eq!(svc.settings().theme["primaryColor"], "#123456");
        assert_eq!(svc.history()[0].label, "Manual save");
    }

    #[test]
    fn test_schedule_without_time_touches_nothing() {
        let mut svc = service();
        let before = svc.settings().clone();

        assert!(matches!(svc.schedule_publish(None, now()), Err(LayoutError::MissingSchedule)));
        assert_eq!(svc.settings(), &before);
        assert_eq!(svc.store().saves(), 0);
    }

    #[test]
    fn test_not_due_check_does_not_persist() {
        let mut svc = service();
        svc.schedule_publish(Some(now() + Duration::hours(1)), now()).unwrap();
        let saves = svc.store().saves();

        let outcome = svc.run_publish_check(now()).unwrap();
        assert!(matches!(outcome, PublishCheck::NotDueYet { .. }));
        assert_eq!(svc.store().saves(), saves);
    }

    #[test]
    fn test_history_newest_first_and_restore() {
        let mut svc = service();
        let mut draft = svc.settings().snapshot();
        draft.branding.insert("siteName".into(), "First".into());
        svc.save_draft(draft.clone(), Some("first"), now()).unwrap();

        draft.branding.insert("siteName".into(), "Second".into());
        svc.save_draft(draft, Some("second"), now()).unwrap();

        let history = svc.history();
        assert_eq!(history[0].label, "second");
        assert_eq!(history[1].label, "first");

        svc.restore(&history[1].id, now()).unwrap();
        assert_eq!(svc.settings().branding["siteName"], "First");
        assert_eq!(svc.history()[0].label, "Restore: first");
    }

    #[test]
    fn test_restore_unknown_id() {
        let mut svc = service();
        let err = svc.restore("v404", now()).unwrap_err();
        assert!(matches!(err, LayoutError::HistoryEntryNotFound(id) if id == "v404"));
    }

    #[test]
    fn test_restore_republishes_when_live() {
        let mut svc = service();
        svc.publish_now(now()).unwrap();
        let first = svc.history()[0].id.clone();

        let mut draft = svc.settings().snapshot();
        draft.theme.insert("fontFamily".into(), "serif".into());
        svc.save_draft(draft, None, now()).unwrap();
        svc.publish_now(now()).unwrap();

        svc.restore(&first, now()).unwrap();
        let live = svc.settings().published_snapshot.clone().unwrap();
        assert_eq!(live.theme["fontFamily"], "var(--font-inter)");
    }

    #[test]
    fn test_export_import_round_trip() {
        let mut source = service();
        let mut draft = source.settings().snapshot();
        draft.announcement_bar.insert("text".into(), "Free shipping".into());
        source.save_draft(draft, None, now()).unwrap();
        let exported = source.export_theme(now()).unwrap();

        let mut target = service();
        target.import_theme(&exported, now()).unwrap();

        assert_eq!(target.settings().snapshot(), source.settings().snapshot());
        assert_eq!(target.history()[0].label, "Imported JSON");
    }

    #[test]
    fn test_import_bare_snapshot_replaces_provided_parts() {
        let mut svc = service();
        let layout = svc.settings().layout.clone();

        svc.import_theme(r##"{ "theme": { "primaryColor": "#fff" }, "label": "Brand kit" }"##, now())
            .unwrap();

        assert_eq!(svc.settings().theme["primaryColor"], "#fff");
        assert_eq!(svc.settings().layout, layout);
        assert_eq!(svc.history()[0].label, "Brand kit");
    }

    #[test]
    fn test_reload_picks_up_external_writes() {
        let mut svc = service();
        let mut other = SettingsService::open(MemoryStore::with_settings(svc.settings().clone())).unwrap();
        other.publish_now(now()).unwrap();

        svc.store = MemoryStore::with_settings(other.settings().clone());
        svc.reload().unwrap();
        assert_eq!(svc.settings().publish_workflow.status, PublishStatus::Live);
    }

    #[test]
    fn test_import_malformed_json_is_rejected() {
        let mut svc = service();
        let before = svc.settings().clone();

        assert!(matches!(svc.import_theme("{ nope", now()), Err(LayoutError::InvalidJson(_))));
        assert!(matches!(svc.import_theme("[1, 2]", now()), Err(LayoutError::InvalidJson(_))));
        assert_eq!(svc.settings(), &before);
    }
}
