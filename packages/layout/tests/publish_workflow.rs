//! End-to-end publish workflow scenarios against the in-memory and file stores

use chrono::{DateTime, Duration, TimeZone, Utc};
use storefront_layout::{
    JsonFileStore, LayoutError, MemoryStore, PublishCheck, PublishStatus, SettingsService, SettingsStore, SiteSettings,
    RESET_CONFIRMATION,
};
use tempfile::TempDir;

fn at(hour: u32, minute: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, 1, hour, minute, 0).unwrap()
}

#[test]
fn scheduled_publish_is_promoted_once() {
    let mut svc = SettingsService::open(MemoryStore::new()).unwrap();

    let mut draft = svc.settings().snapshot();
    draft.layout[0].data.insert("title".into(), "Spring drop".into());
    svc.save_draft(draft, None, at(8, 0)).unwrap();
    svc.schedule_publish(Some(at(9, 0)), at(8, 5)).unwrap();

    let check_time = at(9, 30);
    let outcome = svc.run_publish_check(check_time).unwrap();

    assert_eq!(outcome, PublishCheck::Promoted { published_at: check_time });
    let settings = svc.settings();
    assert_eq!(settings.publish_workflow.status, PublishStatus::Live);
    assert_eq!(settings.publish_workflow.published_at, Some(check_time));
    assert_eq!(settings.publish_workflow.scheduled_at, None);
    assert_eq!(settings.published_snapshot, Some(settings.snapshot()));

    let saves = svc.store().saves();
    let again = svc.run_publish_check(check_time + Duration::seconds(1)).unwrap();
    assert_eq!(again, PublishCheck::NotScheduled);
    assert_eq!(svc.settings().publish_workflow.published_at, Some(check_time));
    assert_eq!(svc.store().saves(), saves);
}

#[test]
fn reset_requires_exact_token() {
    let mut svc = SettingsService::open(MemoryStore::new()).unwrap();

    let mut draft = svc.settings().snapshot();
    draft.theme.insert("primaryColor".into(), "#ff0000".into());
    draft.branding.insert("siteName".into(), "Custom".into());
    svc.save_draft(draft, None, at(8, 0)).unwrap();

    let before = svc.settings().clone();
    let saves = svc.store().saves();

    for attempt in ["", "reset", "RESET ", "yes"] {
        let err = svc.reset_to_defaults(attempt, at(9, 0)).unwrap_err();
        assert!(matches!(err, LayoutError::ResetNotConfirmed { .. }));
    }

    assert_eq!(svc.settings(), &before);
    assert_eq!(svc.store().saves(), saves);

    svc.reset_to_defaults(RESET_CONFIRMATION, at(9, 0)).unwrap();
    let defaults = SiteSettings::default();
    assert_eq!(svc.settings().theme, defaults.theme);
    assert_eq!(svc.settings().branding, defaults.branding);
    assert_eq!(svc.settings().publish_workflow.status, PublishStatus::Live);
}

#[test]
fn saved_then_published_layout_has_no_diff() {
    let mut svc = SettingsService::open(MemoryStore::new()).unwrap();

    let mut draft = svc.settings().snapshot();
    draft.layout.remove(2);
    draft.layout[0].set_enabled(false);
    svc.save_draft(draft, None, at(8, 0)).unwrap();
    svc.publish_now(at(8, 1)).unwrap();

    let diff = svc.settings().diff_against_live();
    assert_eq!(diff.changed_sections, 0);
    assert_eq!(diff.changed_field_groups, 0);
}

#[test]
fn editing_after_publish_reopens_a_draft() {
    let mut svc = SettingsService::open(MemoryStore::new()).unwrap();
    svc.publish_now(at(8, 0)).unwrap();

    let mut draft = svc.settings().snapshot();
    draft.layout[1].data.insert("productLimit".into(), 12.into());
    svc.save_draft(draft, None, at(8, 30)).unwrap();

    assert_eq!(svc.settings().publish_workflow.status, PublishStatus::Draft);
    let diff = svc.settings().diff_against_live();
    assert_eq!(diff.changed_sections, 1);
    assert_eq!(diff.changed_field_groups, svc.settings().layout[1].data.len());
}

#[test]
fn file_store_survives_reopen() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("storefront.settings.json");

    {
        let mut svc = SettingsService::open(JsonFileStore::new(&path)).unwrap();
        svc.schedule_publish(Some(at(10, 0)), at(9, 0)).unwrap();
    }

    let mut svc = SettingsService::open(JsonFileStore::new(&path)).unwrap();
    assert_eq!(svc.settings().publish_workflow.status, PublishStatus::Scheduled);
    assert_eq!(svc.settings().publish_workflow.scheduled_at, Some(at(10, 0)));

    assert!(svc.run_publish_check(at(10, 0)).unwrap().promoted());

    let reloaded = JsonFileStore::new(&path).load().unwrap();
    assert_eq!(reloaded.publish_workflow.status, PublishStatus::Live);
    let labels: Vec<_> = reloaded.version_history.iter().map(|entry| entry.label.as_str()).collect();
    assert_eq!(labels, vec!["Scheduled publish"]);
}
