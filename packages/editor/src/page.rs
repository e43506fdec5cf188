//! # Visual Page Editor
//!
//! Edits a working copy of the site settings: the section list, theme,
//! branding and announcement bar. The working copy is only written back
//! through the [`SettingsService`] on save, schedule or publish.
//!
//! Every change to the working copy is pushed to the attached preview sink
//! as a partial update. The preview can ask to open a section by clicking
//! it.

use crate::preview::{PreviewMessage, PreviewSink, PreviewUpdate, SectionClick};
use crate::EditorError;
use chrono::{DateTime, Utc};
use serde::de::Error as _;
use serde_json::Value;
use storefront_blocks::{normalize_nodes, BlockNode, IdGenerator, Props};
use storefront_layout::section::{self, template_for};
use storefront_layout::{
    diff_layouts, HistoryItem, LayoutDiff, PublishCheck, Section, SectionType, SettingsService, SettingsSnapshot,
    SettingsStore,
};
use tracing::{debug, info, warn};

pub struct VisualEditor<S: SettingsStore> {
    service: SettingsService<S>,
    draft: SettingsSnapshot,
    editing: Option<String>,
    ids: IdGenerator,
    preview: Option<Box<dyn PreviewSink>>,
}

impl<S: SettingsStore> VisualEditor<S> {
    pub fn open(store: S) -> Result<Self, EditorError> {
        Self::with_ids(store, IdGenerator::session().with_prefix("section"))
    }

    pub fn with_ids(store: S, ids: IdGenerator) -> Result<Self, EditorError> {
        let service = SettingsService::open(store)?;
        let draft = service.settings().snapshot();
        Ok(Self {
            service,
            draft,
            editing: None,
            ids,
            preview: None,
        })
    }

    /// Attach a preview sink and send it the full working copy
    pub fn attach_preview(&mut self, sink: impl PreviewSink + 'static) {
        self.preview = Some(Box::new(sink));
        self.notify(PreviewUpdate {
            layout: Some(self.draft.layout.clone()),
            theme: Some(self.draft.theme.clone()),
            branding: Some(self.draft.branding.clone()),
            announcement_bar: Some(self.draft.announcement_bar.clone()),
        });
    }

    fn notify(&self, update: PreviewUpdate) {
        if let Some(sink) = &self.preview {
            if let Err(err) = sink.notify(update) {
                warn!(%err, "preview update dropped");
            }
        }
    }

    fn notify_layout(&self) {
        self.notify(PreviewUpdate::layout(self.draft.layout.clone()));
    }

    pub fn service(&self) -> &SettingsService<S> {
        &self.service
    }

    pub fn draft(&self) -> &SettingsSnapshot {
        &self.draft
    }

    pub fn layout(&self) -> &[Section] {
        &self.draft.layout
    }

    pub fn section(&self, id: &str) -> Option<&Section> {
        self.draft.layout.iter().find(|section| section.id == id)
    }

    /// Working copy differs from the saved settings
    pub fn is_dirty(&self) -> bool {
        self.draft != self.service.settings().snapshot()
    }

    // Sections

    pub fn editing(&self) -> Option<&Section> {
        self.editing.as_deref().and_then(|id| self.section(id))
    }

    pub fn open_section(&mut self, id: &str) -> Result<(), EditorError> {
        if self.section(id).is_none() {
            return Err(EditorError::SectionNotFound(id.to_string()));
        }
        self.editing = Some(id.to_string());
        Ok(())
    }

    pub fn close_section(&mut self) {
        self.editing = None;
    }

    /// Append a section built from the template for `kind` and open it
    pub fn add_section(&mut self, kind: &SectionType) -> Result<String, EditorError> {
        let template = template_for(kind).ok_or_else(|| EditorError::SectionNotFound(kind.to_string()))?;
        let id = format!("{}-{}", kind.as_str(), self.ids.new_id());
        self.draft.layout = section::add_section(&self.draft.layout, &template, id.clone());
        self.editing = Some(id.clone());
        info!(id = %id, "section added");
        self.notify_layout();
        Ok(id)
    }

    pub fn toggle_section(&mut self, id: &str) -> Result<(), EditorError> {
        self.require(id)?;
        self.draft.layout = section::toggle_section(&self.draft.layout, id);
        self.notify_layout();
        Ok(())
    }

    pub fn remove_section(&mut self, id: &str) -> Result<(), EditorError> {
        self.require(id)?;
        self.draft.layout = section::remove_section(&self.draft.layout, id);
        if self.editing.as_deref() == Some(id) {
            self.editing = None;
        }
        info!(id, "section removed");
        self.notify_layout();
        Ok(())
    }

    pub fn update_section_data(&mut self, id: &str, data: Props) -> Result<(), EditorError> {
        self.require(id)?;
        self.draft.layout = section::update_section_data(&self.draft.layout, id, data);
        self.notify_layout();
        Ok(())
    }

    /// Replace a section's data from JSON text; invalid JSON or a
    /// non-object leaves the section untouched
    pub fn update_section_json(&mut self, id: &str, json: &str) -> Result<(), EditorError> {
        self.require(id)?;
        let data = match serde_json::from_str(json)? {
            Value::Object(map) => map,
            _ => return Err(serde_json::Error::custom("section data must be a JSON object").into()),
        };
        self.update_section_data(id, data)
    }

    /// Merge `partial` into every section of `kind`
    pub fn merge_section_data(&mut self, kind: &SectionType, partial: &Props) {
        self.draft.layout = section::merge_section_data(&self.draft.layout, kind, partial);
        self.notify_layout();
    }

    pub fn reorder_sections(&mut self, active_id: &str, over_id: &str) {
        let next = section::reorder_sections(&self.draft.layout, active_id, over_id);
        if next != self.draft.layout {
            self.draft.layout = next;
            self.notify_layout();
        } else {
            debug!(active_id, over_id, "section reorder ignored");
        }
    }

    fn require(&self, id: &str) -> Result<(), EditorError> {
        match self.section(id) {
            Some(_) => Ok(()),
            None => Err(EditorError::SectionNotFound(id.to_string())),
        }
    }

    // Section blocks

    /// Normalized block forest of a section, for an edit session
    pub fn open_blocks(&mut self, id: &str) -> Result<Vec<BlockNode>, EditorError> {
        let section = self
            .draft
            .layout
            .iter()
            .find(|section| section.id == id)
            .ok_or_else(|| EditorError::SectionNotFound(id.to_string()))?;
        Ok(section.blocks(&mut self.ids))
    }

    /// Write a block forest back into a section's data
    pub fn commit_blocks(&mut self, id: &str, blocks: &[BlockNode]) -> Result<(), EditorError> {
        let blocks = normalize_nodes(blocks, &mut self.ids);
        let section = self
            .draft
            .layout
            .iter_mut()
            .find(|section| section.id == id)
            .ok_or_else(|| EditorError::SectionNotFound(id.to_string()))?;
        section.set_blocks(&blocks)?;
        debug!(id, blocks = blocks.len(), "section blocks committed");
        self.notify_layout();
        Ok(())
    }

    // Theme and branding

    pub fn update_theme(&mut self, partial: Props) {
        self.draft.theme.extend(partial);
        self.notify(PreviewUpdate {
            theme: Some(self.draft.theme.clone()),
            ..PreviewUpdate::default()
        });
    }

    pub fn update_branding(&mut self, partial: Props) {
        self.draft.branding.extend(partial);
        self.notify(PreviewUpdate {
            branding: Some(self.draft.branding.clone()),
            ..PreviewUpdate::default()
        });
    }

    pub fn update_announcement_bar(&mut self, partial: Props) {
        self.draft.announcement_bar.extend(partial);
        self.notify(PreviewUpdate {
            announcement_bar: Some(self.draft.announcement_bar.clone()),
            ..PreviewUpdate::default()
        });
    }

    // Preview

    /// React to an inbound preview message; returns the opened section id
    pub fn handle_preview_message(&mut self, message: &PreviewMessage) -> Option<String> {
        let PreviewMessage::SectionClicked(SectionClick { id, section_type }) = message else {
            return None;
        };

        let by_id = id.as_deref().and_then(|id| self.section(id));
        let by_type = || {
            section_type.as_deref().and_then(|kind| {
                let kind = SectionType::from(kind);
                self.draft.layout.iter().find(|section| section.kind == kind)
            })
        };
        let opened = by_id.or_else(by_type)?.id.clone();

        debug!(id = %opened, "opened from preview");
        self.editing = Some(opened.clone());
        Some(opened)
    }

    // Persistence

    /// Draft versus the live snapshot
    pub fn diff(&self) -> LayoutDiff {
        let live = self.service.settings().live_snapshot();
        diff_layouts(&self.draft.layout, &live.layout)
    }

    fn reload(&mut self) {
        self.draft = self.service.settings().snapshot();
        if self.editing.as_deref().is_some_and(|id| self.section(id).is_none()) {
            self.editing = None;
        }
        let draft = &self.draft;
        self.notify(PreviewUpdate {
            layout: Some(draft.layout.clone()),
            theme: Some(draft.theme.clone()),
            branding: Some(draft.branding.clone()),
            announcement_bar: Some(draft.announcement_bar.clone()),
        });
    }

    pub fn save_draft(&mut self, label: Option<&str>, now: DateTime<Utc>) -> Result<(), EditorError> {
        self.service.save_draft(self.draft.clone(), label, now)?;
        Ok(())
    }

    fn save_if_dirty(&mut self, now: DateTime<Utc>) -> Result<(), EditorError> {
        if self.is_dirty() {
            self.save_draft(None, now)?;
        }
        Ok(())
    }

    pub fn schedule_publish(&mut self, at: Option<DateTime<Utc>>, now: DateTime<Utc>) -> Result<(), EditorError> {
        if at.is_none() {
            return Err(storefront_layout::LayoutError::MissingSchedule.into());
        }
        self.save_if_dirty(now)?;
        self.service.schedule_publish(at, now)?;
        Ok(())
    }

    pub fn publish_now(&mut self, now: DateTime<Utc>) -> Result<(), EditorError> {
        self.save_if_dirty(now)?;
        self.service.publish_now(now)?;
        Ok(())
    }

    pub fn run_publish_check(&mut self, now: DateTime<Utc>) -> Result<PublishCheck, EditorError> {
        Ok(self.service.run_publish_check(now)?)
    }

    pub fn reset_to_defaults(&mut self, confirmation: &str, now: DateTime<Utc>) -> Result<(), EditorError> {
        self.service.reset_to_defaults(confirmation, now)?;
        self.reload();
        Ok(())
    }

    pub fn history(&self) -> Vec<HistoryItem> {
        self.service.history()
    }

    pub fn restore(&mut self, id: &str, now: DateTime<Utc>) -> Result<(), EditorError> {
        self.service.restore(id, now)?;
        self.reload();
        Ok(())
    }

    pub fn export_theme(&self, now: DateTime<Utc>) -> Result<String, EditorError> {
        Ok(self.service.export_theme(now)?)
    }

    pub fn import_theme(&mut self, json: &str, now: DateTime<Utc>) -> Result<(), EditorError> {
        self.service.import_theme(json, now)?;
        self.reload();
        Ok(())
    }
}
