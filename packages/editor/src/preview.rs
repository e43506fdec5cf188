//! # Preview Channel
//!
//! One-way updates to a live preview surface, and the single inbound
//! message it may send back.
//!
//! Updates are partial: each field present replaces the receiver's copy.
//! [`PreviewDebouncer`] coalesces bursts of edits into one outbound update
//! after a quiet window (trailing edge). Later fields win.
//!
//! ```text
//! editor ──notify──▶ debouncer task ──(quiet 180ms)──▶ PreviewMessage::Update
//! preview ──SectionClicked { id, sectionType }──▶ editor
//! ```

use crate::EditorError;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use storefront_blocks::Props;
use storefront_layout::Section;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::debug;

/// Quiet period before a coalesced update goes out
pub const PREVIEW_DEBOUNCE: Duration = Duration::from_millis(180);

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PreviewUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub layout: Option<Vec<Section>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub theme: Option<Props>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub branding: Option<Props>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub announcement_bar: Option<Props>,
}

impl PreviewUpdate {
    pub fn layout(layout: Vec<Section>) -> Self {
        Self {
            layout: Some(layout),
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.layout.is_none() && self.theme.is_none() && self.branding.is_none() && self.announcement_bar.is_none()
    }

    /// Fold a later update into this one
    pub fn merge(&mut self, later: PreviewUpdate) {
        if later.layout.is_some() {
            self.layout = later.layout;
        }
        if later.theme.is_some() {
            self.theme = later.theme;
        }
        if later.branding.is_some() {
            self.branding = later.branding;
        }
        if later.announcement_bar.is_some() {
            self.announcement_bar = later.announcement_bar;
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SectionClick {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub section_type: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload", rename_all = "camelCase")]
pub enum PreviewMessage {
    Update(PreviewUpdate),
    SectionClicked(SectionClick),
}

impl PreviewMessage {
    pub fn parse(json: &str) -> Result<Self, EditorError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json(&self) -> Result<String, EditorError> {
        Ok(serde_json::to_string(self)?)
    }
}

/// Destination for preview updates
pub trait PreviewSink {
    fn notify(&self, update: PreviewUpdate) -> Result<(), EditorError>;
}

impl PreviewSink for mpsc::UnboundedSender<PreviewUpdate> {
    fn notify(&self, update: PreviewUpdate) -> Result<(), EditorError> {
        self.send(update).map_err(|_| EditorError::PreviewClosed)
    }
}

/// Trailing-edge debouncer running on the tokio runtime
pub struct PreviewDebouncer {
    tx: mpsc::UnboundedSender<PreviewUpdate>,
    handle: JoinHandle<()>,
}

impl PreviewDebouncer {
    /// Spawn the debounce task; must be called inside a tokio runtime
    pub fn spawn(window: Duration, out: mpsc::UnboundedSender<PreviewMessage>) -> Self {
        let (tx, mut rx) = mpsc::unbounded_channel::<PreviewUpdate>();

        let handle = tokio::spawn(async move {
            while let Some(first) = rx.recv().await {
                let mut pending = first;
                let mut coalesced = 1usize;
                loop {
                    match tokio::time::timeout(window, rx.recv()).await {
                        Ok(Some(next)) => {
                            pending.merge(next);
                            coalesced += 1;
                        }
                        Ok(None) => {
                            debug!(coalesced, "flushing preview update on shutdown");
                            let _ = out.send(PreviewMessage::Update(pending));
                            return;
                        }
                        Err(_) => break,
                    }
                }

                debug!(coalesced, "sending preview update");
                if out.send(PreviewMessage::Update(pending)).is_err() {
                    debug!("preview receiver dropped");
                    return;
                }
            }
        });

        Self { tx, handle }
    }

    /// Stop accepting updates and wait for the last one to flush
    pub async fn shutdown(self) {
        drop(self.tx);
        let _ = self.handle.await;
    }
}

impl PreviewSink for PreviewDebouncer {
    fn notify(&self, update: PreviewUpdate) -> Result<(), EditorError> {
        self.tx.notify(update)
    }
}
