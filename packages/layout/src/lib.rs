//! # Storefront Layout
//!
//! Page layout and publishing for the storefront visual builder.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────┐
//! │ SettingsService                              │
//! │  - save draft / schedule / publish / check   │
//! │  - reset (typed confirmation)                │
//! │  - version history, restore                  │
//! │  - theme export / import                     │
//! └──────────────────────────────────────────────┘
//!          ↑ polled by PublishWorker (tokio interval)
//!          ↓ owns                    ↓ persists via
//! ┌─────────────────────────┐  ┌─────────────────────────┐
//! │ SiteSettings            │  │ SettingsStore           │
//! │  - layout: [Section]    │  │  - JsonFileStore        │
//! │  - theme, branding, ... │  │  - MemoryStore          │
//! │  - PublishWorkflow      │  └─────────────────────────┘
//! │  - published snapshot   │
//! └─────────────────────────┘
//! ```
//!
//! Sections form a flat list; the block tree lives inside a section's
//! `data.blocks` and is handled by `storefront-blocks`.

mod diff;
mod error;
pub mod section;
pub mod service;
pub mod settings;
pub mod store;
pub mod workflow;
pub mod worker;

pub use diff::{diff_layouts, LayoutDiff};
pub use error::{LayoutError, Result};
pub use section::{
    derive_home_sections, normalize_layout, normalize_section, section_templates, Section, SectionTemplate,
    SectionType, CURRENT_LAYOUT_SCHEMA_VERSION,
};
pub use service::{HistoryItem, SettingsService, ThemeExport, RESET_CONFIRMATION};
pub use settings::{SettingsSnapshot, SiteSettings, SnapshotPatch, VersionEntry, MAX_VERSION_HISTORY};
pub use store::{JsonFileStore, MemoryStore, SettingsStore};
pub use worker::{PublishWorker, PUBLISH_CHECK_INTERVAL};
pub use workflow::{PublishCheck, PublishStatus, PublishWorkflow};
