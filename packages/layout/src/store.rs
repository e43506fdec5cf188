//! # Settings Storage
//!
//! [`SettingsStore`] is the persistence boundary for [`SiteSettings`].
//!
//! ## Implementations
//!
//! - [`JsonFileStore`]: one pretty-printed JSON document on disk
//! - [`MemoryStore`]: for exercising the workflow without I/O; counts
//!   round-trips so callers can assert that nothing was written

use crate::{Result, SiteSettings};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

pub trait SettingsStore {
    /// Load stored settings, or defaults if nothing has been saved yet
    fn load(&self) -> Result<SiteSettings>;

    /// Replace the stored settings
    fn save(&mut self, settings: &SiteSettings) -> Result<()>;
}

#[derive(Debug, Default)]
pub struct MemoryStore {
    settings: Option<SiteSettings>,
    saves: usize,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_settings(settings: SiteSettings) -> Self {
        Self {
            settings: Some(settings),
            saves: 0,
        }
    }

    /// Number of `save` calls so far
    pub fn saves(&self) -> usize {
        self.saves
    }

    pub fn stored(&self) -> Option<&SiteSettings> {
        self.settings.as_ref()
    }
}

impl SettingsStore for MemoryStore {
    fn load(&self) -> Result<SiteSettings> {
        Ok(self.settings.clone().unwrap_or_default())
    }

    fn save(&mut self, settings: &SiteSettings) -> Result<()> {
        self.saves += 1;
        self.settings = Some(settings.clone());
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SettingsStore for JsonFileStore {
    fn load(&self) -> Result<SiteSettings> {
        if !self.path.exists() {
            debug!(path = %self.path.display(), "no settings file, using defaults");
            return Ok(SiteSettings::default());
        }
        let content = fs::read_to_string(&self.path)?;
        Ok(serde_json::from_str(&content)?)
    }

    fn save(&mut self, settings: &SiteSettings) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        let content = serde_json::to_string_pretty(settings)?;
        fs::write(&self.path, content)?;
        debug!(path = %self.path.display(), "settings saved");
        Ok(())
    }
}
