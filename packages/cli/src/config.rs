use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const DEFAULT_CONFIG_NAME: &str = "storefront.config.json";

/// Storefront configuration file format
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    /// Site settings document (layout, theme, workflow, history)
    #[serde(default = "default_settings_path")]
    pub settings_path: String,

    /// Directory holding one JSON file per preset list
    #[serde(default = "default_presets_dir")]
    pub presets_dir: String,

    /// Undo depth for block edit sessions
    #[serde(default = "default_history_limit")]
    pub history_limit: usize,

    #[serde(default = "default_preview_debounce_ms")]
    pub preview_debounce_ms: u64,

    #[serde(default = "default_auto_expand_delay_ms")]
    pub auto_expand_delay_ms: u64,
}

fn default_settings_path() -> String {
    "storefront.settings.json".to_string()
}

fn default_presets_dir() -> String {
    ".storefront/presets".to_string()
}

fn default_history_limit() -> usize {
    storefront_editor::DEFAULT_MAX_LEVELS
}

fn default_preview_debounce_ms() -> u64 {
    storefront_editor::PREVIEW_DEBOUNCE.as_millis() as u64
}

fn default_auto_expand_delay_ms() -> u64 {
    storefront_editor::AUTO_EXPAND_DELAY.as_millis() as u64
}

impl Config {
    /// Load config from a directory
    pub fn load(cwd: &Path) -> anyhow::Result<Self> {
        let config_path = cwd.join(DEFAULT_CONFIG_NAME);

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            let config: Config = serde_json::from_str(&content)?;
            Ok(config)
        } else {
            Ok(Config::default())
        }
    }

    pub fn settings_path(&self, cwd: &Path) -> PathBuf {
        cwd.join(&self.settings_path)
    }

    pub fn presets_dir(&self, cwd: &Path) -> PathBuf {
        cwd.join(&self.presets_dir)
    }

    pub fn preview_debounce(&self) -> Duration {
        Duration::from_millis(self.preview_debounce_ms)
    }

    pub fn auto_expand_delay(&self) -> Duration {
        Duration::from_millis(self.auto_expand_delay_ms)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            settings_path: default_settings_path(),
            presets_dir: default_presets_dir(),
            history_limit: default_history_limit(),
            preview_debounce_ms: default_preview_debounce_ms(),
            auto_expand_delay_ms: default_auto_expand_delay_ms(),
        }
    }
}
