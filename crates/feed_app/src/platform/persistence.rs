use std::path::{Path, PathBuf};

use feed_core::FeedConfig;
use feed_engine::{AtomicFileWriter, EngineConfig, FetchSettings};
use feed_logging::{feed_error, feed_info, feed_warn};
use serde::{Deserialize, Serialize};

pub const SETTINGS_FILENAME: &str = "reader_settings.ron";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppSettings {
    pub instance_url: String,
    pub auth_token: Option<String>,
    pub feed: FeedConfig,
    pub fetch: FetchSettings,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            instance_url: "https://lemmy.ml".to_string(),
            auth_token: None,
            feed: FeedConfig::default(),
            fetch: FetchSettings::default(),
        }
    }
}

impl AppSettings {
    pub fn engine_config(&self) -> EngineConfig {
        EngineConfig {
            instance_url: self.instance_url.clone(),
            auth_token: self.auth_token.clone(),
            fetch: self.fetch.clone(),
        }
    }
}

/// Settings file in `dir`, read once at start and rewritten on change.
pub struct SettingsStore {
    writer: AtomicFileWriter,
}

impl SettingsStore {
    pub fn in_dir(dir: &Path) -> Self {
        Self {
            writer: AtomicFileWriter::new(dir.join(SETTINGS_FILENAME)),
        }
    }

    fn path(&self) -> PathBuf {
        self.writer.path().to_path_buf()
    }

    /// Missing or malformed files fall back to defaults.
    pub fn load(&self) -> AppSettings {
        let path = self.path();
        let content = match self.writer.read() {
            Ok(Some(text)) => text,
            Ok(None) => return AppSettings::default(),
            Err(err) => {
                feed_warn!("Failed to read settings from {:?}: {}", path, err);
                return AppSettings::default();
            }
        };

        match ron::from_str(&content) {
            Ok(settings) => {
                feed_info!("Loaded settings from {:?}", path);
                settings
            }
            Err(err) => {
                feed_warn!("Failed to parse settings from {:?}: {}", path, err);
                AppSettings::default()
            }
        }
    }

    pub fn save(&self, settings: &AppSettings) {
        let pretty = ron::ser::PrettyConfig::new();
        let content = match ron::ser::to_string_pretty(settings, pretty) {
            Ok(text) => text,
            Err(err) => {
                feed_error!("Failed to serialize settings: {}", err);
                return;
            }
        };

        if let Err(err) = self.writer.write(&content) {
            feed_error!("Failed to write settings to {:?}: {}", self.path(), err);
        }
    }
}
