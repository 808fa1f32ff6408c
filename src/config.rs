//! User configuration loaded from `config.toml`.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

pub const APP_NAME: &str = "gridedit";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub editor: EditorSettings,

    #[serde(default)]
    pub logging: LoggingSettings,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EditorSettings {
    /// Spaces inserted for a Tab key press
    #[serde(default = "default_tab_size")]
    pub tab_size: usize,

    /// Seconds between background saves, 0 disables autosave
    #[serde(default)]
    pub autosave_secs: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingSettings {
    /// Log file path; defaults to the user data directory
    #[serde(default)]
    pub file_path: Option<String>,

    /// Minimum level: error, warn, info, debug, trace or off
    #[serde(default = "default_log_level")]
    pub level: String,
}

fn default_tab_size() -> usize {
    4
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for EditorSettings {
    fn default() -> Self {
        Self {
            tab_size: default_tab_size(),
            autosave_secs: 0,
        }
    }
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            file_path: None,
            level: default_log_level(),
        }
    }
}

impl Config {
    /// Load the config from the default location, falling back to defaults
    /// when no file exists.
    pub fn load() -> Result<Self> {
        match Self::default_path() {
            Some(path) => Self::load_from(&path),
            None => Ok(Self::default()),
        }
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)
            .with_context(|| format!("failed to read config {}", path.display()))?;
        toml::from_str(&content)
            .with_context(|| format!("failed to parse config {}", path.display()))
    }

    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join(APP_NAME).join("config.toml"))
    }

    pub fn log_path(&self) -> PathBuf {
        match &self.logging.file_path {
            Some(path) => PathBuf::from(path),
            None => dirs::data_local_dir()
                .unwrap_or_else(std::env::temp_dir)
                .join(APP_NAME)
                .join(format!("{APP_NAME}.log")),
        }
    }

    /// The configured level, or `Info` when the value is not recognised.
    pub fn log_level(&self) -> log::LevelFilter {
        self.logging.level.parse().unwrap_or(log::LevelFilter::Info)
    }
}
