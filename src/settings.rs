use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Default, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub visualizer: VisualizerSettings,
}

/// `[visualizer]` table; anything left out falls back to the CLI defaults
#[derive(Debug, Default, Deserialize, PartialEq)]
pub struct VisualizerSettings {
    pub source: Option<String>, // system, mic, synth, none
    pub mode: Option<String>,   // bloom, snowflake, spores, flow or 0-3
    pub time_step: Option<f32>, // seconds per frame
    pub scale: Option<f32>,     // braille dots per canvas unit
}

impl Settings {
    pub fn load() -> Self {
        Self::load_from(&Self::config_path())
    }

    /// Read settings from `path`; a missing or malformed file gives defaults
    pub fn load_from(path: &Path) -> Self {
        if !path.exists() {
            return Self::default();
        }

        match fs::read_to_string(path) {
            Ok(content) => Self::parse(&content).unwrap_or_else(|e| {
                tracing::warn!(path = %path.display(), "ignoring malformed settings: {}", e);
                Self::default()
            }),
            Err(e) => {
                tracing::warn!(path = %path.display(), "cannot read settings: {}", e);
                Self::default()
            }
        }
    }

    pub fn parse(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("audiobloom")
            .join("config.toml")
    }
}
