use crate::config::{ConfigError, DisplayConfig, SourceConfig, SpectrumConfig, ToneConfig};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

/// Contents of `config.toml`; every table is optional
#[derive(Debug, Default, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub source: SourceConfig,
    #[serde(default)]
    pub spectrum: SpectrumConfig,
    #[serde(default)]
    pub display: DisplayConfig,
    #[serde(default)]
    pub tone: ToneConfig,
}

impl Settings {
    /// Load from an explicit path, or from the per-user config file if present.
    /// Unreadable or malformed files fall back to defaults with a warning.
    pub fn load(explicit: Option<&Path>) -> Self {
        let path = match explicit {
            Some(p) => p.to_path_buf(),
            None => Self::config_path(),
        };
        if !path.exists() {
            if explicit.is_some() {
                log::warn!("Config file {} not found, using defaults", path.display());
            }
            return Self::default();
        }

        match fs::read_to_string(&path) {
            Ok(content) => match Self::parse(&content) {
                Ok(settings) => {
                    log::info!("Loaded config from {}", path.display());
                    settings
                }
                Err(e) => {
                    log::warn!("Failed to parse {}: {}", path.display(), e);
                    Self::default()
                }
            },
            Err(e) => {
                log::warn!("Failed to read {}: {}", path.display(), e);
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
            .join("specan")
            .join("config.toml")
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.source.validate()?;
        self.spectrum.validate()?;
        self.display.validate()
    }
}
