use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::style::ThemeMode;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("reading {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("toml: {0}")]
    Toml(#[from] toml::de::Error),
}

/// Tunables for one viewer instance. Every field has a default, so a config
/// file only needs the keys it overrides.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewerConfig {
    /// Gap above each row, CSS pixels.
    pub border_width: f64,
    /// Inner label padding, CSS pixels.
    pub padding: f64,
    /// Label font size, CSS pixels.
    pub font_size: f64,
    /// Labels narrower than this (device pixels) are not drawn.
    pub min_label_width: f64,
    /// Distance between pointer and tooltip, CSS pixels.
    pub tooltip_offset: f64,
    /// Caption of the selection dropdown.
    pub selector_label: String,
    pub theme: ThemeMode,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            border_width: 2.0,
            padding: 2.0,
            font_size: 12.0,
            min_label_width: 10.0,
            tooltip_offset: 10.0,
            selector_label: "Thread".to_string(),
            theme: ThemeMode::Dark,
        }
    }
}

impl ViewerConfig {
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(text)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let config = Self::from_toml_str(&text)?;
        log::debug!("loaded viewer config from {}", path.display());
        Ok(config)
    }

    /// Settings for a character-cell host: no borders or padding, one cell
    /// per row and a narrower label threshold.
    pub fn terminal() -> Self {
        Self {
            border_width: 0.0,
            padding: 0.0,
            font_size: 1.0,
            min_label_width: 3.0,
            tooltip_offset: 1.0,
            ..Self::default()
        }
    }
}
