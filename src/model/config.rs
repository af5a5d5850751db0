use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

use super::geometry::Insets;

const DEFAULTS: &str = include_str!("../../config/default.toml");

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct HandlerConfig {
    pub touch: TouchConfig,
    pub input: InputConfig,
    pub messages: MessagesConfig,
    pub logging: LoggingConfig,
}

/// Radius around the selection that still counts as a tap on it.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TouchConfig {
    pub left: f64,
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct InputConfig {
    /// Upward nudge applied to synthetic clicks in selection mode.
    pub line_bias: f64,
    /// Distance kept from a field's top and bottom edges when clamping.
    pub field_edge_inset: f64,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct MessagesConfig {
    pub text_copied: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub filter: String,
}

impl Default for TouchConfig {
    fn default() -> Self {
        Self {
            left: 12.0,
            top: 12.0,
            right: 12.0,
            bottom: 12.0,
        }
    }
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            line_bias: 1.0,
            field_edge_inset: 1.0,
        }
    }
}

impl Default for MessagesConfig {
    fn default() -> Self {
        Self {
            text_copied: "Text copied to clipboard".to_string(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "selection_handles=info,selhandles=info".to_string(),
        }
    }
}

impl TouchConfig {
    pub fn radius(&self) -> Insets {
        Insets {
            left: self.left,
            top: self.top,
            right: self.right,
            bottom: self.bottom,
        }
    }
}

impl HandlerConfig {
    /// Load configuration with layering: defaults → user config.
    pub fn load() -> Result<Self> {
        match user_config_path() {
            Some(path) if path.exists() => Self::load_from(&path),
            _ => Self::from_toml_str(DEFAULTS),
        }
    }

    /// Read a user file. Keys it leaves out keep their default values.
    pub fn load_from(path: &Path) -> Result<Self> {
        let user_str = fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        Self::from_toml_str(&user_str).with_context(|| format!("parsing {}", path.display()))
    }

    pub fn from_toml_str(source: &str) -> Result<Self> {
        Ok(toml::from_str(source)?)
    }
}

pub fn user_config_path() -> Option<PathBuf> {
    directories::ProjectDirs::from("", "", "selhandles")
        .map(|dirs| dirs.config_dir().join("config.toml"))
}
