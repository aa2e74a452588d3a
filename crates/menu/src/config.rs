//! User configuration for the forge choice menu, persisted as TOML.

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;
use tracing::{debug, warn};

/// Errors reading or writing the configuration file.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write config {path}: {source}")]
    Write {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),
}

/// When the carousel shows the hovered option's tooltip.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum TooltipBehavior {
    /// Never.
    Off,
    /// Always.
    On,
    /// Only once the player has found the lore note describing the enchantments.
    #[default]
    Immersive,
}

impl TooltipBehavior {
    pub fn should_show(self, lore_discovered: bool) -> bool {
        match self {
            Self::Off => false,
            Self::On => true,
            Self::Immersive => lore_discovered,
        }
    }
}

/// Menu configuration.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MenuConfig {
    pub tooltip_behavior: TooltipBehavior,
    /// Build tooltips from the in-game lore note when no translation provides one.
    pub enable_tooltip_autogeneration: bool,
    /// Keys that move the carousel back.
    pub left_arrow: Vec<String>,
    /// Keys that move the carousel forward.
    pub right_arrow: Vec<String>,
    /// Offer a choice for innate enchantments too, not just the primary one.
    pub override_innate_enchantments: bool,
}

impl Default for MenuConfig {
    fn default() -> Self {
        Self {
            tooltip_behavior: TooltipBehavior::Immersive,
            enable_tooltip_autogeneration: true,
            left_arrow: vec!["Left".to_string()],
            right_arrow: vec!["Right".to_string()],
            override_innate_enchantments: true,
        }
    }
}

impl MenuConfig {
    /// Parses a configuration from TOML. Missing fields take their defaults.
    pub fn from_toml(text: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(text)?)
    }

    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Loads the configuration at `path`.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        let config = Self::from_toml(&text)?;
        debug!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Loads `path` if it exists and parses; otherwise falls back to defaults.
    pub fn load_or_default(path: &Path) -> Self {
        if !path.exists() {
            debug!("No config at {}, using defaults", path.display());
            return Self::default();
        }
        Self::load(path).unwrap_or_else(|e| {
            warn!("Ignoring config: {e}");
            Self::default()
        })
    }

    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        std::fs::write(path, self.to_toml()?).map_err(|source| ConfigError::Write {
            path: path.display().to_string(),
            source,
        })
    }

    /// Restores every field to its default.
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}
