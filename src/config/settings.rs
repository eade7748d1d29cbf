//! Behavioural settings of the live model
//!
//! # Main Types
//!
//! - [`ModelSettings`] - Ingestion strictness, id separator, default formatter
//! - [`UnitPolicy`] - What ingestion does with unit pairs the table lacks

use crate::error::{ModelError, Result};
use crate::model::id::DEFAULT_SEPARATOR;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

/// Handling of native/canonical unit pairs with no conversion entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnitPolicy {
    /// Store the value unconverted and log a warning
    #[default]
    Permissive,
    /// Reject the value with `UnsupportedConversion`
    Strict,
}

impl fmt::Display for UnitPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UnitPolicy::Permissive => write!(f, "permissive"),
            UnitPolicy::Strict => write!(f, "strict"),
        }
    }
}

/// Settings shared by every node of a model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelSettings {
    /// Reject ingested values for data items the node never declared
    pub strict_data_items: bool,

    pub unit_policy: UnitPolicy,

    /// Separator used when deriving child and data item ids
    pub id_separator: String,

    /// Formatter used when a caller does not name one
    pub default_formatter: String,
}

impl Default for ModelSettings {
    fn default() -> Self {
        Self {
            strict_data_items: false,
            unit_policy: UnitPolicy::Permissive,
            id_separator: DEFAULT_SEPARATOR.to_string(),
            default_formatter: "json".to_string(),
        }
    }
}

impl ModelSettings {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn strict() -> Self {
        Self {
            strict_data_items: true,
            unit_policy: UnitPolicy::Strict,
            ..Self::default()
        }
    }

    pub fn with_separator(mut self, separator: impl Into<String>) -> Self {
        self.id_separator = separator.into();
        self
    }

    /// Load settings from a TOML file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            ModelError::Config(format!("Failed to read settings {:?}: {}", path, e))
        })?;

        toml::from_str(&content).map_err(|e| {
            ModelError::Config(format!("Failed to parse settings {:?}: {}", path, e))
        })
    }

    /// Load settings from the platform config directory, returning defaults on any error
    pub fn load_or_default() -> Self {
        let Some(path) = super::settings_path() else {
            return Self::default();
        };
        if !path.exists() {
            return Self::default();
        }
        Self::load(&path).unwrap_or_else(|e| {
            tracing::warn!("Failed to load settings, using defaults: {}", e);
            Self::default()
        })
    }

    /// Save settings as TOML
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                ModelError::Config(format!("Failed to create settings directory: {}", e))
            })?;
        }

        let content = toml::to_string_pretty(self)
            .map_err(|e| ModelError::Config(format!("Failed to serialize settings: {}", e)))?;

        std::fs::write(path, content).map_err(|e| {
            ModelError::Config(format!("Failed to write settings {:?}: {}", path, e))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let settings = ModelSettings::default();
        assert!(!settings.strict_data_items);
        assert_eq!(settings.unit_policy, UnitPolicy::Permissive);
        assert_eq!(settings.id_separator, "_");
        assert_eq!(settings.default_formatter, "json");
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let settings: ModelSettings = toml::from_str("unit_policy = \"strict\"").unwrap();
        assert_eq!(settings.unit_policy, UnitPolicy::Strict);
        assert!(!settings.strict_data_items);
        assert_eq!(settings.id_separator, "_");
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("settings.toml");

        let settings = ModelSettings::strict().with_separator(":");
        settings.save(&path).unwrap();

        let loaded = ModelSettings::load(&path).unwrap();
        assert_eq!(loaded, settings);
    }

    #[test]
    fn test_load_missing_file_is_config_error() {
        let err = ModelSettings::load("/nonexistent/settings.toml").unwrap_err();
        assert!(matches!(err, ModelError::Config(_)));
    }
}
