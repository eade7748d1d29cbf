//! Configuration for the equipment model
//!
//! This module handles:
//! - Model settings (ingestion strictness, unit policy, id separator)
//! - Device definition files (`.toml` / `.json`) describing a device's structure
//!
//! # Config Location
//!
//! Settings are read from the platform-appropriate config directory:
//! - **Linux**: `~/.config/org.mtconnect.model-rs/settings.toml`
//! - **macOS**: `~/Library/Application Support/org.mtconnect.model-rs/settings.toml`
//! - **Windows**: `%APPDATA%\org.mtconnect.model-rs\settings.toml`

pub mod definition;
pub mod settings;

pub use definition::{ComponentDefinition, CompositionDefinition};
pub use settings::{ModelSettings, UnitPolicy};

use std::path::PathBuf;

/// Application identifier for config directories
pub const APP_ID: &str = "org.mtconnect.model-rs";

/// Settings filename
pub const SETTINGS_FILE: &str = "settings.toml";

/// Platform config directory for this application
pub fn config_dir() -> Option<PathBuf> {
    dirs_next::config_dir().map(|p| p.join(APP_ID))
}

/// Path of the settings file
pub fn settings_path() -> Option<PathBuf> {
    config_dir().map(|p| p.join(SETTINGS_FILE))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_settings_path_is_under_app_id() {
        if let Some(path) = settings_path() {
            assert!(path.ends_with(format!("{}/{}", APP_ID, SETTINGS_FILE)));
        }
    }
}
