//! Serializable device information model
//!
//! A [`ComponentDefinition`] describes the structure of a device: its
//! components, compositions and declared data items. Definitions are loaded
//! from `.toml` or `.json` files and turned into a live tree with
//! [`ComponentNode::from_definition`](crate::model::ComponentNode::from_definition).
//!
//! ```toml
//! id = "dev"
//! type = "Device"
//! name = "VMC-3Axis"
//!
//! [[data_items]]
//! id = "dev_avail"
//! type = "AVAILABILITY"
//! category = "EVENT"
//!
//! [[components]]
//! id = "dev_cooling"
//! type = "Cooling"
//! ```

use crate::error::{ModelError, Result};
use crate::model::{DataItemDescriptor, Description};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Structure of one component and its subtree
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComponentDefinition {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Description::is_empty")]
    pub description: Description,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub data_items: Vec<DataItemDescriptor>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub compositions: Vec<CompositionDefinition>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub components: Vec<ComponentDefinition>,
}

/// Structure of one composition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompositionDefinition {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub data_items: Vec<DataItemDescriptor>,
}

/// File encodings a definition can be stored in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DefinitionFormat {
    Json,
    Toml,
}

impl DefinitionFormat {
    fn from_path(path: &Path) -> Result<Self> {
        match path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase())
            .as_deref()
        {
            Some("json") => Ok(Self::Json),
            Some("toml") => Ok(Self::Toml),
            other => Err(ModelError::Config(format!(
                "Unsupported device file extension {:?} for {:?}",
                other.unwrap_or(""),
                path
            ))),
        }
    }
}

impl ComponentDefinition {
    pub fn new(id: impl Into<String>, kind: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            kind: kind.into(),
            name: None,
            description: Description::default(),
            data_items: Vec::new(),
            compositions: Vec::new(),
            components: Vec::new(),
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_data_item(mut self, item: DataItemDescriptor) -> Self {
        self.data_items.push(item);
        self
    }

    pub fn with_component(mut self, component: ComponentDefinition) -> Self {
        self.components.push(component);
        self
    }

    pub fn with_composition(mut self, composition: CompositionDefinition) -> Self {
        self.compositions.push(composition);
        self
    }

    /// Load a definition, choosing the parser by file extension
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let format = DefinitionFormat::from_path(path)?;
        let content = std::fs::read_to_string(path).map_err(|e| {
            ModelError::Config(format!("Failed to read device file {:?}: {}", path, e))
        })?;

        let parsed = match format {
            DefinitionFormat::Json => serde_json::from_str(&content).map_err(|e| e.to_string()),
            DefinitionFormat::Toml => toml::from_str(&content).map_err(|e| e.to_string()),
        };
        parsed.map_err(|e| {
            ModelError::Config(format!("Failed to parse device file {:?}: {}", path, e))
        })
    }

    /// Save a definition, choosing the encoding by file extension
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let format = DefinitionFormat::from_path(path)?;

        let content = match format {
            DefinitionFormat::Json => serde_json::to_string_pretty(self).map_err(|e| e.to_string()),
            DefinitionFormat::Toml => toml::to_string_pretty(self).map_err(|e| e.to_string()),
        }
        .map_err(|e| ModelError::Config(format!("Failed to serialize device: {}", e)))?;

        std::fs::write(path, content).map_err(|e| {
            ModelError::Config(format!("Failed to write device file {:?}: {}", path, e))
        })
    }

    /// Total number of components in this subtree, including this one
    pub fn component_count(&self) -> usize {
        1 + self
            .components
            .iter()
            .map(ComponentDefinition::component_count)
            .sum::<usize>()
    }
}

impl CompositionDefinition {
    pub fn new(id: impl Into<String>, kind: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            kind: kind.into(),
            name: None,
            data_items: Vec::new(),
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_data_item(mut self, item: DataItemDescriptor) -> Self {
        self.data_items.push(item);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DEVICE_TOML: &str = r#"
id = "dev"
type = "Device"
name = "VMC-3Axis"

[description]
manufacturer = "Mazak"

[[data_items]]
id = "dev_avail"
type = "AVAILABILITY"
category = "EVENT"

[[components]]
id = "dev_cooling"
type = "Cooling"

[[components.compositions]]
id = "dev_cooling_pump"
type = "PUMP"

[[components.data_items]]
id = "dev_cooling_temp"
type = "TEMPERATURE"
units = "CELSIUS"
native_units = "FAHRENHEIT"
"#;

    #[test]
    fn test_parse_toml() {
        let def: ComponentDefinition = toml::from_str(DEVICE_TOML).unwrap();
        assert_eq!(def.kind, "Device");
        assert_eq!(def.description.manufacturer.as_deref(), Some("Mazak"));
        assert_eq!(def.components.len(), 1);
        assert_eq!(def.components[0].compositions[0].kind, "PUMP");
        assert_eq!(
            def.components[0].data_items[0].native_units.as_deref(),
            Some("FAHRENHEIT")
        );
        assert_eq!(def.component_count(), 2);
    }

    #[test]
    fn test_load_by_extension() {
        let dir = tempfile::tempdir().unwrap();
        let def: ComponentDefinition = toml::from_str(DEVICE_TOML).unwrap();

        let json_path = dir.path().join("device.json");
        def.save(&json_path).unwrap();
        assert_eq!(ComponentDefinition::load(&json_path).unwrap(), def);

        let toml_path = dir.path().join("device.toml");
        def.save(&toml_path).unwrap();
        assert_eq!(ComponentDefinition::load(&toml_path).unwrap(), def);
    }

    #[test]
    fn test_unknown_extension() {
        let err = ComponentDefinition::load("device.xml").unwrap_err();
        assert!(matches!(err, ModelError::Config(_)));
    }
}
