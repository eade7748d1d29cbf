//! Declared schema of a data item

use crate::types::{DataItemCategory, Representation};
use serde::{Deserialize, Serialize};

/// A data item declared on a component or composition.
///
/// `units` is the canonical unit values are reported in; `native_units` and
/// `native_scale` describe what the device actually produces.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataItemDescriptor {
    pub id: String,
    /// Type identifier, e.g. `TEMPERATURE`
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub category: DataItemCategory,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subtype: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub units: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub native_units: Option<String>,
    /// Native values are divided by this before unit conversion
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub native_scale: Option<f64>,
    #[serde(default, skip_serializing_if = "is_default_representation")]
    pub representation: Representation,
    /// Rhai converter applied to numeric native values
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub converter: Option<String>,
}

fn is_default_representation(r: &Representation) -> bool {
    *r == Representation::Value
}

impl DataItemDescriptor {
    pub fn new(id: impl Into<String>, kind: impl Into<String>, category: DataItemCategory) -> Self {
        Self {
            id: id.into(),
            kind: kind.into(),
            category,
            name: None,
            subtype: None,
            units: None,
            native_units: None,
            native_scale: None,
            representation: Representation::Value,
            converter: None,
        }
    }

    pub fn sample(id: impl Into<String>, kind: impl Into<String>) -> Self {
        Self::new(id, kind, DataItemCategory::Sample)
    }

    pub fn event(id: impl Into<String>, kind: impl Into<String>) -> Self {
        Self::new(id, kind, DataItemCategory::Event)
    }

    pub fn condition(id: impl Into<String>, kind: impl Into<String>) -> Self {
        Self::new(id, kind, DataItemCategory::Condition)
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_subtype(mut self, subtype: impl Into<String>) -> Self {
        self.subtype = Some(subtype.into());
        self
    }

    pub fn with_units(mut self, units: impl Into<String>) -> Self {
        self.units = Some(units.into());
        self
    }

    pub fn with_native_units(mut self, native_units: impl Into<String>) -> Self {
        self.native_units = Some(native_units.into());
        self
    }

    pub fn with_native_scale(mut self, scale: f64) -> Self {
        self.native_scale = Some(scale);
        self
    }

    pub fn with_representation(mut self, representation: Representation) -> Self {
        self.representation = representation;
        self
    }

    pub fn with_converter(mut self, source: impl Into<String>) -> Self {
        self.converter = Some(source.into());
        self
    }

    pub fn is_condition(&self) -> bool {
        self.category == DataItemCategory::Condition
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serde_uses_type_key() {
        let item = DataItemDescriptor::sample("dev_temp", "TEMPERATURE")
            .with_units("CELSIUS")
            .with_native_units("FAHRENHEIT");
        let json = serde_json::to_value(&item).unwrap();
        assert_eq!(json["type"], "TEMPERATURE");
        assert_eq!(json["category"], "SAMPLE");
        assert!(json.get("subtype").is_none());

        let back: DataItemDescriptor = serde_json::from_value(json).unwrap();
        assert_eq!(back, item);
    }

    #[test]
    fn test_minimal_toml() {
        let item: DataItemDescriptor = toml::from_str(
            r#"
id = "avail"
type = "AVAILABILITY"
category = "EVENT"
"#,
        )
        .unwrap();
        assert_eq!(item.category, DataItemCategory::Event);
        assert_eq!(item.representation, Representation::Value);
        assert!(item.units.is_none());
    }
}
