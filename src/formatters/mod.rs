//! Document formatters
//!
//! A [`Formatter`] translates between wire bytes and [`DocumentEntity`]s for
//! one content type. Formatters are collected into a [`FormatterRegistry`]
//! keyed by lower-cased id, so `"JSON"` and `"json"` resolve to the same
//! instance. The registry is immutable once built; a duplicate id is a
//! registration error, never a silent override.
//!
//! # Built-in formatters
//!
//! | id     | content type       |
//! |--------|--------------------|
//! | `json` | `application/json` |
//! | `toml` | `application/toml` |
//! | `xml`  | `application/xml`  |
//!
//! # Example
//!
//! ```
//! use mtconnect_model::formatters::{DocumentEntity, FormatterRegistry};
//! use mtconnect_model::snapshot::Snapshot;
//!
//! let registry = FormatterRegistry::global();
//! let doc = DocumentEntity::Streams(Snapshot::empty(chrono::Utc::now()));
//!
//! let bytes = registry.encode("JSON", &doc)?;
//! assert_eq!(registry.decode("json", &bytes)?, doc);
//! assert!(registry.resolve("yaml").is_err());
//! # Ok::<(), mtconnect_model::ModelError>(())
//! ```

pub mod json;
pub mod toml;
pub mod xml;

pub use self::json::JsonFormatter;
pub use self::toml::TomlFormatter;
pub use self::xml::XmlFormatter;

use crate::config::ComponentDefinition;
use crate::error::{ModelError, Result};
use crate::snapshot::Snapshot;
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;

/// Domain entities a formatter can encode and decode
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "document", rename_all = "snake_case")]
pub enum DocumentEntity {
    /// Structure of a device
    Device(ComponentDefinition),
    /// Current values and conditions
    Streams(Snapshot),
}

impl DocumentEntity {
    pub fn kind(&self) -> &'static str {
        match self {
            DocumentEntity::Device(_) => "device",
            DocumentEntity::Streams(_) => "streams",
        }
    }
}

/// Codec for one document content type
pub trait Formatter: Send + Sync {
    /// Registry key, compared case-insensitively
    fn id(&self) -> &str;

    /// MIME type of the encoded documents
    fn content_type(&self) -> &str;

    fn encode(&self, entity: &DocumentEntity) -> Result<Vec<u8>>;

    fn decode(&self, bytes: &[u8]) -> Result<DocumentEntity>;
}

/// Immutable set of formatters keyed by lower-cased id
#[derive(Default)]
pub struct FormatterRegistry {
    formatters: HashMap<String, Arc<dyn Formatter>>,
}

static GLOBAL: Lazy<FormatterRegistry> = Lazy::new(|| {
    match FormatterRegistry::builder().with_builtins() {
        Ok(builder) => {
            let registry = builder.build();
            tracing::debug!("Formatter registry populated: {:?}", registry.ids());
            registry
        }
        Err(e) => {
            tracing::error!("Failed to register built-in formatters: {}", e);
            FormatterRegistry::default()
        }
    }
});

impl FormatterRegistry {
    pub fn builder() -> FormatterRegistryBuilder {
        FormatterRegistryBuilder::default()
    }

    /// Process-wide registry holding the built-in formatters.
    ///
    /// Populated exactly once on first use.
    pub fn global() -> &'static FormatterRegistry {
        &GLOBAL
    }

    /// Formatter registered under `id`, ignoring case
    pub fn resolve(&self, id: &str) -> Result<Arc<dyn Formatter>> {
        self.formatters
            .get(&id.to_lowercase())
            .cloned()
            .ok_or_else(|| {
                tracing::debug!("No formatter registered for {:?}", id);
                ModelError::FormatterNotFound { id: id.to_string() }
            })
    }

    pub fn contains(&self, id: &str) -> bool {
        self.formatters.contains_key(&id.to_lowercase())
    }

    pub fn content_type(&self, id: &str) -> Result<String> {
        self.resolve(id).map(|f| f.content_type().to_string())
    }

    pub fn encode(&self, id: &str, entity: &DocumentEntity) -> Result<Vec<u8>> {
        self.resolve(id)?.encode(entity)
    }

    pub fn decode(&self, id: &str, bytes: &[u8]) -> Result<DocumentEntity> {
        self.resolve(id)?.decode(bytes)
    }

    /// Registered ids, sorted
    pub fn ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.formatters.keys().cloned().collect();
        ids.sort();
        ids
    }
}

impl std::fmt::Debug for FormatterRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FormatterRegistry")
            .field("ids", &self.ids())
            .finish()
    }
}

/// Collects formatters before freezing them into a [`FormatterRegistry`]
#[derive(Default)]
pub struct FormatterRegistryBuilder {
    formatters: HashMap<String, Arc<dyn Formatter>>,
}

impl FormatterRegistryBuilder {
    /// Register the built-in formatters
    pub fn with_builtins(self) -> Result<Self> {
        self.register(JsonFormatter::new())?
            .register(TomlFormatter::new())?
            .register(XmlFormatter::new())
    }

    /// Register a formatter. An id already taken, ignoring case, is rejected.
    pub fn register<F: Formatter + 'static>(self, formatter: F) -> Result<Self> {
        self.register_arc(Arc::new(formatter))
    }

    pub fn register_arc(mut self, formatter: Arc<dyn Formatter>) -> Result<Self> {
        let key = formatter.id().to_lowercase();
        if self.formatters.contains_key(&key) {
            return Err(ModelError::DuplicateFormatter {
                id: formatter.id().to_string(),
            });
        }
        self.formatters.insert(key, formatter);
        Ok(self)
    }

    pub fn build(self) -> FormatterRegistry {
        FormatterRegistry {
            formatters: self.formatters,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Upper;

    impl Formatter for Upper {
        fn id(&self) -> &str {
            "JSON"
        }

        fn content_type(&self) -> &str {
            "text/plain"
        }

        fn encode(&self, _entity: &DocumentEntity) -> Result<Vec<u8>> {
            Ok(Vec::new())
        }

        fn decode(&self, _bytes: &[u8]) -> Result<DocumentEntity> {
            Err(ModelError::Decode("unsupported".to_string()))
        }
    }

    #[test]
    fn test_resolve_is_case_insensitive() {
        let registry = FormatterRegistry::builder().with_builtins().unwrap().build();
        let a = registry.resolve("JSON").unwrap();
        let b = registry.resolve("json").unwrap();
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(registry.content_type("Json").unwrap(), "application/json");
    }

    #[test]
    fn test_not_found_carries_id() {
        let registry = FormatterRegistry::builder().build();
        match registry.resolve("nonexistent") {
            Err(ModelError::FormatterNotFound { id }) => assert_eq!(id, "nonexistent"),
            other => panic!("unexpected result: {:?}", other.map(|f| f.id().to_string())),
        }
        assert!(matches!(
            registry.resolve(""),
            Err(ModelError::FormatterNotFound { .. })
        ));
    }

    #[test]
    fn test_duplicate_id_ignoring_case_is_rejected() {
        let err = FormatterRegistry::builder()
            .with_builtins()
            .unwrap()
            .register(Upper)
            .err()
            .unwrap();
        assert!(matches!(err, ModelError::DuplicateFormatter { id } if id == "JSON"));
    }

    #[test]
    fn test_ids() {
        assert_eq!(FormatterRegistry::global().ids(), ["json", "toml", "xml"]);
    }

    #[test]
    fn test_document_tag() {
        let doc = DocumentEntity::Device(ComponentDefinition::new("dev", "Device"));
        let value = serde_json::to_value(&doc).unwrap();
        assert_eq!(value["document"], "device");
        assert_eq!(value["type"], "Device");
        assert_eq!(doc.kind(), "device");
    }
}
