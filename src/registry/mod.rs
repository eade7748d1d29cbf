//! Registry of component and composition kinds
//!
//! Every component and composition has a type identifier (`Linear`,
//! `Controller`, `MOTOR`, ...) and a default name used when a child is
//! created without one. Kinds may also declare default data items that a
//! freshly materialized node starts with.
//!
//! The registry is built once from explicit registrations and is immutable
//! afterwards, so lookups never take a lock. Registering the same type id
//! twice is rejected with [`ModelError::DuplicateKind`].
//!
//! # Example
//!
//! ```
//! use mtconnect_model::registry::{ComponentKind, KindRegistry};
//!
//! struct Conveyor;
//!
//! impl ComponentKind for Conveyor {
//!     const TYPE_ID: &'static str = "Conveyor";
//!     const NAME_ID: &'static str = "conveyor";
//! }
//!
//! let registry = KindRegistry::builder()
//!     .with_builtins()?
//!     .register_component::<Conveyor>()?
//!     .build();
//!
//! assert_eq!(registry.resolve_component("Conveyor").unwrap().name_id(), "conveyor");
//! assert!(registry.resolve_component("Unknown").is_none());
//! # Ok::<(), mtconnect_model::ModelError>(())
//! ```

pub mod kinds;

use crate::error::{ModelError, Result};
use crate::model::DataItemDescriptor;
use once_cell::sync::Lazy;
use std::collections::HashMap;
use std::sync::Arc;

/// Declares the default data items of a kind for a node with the given id
pub type DataItemsFn = fn(component_id: &str, separator: &str) -> Vec<DataItemDescriptor>;

/// A component kind (recursive structural node)
pub trait ComponentKind {
    const TYPE_ID: &'static str;
    const NAME_ID: &'static str;

    fn data_items(_component_id: &str, _separator: &str) -> Vec<DataItemDescriptor> {
        Vec::new()
    }
}

/// A composition kind (leaf structural node)
pub trait CompositionKind {
    const TYPE_ID: &'static str;
    const NAME_ID: &'static str;

    fn data_items(_composition_id: &str, _separator: &str) -> Vec<DataItemDescriptor> {
        Vec::new()
    }
}

/// Registered kind
#[derive(Debug, Clone)]
pub struct KindEntry {
    type_id: String,
    name_id: String,
    data_items: Option<DataItemsFn>,
}

impl KindEntry {
    pub fn new(
        type_id: impl Into<String>,
        name_id: impl Into<String>,
        data_items: Option<DataItemsFn>,
    ) -> Self {
        Self {
            type_id: type_id.into(),
            name_id: name_id.into(),
            data_items,
        }
    }

    pub fn type_id(&self) -> &str {
        &self.type_id
    }

    /// Default name for nodes of this kind
    pub fn name_id(&self) -> &str {
        &self.name_id
    }

    /// Default data items for a node with id `node_id`
    pub fn default_data_items(&self, node_id: &str, separator: &str) -> Vec<DataItemDescriptor> {
        self.data_items
            .map(|f| f(node_id, separator))
            .unwrap_or_default()
    }
}

/// Immutable lookup tables of component and composition kinds
#[derive(Debug, Default)]
pub struct KindRegistry {
    components: HashMap<String, KindEntry>,
    compositions: HashMap<String, KindEntry>,
}

static GLOBAL: Lazy<Arc<KindRegistry>> = Lazy::new(|| {
    match KindRegistry::builder().with_builtins() {
        Ok(builder) => {
            let registry = builder.build();
            tracing::debug!(
                "Kind registry populated with {} component and {} composition kinds",
                registry.components.len(),
                registry.compositions.len()
            );
            Arc::new(registry)
        }
        Err(e) => {
            tracing::error!("Failed to register built-in kinds: {}", e);
            Arc::new(KindRegistry::default())
        }
    }
});

impl KindRegistry {
    pub fn builder() -> KindRegistryBuilder {
        KindRegistryBuilder::default()
    }

    /// Process-wide registry holding the built-in vocabulary.
    ///
    /// Populated exactly once on first use.
    pub fn global() -> Arc<KindRegistry> {
        GLOBAL.clone()
    }

    pub fn resolve_component(&self, type_id: &str) -> Option<&KindEntry> {
        self.components.get(type_id)
    }

    pub fn resolve_composition(&self, type_id: &str) -> Option<&KindEntry> {
        self.compositions.get(type_id)
    }

    /// Registered component type ids, sorted
    pub fn component_types(&self) -> Vec<&str> {
        let mut ids: Vec<&str> = self.components.keys().map(String::as_str).collect();
        ids.sort_unstable();
        ids
    }

    /// Registered composition type ids, sorted
    pub fn composition_types(&self) -> Vec<&str> {
        let mut ids: Vec<&str> = self.compositions.keys().map(String::as_str).collect();
        ids.sort_unstable();
        ids
    }
}

/// Collects kind registrations before freezing them into a [`KindRegistry`]
#[derive(Debug, Default)]
pub struct KindRegistryBuilder {
    components: HashMap<String, KindEntry>,
    compositions: HashMap<String, KindEntry>,
}

impl KindRegistryBuilder {
    /// Register every built-in kind
    pub fn with_builtins(self) -> Result<Self> {
        kinds::register_builtins(self)
    }

    pub fn register_component<K: ComponentKind>(self) -> Result<Self> {
        self.register_component_fn(K::TYPE_ID, K::NAME_ID, Some(K::data_items))
    }

    pub fn register_composition<K: CompositionKind>(self) -> Result<Self> {
        self.register_composition_fn(K::TYPE_ID, K::NAME_ID, Some(K::data_items))
    }

    /// Register a component kind from plain identifiers
    pub fn register_component_fn(
        mut self,
        type_id: &str,
        name_id: &str,
        data_items: Option<DataItemsFn>,
    ) -> Result<Self> {
        insert_unique(
            &mut self.components,
            KindEntry::new(type_id, name_id, data_items),
        )?;
        Ok(self)
    }

    /// Register a composition kind from plain identifiers
    pub fn register_composition_fn(
        mut self,
        type_id: &str,
        name_id: &str,
        data_items: Option<DataItemsFn>,
    ) -> Result<Self> {
        insert_unique(
            &mut self.compositions,
            KindEntry::new(type_id, name_id, data_items),
        )?;
        Ok(self)
    }

    pub fn build(self) -> KindRegistry {
        KindRegistry {
            components: self.components,
            compositions: self.compositions,
        }
    }
}

fn insert_unique(table: &mut HashMap<String, KindEntry>, entry: KindEntry) -> Result<()> {
    if table.contains_key(entry.type_id()) {
        return Err(ModelError::DuplicateKind {
            type_id: entry.type_id().to_string(),
        });
    }
    table.insert(entry.type_id().to_string(), entry);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::create_id;

    struct Conveyor;

    impl ComponentKind for Conveyor {
        const TYPE_ID: &'static str = "Conveyor";
        const NAME_ID: &'static str = "conveyor";

        fn data_items(component_id: &str, separator: &str) -> Vec<DataItemDescriptor> {
            vec![DataItemDescriptor::sample(
                create_id(component_id, "speed", None, separator),
                "LINEAR_VELOCITY",
            )]
        }
    }

    struct Belt;

    impl CompositionKind for Belt {
        const TYPE_ID: &'static str = "BELT";
        const NAME_ID: &'static str = "belt";
    }

    #[test]
    fn test_register_and_resolve() {
        let registry = KindRegistry::builder()
            .register_component::<Conveyor>()
            .unwrap()
            .register_composition::<Belt>()
            .unwrap()
            .build();

        let entry = registry.resolve_component("Conveyor").unwrap();
        assert_eq!(entry.name_id(), "conveyor");
        let items = entry.default_data_items("line1", "_");
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].id, "line1_speed");

        assert!(registry.resolve_composition("BELT").is_some());
        assert!(registry.resolve_component("BELT").is_none());
    }

    #[test]
    fn test_duplicate_kind_is_rejected() {
        let err = KindRegistry::builder()
            .register_component::<Conveyor>()
            .unwrap()
            .register_component_fn("Conveyor", "other", None)
            .unwrap_err();
        assert!(matches!(err, ModelError::DuplicateKind { type_id } if type_id == "Conveyor"));
    }

    #[test]
    fn test_same_id_allowed_across_tables() {
        let registry = KindRegistry::builder()
            .register_component_fn("Filter", "filter", None)
            .unwrap()
            .register_composition_fn("Filter", "filter", None)
            .unwrap()
            .build();
        assert!(registry.resolve_component("Filter").is_some());
        assert!(registry.resolve_composition("Filter").is_some());
    }

    #[test]
    fn test_global_is_shared() {
        let a = KindRegistry::global();
        let b = KindRegistry::global();
        assert!(Arc::ptr_eq(&a, &b));
        assert!(a.resolve_component("Device").is_some());
        assert!(a.resolve_composition("MOTOR").is_some());
    }
}
