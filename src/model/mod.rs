//! Live equipment model
//!
//! A device is a tree of [`ComponentNode`]s. Each node owns its child
//! components, its [`CompositionNode`]s and a [`LiveTable`] holding the
//! declared data items plus the last known value and condition of each.
//!
//! ```text
//! Device (dev)
//! +-- Axes (dev_axes)
//! |   +-- Linear (dev_axes_x)        pos, vel
//! |   +-- Rotary (dev_axes_c)        angle, speed
//! |       +-- [MOTOR] (dev_axes_c_motor)
//! +-- Systems (dev_systems)
//!     +-- Cooling (dev_systems_cooling)   temp
//! ```
//!
//! # Concurrency
//!
//! Every node guards its own tables and child lists; no operation ever locks
//! more than one node at a time. Reads and upserts are atomic per node.
//! Children are created under the parent's write lock, so concurrent
//! requests for the same `(kind, name)` all receive the same instance.
//!
//! All nodes of a tree share one [`ModelContext`] (kind registry, settings
//! and script engine).

pub mod component;
pub mod composition;
pub mod condition;
pub mod data_item;
pub mod description;
pub mod id;
pub mod table;

pub use component::ComponentNode;
pub use composition::CompositionNode;
pub use condition::{ConditionLevel, ConditionQualifier, ConditionState};
pub use data_item::DataItemDescriptor;
pub use description::{Description, SoftwareInfo, SoftwareKind};
pub use id::create_id;
pub use table::LiveTable;

use crate::config::ModelSettings;
use crate::registry::KindRegistry;
use crate::scripting::ScriptEngine;
use std::sync::Arc;

/// State shared by every node of one model tree
#[derive(Debug)]
pub struct ModelContext {
    kinds: Arc<KindRegistry>,
    settings: ModelSettings,
    scripts: ScriptEngine,
}

impl ModelContext {
    pub fn new(kinds: Arc<KindRegistry>, settings: ModelSettings) -> Arc<Self> {
        Arc::new(Self {
            kinds,
            settings,
            scripts: ScriptEngine::new(),
        })
    }

    /// Context using the global kind registry
    pub fn with_settings(settings: ModelSettings) -> Arc<Self> {
        Self::new(KindRegistry::global(), settings)
    }

    /// Context using the global kind registry and default settings
    pub fn shared() -> Arc<Self> {
        Self::with_settings(ModelSettings::default())
    }

    pub fn kinds(&self) -> &KindRegistry {
        &self.kinds
    }

    pub fn settings(&self) -> &ModelSettings {
        &self.settings
    }

    pub fn scripts(&self) -> &ScriptEngine {
        &self.scripts
    }

    pub fn separator(&self) -> &str {
        &self.settings.id_separator
    }
}
