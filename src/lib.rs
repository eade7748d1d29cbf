//! # mtconnect-model: live equipment model
//!
//! A concurrently accessed model of a piece of manufacturing equipment: a
//! tree of components holding the current value and condition of each
//! declared data item, flattened on demand into time-stamped snapshots and
//! encoded by pluggable document formatters.
//!
//! ## Architecture
//!
//! - **Model**: [`ComponentNode`] tree with per-node locked value/condition tables
//! - **Registry**: [`KindRegistry`] of component/composition kinds and their defaults
//! - **Snapshot**: flat, single-timestamp view of a subtree, fed to history sinks
//! - **Formatters**: [`FormatterRegistry`] dispatching encode/decode by case-insensitive id
//! - **Units**: exact native-to-canonical unit conversion table
//! - **Scripting**: Rhai converters for device-specific native encodings
//!
//! ## Configuration
//!
//! [`ModelSettings`] are stored as TOML in the platform config directory under
//! `org.mtconnect.model-rs`. Device structure is described by
//! [`ComponentDefinition`] files in TOML or JSON.
//!
//! ## Example
//!
//! ```
//! use mtconnect_model::{
//!     ComponentNode, DataItemDescriptor, DocumentEntity, FormatterRegistry, ModelContext,
//! };
//!
//! let device = ComponentNode::device("dev", "VMC-3Axis", ModelContext::shared());
//! let cooling = device.get_or_create_child("Cooling", None);
//! cooling.declare(
//!     DataItemDescriptor::sample("dev_cooling_temp", "TEMPERATURE")
//!         .with_units("CELSIUS")
//!         .with_native_units("FAHRENHEIT"),
//! );
//!
//! device.ingest("dev_cooling_temp", 212.0)?;
//! assert_eq!(cooling.get_value("dev_cooling_temp").unwrap().as_f64(), Some(100.0));
//!
//! let streams = DocumentEntity::Streams(device.snapshot(None));
//! let json = FormatterRegistry::global().encode("json", &streams)?;
//! assert!(!json.is_empty());
//! # Ok::<(), mtconnect_model::ModelError>(())
//! ```

pub mod config;
pub mod error;
pub mod formatters;
pub mod model;
pub mod registry;
pub mod scripting;
pub mod snapshot;
pub mod types;
pub mod units;

// Re-export commonly used types
pub use config::{ComponentDefinition, CompositionDefinition, ModelSettings, UnitPolicy};
pub use error::{ModelError, Result, ResultExt};
pub use formatters::{DocumentEntity, Formatter, FormatterRegistry};
pub use model::{
    ComponentNode, CompositionNode, ConditionLevel, ConditionState, DataItemDescriptor,
    Description, ModelContext, SoftwareInfo, SoftwareKind,
};
pub use registry::{ComponentKind, CompositionKind, KindRegistry};
pub use scripting::ScriptEngine;
pub use snapshot::{ObservationSink, Snapshot};
pub use types::{ObservationValue, UNAVAILABLE};
