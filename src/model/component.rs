//! Component nodes of the live model tree

use crate::config::{ComponentDefinition, CompositionDefinition, UnitPolicy};
use crate::error::{ModelError, Result, ResultExt};
use crate::model::{
    create_id, CompositionNode, ConditionState, DataItemDescriptor, Description, LiveTable,
    ModelContext, SoftwareInfo, SoftwareKind,
};
use crate::registry::kinds::Device;
use crate::registry::ComponentKind;
use crate::snapshot::{self, Snapshot};
use crate::types::ObservationValue;
use crate::units;
use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use std::sync::Arc;

/// A component of the device tree (device, axis, controller, sensor...)
pub struct ComponentNode {
    id: String,
    kind: String,
    name: String,
    description: RwLock<Description>,
    table: LiveTable,
    compositions: RwLock<Vec<Arc<CompositionNode>>>,
    children: RwLock<Vec<Arc<ComponentNode>>>,
    ctx: Arc<ModelContext>,
}

/// Node owning a data item, as found by an ingest lookup
enum Owner {
    This,
    Composition(Arc<CompositionNode>),
    Child(Arc<ComponentNode>),
}

fn find_child(
    children: &[Arc<ComponentNode>],
    kind: &str,
    name: Option<&str>,
) -> Option<Arc<ComponentNode>> {
    children
        .iter()
        .find(|c| c.kind == kind && name.map_or(true, |n| c.name == n))
        .cloned()
}

fn find_composition(
    compositions: &[Arc<CompositionNode>],
    kind: &str,
    name: Option<&str>,
) -> Option<Arc<CompositionNode>> {
    compositions
        .iter()
        .find(|c| c.kind() == kind && name.map_or(true, |n| c.name() == n))
        .cloned()
}

impl ComponentNode {
    /// Create a node. Registered kinds start with their default data items;
    /// unknown kinds produce a generic node with none.
    pub fn new(
        id: impl Into<String>,
        kind: impl Into<String>,
        name: impl Into<String>,
        ctx: Arc<ModelContext>,
    ) -> Self {
        let id = id.into();
        let kind = kind.into();
        let defaults = ctx
            .kinds()
            .resolve_component(&kind)
            .map(|entry| entry.default_data_items(&id, ctx.separator()))
            .unwrap_or_default();

        Self {
            id,
            kind,
            name: name.into(),
            description: RwLock::new(Description::default()),
            table: LiveTable::new(defaults),
            compositions: RwLock::new(Vec::new()),
            children: RwLock::new(Vec::new()),
            ctx,
        }
    }

    /// Create a device root
    pub fn device(id: impl Into<String>, name: impl Into<String>, ctx: Arc<ModelContext>) -> Self {
        Self::new(id, Device::TYPE_ID, name, ctx)
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn kind(&self) -> &str {
        &self.kind
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn context(&self) -> &Arc<ModelContext> {
        &self.ctx
    }

    pub fn table(&self) -> &LiveTable {
        &self.table
    }

    pub fn description(&self) -> Description {
        self.description.read().clone()
    }

    pub fn set_description(&self, description: Description) {
        *self.description.write() = description;
    }

    // ==================== Values ====================

    pub fn get_value(&self, data_item_id: &str) -> Option<ObservationValue> {
        self.table.get_value(data_item_id)
    }

    /// Upsert the current value of a data item. No conversion is applied.
    pub fn set_value(&self, data_item_id: &str, value: impl Into<ObservationValue>) {
        self.table.set_value(data_item_id, value.into());
    }

    pub fn get_condition(&self, data_item_id: &str) -> Option<ConditionState> {
        self.table.get_condition(data_item_id)
    }

    pub fn set_condition(&self, data_item_id: &str, state: ConditionState) {
        self.table.set_condition(data_item_id, state);
    }

    pub fn declare(&self, item: DataItemDescriptor) {
        self.table.declare(item);
    }

    pub fn data_item(&self, data_item_id: &str) -> Option<DataItemDescriptor> {
        self.table.data_item(data_item_id)
    }

    pub fn data_items(&self) -> Vec<DataItemDescriptor> {
        self.table.data_items()
    }

    // ==================== Structure ====================

    pub fn children(&self) -> Vec<Arc<ComponentNode>> {
        self.children.read().clone()
    }

    pub fn compositions(&self) -> Vec<Arc<CompositionNode>> {
        self.compositions.read().clone()
    }

    /// Existing child of `kind`, matching `name` when given
    pub fn child(&self, kind: &str, name: Option<&str>) -> Option<Arc<ComponentNode>> {
        find_child(&self.children.read(), kind, name)
    }

    /// Look up a child by `(kind, name)`, creating it on first access.
    ///
    /// A missing name defaults to the kind's name id. The new child's id is
    /// derived from this node's id and the name.
    pub fn get_or_create_child(&self, kind: &str, name: Option<&str>) -> Arc<ComponentNode> {
        if let Some(child) = find_child(&self.children.read(), kind, name) {
            return child;
        }

        let mut children = self.children.write();
        if let Some(child) = find_child(&children, kind, name) {
            tracing::trace!("Child {} was created by a concurrent caller", child.id);
            return child;
        }

        let entry = self.ctx.kinds().resolve_component(kind);
        if entry.is_none() {
            tracing::debug!(
                "Unknown component kind {:?} under {}, creating a generic node",
                kind,
                self.id
            );
        }
        let name = match (name, entry) {
            (Some(n), _) => n.to_string(),
            (None, Some(entry)) => entry.name_id().to_string(),
            (None, None) => kind.to_ascii_lowercase(),
        };
        let id = create_id(&self.id, &name, None, self.ctx.separator());
        tracing::debug!("Creating {} child {} under {}", kind, id, self.id);

        let child = Arc::new(ComponentNode::new(id, kind, name, self.ctx.clone()));
        children.push(child.clone());
        child
    }

    /// Existing composition of `kind`, matching `name` when given
    pub fn composition(&self, kind: &str, name: Option<&str>) -> Option<Arc<CompositionNode>> {
        find_composition(&self.compositions.read(), kind, name)
    }

    /// Look up a composition by `(kind, name)`, creating it on first access
    pub fn get_or_create_composition(
        &self,
        kind: &str,
        name: Option<&str>,
    ) -> Arc<CompositionNode> {
        if let Some(composition) = find_composition(&self.compositions.read(), kind, name) {
            return composition;
        }

        let mut compositions = self.compositions.write();
        if let Some(composition) = find_composition(&compositions, kind, name) {
            return composition;
        }

        let entry = self.ctx.kinds().resolve_composition(kind);
        if entry.is_none() {
            tracing::debug!(
                "Unknown composition kind {:?} under {}, creating a generic composition",
                kind,
                self.id
            );
        }
        let name = match (name, entry) {
            (Some(n), _) => n.to_string(),
            (None, Some(entry)) => entry.name_id().to_string(),
            (None, None) => kind.to_ascii_lowercase(),
        };
        let id = create_id(&self.id, &name, None, self.ctx.separator());
        let defaults = entry
            .map(|e| e.default_data_items(&id, self.ctx.separator()))
            .unwrap_or_default();

        let composition = Arc::new(CompositionNode::new(id, kind, name, defaults));
        compositions.push(composition.clone());
        composition
    }

    /// Depth-first search for a component by id, including this node
    pub fn find_component(self: &Arc<Self>, id: &str) -> Option<Arc<ComponentNode>> {
        if self.id == id {
            return Some(self.clone());
        }
        self.children()
            .iter()
            .find_map(|child| child.find_component(id))
    }

    // ==================== Ingestion ====================

    fn locate(&self, data_item_id: &str) -> Option<(Owner, DataItemDescriptor)> {
        if let Some(item) = self.table.data_item(data_item_id) {
            return Some((Owner::This, item));
        }
        for composition in self.compositions.read().iter() {
            if let Some(item) = composition.table().data_item(data_item_id) {
                return Some((Owner::Composition(composition.clone()), item));
            }
        }
        for child in self.children() {
            if let Some((owner, item)) = child.locate(data_item_id) {
                let owner = match owner {
                    Owner::This => Owner::Child(child.clone()),
                    other => other,
                };
                return Some((owner, item));
            }
        }
        None
    }

    fn resolve_owner(&self, data_item_id: &str) -> Result<(Owner, Option<DataItemDescriptor>)> {
        match self.locate(data_item_id) {
            Some((owner, item)) => Ok((owner, Some(item))),
            None if self.ctx.settings().strict_data_items => Err(ModelError::UndeclaredDataItem {
                component_id: self.id.clone(),
                data_item_id: data_item_id.to_string(),
            }),
            None => {
                tracing::debug!(
                    "Data item {} is not declared under {}, storing as-is",
                    data_item_id,
                    self.id
                );
                Ok((Owner::This, None))
            }
        }
    }

    /// Ingest a native value for a data item declared on this node, one of its
    /// compositions, or a descendant.
    ///
    /// Numeric values run through the data item's converter script, are
    /// divided by its native scale and converted from its native units before
    /// being stored. Other values are stored untouched.
    pub fn ingest(&self, data_item_id: &str, raw: impl Into<ObservationValue>) -> Result<()> {
        let (owner, item) = self.resolve_owner(data_item_id)?;
        let value = match item {
            Some(item) => self.normalize(&item, raw.into())?,
            None => raw.into(),
        };

        match owner {
            Owner::This => self.table.set_value(data_item_id, value),
            Owner::Composition(c) => c.table().set_value(data_item_id, value),
            Owner::Child(n) => n.table.set_value(data_item_id, value),
        }
        Ok(())
    }

    /// Ingest a condition for a data item, with the same lookup as [`ingest`](Self::ingest)
    pub fn ingest_condition(&self, data_item_id: &str, state: ConditionState) -> Result<()> {
        let (owner, _) = self.resolve_owner(data_item_id)?;
        match owner {
            Owner::This => self.table.set_condition(data_item_id, state),
            Owner::Composition(c) => c.table().set_condition(data_item_id, state),
            Owner::Child(n) => n.table.set_condition(data_item_id, state),
        }
        Ok(())
    }

    fn normalize(&self, item: &DataItemDescriptor, raw: ObservationValue) -> Result<ObservationValue> {
        match raw {
            ObservationValue::Number(v) => Ok(ObservationValue::Number(self.normalize_number(item, v)?)),
            ObservationValue::TimeSeries(samples) => samples
                .into_iter()
                .map(|v| self.normalize_number(item, v))
                .collect::<Result<Vec<f64>>>()
                .map(ObservationValue::TimeSeries),
            other => Ok(other),
        }
    }

    fn normalize_number(&self, item: &DataItemDescriptor, raw: f64) -> Result<f64> {
        let mut value = raw;

        if let Some(source) = item.converter.as_deref() {
            let scripts = self.ctx.scripts();
            let converter = scripts.compile(&item.id, source)?;
            value = scripts
                .execute(&converter, value)
                .with_context(|| format!("Converter for {} failed", item.id))?;
        }

        if let Some(scale) = item.native_scale.filter(|s| *s != 0.0) {
            value /= scale;
        }

        let units = item.units.as_deref();
        let native_units = item.native_units.as_deref();
        match self.ctx.settings().unit_policy {
            UnitPolicy::Strict => units::try_convert(value, units, native_units)
                .with_context(|| format!("Failed to ingest {}", item.id)),
            UnitPolicy::Permissive => match units::try_convert(value, units, native_units) {
                Ok(converted) => Ok(converted),
                Err(e) => {
                    tracing::warn!("{} for {}, storing unconverted", e, item.id);
                    Ok(value)
                }
            },
        }
    }

    // ==================== Software metadata ====================

    /// Declare the five metadata data items of `kind` and store the present fields.
    /// Missing fields are reported as `UNAVAILABLE`.
    pub fn set_software(&self, kind: SoftwareKind, info: &SoftwareInfo) {
        for (subtype, value) in info.fields() {
            let id = create_id(
                &self.id,
                kind.name_id(),
                Some(&subtype.to_ascii_lowercase()),
                self.ctx.separator(),
            );
            self.table.declare_if_absent(
                DataItemDescriptor::event(id.clone(), kind.type_id()).with_subtype(subtype),
            );
            let value = value
                .map(ObservationValue::from)
                .unwrap_or_else(ObservationValue::unavailable);
            self.table.set_value(&id, value);
        }
    }

    /// Metadata of `kind` assembled from the value table
    pub fn software(&self, kind: SoftwareKind) -> Option<SoftwareInfo> {
        let mut info = SoftwareInfo::default();
        for item in self
            .table
            .data_items()
            .into_iter()
            .filter(|d| d.kind == kind.type_id())
        {
            let (Some(subtype), Some(value)) = (item.subtype.as_deref(), self.table.get_value(&item.id))
            else {
                continue;
            };
            if value.is_unavailable() {
                continue;
            }
            if let ObservationValue::Text(text) = value {
                info.set_field(subtype, text);
            }
        }
        (!info.is_empty()).then_some(info)
    }

    // ==================== Definitions ====================

    /// Build a live tree from a device definition
    pub fn from_definition(def: &ComponentDefinition, ctx: Arc<ModelContext>) -> Self {
        let name = def.name.clone().unwrap_or_else(|| {
            ctx.kinds()
                .resolve_component(&def.kind)
                .map(|e| e.name_id().to_string())
                .unwrap_or_else(|| def.kind.to_ascii_lowercase())
        });
        if ctx.kinds().resolve_component(&def.kind).is_none() {
            tracing::debug!("Unknown component kind {:?} for {}, using a generic node", def.kind, def.id);
        }

        let node = Self::new(def.id.clone(), def.kind.clone(), name, ctx.clone());
        node.set_description(def.description.clone());
        for item in &def.data_items {
            node.table.declare(item.clone());
        }
        {
            let mut compositions = node.compositions.write();
            for composition in &def.compositions {
                compositions.push(Arc::new(composition_from_definition(composition, &ctx)));
            }
        }
        {
            let mut children = node.children.write();
            for child in &def.components {
                children.push(Arc::new(Self::from_definition(child, ctx.clone())));
            }
        }
        node
    }

    /// Structure of this subtree, without values
    pub fn definition(&self) -> ComponentDefinition {
        ComponentDefinition {
            id: self.id.clone(),
            kind: self.kind.clone(),
            name: Some(self.name.clone()),
            description: self.description(),
            data_items: self.table.data_items(),
            compositions: self.compositions().iter().map(|c| c.definition()).collect(),
            components: self.children().iter().map(|c| c.definition()).collect(),
        }
    }

    // ==================== Snapshot ====================

    /// Flatten this subtree into observations stamped `as_of` (or now)
    pub fn snapshot(&self, as_of: Option<DateTime<Utc>>) -> Snapshot {
        snapshot::snapshot(self, as_of)
    }
}

fn composition_from_definition(def: &CompositionDefinition, ctx: &ModelContext) -> CompositionNode {
    let entry = ctx.kinds().resolve_composition(&def.kind);
    let name = def.name.clone().unwrap_or_else(|| {
        entry
            .map(|e| e.name_id().to_string())
            .unwrap_or_else(|| def.kind.to_ascii_lowercase())
    });
    let defaults = entry
        .map(|e| e.default_data_items(&def.id, ctx.separator()))
        .unwrap_or_default();
    let composition = CompositionNode::new(def.id.clone(), def.kind.clone(), name, defaults);
    for item in &def.data_items {
        composition.declare(item.clone());
    }
    composition
}

impl std::fmt::Debug for ComponentNode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ComponentNode")
            .field("id", &self.id)
            .field("kind", &self.kind)
            .field("name", &self.name)
            .field("children", &self.children.read().len())
            .field("compositions", &self.compositions.read().len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ModelSettings;
    use crate::registry::KindRegistry;

    fn device() -> ComponentNode {
        ComponentNode::device("dev", "VMC", ModelContext::shared())
    }

    #[test]
    fn test_set_then_get() {
        let dev = device();
        dev.set_value("dev_avail", "AVAILABLE");
        dev.set_value("dev_avail", "UNAVAILABLE");
        assert!(dev.get_value("dev_avail").unwrap().is_unavailable());
        assert!(dev.get_value("missing").is_none());
    }

    #[test]
    fn test_device_declares_availability() {
        let dev = device();
        assert_eq!(dev.data_item("dev_avail").unwrap().kind, "AVAILABILITY");
    }

    #[test]
    fn test_get_or_create_child_derives_id_and_defaults() {
        let dev = device();
        let cooling = dev.get_or_create_child("Cooling", None);
        assert_eq!(cooling.id(), "dev_cooling");
        assert_eq!(cooling.name(), "cooling");
        assert!(cooling.data_item("dev_cooling_temp").is_some());

        let again = dev.get_or_create_child("Cooling", Some("cooling"));
        assert!(Arc::ptr_eq(&cooling, &again));
        assert_eq!(dev.children().len(), 1);
    }

    #[test]
    fn test_unknown_kind_falls_back_to_generic() {
        let dev = device();
        let child = dev.get_or_create_child("Conveyor", Some("line"));
        assert_eq!(child.kind(), "Conveyor");
        assert_eq!(child.id(), "dev_line");
        assert!(child.data_items().is_empty());
    }

    #[test]
    fn test_name_distinguishes_children_of_same_kind() {
        let dev = device();
        let axes = dev.get_or_create_child("Axes", None);
        let x = axes.get_or_create_child("Linear", Some("X"));
        let y = axes.get_or_create_child("Linear", Some("Y"));
        assert!(!Arc::ptr_eq(&x, &y));
        assert_eq!(x.id(), "dev_axes_X");
        // No name matches the first child of the kind
        assert!(Arc::ptr_eq(&axes.get_or_create_child("Linear", None), &x));
    }

    #[test]
    fn test_composition_creation() {
        let dev = device();
        let motor = dev.get_or_create_composition("MOTOR", None);
        assert_eq!(motor.id(), "dev_motor");
        assert!(Arc::ptr_eq(&motor, &dev.get_or_create_composition("MOTOR", Some("motor"))));
    }

    #[test]
    fn test_ingest_converts_units() {
        let dev = device();
        dev.declare(
            DataItemDescriptor::sample("dev_temp", "TEMPERATURE")
                .with_units("CELSIUS")
                .with_native_units("FAHRENHEIT"),
        );
        dev.ingest("dev_temp", 212.0).unwrap();
        assert_eq!(dev.get_value("dev_temp"), Some(ObservationValue::Number(100.0)));
    }

    #[test]
    fn test_ingest_applies_converter_then_scale() {
        let dev = device();
        dev.declare(
            DataItemDescriptor::sample("dev_load", "LOAD")
                .with_converter("value + 10.0")
                .with_native_scale(2.0),
        );
        dev.ingest("dev_load", 30.0).unwrap();
        assert_eq!(dev.get_value("dev_load").unwrap().as_f64(), Some(20.0));
    }

    #[test]
    fn test_ingest_routes_to_descendant() {
        let dev = device();
        let cooling = dev.get_or_create_child("Cooling", None);
        dev.ingest("dev_cooling_temp", 21.5).unwrap();
        assert_eq!(cooling.get_value("dev_cooling_temp").unwrap().as_f64(), Some(21.5));
        assert!(dev.get_value("dev_cooling_temp").is_none());
    }

    #[test]
    fn test_strict_ingest_rejects_undeclared() {
        let ctx = ModelContext::new(KindRegistry::global(), ModelSettings::strict());
        let dev = ComponentNode::device("dev", "VMC", ctx);
        let err = dev.ingest("dev_bogus", 1.0).unwrap_err();
        assert!(matches!(err, ModelError::UndeclaredDataItem { .. }));

        // set_value stays permissive
        dev.set_value("dev_bogus", 1.0);
        assert!(dev.get_value("dev_bogus").is_some());
    }

    #[test]
    fn test_strict_unit_policy() {
        let ctx = ModelContext::new(KindRegistry::global(), ModelSettings::strict());
        let dev = ComponentNode::device("dev", "VMC", ctx);
        dev.declare(
            DataItemDescriptor::sample("dev_v", "VOLTAGE")
                .with_units("VOLT")
                .with_native_units("CELSIUS"),
        );
        let err = dev.ingest("dev_v", 1.0).unwrap_err();
        assert!(matches!(err.root(), ModelError::UnsupportedConversion { .. }));
        assert!(dev.get_value("dev_v").is_none());
    }

    #[test]
    fn test_permissive_unit_policy_passes_value_through() {
        let dev = device();
        dev.declare(
            DataItemDescriptor::sample("dev_v", "VOLTAGE")
                .with_units("VOLT")
                .with_native_units("CELSIUS"),
        );
        dev.ingest("dev_v", 1.5).unwrap();
        assert_eq!(dev.get_value("dev_v").unwrap().as_f64(), Some(1.5));
    }

    #[test]
    fn test_software_metadata() {
        let dev = device();
        let info = SoftwareInfo {
            version: Some("1.4.2".into()),
            manufacturer: Some("Acme".into()),
            ..Default::default()
        };
        dev.set_software(SoftwareKind::Firmware, &info);

        assert_eq!(
            dev.get_value("dev_firmware_version").unwrap().as_str(),
            Some("1.4.2")
        );
        assert!(dev.get_value("dev_firmware_license").unwrap().is_unavailable());
        assert_eq!(dev.software(SoftwareKind::Firmware), Some(info));
        assert!(dev.software(SoftwareKind::Library).is_none());
    }

    #[test]
    fn test_definition_roundtrip() {
        let dev = device();
        let axes = dev.get_or_create_child("Axes", None);
        axes.get_or_create_child("Rotary", Some("C"))
            .get_or_create_composition("MOTOR", None);

        let def = dev.definition();
        let rebuilt = ComponentNode::from_definition(&def, ModelContext::shared());
        assert_eq!(rebuilt.definition(), def);
        assert_eq!(def.component_count(), 3);
    }
}
