//! Test data builders for device trees

use mtconnect_model::{
    units, ComponentDefinition, ComponentNode, CompositionDefinition, DataItemDescriptor,
    ModelContext,
};
use std::sync::Arc;

/// Builder for a small machining center definition
pub struct DeviceBuilder {
    id: String,
    name: String,
    axes: Vec<&'static str>,
    with_cooling: bool,
}

impl DeviceBuilder {
    pub fn new(id: &str) -> Self {
        Self {
            id: id.to_string(),
            name: "VMC-3Axis".to_string(),
            axes: Vec::new(),
            with_cooling: false,
        }
    }

    pub fn axis(mut self, name: &'static str) -> Self {
        self.axes.push(name);
        self
    }

    pub fn cooling(mut self) -> Self {
        self.with_cooling = true;
        self
    }

    pub fn definition(&self) -> ComponentDefinition {
        let mut device = ComponentDefinition::new(&self.id, "Device").with_name(&self.name);

        if !self.axes.is_empty() {
            let mut axes = ComponentDefinition::new(format!("{}_axes", self.id), "Axes");
            for name in &self.axes {
                axes = axes.with_component(
                    ComponentDefinition::new(format!("{}_axes_{}", self.id, name), "Linear")
                        .with_name(*name),
                );
            }
            device = device.with_component(axes);
        }

        if self.with_cooling {
            let cooling_id = format!("{}_cooling", self.id);
            device = device.with_component(
                ComponentDefinition::new(&cooling_id, "Cooling")
                    .with_data_item(
                        DataItemDescriptor::sample(format!("{}_temp", cooling_id), "TEMPERATURE")
                            .with_units(units::CELSIUS)
                            .with_native_units(units::FAHRENHEIT),
                    )
                    .with_composition(
                        CompositionDefinition::new(format!("{}_pump", cooling_id), "PUMP")
                            .with_data_item(
                                DataItemDescriptor::sample(
                                    format!("{}_pump_flow", cooling_id),
                                    "FLOW",
                                )
                                .with_units(units::LITER_PER_SECOND)
                                .with_native_units(units::GALLON_PER_MINUTE),
                            ),
                    ),
            );
        }

        device
    }

    pub fn build(self, ctx: Arc<ModelContext>) -> Arc<ComponentNode> {
        Arc::new(ComponentNode::from_definition(&self.definition(), ctx))
    }
}
