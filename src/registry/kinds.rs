//! Built-in component and composition vocabulary

use super::{ComponentKind, CompositionKind, KindRegistryBuilder};
use crate::error::Result;
use crate::model::{create_id, DataItemDescriptor};
use crate::units;

/// Declare marker types for kinds that carry no default data items
macro_rules! plain_kinds {
    ($trait:ident: $($name:ident => ($type_id:literal, $name_id:literal)),* $(,)?) => {
        $(
            #[derive(Debug, Clone, Copy, Default)]
            pub struct $name;

            impl $trait for $name {
                const TYPE_ID: &'static str = $type_id;
                const NAME_ID: &'static str = $name_id;
            }
        )*
    };
}

plain_kinds!(ComponentKind:
    Axes => ("Axes", "axes"),
    Controller => ("Controller", "cont"),
    Path => ("Path", "path"),
    Systems => ("Systems", "systems"),
    Coolant => ("Coolant", "coolant"),
    Electric => ("Electric", "electric"),
    Hydraulic => ("Hydraulic", "hydraulic"),
    Pneumatic => ("Pneumatic", "pneumatic"),
    Lubrication => ("Lubrication", "lubrication"),
    WorkEnvelope => ("WorkEnvelope", "workenv"),
    GangToolBar => ("GangToolBar", "gangToolBar"),
    Door => ("Door", "door"),
    Auxiliaries => ("Auxiliaries", "aux"),
    Resources => ("Resources", "resources"),
    Personnel => ("Personnel", "personnel"),
);

plain_kinds!(CompositionKind:
    Motor => ("MOTOR", "motor"),
    Amplifier => ("AMPLIFIER", "amp"),
    Spindle => ("SPINDLE", "spindle"),
    Valve => ("VALVE", "valve"),
    Tank => ("TANK", "tank"),
    Pump => ("PUMP", "pump"),
    Filter => ("FILTER", "filter"),
    Encoder => ("ENCODER", "encoder"),
);

fn temperature(node_id: &str, separator: &str) -> DataItemDescriptor {
    DataItemDescriptor::sample(create_id(node_id, "temp", None, separator), "TEMPERATURE")
        .with_units(units::CELSIUS)
}

/// Root of a device model
#[derive(Debug, Clone, Copy, Default)]
pub struct Device;

impl ComponentKind for Device {
    const TYPE_ID: &'static str = "Device";
    const NAME_ID: &'static str = "dev";

    fn data_items(component_id: &str, separator: &str) -> Vec<DataItemDescriptor> {
        vec![DataItemDescriptor::event(
            create_id(component_id, "avail", None, separator),
            "AVAILABILITY",
        )]
    }
}

/// Prismatic axis
#[derive(Debug, Clone, Copy, Default)]
pub struct Linear;

impl ComponentKind for Linear {
    const TYPE_ID: &'static str = "Linear";
    const NAME_ID: &'static str = "lin";

    fn data_items(component_id: &str, separator: &str) -> Vec<DataItemDescriptor> {
        vec![
            DataItemDescriptor::sample(create_id(component_id, "pos", None, separator), "POSITION")
                .with_subtype("ACTUAL")
                .with_units(units::MILLIMETER),
            DataItemDescriptor::sample(
                create_id(component_id, "vel", None, separator),
                "AXIS_FEEDRATE",
            )
            .with_subtype("ACTUAL")
            .with_units(units::MILLIMETER_PER_SECOND),
        ]
    }
}

/// Rotational axis
#[derive(Debug, Clone, Copy, Default)]
pub struct Rotary;

impl ComponentKind for Rotary {
    const TYPE_ID: &'static str = "Rotary";
    const NAME_ID: &'static str = "rot";

    fn data_items(component_id: &str, separator: &str) -> Vec<DataItemDescriptor> {
        vec![
            DataItemDescriptor::sample(create_id(component_id, "angle", None, separator), "ANGLE")
                .with_subtype("ACTUAL")
                .with_units(units::DEGREE),
            DataItemDescriptor::sample(
                create_id(component_id, "speed", None, separator),
                "ROTARY_VELOCITY",
            )
            .with_subtype("ACTUAL")
            .with_units(units::REVOLUTION_PER_MINUTE),
        ]
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct Cooling;

impl ComponentKind for Cooling {
    const TYPE_ID: &'static str = "Cooling";
    const NAME_ID: &'static str = "cooling";

    fn data_items(component_id: &str, separator: &str) -> Vec<DataItemDescriptor> {
        vec![temperature(component_id, separator)]
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct Sensor;

impl ComponentKind for Sensor {
    const TYPE_ID: &'static str = "Sensor";
    const NAME_ID: &'static str = "sensor";

    fn data_items(component_id: &str, separator: &str) -> Vec<DataItemDescriptor> {
        vec![temperature(component_id, separator)]
    }
}

pub(super) fn register_builtins(builder: KindRegistryBuilder) -> Result<KindRegistryBuilder> {
    builder
        .register_component::<Device>()?
        .register_component::<Axes>()?
        .register_component::<Linear>()?
        .register_component::<Rotary>()?
        .register_component::<Controller>()?
        .register_component::<Path>()?
        .register_component::<Systems>()?
        .register_component::<Cooling>()?
        .register_component::<Coolant>()?
        .register_component::<Electric>()?
        .register_component::<Hydraulic>()?
        .register_component::<Pneumatic>()?
        .register_component::<Lubrication>()?
        .register_component::<WorkEnvelope>()?
        .register_component::<GangToolBar>()?
        .register_component::<Sensor>()?
        .register_component::<Door>()?
        .register_component::<Auxiliaries>()?
        .register_component::<Resources>()?
        .register_component::<Personnel>()?
        .register_composition::<Motor>()?
        .register_composition::<Amplifier>()?
        .register_composition::<Spindle>()?
        .register_composition::<Valve>()?
        .register_composition::<Tank>()?
        .register_composition::<Pump>()?
        .register_composition::<Filter>()?
        .register_composition::<Encoder>()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::KindRegistry;

    #[test]
    fn test_builtins_register_without_conflict() {
        let registry = KindRegistry::builder().with_builtins().unwrap().build();
        assert_eq!(registry.component_types().len(), 20);
        assert_eq!(registry.composition_types().len(), 8);
    }

    #[test]
    fn test_axis_defaults() {
        let items = Linear::data_items("dev_x", "_");
        let ids: Vec<&str> = items.iter().map(|d| d.id.as_str()).collect();
        assert_eq!(ids, ["dev_x_pos", "dev_x_vel"]);
        assert_eq!(items[0].units.as_deref(), Some(units::MILLIMETER));
    }

    #[test]
    fn test_cooling_declares_temperature() {
        let items = Cooling::data_items("dev_cooling", "_");
        assert_eq!(items[0].id, "dev_cooling_temp");
        assert_eq!(items[0].kind, "TEMPERATURE");
    }
}
