//! Compositions: leaf structural parts of a component

use crate::config::CompositionDefinition;
use crate::model::{ConditionState, DataItemDescriptor, LiveTable};
use crate::types::ObservationValue;

/// A motor, pump, valve... owned by a component. Compositions have no children.
#[derive(Debug)]
pub struct CompositionNode {
    id: String,
    kind: String,
    name: String,
    table: LiveTable,
}

impl CompositionNode {
    pub fn new(
        id: impl Into<String>,
        kind: impl Into<String>,
        name: impl Into<String>,
        data_items: impl IntoIterator<Item = DataItemDescriptor>,
    ) -> Self {
        Self {
            id: id.into(),
            kind: kind.into(),
            name: name.into(),
            table: LiveTable::new(data_items),
        }
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

    pub fn table(&self) -> &LiveTable {
        &self.table
    }

    pub fn get_value(&self, data_item_id: &str) -> Option<ObservationValue> {
        self.table.get_value(data_item_id)
    }

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

    pub fn data_items(&self) -> Vec<DataItemDescriptor> {
        self.table.data_items()
    }

    /// Structure of this composition, without values
    pub fn definition(&self) -> CompositionDefinition {
        CompositionDefinition {
            id: self.id.clone(),
            kind: self.kind.clone(),
            name: Some(self.name.clone()),
            data_items: self.table.data_items(),
        }
    }
}
