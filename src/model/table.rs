//! Per-node live value and condition tables

use crate::model::{ConditionState, DataItemDescriptor};
use crate::types::ObservationValue;
use indexmap::IndexMap;
use parking_lot::RwLock;

#[derive(Debug, Default)]
struct LiveState {
    values: IndexMap<String, ObservationValue>,
    conditions: IndexMap<String, ConditionState>,
}

/// Declared data items plus the last known value/condition of each.
///
/// Entries keep first-insertion order; an upsert replaces the entry in place.
/// Both tables sit behind one lock so a reader sees a consistent pair.
#[derive(Debug, Default)]
pub struct LiveTable {
    data_items: RwLock<IndexMap<String, DataItemDescriptor>>,
    state: RwLock<LiveState>,
}

impl LiveTable {
    pub fn new(data_items: impl IntoIterator<Item = DataItemDescriptor>) -> Self {
        let table = Self::default();
        for item in data_items {
            table.declare(item);
        }
        table
    }

    /// Declare a data item, replacing any previous declaration with the same id
    pub fn declare(&self, item: DataItemDescriptor) {
        self.data_items.write().insert(item.id.clone(), item);
    }

    /// Declare a data item unless one with the same id already exists
    pub fn declare_if_absent(&self, item: DataItemDescriptor) {
        self.data_items
            .write()
            .entry(item.id.clone())
            .or_insert(item);
    }

    pub fn data_item(&self, id: &str) -> Option<DataItemDescriptor> {
        self.data_items.read().get(id).cloned()
    }

    pub fn is_declared(&self, id: &str) -> bool {
        self.data_items.read().contains_key(id)
    }

    pub fn data_items(&self) -> Vec<DataItemDescriptor> {
        self.data_items.read().values().cloned().collect()
    }

    pub fn get_value(&self, id: &str) -> Option<ObservationValue> {
        self.state.read().values.get(id).cloned()
    }

    pub fn set_value(&self, id: &str, value: ObservationValue) {
        self.state.write().values.insert(id.to_string(), value);
    }

    pub fn get_condition(&self, id: &str) -> Option<ConditionState> {
        self.state.read().conditions.get(id).cloned()
    }

    pub fn set_condition(&self, id: &str, state: ConditionState) {
        self.state.write().conditions.insert(id.to_string(), state);
    }

    /// Copy of both tables taken under a single read lock
    pub fn entries(
        &self,
    ) -> (
        Vec<(String, ObservationValue)>,
        Vec<(String, ConditionState)>,
    ) {
        let state = self.state.read();
        let values = state
            .values
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();
        let conditions = state
            .conditions
            .iter()
            .map(|(k, c)| (k.clone(), c.clone()))
            .collect();
        (values, conditions)
    }

    pub fn value_count(&self) -> usize {
        self.state.read().values.len()
    }

    pub fn condition_count(&self) -> usize {
        self.state.read().conditions.len()
    }
}
