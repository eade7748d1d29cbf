//! Flattening a component tree into time-stamped observations
//!
//! A [`Snapshot`] lists every value and condition currently held by a
//! subtree. Traversal order is fixed: a node's own values, then its own
//! conditions, then each composition (values, conditions), then each child
//! recursively. Sibling order is insertion order.
//!
//! Each node is read under its own lock, so a snapshot of a tree being
//! updated concurrently may mix old and new state across nodes, but never
//! within one node.

use crate::error::{ModelError, Result};
use crate::model::{ComponentNode, ConditionState, LiveTable};
use crate::types::ObservationValue;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Value of one data item at snapshot time
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    pub data_item_id: String,
    /// Component or composition holding the value
    pub component_id: String,
    pub value: ObservationValue,
    pub timestamp: DateTime<Utc>,
}

/// Condition of one data item at snapshot time
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConditionObservation {
    pub data_item_id: String,
    pub component_id: String,
    pub condition: ConditionState,
    pub timestamp: DateTime<Utc>,
}

/// Flat view of a subtree
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub timestamp: DateTime<Utc>,
    #[serde(default)]
    pub observations: Vec<Observation>,
    #[serde(default)]
    pub conditions: Vec<ConditionObservation>,
}

impl Snapshot {
    pub fn empty(timestamp: DateTime<Utc>) -> Self {
        Self {
            timestamp,
            observations: Vec::new(),
            conditions: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.observations.len() + self.conditions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.observations.is_empty() && self.conditions.is_empty()
    }

    pub fn observation(&self, data_item_id: &str) -> Option<&Observation> {
        self.observations
            .iter()
            .find(|o| o.data_item_id == data_item_id)
    }

    pub fn condition(&self, data_item_id: &str) -> Option<&ConditionObservation> {
        self.conditions.iter().find(|c| c.data_item_id == data_item_id)
    }

    /// Hand this snapshot to a history sink
    pub fn publish_to(&self, sink: &dyn ObservationSink) -> Result<()> {
        sink.publish(self)
    }
}

/// Snapshot `node` and its subtree. Every record carries `as_of`, or the
/// capture time when none is given.
pub fn snapshot(node: &ComponentNode, as_of: Option<DateTime<Utc>>) -> Snapshot {
    let mut snapshot = Snapshot::empty(as_of.unwrap_or_else(Utc::now));
    collect(node, &mut snapshot);
    tracing::trace!(
        "Snapshot of {}: {} observations, {} conditions",
        node.id(),
        snapshot.observations.len(),
        snapshot.conditions.len()
    );
    snapshot
}

fn collect(node: &ComponentNode, out: &mut Snapshot) {
    collect_table(node.id(), node.table(), out);
    for composition in node.compositions() {
        collect_table(composition.id(), composition.table(), out);
    }
    for child in node.children() {
        collect(&child, out);
    }
}

fn collect_table(component_id: &str, table: &LiveTable, out: &mut Snapshot) {
    let timestamp = out.timestamp;
    let (values, conditions) = table.entries();
    out.observations
        .extend(values.into_iter().map(|(data_item_id, value)| Observation {
            data_item_id,
            component_id: component_id.to_string(),
            value,
            timestamp,
        }));
    out.conditions
        .extend(
            conditions
                .into_iter()
                .map(|(data_item_id, condition)| ConditionObservation {
                    data_item_id,
                    component_id: component_id.to_string(),
                    condition,
                    timestamp,
                }),
        );
}

/// Receiver of snapshots, typically a sequenced history buffer
#[cfg_attr(test, mockall::automock)]
pub trait ObservationSink: Send + Sync {
    fn publish(&self, snapshot: &Snapshot) -> Result<()>;
}

impl ObservationSink for crossbeam_channel::Sender<Snapshot> {
    fn publish(&self, snapshot: &Snapshot) -> Result<()> {
        self.send(snapshot.clone())
            .map_err(|e| ModelError::Sink(format!("History channel closed: {}", e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ModelContext;
    use chrono::TimeZone;

    fn tree() -> ComponentNode {
        let dev = ComponentNode::device("dev", "VMC", ModelContext::shared());
        dev.set_value("dev_avail", "AVAILABLE");
        dev.set_condition("dev_system", ConditionState::normal());

        let motor = dev.get_or_create_composition("MOTOR", None);
        motor.set_value("dev_motor_temp", 40.0);

        let axes = dev.get_or_create_child("Axes", None);
        let x = axes.get_or_create_child("Linear", Some("X"));
        x.set_value("dev_axes_X_pos", 12.5);
        x.set_condition("dev_axes_X_travel", ConditionState::warning("Soft limit"));
        dev.get_or_create_child("Controller", None)
            .set_value("dev_cont_mode", "AUTOMATIC");
        dev
    }

    #[test]
    fn test_traversal_order() {
        let snap = tree().snapshot(None);
        let ids: Vec<&str> = snap
            .observations
            .iter()
            .map(|o| o.data_item_id.as_str())
            .collect();
        assert_eq!(
            ids,
            ["dev_avail", "dev_motor_temp", "dev_axes_X_pos", "dev_cont_mode"]
        );
        assert_eq!(snap.conditions.len(), 2);
        assert_eq!(snap.conditions[0].data_item_id, "dev_system");
        assert_eq!(snap.observation("dev_motor_temp").unwrap().component_id, "dev_motor");
    }

    #[test]
    fn test_single_timestamp() {
        let as_of = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
        let snap = tree().snapshot(Some(as_of));
        assert_eq!(snap.timestamp, as_of);
        assert!(snap.observations.iter().all(|o| o.timestamp == as_of));
        assert!(snap.conditions.iter().all(|c| c.timestamp == as_of));
    }

    #[test]
    fn test_empty_tree() {
        let dev = ComponentNode::device("dev", "VMC", ModelContext::shared());
        assert!(dev.snapshot(None).is_empty());
    }

    #[test]
    fn test_publish_to_mock_sink() {
        let snap = tree().snapshot(None);
        let expected = snap.len();

        let mut sink = MockObservationSink::new();
        sink.expect_publish()
            .withf(move |s| s.len() == expected)
            .times(1)
            .returning(|_| Ok(()));

        snap.publish_to(&sink).unwrap();
    }

    #[test]
    fn test_publish_to_channel() {
        let (tx, rx) = crossbeam_channel::unbounded();
        let snap = tree().snapshot(None);
        snap.publish_to(&tx).unwrap();
        assert_eq!(rx.try_recv().unwrap(), snap);

        drop(rx);
        let err = snap.publish_to(&tx).unwrap_err();
        assert!(matches!(err, ModelError::Sink(_)));
    }
}
