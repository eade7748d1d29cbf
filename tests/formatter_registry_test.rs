//! Formatter registry tests
//!
//! Tests for formatter resolution and document encoding:
//! - Case-insensitive lookup against the global registry
//! - Not-found errors naming the requested id
//! - Streams and device documents through every built-in formatter

mod common;

use chrono::{TimeZone, Utc};
use common::builders::DeviceBuilder;
use common::context;
use indexmap::IndexMap;
use mtconnect_model::formatters::{DocumentEntity, Formatter, FormatterRegistry};
use mtconnect_model::types::ScalarValue;
use mtconnect_model::{ComponentDefinition, ConditionState, ModelError, ObservationValue};
use std::sync::Arc;

fn streams_document() -> DocumentEntity {
    let device = DeviceBuilder::new("dev").axis("X").cooling().build(context());
    device.ingest("dev_avail", "AVAILABLE").unwrap();
    device.ingest("dev_axes_X_pos", 125.5).unwrap();
    device.ingest("dev_cooling_temp", 212.0).unwrap();
    device
        .ingest_condition(
            "dev_cooling_temp",
            ConditionState::fault("Coolant overheated").with_native_code("C12"),
        )
        .unwrap();

    let as_of = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
    DocumentEntity::Streams(device.snapshot(Some(as_of)))
}

#[test]
fn test_global_resolve_is_case_insensitive() {
    let registry = FormatterRegistry::global();
    let lower = registry.resolve("json").unwrap();
    let upper = registry.resolve("JSON").unwrap();
    assert!(Arc::ptr_eq(&lower, &upper));
    assert_eq!(upper.id(), "json");
}

#[test]
fn test_global_resolves_xml_ignoring_case() {
    let registry = FormatterRegistry::global();
    let upper = registry.resolve("XML").unwrap();
    let lower = registry.resolve("xml").unwrap();
    assert!(Arc::ptr_eq(&upper, &lower));
    assert_eq!(lower.id(), "xml");
    assert_eq!(lower.content_type(), "application/xml");
}

#[test]
fn test_global_registry_is_populated_once() {
    assert!(std::ptr::eq(
        FormatterRegistry::global(),
        FormatterRegistry::global()
    ));
}

#[test]
fn test_nonexistent_formatter() {
    let err = FormatterRegistry::global()
        .encode("nonexistent", &streams_document())
        .unwrap_err();
    assert!(matches!(&err, ModelError::FormatterNotFound { id } if id == "nonexistent"));
    assert_eq!(err.to_string(), "Formatter Not Found for \"nonexistent\"");
}

#[test]
fn test_streams_document_through_every_formatter() {
    let registry = FormatterRegistry::global();
    let doc = streams_document();

    for id in registry.ids() {
        let bytes = registry.encode(&id, &doc).unwrap();
        let decoded = registry.decode(&id, &bytes).unwrap();
        assert_eq!(decoded, doc, "formatter {} changed the document", id);
    }
}

#[test]
fn test_streams_json_shape() {
    let bytes = FormatterRegistry::global()
        .encode("json", &streams_document())
        .unwrap();
    let value: serde_json::Value = serde_json::from_slice(&bytes).unwrap();

    assert_eq!(value["document"], "streams");
    assert_eq!(value["timestamp"], "2024-05-01T12:00:00Z");
    let observations = value["observations"].as_array().unwrap();
    assert_eq!(observations.len(), 3);
    assert_eq!(observations[2]["data_item_id"], "dev_cooling_temp");
    assert_eq!(observations[2]["value"], 100.0);
    assert_eq!(value["conditions"][0]["condition"]["level"], "FAULT");
    assert_eq!(value["conditions"][0]["condition"]["native_code"], "C12");
}

#[test]
fn test_device_document_from_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("device.toml");
    DeviceBuilder::new("dev")
        .axis("X")
        .cooling()
        .definition()
        .save(&path)
        .unwrap();

    let definition = ComponentDefinition::load(&path).unwrap();
    let doc = DocumentEntity::Device(definition.clone());
    let registry = FormatterRegistry::global();

    let bytes = registry.encode("TOML", &doc).unwrap();
    match registry.decode("toml", &bytes).unwrap() {
        DocumentEntity::Device(decoded) => assert_eq!(decoded, definition),
        other => panic!("expected a device document, got {}", other.kind()),
    }
}

#[test]
fn test_decode_failure_is_typed() {
    let err = FormatterRegistry::global()
        .decode("json", br#"{"document": "assets"}"#)
        .unwrap_err();
    assert!(matches!(err, ModelError::Decode(_)));
}

#[test]
fn test_data_set_values_survive_json() {
    let device = DeviceBuilder::new("dev").build(context());
    let mut offsets: IndexMap<String, ScalarValue> = IndexMap::new();
    offsets.insert("X".to_string(), 1.5.into());
    offsets.insert("Y".to_string(), "n/a".into());
    device.set_value("dev_offsets", ObservationValue::DataSet(offsets));

    let doc = DocumentEntity::Streams(device.snapshot(None));
    let registry = FormatterRegistry::global();
    let decoded = registry
        .decode("json", &registry.encode("json", &doc).unwrap())
        .unwrap();
    assert_eq!(decoded, doc);
}

#[test]
fn test_non_finite_values_through_every_formatter() {
    let device = DeviceBuilder::new("dev").build(context());
    device.set_value("dev_temp", f64::NAN);
    device.set_value("dev_load", f64::INFINITY);
    device.set_value(
        "dev_wave",
        ObservationValue::TimeSeries(vec![1.0, f64::NEG_INFINITY]),
    );
    device.set_value("dev_tools", ObservationValue::Table(IndexMap::new()));
    let doc = DocumentEntity::Streams(device.snapshot(None));

    let registry = FormatterRegistry::global();
    for id in registry.ids() {
        let bytes = registry.encode(&id, &doc).unwrap();
        let DocumentEntity::Streams(snapshot) = registry.decode(&id, &bytes).unwrap() else {
            panic!("{} decoded a different document kind", id);
        };
        let values: Vec<&ObservationValue> =
            snapshot.observations.iter().map(|o| &o.value).collect();
        assert!(values[0].as_f64().unwrap().is_nan(), "formatter {}", id);
        assert_eq!(values[1].as_f64(), Some(f64::INFINITY), "formatter {}", id);
        assert_eq!(
            values[2],
            &ObservationValue::TimeSeries(vec![1.0, f64::NEG_INFINITY]),
            "formatter {}",
            id
        );
        assert_eq!(values[3], &ObservationValue::Table(IndexMap::new()), "formatter {}", id);
    }
}
