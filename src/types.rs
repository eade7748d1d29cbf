//! Core value types for the equipment model
//!
//! This module contains the value representations stored in a component's
//! live value table and carried by snapshot observations.
//!
//! # Main Types
//!
//! - [`ObservationValue`] - Current value of a data item (number, text, table, ...)
//! - [`ScalarValue`] - A single cell of a data set or table entry
//! - [`DataItemCategory`] - Sample, event or condition
//! - [`Representation`] - How an observation value is shaped on the wire
//!
//! # Unavailable values
//!
//! When no valid value can be determined for a data item it is reported with
//! the text [`UNAVAILABLE`].
//!
//! # Wire form
//!
//! Finite numbers and text are written as plain scalars. Structured values
//! carry a single-key tag so that an empty table never reads back as an
//! empty data set, and non-finite numbers are tagged text because JSON has
//! no literal for them:
//!
//! ```json
//! 100.0
//! "AVAILABLE"
//! {"number": "NaN"}
//! {"time_series": [0.0, 100.0]}
//! {"data_set": {"X": 1.5, "Y": "n/a"}}
//! {"table": {"T1": {"LENGTH": 10.5}}}
//! ```

use crate::error::ModelError;
use indexmap::IndexMap;
use serde::de::{self, Deserializer};
use serde::ser::{SerializeMap, Serializer};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Text reported when no valid value is known for a data item
pub const UNAVAILABLE: &str = "UNAVAILABLE";

/// Category of a data item
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DataItemCategory {
    /// Continuously variable numeric measurement
    #[default]
    Sample,
    /// Discrete state or message
    Event,
    /// Health / fault state
    Condition,
}

impl DataItemCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            DataItemCategory::Sample => "SAMPLE",
            DataItemCategory::Event => "EVENT",
            DataItemCategory::Condition => "CONDITION",
        }
    }
}

impl fmt::Display for DataItemCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DataItemCategory {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "SAMPLE" => Ok(DataItemCategory::Sample),
            "EVENT" => Ok(DataItemCategory::Event),
            "CONDITION" => Ok(DataItemCategory::Condition),
            other => Err(ModelError::Decode(format!(
                "Unknown data item category {:?}",
                other
            ))),
        }
    }
}

/// Shape of the values reported for a data item
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Representation {
    #[default]
    Value,
    TimeSeries,
    DataSet,
    Table,
}

impl Representation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Representation::Value => "VALUE",
            Representation::TimeSeries => "TIME_SERIES",
            Representation::DataSet => "DATA_SET",
            Representation::Table => "TABLE",
        }
    }
}

impl FromStr for Representation {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "VALUE" => Ok(Representation::Value),
            "TIME_SERIES" => Ok(Representation::TimeSeries),
            "DATA_SET" => Ok(Representation::DataSet),
            "TABLE" => Ok(Representation::Table),
            other => Err(ModelError::Decode(format!("Unknown representation {:?}", other))),
        }
    }
}

/// A single scalar inside a data set or table
#[derive(Debug, Clone, PartialEq)]
pub enum ScalarValue {
    Number(f64),
    Text(String),
}

impl From<f64> for ScalarValue {
    fn from(v: f64) -> Self {
        ScalarValue::Number(v)
    }
}

impl From<&str> for ScalarValue {
    fn from(v: &str) -> Self {
        ScalarValue::Text(v.to_string())
    }
}

impl From<String> for ScalarValue {
    fn from(v: String) -> Self {
        ScalarValue::Text(v)
    }
}

impl fmt::Display for ScalarValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScalarValue::Number(v) => write!(f, "{}", v),
            ScalarValue::Text(s) => write!(f, "{}", s),
        }
    }
}

/// Current value of a data item
#[derive(Debug, Clone, PartialEq)]
pub enum ObservationValue {
    /// Numeric sample or event value
    Number(f64),
    /// Text event value, including [`UNAVAILABLE`]
    Text(String),
    /// Fixed-rate series of samples
    TimeSeries(Vec<f64>),
    /// Key/value pairs
    DataSet(IndexMap<String, ScalarValue>),
    /// Keyed rows of key/value cells
    Table(IndexMap<String, IndexMap<String, ScalarValue>>),
}

impl ObservationValue {
    /// The `UNAVAILABLE` value
    pub fn unavailable() -> Self {
        ObservationValue::Text(UNAVAILABLE.to_string())
    }

    /// Returns true if this value reports the data item as unavailable
    pub fn is_unavailable(&self) -> bool {
        matches!(self, ObservationValue::Text(s) if s == UNAVAILABLE)
    }

    /// Numeric value, if this is a number
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            ObservationValue::Number(v) => Some(*v),
            _ => None,
        }
    }

    /// Text value, if this is text
    pub fn as_str(&self) -> Option<&str> {
        match self {
            ObservationValue::Text(s) => Some(s),
            _ => None,
        }
    }

    /// The representation this value is reported with
    pub fn representation(&self) -> Representation {
        match self {
            ObservationValue::Number(_) | ObservationValue::Text(_) => Representation::Value,
            ObservationValue::TimeSeries(_) => Representation::TimeSeries,
            ObservationValue::DataSet(_) => Representation::DataSet,
            ObservationValue::Table(_) => Representation::Table,
        }
    }

    /// Number of entries for data set and table values
    pub fn entry_count(&self) -> usize {
        match self {
            ObservationValue::DataSet(m) => m.len(),
            ObservationValue::Table(m) => m.len(),
            ObservationValue::TimeSeries(v) => v.len(),
            _ => 1,
        }
    }
}

impl From<f64> for ObservationValue {
    fn from(v: f64) -> Self {
        ObservationValue::Number(v)
    }
}

impl From<&str> for ObservationValue {
    fn from(v: &str) -> Self {
        ObservationValue::Text(v.to_string())
    }
}

impl From<String> for ObservationValue {
    fn from(v: String) -> Self {
        ObservationValue::Text(v)
    }
}

impl From<Vec<f64>> for ObservationValue {
    fn from(v: Vec<f64>) -> Self {
        ObservationValue::TimeSeries(v)
    }
}

impl fmt::Display for ObservationValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ObservationValue::Number(v) => write!(f, "{}", v),
            ObservationValue::Text(s) => write!(f, "{}", s),
            ObservationValue::TimeSeries(v) => {
                let parts: Vec<String> = v.iter().map(|x| x.to_string()).collect();
                write!(f, "{}", parts.join(" "))
            }
            ObservationValue::DataSet(m) => {
                let parts: Vec<String> = m.iter().map(|(k, v)| format!("{}={}", k, v)).collect();
                write!(f, "{}", parts.join(" "))
            }
            ObservationValue::Table(m) => {
                let parts: Vec<String> = m
                    .iter()
                    .map(|(k, row)| {
                        let cells: Vec<String> =
                            row.iter().map(|(c, v)| format!("{}={}", c, v)).collect();
                        format!("{}={{{}}}", k, cells.join(" "))
                    })
                    .collect();
                write!(f, "{}", parts.join(" "))
            }
        }
    }
}

// ==================== Wire form ====================

fn tagged<S, T>(serializer: S, tag: &str, value: &T) -> Result<S::Ok, S::Error>
where
    S: Serializer,
    T: Serialize + ?Sized,
{
    let mut map = serializer.serialize_map(Some(1))?;
    map.serialize_entry(tag, value)?;
    map.end()
}

/// An `f64` written as a plain number when finite, else as `{"number": "<text>"}`
struct WireFloat(f64);

impl Serialize for WireFloat {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        if self.0.is_finite() {
            serializer.serialize_f64(self.0)
        } else {
            tagged(serializer, "number", &self.0.to_string())
        }
    }
}

/// Text form of a number (`NaN`, `inf`, `-inf`)
struct NumberText(f64);

impl<'de> Deserialize<'de> for NumberText {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        text.parse()
            .map(NumberText)
            .map_err(|_| de::Error::custom(format!("invalid number {:?}", text)))
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum FloatRepr {
    Plain(f64),
    Tagged { number: NumberText },
}

impl FloatRepr {
    fn value(self) -> f64 {
        match self {
            FloatRepr::Plain(v) => v,
            FloatRepr::Tagged { number } => number.0,
        }
    }
}

impl Serialize for ScalarValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            ScalarValue::Number(v) => WireFloat(*v).serialize(serializer),
            ScalarValue::Text(s) => serializer.serialize_str(s),
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum ScalarRepr {
    Number(FloatRepr),
    Text(String),
}

impl<'de> Deserialize<'de> for ScalarValue {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Ok(match ScalarRepr::deserialize(deserializer)? {
            ScalarRepr::Number(v) => ScalarValue::Number(v.value()),
            ScalarRepr::Text(s) => ScalarValue::Text(s),
        })
    }
}

impl Serialize for ObservationValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            ObservationValue::Number(v) => WireFloat(*v).serialize(serializer),
            ObservationValue::Text(s) => serializer.serialize_str(s),
            ObservationValue::TimeSeries(samples) => {
                let samples: Vec<WireFloat> = samples.iter().copied().map(WireFloat).collect();
                tagged(serializer, "time_series", &samples)
            }
            ObservationValue::DataSet(entries) => tagged(serializer, "data_set", entries),
            ObservationValue::Table(rows) => tagged(serializer, "table", rows),
        }
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "snake_case")]
enum TaggedValue {
    Number(NumberText),
    TimeSeries(Vec<FloatRepr>),
    DataSet(IndexMap<String, ScalarValue>),
    Table(IndexMap<String, IndexMap<String, ScalarValue>>),
}

#[derive(Deserialize)]
#[serde(untagged)]
enum ValueRepr {
    Number(f64),
    Text(String),
    Tagged(TaggedValue),
}

impl<'de> Deserialize<'de> for ObservationValue {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Ok(match ValueRepr::deserialize(deserializer)? {
            ValueRepr::Number(v) => ObservationValue::Number(v),
            ValueRepr::Text(s) => ObservationValue::Text(s),
            ValueRepr::Tagged(TaggedValue::Number(v)) => ObservationValue::Number(v.0),
            ValueRepr::Tagged(TaggedValue::TimeSeries(samples)) => ObservationValue::TimeSeries(
                samples.into_iter().map(FloatRepr::value).collect(),
            ),
            ValueRepr::Tagged(TaggedValue::DataSet(entries)) => ObservationValue::DataSet(entries),
            ValueRepr::Tagged(TaggedValue::Table(rows)) => ObservationValue::Table(rows),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unavailable() {
        let v = ObservationValue::unavailable();
        assert!(v.is_unavailable());
        assert!(!ObservationValue::from("ACTIVE").is_unavailable());
    }

    #[test]
    fn test_structured_values_are_tagged() {
        let v: ObservationValue =
            serde_json::from_str(r#"{"data_set": {"a": 1.0, "b": "x"}}"#).unwrap();
        assert_eq!(v.representation(), Representation::DataSet);
        assert_eq!(v.entry_count(), 2);

        let t: ObservationValue =
            serde_json::from_str(r#"{"table": {"T1": {"LENGTH": 10.5, "NAME": "drill"}}}"#)
                .unwrap();
        assert_eq!(t.representation(), Representation::Table);

        assert!(serde_json::from_str::<ObservationValue>(r#"{"a": 1.0}"#).is_err());
    }

    #[test]
    fn test_empty_table_stays_a_table() {
        for value in [
            ObservationValue::Table(IndexMap::new()),
            ObservationValue::DataSet(IndexMap::new()),
            ObservationValue::TimeSeries(Vec::new()),
        ] {
            let json = serde_json::to_string(&value).unwrap();
            let back: ObservationValue = serde_json::from_str(&json).unwrap();
            assert_eq!(back, value, "{} decoded as {:?}", json, back);
        }
        assert_eq!(
            serde_json::to_string(&ObservationValue::Table(IndexMap::new())).unwrap(),
            r#"{"table":{}}"#
        );
    }

    #[test]
    fn test_non_finite_numbers_survive_json() {
        let json = serde_json::to_string(&ObservationValue::Number(f64::NAN)).unwrap();
        assert_eq!(json, r#"{"number":"NaN"}"#);
        let back: ObservationValue = serde_json::from_str(&json).unwrap();
        assert!(back.as_f64().unwrap().is_nan());

        let series = ObservationValue::TimeSeries(vec![1.0, f64::INFINITY, f64::NEG_INFINITY]);
        let back: ObservationValue =
            serde_json::from_str(&serde_json::to_string(&series).unwrap()).unwrap();
        assert_eq!(back, series);

        let mut entries = IndexMap::new();
        entries.insert("limit".to_string(), ScalarValue::Number(f64::INFINITY));
        entries.insert("label".to_string(), ScalarValue::from("NaN"));
        let set = ObservationValue::DataSet(entries);
        let back: ObservationValue =
            serde_json::from_str(&serde_json::to_string(&set).unwrap()).unwrap();
        assert_eq!(back, set);
    }

    #[test]
    fn test_text_nan_is_not_a_number() {
        let back: ObservationValue = serde_json::from_str(r#""NaN""#).unwrap();
        assert_eq!(back.as_str(), Some("NaN"));
    }

    #[test]
    fn test_category_and_representation_parse() {
        assert_eq!("EVENT".parse::<DataItemCategory>().unwrap(), DataItemCategory::Event);
        assert_eq!(
            "TIME_SERIES".parse::<Representation>().unwrap(),
            Representation::TimeSeries
        );
        assert!(matches!(
            "sample".parse::<DataItemCategory>(),
            Err(ModelError::Decode(_))
        ));
    }

    #[test]
    fn test_number_and_text_decoding() {
        let n: ObservationValue = serde_json::from_str("100").unwrap();
        assert_eq!(n.as_f64(), Some(100.0));

        let s: ObservationValue = serde_json::from_str(r#""READY""#).unwrap();
        assert_eq!(s.as_str(), Some("READY"));
    }

    #[test]
    fn test_display() {
        assert_eq!(ObservationValue::from(vec![1.0, 2.5]).to_string(), "1 2.5");
        assert_eq!(DataItemCategory::Condition.to_string(), "CONDITION");
    }
}
