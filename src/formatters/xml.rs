//! XML documents
//!
//! Devices are written under `MTConnectDevices`, streams under
//! `MTConnectStreams`. Element and attribute names follow the MTConnect
//! camel-case convention:
//!
//! ```xml
//! <MTConnectStreams timestamp="2024-05-01T12:00:00Z">
//!   <Observations>
//!     <Observation dataItemId="dev_temp" componentId="dev" timestamp="...">
//!       <Sample>100</Sample>
//!     </Observation>
//!   </Observations>
//!   <Conditions>
//!     <Condition dataItemId="dev_temp" componentId="dev" timestamp="..." level="FAULT">Overtemp</Condition>
//!   </Conditions>
//! </MTConnectStreams>
//! ```
//!
//! Numbers are written with their shortest exact text, so `NaN` and `inf`
//! survive a round trip.

use super::{DocumentEntity, Formatter};
use crate::config::{ComponentDefinition, CompositionDefinition};
use crate::error::{ModelError, Result};
use crate::model::{ConditionState, DataItemDescriptor, Description};
use crate::snapshot::{ConditionObservation, Observation, Snapshot};
use crate::types::{ObservationValue, ScalarValue};
use chrono::{DateTime, SecondsFormat, Utc};
use indexmap::IndexMap;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::{Reader, Writer};
use std::fmt::Display;
use std::str::FromStr;

const DEVICES: &str = "MTConnectDevices";
const STREAMS: &str = "MTConnectStreams";

/// Compact XML
#[derive(Debug, Clone, Copy, Default)]
pub struct XmlFormatter;

impl XmlFormatter {
    pub const ID: &'static str = "xml";
    pub const CONTENT_TYPE: &'static str = "application/xml";

    pub fn new() -> Self {
        Self
    }
}

impl Formatter for XmlFormatter {
    fn id(&self) -> &str {
        Self::ID
    }

    fn content_type(&self) -> &str {
        Self::CONTENT_TYPE
    }

    fn encode(&self, entity: &DocumentEntity) -> Result<Vec<u8>> {
        let mut out = DocWriter::new();
        out.write(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;
        match entity {
            DocumentEntity::Device(definition) => {
                out.start(DEVICES, &[])?;
                write_component(&mut out, definition)?;
                out.end(DEVICES)?;
            }
            DocumentEntity::Streams(snapshot) => write_streams(&mut out, snapshot)?,
        }
        Ok(out.finish())
    }

    fn decode(&self, bytes: &[u8]) -> Result<DocumentEntity> {
        let text = std::str::from_utf8(bytes).map_err(invalid)?;
        let root = parse(text)?;
        match root.name.as_str() {
            DEVICES => {
                let component = root
                    .child("Component")
                    .ok_or_else(|| missing(DEVICES, "Component"))?;
                Ok(DocumentEntity::Device(read_component(component)?))
            }
            STREAMS => Ok(DocumentEntity::Streams(read_streams(&root)?)),
            other => Err(ModelError::Decode(format!(
                "Unknown XML document root <{}>",
                other
            ))),
        }
    }
}

fn invalid(e: impl Display) -> ModelError {
    ModelError::Decode(format!("Invalid XML document: {}", e))
}

fn missing(parent: &str, what: &str) -> ModelError {
    ModelError::Decode(format!("<{}> is missing {}", parent, what))
}

fn timestamp_text(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::AutoSi, true)
}

fn parse_timestamp(text: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(text)
        .map(|ts| ts.with_timezone(&Utc))
        .map_err(|e| ModelError::Decode(format!("Invalid timestamp {:?}: {}", text, e)))
}

fn parse_number(text: &str) -> Result<f64> {
    text.trim()
        .parse()
        .map_err(|_| ModelError::Decode(format!("Invalid number {:?}", text)))
}

// ==================== Encoding ====================

struct DocWriter {
    inner: Writer<Vec<u8>>,
}

impl DocWriter {
    fn new() -> Self {
        Self {
            inner: Writer::new(Vec::new()),
        }
    }

    fn write(&mut self, event: Event<'_>) -> Result<()> {
        self.inner
            .write_event(event)
            .map_err(|e| ModelError::Encode(format!("Failed to write XML: {}", e)))
    }

    fn element<'a>(name: &'a str, attributes: &[(&str, &str)]) -> BytesStart<'a> {
        let mut element = BytesStart::new(name);
        for attribute in attributes {
            element.push_attribute(*attribute);
        }
        element
    }

    fn start(&mut self, name: &str, attributes: &[(&str, &str)]) -> Result<()> {
        self.write(Event::Start(Self::element(name, attributes)))
    }

    fn empty(&mut self, name: &str, attributes: &[(&str, &str)]) -> Result<()> {
        self.write(Event::Empty(Self::element(name, attributes)))
    }

    fn end(&mut self, name: &str) -> Result<()> {
        self.write(Event::End(BytesEnd::new(name)))
    }

    fn text_element(&mut self, name: &str, attributes: &[(&str, &str)], text: &str) -> Result<()> {
        self.start(name, attributes)?;
        self.write(Event::Text(BytesText::new(text)))?;
        self.end(name)
    }

    fn finish(self) -> Vec<u8> {
        self.inner.into_inner()
    }
}

fn write_component(out: &mut DocWriter, definition: &ComponentDefinition) -> Result<()> {
    let mut attributes = vec![("id", definition.id.as_str()), ("type", definition.kind.as_str())];
    if let Some(name) = &definition.name {
        attributes.push(("name", name.as_str()));
    }
    out.start("Component", &attributes)?;

    if !definition.description.is_empty() {
        write_description(out, &definition.description)?;
    }
    write_data_items(out, &definition.data_items)?;
    if !definition.compositions.is_empty() {
        out.start("Compositions", &[])?;
        for composition in &definition.compositions {
            write_composition(out, composition)?;
        }
        out.end("Compositions")?;
    }
    if !definition.components.is_empty() {
        out.start("Components", &[])?;
        for child in &definition.components {
            write_component(out, child)?;
        }
        out.end("Components")?;
    }

    out.end("Component")
}

fn write_description(out: &mut DocWriter, description: &Description) -> Result<()> {
    let mut attributes = Vec::new();
    for (key, value) in [
        ("manufacturer", &description.manufacturer),
        ("model", &description.model),
        ("serialNumber", &description.serial_number),
        ("station", &description.station),
    ] {
        if let Some(value) = value {
            attributes.push((key, value.as_str()));
        }
    }
    match &description.text {
        Some(text) => {
            out.start("Description", &attributes)?;
            out.text_element("Text", &[], text)?;
            out.end("Description")
        }
        None => out.empty("Description", &attributes),
    }
}

fn write_composition(out: &mut DocWriter, composition: &CompositionDefinition) -> Result<()> {
    let mut attributes = vec![("id", composition.id.as_str()), ("type", composition.kind.as_str())];
    if let Some(name) = &composition.name {
        attributes.push(("name", name.as_str()));
    }
    out.start("Composition", &attributes)?;
    write_data_items(out, &composition.data_items)?;
    out.end("Composition")
}

fn write_data_items(out: &mut DocWriter, items: &[DataItemDescriptor]) -> Result<()> {
    if items.is_empty() {
        return Ok(());
    }
    out.start("DataItems", &[])?;
    for item in items {
        let scale = item.native_scale.map(|s| s.to_string());
        let mut attributes = vec![
            ("id", item.id.as_str()),
            ("type", item.kind.as_str()),
            ("category", item.category.as_str()),
        ];
        for (key, value) in [
            ("name", &item.name),
            ("subType", &item.subtype),
            ("units", &item.units),
            ("nativeUnits", &item.native_units),
            ("nativeScale", &scale),
        ] {
            if let Some(value) = value {
                attributes.push((key, value.as_str()));
            }
        }
        if item.representation != Default::default() {
            attributes.push(("representation", item.representation.as_str()));
        }

        match &item.converter {
            Some(script) => {
                out.start("DataItem", &attributes)?;
                out.text_element("Converter", &[], script)?;
                out.end("DataItem")?;
            }
            None => out.empty("DataItem", &attributes)?,
        }
    }
    out.end("DataItems")
}

fn write_streams(out: &mut DocWriter, snapshot: &Snapshot) -> Result<()> {
    let ts = timestamp_text(&snapshot.timestamp);
    out.start(STREAMS, &[("timestamp", ts.as_str())])?;

    out.start("Observations", &[])?;
    for observation in &snapshot.observations {
        let ts = timestamp_text(&observation.timestamp);
        out.start(
            "Observation",
            &[
                ("dataItemId", observation.data_item_id.as_str()),
                ("componentId", observation.component_id.as_str()),
                ("timestamp", ts.as_str()),
            ],
        )?;
        write_value(out, &observation.value)?;
        out.end("Observation")?;
    }
    out.end("Observations")?;

    out.start("Conditions", &[])?;
    for observation in &snapshot.conditions {
        write_condition(out, observation)?;
    }
    out.end("Conditions")?;

    out.end(STREAMS)
}

fn write_value(out: &mut DocWriter, value: &ObservationValue) -> Result<()> {
    match value {
        ObservationValue::Number(v) => out.text_element("Sample", &[], &v.to_string()),
        ObservationValue::Text(s) => out.text_element("Event", &[], s),
        ObservationValue::TimeSeries(samples) => {
            let count = samples.len().to_string();
            let text = samples
                .iter()
                .map(|v| v.to_string())
                .collect::<Vec<_>>()
                .join(" ");
            out.text_element("TimeSeries", &[("count", count.as_str())], &text)
        }
        ObservationValue::DataSet(entries) => {
            out.start("DataSet", &[])?;
            write_entries(out, entries)?;
            out.end("DataSet")
        }
        ObservationValue::Table(rows) => {
            out.start("Table", &[])?;
            for (key, entries) in rows {
                out.start("Row", &[("key", key.as_str())])?;
                write_entries(out, entries)?;
                out.end("Row")?;
            }
            out.end("Table")
        }
    }
}

fn write_entries(out: &mut DocWriter, entries: &IndexMap<String, ScalarValue>) -> Result<()> {
    for (key, value) in entries {
        match value {
            ScalarValue::Number(v) => out.text_element("Number", &[("key", key.as_str())], &v.to_string())?,
            ScalarValue::Text(s) => out.text_element("Text", &[("key", key.as_str())], s)?,
        }
    }
    Ok(())
}

fn write_condition(out: &mut DocWriter, observation: &ConditionObservation) -> Result<()> {
    let ts = timestamp_text(&observation.timestamp);
    let condition = &observation.condition;
    let mut attributes = vec![
        ("dataItemId", observation.data_item_id.as_str()),
        ("componentId", observation.component_id.as_str()),
        ("timestamp", ts.as_str()),
        ("level", condition.level.as_str()),
    ];
    if let Some(code) = &condition.native_code {
        attributes.push(("nativeCode", code.as_str()));
    }
    if let Some(severity) = &condition.native_severity {
        attributes.push(("nativeSeverity", severity.as_str()));
    }
    if let Some(qualifier) = &condition.qualifier {
        attributes.push(("qualifier", qualifier.as_str()));
    }
    match &condition.text {
        Some(text) => out.text_element("Condition", &attributes, text),
        None => out.empty("Condition", &attributes),
    }
}

// ==================== Decoding ====================

/// Minimal element tree
#[derive(Debug, Default)]
struct Element {
    name: String,
    attributes: Vec<(String, String)>,
    children: Vec<Element>,
    text: String,
    self_closing: bool,
}

impl Element {
    fn open(start: &BytesStart<'_>) -> Result<Self> {
        let name = String::from_utf8_lossy(start.name().as_ref()).into_owned();
        let mut attributes = Vec::new();
        for attribute in start.attributes() {
            let attribute = attribute.map_err(invalid)?;
            let key = String::from_utf8_lossy(attribute.key.as_ref()).into_owned();
            let value = attribute.unescape_value().map_err(invalid)?.into_owned();
            attributes.push((key, value));
        }
        Ok(Self {
            name,
            attributes,
            ..Default::default()
        })
    }

    fn attr(&self, key: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    fn owned_attr(&self, key: &str) -> Option<String> {
        self.attr(key).map(str::to_string)
    }

    fn required(&self, key: &str) -> Result<&str> {
        self.attr(key)
            .ok_or_else(|| missing(&self.name, &format!("attribute {:?}", key)))
    }

    fn parsed<T: FromStr<Err = ModelError>>(&self, key: &str) -> Result<Option<T>> {
        self.attr(key).map(str::parse).transpose()
    }

    fn child(&self, name: &str) -> Option<&Element> {
        self.children.iter().find(|c| c.name == name)
    }

    /// `<container><name/>...</container>` children
    fn grandchildren<'a>(&'a self, container: &str, name: &'a str) -> impl Iterator<Item = &'a Element> {
        self.child(container)
            .into_iter()
            .flat_map(move |c| c.children.iter().filter(move |e| e.name == name))
    }
}

fn parse(text: &str) -> Result<Element> {
    let mut reader = Reader::from_str(text);
    let mut stack: Vec<Element> = Vec::new();

    loop {
        match reader.read_event().map_err(invalid)? {
            Event::Start(start) => stack.push(Element::open(&start)?),
            Event::Empty(start) => {
                let mut element = Element::open(&start)?;
                element.self_closing = true;
                if let Some(done) = close(&mut stack, element) {
                    return Ok(done);
                }
            }
            Event::End(_) => {
                let element = stack
                    .pop()
                    .ok_or_else(|| ModelError::Decode("Unbalanced XML end tag".to_string()))?;
                if let Some(done) = close(&mut stack, element) {
                    return Ok(done);
                }
            }
            Event::Text(t) => {
                if let Some(current) = stack.last_mut() {
                    current.text.push_str(&t.unescape().map_err(invalid)?);
                }
            }
            Event::CData(c) => {
                if let Some(current) = stack.last_mut() {
                    current.text.push_str(&String::from_utf8_lossy(&c.into_inner()));
                }
            }
            Event::Eof => {
                return Err(ModelError::Decode(
                    "XML document ended before its root element closed".to_string(),
                ))
            }
            _ => {}
        }
    }
}

/// Attach a finished element to its parent; returns it when it is the root
fn close(stack: &mut Vec<Element>, element: Element) -> Option<Element> {
    match stack.last_mut() {
        Some(parent) => {
            parent.children.push(element);
            None
        }
        None => Some(element),
    }
}

fn read_component(el: &Element) -> Result<ComponentDefinition> {
    let description = match el.child("Description") {
        Some(d) => Description {
            manufacturer: d.owned_attr("manufacturer"),
            model: d.owned_attr("model"),
            serial_number: d.owned_attr("serialNumber"),
            station: d.owned_attr("station"),
            text: d.child("Text").map(|t| t.text.clone()),
        },
        None => Description::default(),
    };

    Ok(ComponentDefinition {
        id: el.required("id")?.to_string(),
        kind: el.required("type")?.to_string(),
        name: el.owned_attr("name"),
        description,
        data_items: read_data_items(el)?,
        compositions: el
            .grandchildren("Compositions", "Composition")
            .map(|c| -> Result<CompositionDefinition> {
                Ok(CompositionDefinition {
                    id: c.required("id")?.to_string(),
                    kind: c.required("type")?.to_string(),
                    name: c.owned_attr("name"),
                    data_items: read_data_items(c)?,
                })
            })
            .collect::<Result<_>>()?,
        components: el
            .grandchildren("Components", "Component")
            .map(read_component)
            .collect::<Result<_>>()?,
    })
}

fn read_data_items(el: &Element) -> Result<Vec<DataItemDescriptor>> {
    el.grandchildren("DataItems", "DataItem")
        .map(|item| -> Result<DataItemDescriptor> {
            Ok(DataItemDescriptor {
                id: item.required("id")?.to_string(),
                kind: item.required("type")?.to_string(),
                category: item.parsed("category")?.unwrap_or_default(),
                name: item.owned_attr("name"),
                subtype: item.owned_attr("subType"),
                units: item.owned_attr("units"),
                native_units: item.owned_attr("nativeUnits"),
                native_scale: item.attr("nativeScale").map(parse_number).transpose()?,
                representation: item.parsed("representation")?.unwrap_or_default(),
                converter: item.child("Converter").map(|c| c.text.clone()),
            })
        })
        .collect()
}

fn read_streams(root: &Element) -> Result<Snapshot> {
    let mut snapshot = Snapshot::empty(parse_timestamp(root.required("timestamp")?)?);

    for el in root.grandchildren("Observations", "Observation") {
        let value = el
            .children
            .first()
            .ok_or_else(|| missing("Observation", "a value"))?;
        snapshot.observations.push(Observation {
            data_item_id: el.required("dataItemId")?.to_string(),
            component_id: el.required("componentId")?.to_string(),
            value: read_value(value)?,
            timestamp: parse_timestamp(el.required("timestamp")?)?,
        });
    }

    for el in root.grandchildren("Conditions", "Condition") {
        let condition = ConditionState {
            level: el.required("level")?.parse()?,
            native_code: el.owned_attr("nativeCode"),
            native_severity: el.owned_attr("nativeSeverity"),
            qualifier: el.parsed("qualifier")?,
            text: (!el.self_closing).then(|| el.text.clone()),
        };
        snapshot.conditions.push(ConditionObservation {
            data_item_id: el.required("dataItemId")?.to_string(),
            component_id: el.required("componentId")?.to_string(),
            condition,
            timestamp: parse_timestamp(el.required("timestamp")?)?,
        });
    }

    Ok(snapshot)
}

fn read_value(el: &Element) -> Result<ObservationValue> {
    match el.name.as_str() {
        "Sample" => Ok(ObservationValue::Number(parse_number(&el.text)?)),
        "Event" => Ok(ObservationValue::Text(el.text.clone())),
        "TimeSeries" => Ok(ObservationValue::TimeSeries(
            el.text
                .split_whitespace()
                .map(parse_number)
                .collect::<Result<_>>()?,
        )),
        "DataSet" => Ok(ObservationValue::DataSet(read_entries(el)?)),
        "Table" => Ok(ObservationValue::Table(
            el.children
                .iter()
                .filter(|row| row.name == "Row")
                .map(|row| -> Result<(String, IndexMap<String, ScalarValue>)> {
                    Ok((row.required("key")?.to_string(), read_entries(row)?))
                })
                .collect::<Result<_>>()?,
        )),
        other => Err(ModelError::Decode(format!("Unknown value element <{}>", other))),
    }
}

fn read_entries(el: &Element) -> Result<IndexMap<String, ScalarValue>> {
    let mut entries = IndexMap::new();
    for entry in &el.children {
        let value = match entry.name.as_str() {
            "Number" => ScalarValue::Number(parse_number(&entry.text)?),
            "Text" => ScalarValue::Text(entry.text.clone()),
            other => return Err(ModelError::Decode(format!("Unknown entry element <{}>", other))),
        };
        entries.insert(entry.required("key")?.to_string(), value);
    }
    Ok(entries)
}
