//! Equipment model demo
//!
//! Loads a device definition, applies `data_item_id=value` updates and prints
//! the device and streams documents.
//!
//! ```text
//! mtconnect-model device.toml dev_cooling_temp=212 dev_avail=AVAILABLE
//! ```

use anyhow::{bail, Context};
use mtconnect_model::{
    ComponentDefinition, ComponentNode, DocumentEntity, FormatterRegistry, ModelContext,
    ModelSettings, ObservationValue,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

fn parse_value(raw: &str) -> ObservationValue {
    raw.parse::<f64>()
        .map(ObservationValue::Number)
        .unwrap_or_else(|_| ObservationValue::from(raw))
}

fn main() -> anyhow::Result<()> {
    let (writer, _guard) = tracing_appender::non_blocking(std::io::stderr());
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,mtconnect_model=debug")),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(writer))
        .init();

    let mut args = std::env::args().skip(1);
    let Some(device_path) = args.next() else {
        bail!("usage: mtconnect-model <device.toml|device.json> [data_item_id=value ...]");
    };

    let settings = ModelSettings::load_or_default();
    tracing::info!(
        "Unit policy {}, strict data items {}",
        settings.unit_policy,
        settings.strict_data_items
    );
    let format = settings.default_formatter.clone();

    let definition = ComponentDefinition::load(&device_path)
        .with_context(|| format!("Failed to load device {}", device_path))?;
    let device = ComponentNode::from_definition(&definition, ModelContext::with_settings(settings));
    tracing::info!(
        "Loaded {} ({} components)",
        device.id(),
        definition.component_count()
    );

    for update in args {
        let Some((id, raw)) = update.split_once('=') else {
            tracing::warn!("Ignoring malformed update {:?}, expected id=value", update);
            continue;
        };
        device
            .ingest(id, parse_value(raw))
            .with_context(|| format!("Failed to ingest {}", id))?;
    }

    let registry = FormatterRegistry::global();
    let device_doc = registry.encode(&format, &DocumentEntity::Device(device.definition()))?;
    let streams_doc = registry.encode(&format, &DocumentEntity::Streams(device.snapshot(None)))?;

    println!("{}", String::from_utf8_lossy(&device_doc));
    println!("{}", String::from_utf8_lossy(&streams_doc));
    Ok(())
}
