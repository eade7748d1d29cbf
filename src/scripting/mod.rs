//! Rhai scripting for native value converters
//!
//! Some devices report values that need a device-specific transformation
//! before unit normalization (raw encoder counts, offset sensor readings,
//! fixed-point registers). A data item may carry a small Rhai script that is
//! applied to every numeric value ingested for it.
//!
//! ## Script forms
//!
//! A converter is either an expression over `value` (or its alias `raw`):
//!
//! ```rhai
//! value * 0.001
//! ```
//!
//! or defines a `convert` function taking the raw value:
//!
//! ```rhai
//! fn convert(raw) {
//!     (raw - 500.0) / 10.0
//! }
//! ```
//!
//! ## Helper functions
//!
//! - `clamp(x, min, max)`, `lerp(a, b, t)`, `map_range(x, in_min, in_max, out_min, out_max)`
//! - `deadband(value, center, width)` - snap to `center` inside the band
//! - `to_signed16(x)` / `to_signed32(x)` - reinterpret unsigned register values
//! - `pi()`, `e()`

mod engine;

pub use engine::ScriptEngine;

use crate::error::{ModelError, Result};
use parking_lot::RwLock;
use rhai::{Engine, AST};
use std::collections::HashMap;
use std::sync::Arc;

/// A compiled converter script
#[derive(Clone)]
pub struct CompiledConverter {
    ast: Arc<AST>,
    source: String,
    name: String,
}

impl CompiledConverter {
    /// Source code of this converter
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Name the converter was first compiled under (usually a data item id)
    pub fn name(&self) -> &str {
        &self.name
    }

    pub(crate) fn ast(&self) -> &AST {
        &self.ast
    }
}

impl std::fmt::Debug for CompiledConverter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CompiledConverter")
            .field("name", &self.name)
            .field("source", &self.source)
            .finish()
    }
}

/// Cache of compiled scripts keyed by source
#[derive(Default)]
pub struct ScriptCache {
    cache: HashMap<String, CompiledConverter>,
}

impl ScriptCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get a cached converter or compile and cache it
    pub fn get_or_compile(
        &mut self,
        engine: &Engine,
        name: &str,
        source: &str,
    ) -> Result<CompiledConverter> {
        if let Some(converter) = self.cache.get(source) {
            return Ok(converter.clone());
        }

        let ast = engine
            .compile(source)
            .map_err(|e| ModelError::Script(format!("Compilation error in {}: {}", name, e)))?;

        let converter = CompiledConverter {
            ast: Arc::new(ast),
            source: source.to_string(),
            name: name.to_string(),
        };

        self.cache.insert(source.to_string(), converter.clone());
        Ok(converter)
    }

    pub fn get(&self, source: &str) -> Option<CompiledConverter> {
        self.cache.get(source).cloned()
    }

    pub fn len(&self) -> usize {
        self.cache.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cache.is_empty()
    }

    pub fn clear(&mut self) {
        self.cache.clear();
    }
}

/// Thread-safe script cache
pub type SharedScriptCache = Arc<RwLock<ScriptCache>>;

pub fn create_shared_cache() -> SharedScriptCache {
    Arc::new(RwLock::new(ScriptCache::new()))
}

/// Converter scripts for common device encodings
pub mod builtins {
    /// Returns the raw value unchanged
    pub const IDENTITY: &str = r#"
fn convert(raw) {
    raw
}
"#;

    /// Micrometer counts to millimeters
    pub const MICRONS_TO_MM: &str = "value / 1000.0";

    /// Tenths of a degree, as reported by many temperature controllers
    pub const DECI_DEGREES: &str = "value / 10.0";

    /// Unsigned 16-bit register holding a signed value
    pub const U16_TO_SIGNED: &str = "to_signed16(value)";

    /// 4-20 mA loop current to percent of range
    pub const LOOP_CURRENT_TO_PERCENT: &str = r#"
fn convert(raw) {
    clamp(map_range(raw, 4.0, 20.0, 0.0, 100.0), 0.0, 100.0)
}
"#;

    /// All built-in converters with names
    pub fn all() -> Vec<(&'static str, &'static str)> {
        vec![
            ("Identity", IDENTITY),
            ("Microns to mm", MICRONS_TO_MM),
            ("Deci-degrees", DECI_DEGREES),
            ("U16 to Signed", U16_TO_SIGNED),
            ("4-20 mA to Percent", LOOP_CURRENT_TO_PERCENT),
        ]
    }
}
