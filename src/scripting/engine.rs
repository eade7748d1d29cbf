//! Rhai engine executing native value converters

use crate::error::{ModelError, Result};
use crate::scripting::{create_shared_cache, CompiledConverter, SharedScriptCache};
use rhai::{Dynamic, Engine, EvalAltResult, Scope};

/// Script engine shared by every node of a model
pub struct ScriptEngine {
    engine: Engine,
    cache: SharedScriptCache,
}

impl ScriptEngine {
    pub fn new() -> Self {
        let mut engine = Engine::new();
        Self::configure_engine(&mut engine);
        Self {
            engine,
            cache: create_shared_cache(),
        }
    }

    /// Configure the Rhai engine with helper functions and safety limits
    fn configure_engine(engine: &mut Engine) {
        engine.set_max_expr_depths(64, 64);
        engine.set_max_call_levels(32);
        engine.set_max_operations(10_000);
        engine.set_max_string_size(10_000);
        engine.set_max_array_size(1_000);
        engine.set_max_map_size(1_000);

        engine.register_fn("clamp", |x: f64, min: f64, max: f64| x.clamp(min, max));
        engine.register_fn("lerp", |a: f64, b: f64, t: f64| a + (b - a) * t);
        engine.register_fn(
            "map_range",
            |x: f64, in_min: f64, in_max: f64, out_min: f64, out_max: f64| {
                (x - in_min) * (out_max - out_min) / (in_max - in_min) + out_min
            },
        );
        engine.register_fn("deadband", |value: f64, center: f64, width: f64| -> f64 {
            if (value - center).abs() < width / 2.0 {
                center
            } else {
                value
            }
        });
        engine.register_fn("to_signed16", |x: f64| -> f64 {
            if x > 32767.0 {
                x - 65536.0
            } else {
                x
            }
        });
        engine.register_fn("to_signed32", |x: f64| -> f64 {
            if x > 2147483647.0 {
                x - 4294967296.0
            } else {
                x
            }
        });
        engine.register_fn("pi", || std::f64::consts::PI);
        engine.register_fn("e", || std::f64::consts::E);
    }

    /// Compile a script and cache it by source
    pub fn compile(&self, name: &str, source: &str) -> Result<CompiledConverter> {
        if let Some(converter) = self.cache.read().get(source) {
            return Ok(converter);
        }
        self.cache.write().get_or_compile(&self.engine, name, source)
    }

    /// Execute a compiled converter with a raw value
    pub fn execute(&self, converter: &CompiledConverter, raw_value: f64) -> Result<f64> {
        let mut scope = Scope::new();
        scope.push("value", raw_value);
        scope.push("raw", raw_value);

        // Prefer a `convert` function, fall back to evaluating the script as an expression
        let result = self
            .engine
            .call_fn::<Dynamic>(&mut scope, converter.ast(), "convert", (raw_value,));

        let value = match result {
            Ok(v) => v,
            Err(e) if matches!(*e, EvalAltResult::ErrorFunctionNotFound(ref f, _) if f.starts_with("convert")) => {
                let mut scope = Scope::new();
                scope.push("value", raw_value);
                scope.push("raw", raw_value);
                self.engine
                    .eval_ast_with_scope::<Dynamic>(&mut scope, converter.ast())
                    .map_err(|e| {
                        ModelError::Script(format!("Execution error in {}: {}", converter.name(), e))
                    })?
            }
            Err(e) => {
                return Err(ModelError::Script(format!(
                    "Execution error in {}: {}",
                    converter.name(),
                    e
                )))
            }
        };

        if let Ok(f) = value.as_float() {
            Ok(f)
        } else if let Ok(i) = value.as_int() {
            Ok(i as f64)
        } else {
            Err(ModelError::Script(format!(
                "Converter {} must return a numeric value, got {}",
                converter.name(),
                value.type_name()
            )))
        }
    }

    /// Compile and execute a script in one step
    pub fn eval(&self, source: &str, raw_value: f64) -> Result<f64> {
        let converter = self.compile("inline", source)?;
        self.execute(&converter, raw_value)
    }

    /// Validate a script without executing it
    pub fn validate(&self, source: &str) -> Result<()> {
        self.engine
            .compile(source)
            .map(|_| ())
            .map_err(|e| ModelError::Script(format!("Validation error: {}", e)))
    }

    pub fn clear_cache(&self) {
        self.cache.write().clear();
    }

    pub fn cache(&self) -> &SharedScriptCache {
        &self.cache
    }
}

impl Default for ScriptEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for ScriptEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScriptEngine")
            .field("cache_size", &self.cache.read().len())
            .finish()
    }
}
