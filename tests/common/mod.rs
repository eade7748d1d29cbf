//! Common test utilities and helpers

#![allow(dead_code)] // Test utilities may not all be used in every test file

pub mod builders;

use mtconnect_model::{KindRegistry, ModelContext, ModelSettings};
use std::sync::Arc;

/// Context with the global kind registry and default settings
pub fn context() -> Arc<ModelContext> {
    ModelContext::shared()
}

/// Context rejecting undeclared data items and unsupported unit pairs
pub fn strict_context() -> Arc<ModelContext> {
    ModelContext::new(KindRegistry::global(), ModelSettings::strict())
}

/// Assert two floats are approximately equal
pub fn assert_float_eq(a: f64, b: f64, epsilon: f64) {
    assert!(
        (a - b).abs() < epsilon,
        "Expected {} to be approximately equal to {} (epsilon: {})",
        a,
        b,
        epsilon
    );
}

/// Assert two floats agree within a relative tolerance
pub fn assert_rel_eq(a: f64, b: f64, rel: f64) {
    let scale = a.abs().max(b.abs()).max(1.0);
    assert!(
        (a - b).abs() <= rel * scale,
        "Expected {} to be within {} (relative) of {}",
        a,
        rel,
        b
    );
}
