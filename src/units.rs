//! Unit normalization between a device's native units and canonical units
//!
//! Every data item declares the canonical `units` its values must be reported
//! in, and optionally the `native_units` the device actually produces. The
//! conversion table maps an ordered `(units, native_units)` pair to a pure
//! formula. The table is deliberately not symmetric: a pair with no entry is
//! an unsupported conversion, never synthesized from its inverse.
//!
//! Two entry points are provided:
//!
//! - [`try_convert`] surfaces [`ModelError::UnsupportedConversion`] for pairs
//!   the table does not cover
//! - [`convert`] is the permissive variant that returns the input unchanged
//!   for unsupported pairs
//!
//! Equal units, or either unit unspecified, always convert as the identity.
//!
//! # Example
//!
//! ```
//! use mtconnect_model::units::{self, CELSIUS, FAHRENHEIT};
//!
//! let c = units::convert(212.0, Some(CELSIUS), Some(FAHRENHEIT));
//! assert_eq!(c, 100.0);
//! ```

use crate::error::{ModelError, Result};
use once_cell::sync::Lazy;
use std::collections::HashMap;
use std::f64::consts::PI;

// Canonical units

pub const AMPERE: &str = "AMPERE";
pub const CELSIUS: &str = "CELSIUS";
pub const COUNT: &str = "COUNT";
pub const DEGREE: &str = "DEGREE";
pub const DEGREE_PER_SECOND: &str = "DEGREE/SECOND";
pub const DEGREE_PER_SECOND_SQUARED: &str = "DEGREE/SECOND^2";
pub const JOULE: &str = "JOULE";
pub const KILOGRAM: &str = "KILOGRAM";
pub const LITER: &str = "LITER";
pub const LITER_PER_SECOND: &str = "LITER/SECOND";
pub const MICRO_RADIAN: &str = "MICRO_RADIAN";
pub const MILLIGRAM: &str = "MILLIGRAM";
pub const MILLILITER: &str = "MILLILITER";
pub const MILLIMETER: &str = "MILLIMETER";
pub const MILLIMETER_PER_SECOND: &str = "MILLIMETER/SECOND";
pub const MILLIMETER_PER_SECOND_SQUARED: &str = "MILLIMETER/SECOND^2";
pub const NEWTON: &str = "NEWTON";
pub const NEWTON_METER: &str = "NEWTON_METER";
pub const PASCAL: &str = "PASCAL";
pub const PASCAL_PER_SECOND: &str = "PASCAL/SECOND";
pub const PASCAL_SECOND: &str = "PASCAL_SECOND";
pub const PERCENT: &str = "PERCENT";
pub const REVOLUTION_PER_MINUTE: &str = "REVOLUTION/MINUTE";
pub const REVOLUTION_PER_SECOND: &str = "REVOLUTION/SECOND";
pub const REVOLUTION_PER_SECOND_SQUARED: &str = "REVOLUTION/SECOND^2";
pub const SECOND: &str = "SECOND";
pub const VOLT: &str = "VOLT";
pub const WATT: &str = "WATT";
pub const WATT_SECOND: &str = "WATT_SECOND";

// Native-only units

pub const BAR: &str = "BAR";
pub const CENTIPOISE: &str = "CENTIPOISE";
pub const DEGREE_PER_MINUTE: &str = "DEGREE/MINUTE";
pub const FAHRENHEIT: &str = "FAHRENHEIT";
pub const FOOT: &str = "FOOT";
pub const FOOT_PER_MINUTE: &str = "FOOT/MINUTE";
pub const FOOT_PER_SECOND: &str = "FOOT/SECOND";
pub const FOOT_PER_SECOND_SQUARED: &str = "FOOT/SECOND^2";
pub const GALLON_PER_MINUTE: &str = "GALLON/MINUTE";
pub const HOUR: &str = "HOUR";
pub const INCH: &str = "INCH";
pub const INCH_PER_MINUTE: &str = "INCH/MINUTE";
pub const INCH_PER_SECOND: &str = "INCH/SECOND";
pub const INCH_PER_SECOND_SQUARED: &str = "INCH/SECOND^2";
pub const INCH_POUND: &str = "INCH_POUND";
pub const KELVIN: &str = "KELVIN";
pub const KILOWATT: &str = "KILOWATT";
pub const KILOWATT_HOUR: &str = "KILOWATT_HOUR";
pub const LITER_PER_MINUTE: &str = "LITER/MINUTE";
pub const MILLIMETER_MERCURY: &str = "MILLIMETER_MERCURY";
pub const MILLIMETER_PER_MINUTE: &str = "MILLIMETER/MINUTE";
pub const MINUTE: &str = "MINUTE";
pub const PASCAL_PER_MINUTE: &str = "PASCAL/MINUTE";
pub const POUND: &str = "POUND";
pub const POUND_PER_INCH_SQUARED: &str = "POUND/INCH^2";
pub const RADIAN: &str = "RADIAN";
pub const RADIAN_PER_MINUTE: &str = "RADIAN/MINUTE";
pub const RADIAN_PER_SECOND: &str = "RADIAN/SECOND";
pub const RADIAN_PER_SECOND_SQUARED: &str = "RADIAN/SECOND^2";
pub const TORR: &str = "TORR";

// Exact defining constants

const MM_PER_INCH: f64 = 25.4;
const MM_PER_FOOT: f64 = 304.8;
const KG_PER_POUND: f64 = 0.453_592_37;
const NEWTON_PER_POUND_FORCE: f64 = 4.448_221_615_260_5;
const NEWTON_METER_PER_INCH_POUND: f64 = NEWTON_PER_POUND_FORCE * 0.0254;
const LITER_PER_GALLON: f64 = 3.785_411_784;
const PASCAL_PER_BAR: f64 = 100_000.0;
const PASCAL_PER_PSI: f64 = 6_894.757_293_168;
const PASCAL_PER_TORR: f64 = 101_325.0 / 760.0;
const PASCAL_PER_MMHG: f64 = 133.322_387_415;
const JOULE_PER_KWH: f64 = 3_600_000.0;
const CELSIUS_ZERO_KELVIN: f64 = 273.15;
const DEG_PER_RAD: f64 = 180.0 / PI;
const RAD_PER_REV: f64 = 2.0 * PI;

/// A pure conversion formula from a native value to a canonical value
pub type Formula = fn(f64) -> f64;

/// One entry of the conversion table
#[derive(Clone, Copy)]
pub struct UnitConversion {
    /// Unit the value is converted to
    pub units: &'static str,
    /// Unit the value is produced in
    pub native_units: &'static str,
    /// Conversion formula
    pub formula: Formula,
}

impl std::fmt::Debug for UnitConversion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UnitConversion")
            .field("units", &self.units)
            .field("native_units", &self.native_units)
            .finish()
    }
}

const fn entry(units: &'static str, native_units: &'static str, formula: Formula) -> UnitConversion {
    UnitConversion {
        units,
        native_units,
        formula,
    }
}

/// The conversion table, ordered by target unit.
pub static CONVERSIONS: &[UnitConversion] = &[
    // Pressure
    entry(BAR, PASCAL, |v| v / PASCAL_PER_BAR),
    entry(BAR, MILLIMETER_MERCURY, |v| v * PASCAL_PER_MMHG / PASCAL_PER_BAR),
    entry(BAR, POUND_PER_INCH_SQUARED, |v| v * PASCAL_PER_PSI / PASCAL_PER_BAR),
    entry(BAR, TORR, |v| v * PASCAL_PER_TORR / PASCAL_PER_BAR),
    entry(MILLIMETER_MERCURY, BAR, |v| v * PASCAL_PER_BAR / PASCAL_PER_MMHG),
    entry(MILLIMETER_MERCURY, PASCAL, |v| v / PASCAL_PER_MMHG),
    entry(MILLIMETER_MERCURY, POUND_PER_INCH_SQUARED, |v| v * PASCAL_PER_PSI / PASCAL_PER_MMHG),
    entry(MILLIMETER_MERCURY, TORR, |v| v * PASCAL_PER_TORR / PASCAL_PER_MMHG),
    entry(PASCAL, BAR, |v| v * PASCAL_PER_BAR),
    entry(PASCAL, MILLIMETER_MERCURY, |v| v * PASCAL_PER_MMHG),
    entry(PASCAL, POUND_PER_INCH_SQUARED, |v| v * PASCAL_PER_PSI),
    entry(PASCAL, TORR, |v| v * PASCAL_PER_TORR),
    entry(POUND_PER_INCH_SQUARED, BAR, |v| v * PASCAL_PER_BAR / PASCAL_PER_PSI),
    entry(POUND_PER_INCH_SQUARED, MILLIMETER_MERCURY, |v| v * PASCAL_PER_MMHG / PASCAL_PER_PSI),
    entry(POUND_PER_INCH_SQUARED, PASCAL, |v| v / PASCAL_PER_PSI),
    entry(POUND_PER_INCH_SQUARED, TORR, |v| v * PASCAL_PER_TORR / PASCAL_PER_PSI),
    entry(TORR, BAR, |v| v * PASCAL_PER_BAR / PASCAL_PER_TORR),
    entry(TORR, MILLIMETER_MERCURY, |v| v * PASCAL_PER_MMHG / PASCAL_PER_TORR),
    entry(TORR, PASCAL, |v| v / PASCAL_PER_TORR),
    entry(TORR, POUND_PER_INCH_SQUARED, |v| v * PASCAL_PER_PSI / PASCAL_PER_TORR),
    entry(PASCAL_PER_SECOND, PASCAL_PER_MINUTE, |v| v / 60.0),
    entry(PASCAL_PER_MINUTE, PASCAL_PER_SECOND, |v| v * 60.0),
    // Temperature
    entry(CELSIUS, FAHRENHEIT, |v| (v - 32.0) * 5.0 / 9.0),
    entry(CELSIUS, KELVIN, |v| v - CELSIUS_ZERO_KELVIN),
    entry(FAHRENHEIT, CELSIUS, |v| v * 9.0 / 5.0 + 32.0),
    entry(FAHRENHEIT, KELVIN, |v| (v - CELSIUS_ZERO_KELVIN) * 9.0 / 5.0 + 32.0),
    entry(KELVIN, CELSIUS, |v| v + CELSIUS_ZERO_KELVIN),
    entry(KELVIN, FAHRENHEIT, |v| (v - 32.0) * 5.0 / 9.0 + CELSIUS_ZERO_KELVIN),
    // Viscosity
    entry(CENTIPOISE, PASCAL_SECOND, |v| v * 1000.0),
    entry(PASCAL_SECOND, CENTIPOISE, |v| v / 1000.0),
    // Angle
    entry(DEGREE, RADIAN, |v| v * DEG_PER_RAD),
    entry(DEGREE, MICRO_RADIAN, |v| v * DEG_PER_RAD / 1_000_000.0),
    entry(RADIAN, DEGREE, |v| v / DEG_PER_RAD),
    // Angular velocity
    entry(DEGREE_PER_MINUTE, DEGREE_PER_SECOND, |v| v * 60.0),
    entry(DEGREE_PER_MINUTE, RADIAN_PER_MINUTE, |v| v * DEG_PER_RAD),
    entry(DEGREE_PER_MINUTE, RADIAN_PER_SECOND, |v| v * DEG_PER_RAD * 60.0),
    entry(DEGREE_PER_MINUTE, REVOLUTION_PER_MINUTE, |v| v * 360.0),
    entry(DEGREE_PER_MINUTE, REVOLUTION_PER_SECOND, |v| v * 360.0 * 60.0),
    entry(DEGREE_PER_SECOND, DEGREE_PER_MINUTE, |v| v / 60.0),
    entry(DEGREE_PER_SECOND, RADIAN_PER_MINUTE, |v| v * DEG_PER_RAD / 60.0),
    entry(DEGREE_PER_SECOND, RADIAN_PER_SECOND, |v| v * DEG_PER_RAD),
    entry(DEGREE_PER_SECOND, REVOLUTION_PER_MINUTE, |v| v * 360.0 / 60.0),
    entry(DEGREE_PER_SECOND, REVOLUTION_PER_SECOND, |v| v * 360.0),
    entry(RADIAN_PER_MINUTE, DEGREE_PER_MINUTE, |v| v / DEG_PER_RAD),
    entry(RADIAN_PER_MINUTE, DEGREE_PER_SECOND, |v| v / DEG_PER_RAD * 60.0),
    entry(RADIAN_PER_MINUTE, RADIAN_PER_SECOND, |v| v * 60.0),
    entry(RADIAN_PER_MINUTE, REVOLUTION_PER_MINUTE, |v| v * RAD_PER_REV),
    entry(RADIAN_PER_MINUTE, REVOLUTION_PER_SECOND, |v| v * RAD_PER_REV * 60.0),
    entry(RADIAN_PER_SECOND, DEGREE_PER_MINUTE, |v| v / DEG_PER_RAD / 60.0),
    entry(RADIAN_PER_SECOND, DEGREE_PER_SECOND, |v| v / DEG_PER_RAD),
    entry(RADIAN_PER_SECOND, RADIAN_PER_MINUTE, |v| v / 60.0),
    entry(RADIAN_PER_SECOND, REVOLUTION_PER_MINUTE, |v| v * RAD_PER_REV / 60.0),
    entry(RADIAN_PER_SECOND, REVOLUTION_PER_SECOND, |v| v * RAD_PER_REV),
    entry(REVOLUTION_PER_MINUTE, DEGREE_PER_MINUTE, |v| v / 360.0),
    entry(REVOLUTION_PER_MINUTE, DEGREE_PER_SECOND, |v| v / 360.0 * 60.0),
    entry(REVOLUTION_PER_MINUTE, RADIAN_PER_MINUTE, |v| v / RAD_PER_REV),
    entry(REVOLUTION_PER_MINUTE, RADIAN_PER_SECOND, |v| v / RAD_PER_REV * 60.0),
    entry(REVOLUTION_PER_MINUTE, REVOLUTION_PER_SECOND, |v| v * 60.0),
    entry(REVOLUTION_PER_SECOND, DEGREE_PER_MINUTE, |v| v / 360.0 / 60.0),
    entry(REVOLUTION_PER_SECOND, DEGREE_PER_SECOND, |v| v / 360.0),
    entry(REVOLUTION_PER_SECOND, RADIAN_PER_MINUTE, |v| v / RAD_PER_REV / 60.0),
    entry(REVOLUTION_PER_SECOND, RADIAN_PER_SECOND, |v| v / RAD_PER_REV),
    entry(REVOLUTION_PER_SECOND, REVOLUTION_PER_MINUTE, |v| v / 60.0),
    // Angular acceleration
    entry(DEGREE_PER_SECOND_SQUARED, RADIAN_PER_SECOND_SQUARED, |v| v * DEG_PER_RAD),
    entry(DEGREE_PER_SECOND_SQUARED, REVOLUTION_PER_SECOND_SQUARED, |v| v * 360.0),
    entry(RADIAN_PER_SECOND_SQUARED, DEGREE_PER_SECOND_SQUARED, |v| v / DEG_PER_RAD),
    entry(RADIAN_PER_SECOND_SQUARED, REVOLUTION_PER_SECOND_SQUARED, |v| v * RAD_PER_REV),
    entry(REVOLUTION_PER_SECOND_SQUARED, DEGREE_PER_SECOND_SQUARED, |v| v / 360.0),
    entry(REVOLUTION_PER_SECOND_SQUARED, RADIAN_PER_SECOND_SQUARED, |v| v / RAD_PER_REV),
    // Length
    entry(FOOT, MILLIMETER, |v| v / MM_PER_FOOT),
    entry(FOOT, INCH, |v| v / 12.0),
    entry(INCH, MILLIMETER, |v| v / MM_PER_INCH),
    entry(INCH, FOOT, |v| v * 12.0),
    entry(MILLIMETER, FOOT, |v| v * MM_PER_FOOT),
    entry(MILLIMETER, INCH, |v| v * MM_PER_INCH),
    // Linear velocity
    entry(FOOT_PER_MINUTE, MILLIMETER_PER_SECOND, |v| v / MM_PER_FOOT * 60.0),
    entry(FOOT_PER_MINUTE, FOOT_PER_SECOND, |v| v * 60.0),
    entry(FOOT_PER_MINUTE, INCH_PER_MINUTE, |v| v / 12.0),
    entry(FOOT_PER_MINUTE, INCH_PER_SECOND, |v| v / 12.0 * 60.0),
    entry(FOOT_PER_SECOND, MILLIMETER_PER_SECOND, |v| v / MM_PER_FOOT),
    entry(FOOT_PER_SECOND, FOOT_PER_MINUTE, |v| v / 60.0),
    entry(FOOT_PER_SECOND, INCH_PER_MINUTE, |v| v / 12.0 / 60.0),
    entry(FOOT_PER_SECOND, INCH_PER_SECOND, |v| v / 12.0),
    entry(INCH_PER_MINUTE, MILLIMETER_PER_SECOND, |v| v / MM_PER_INCH * 60.0),
    entry(INCH_PER_MINUTE, FOOT_PER_MINUTE, |v| v * 12.0),
    entry(INCH_PER_MINUTE, FOOT_PER_SECOND, |v| v * 12.0 * 60.0),
    entry(INCH_PER_MINUTE, INCH_PER_SECOND, |v| v * 60.0),
    entry(INCH_PER_SECOND, MILLIMETER_PER_SECOND, |v| v / MM_PER_INCH),
    entry(INCH_PER_SECOND, FOOT_PER_MINUTE, |v| v * 12.0 / 60.0),
    entry(INCH_PER_SECOND, FOOT_PER_SECOND, |v| v * 12.0),
    entry(INCH_PER_SECOND, INCH_PER_MINUTE, |v| v / 60.0),
    entry(MILLIMETER_PER_SECOND, INCH_PER_MINUTE, |v| v * MM_PER_INCH / 60.0),
    entry(MILLIMETER_PER_SECOND, INCH_PER_SECOND, |v| v * MM_PER_INCH),
    entry(MILLIMETER_PER_SECOND, FOOT_PER_MINUTE, |v| v * MM_PER_FOOT / 60.0),
    entry(MILLIMETER_PER_SECOND, FOOT_PER_SECOND, |v| v * MM_PER_FOOT),
    entry(MILLIMETER_PER_SECOND, MILLIMETER_PER_MINUTE, |v| v / 60.0),
    entry(MILLIMETER_PER_MINUTE, INCH_PER_MINUTE, |v| v * MM_PER_INCH),
    entry(MILLIMETER_PER_MINUTE, INCH_PER_SECOND, |v| v * MM_PER_INCH * 60.0),
    entry(MILLIMETER_PER_MINUTE, FOOT_PER_MINUTE, |v| v * MM_PER_FOOT),
    entry(MILLIMETER_PER_MINUTE, FOOT_PER_SECOND, |v| v * MM_PER_FOOT * 60.0),
    entry(MILLIMETER_PER_MINUTE, MILLIMETER_PER_SECOND, |v| v * 60.0),
    // Linear acceleration
    entry(FOOT_PER_SECOND_SQUARED, MILLIMETER_PER_SECOND_SQUARED, |v| v / MM_PER_FOOT),
    entry(FOOT_PER_SECOND_SQUARED, INCH_PER_SECOND_SQUARED, |v| v / 12.0),
    entry(MILLIMETER_PER_SECOND_SQUARED, INCH_PER_SECOND_SQUARED, |v| v * MM_PER_INCH),
    entry(MILLIMETER_PER_SECOND_SQUARED, FOOT_PER_SECOND_SQUARED, |v| v * MM_PER_FOOT),
    // Flow
    entry(GALLON_PER_MINUTE, LITER_PER_SECOND, |v| v / LITER_PER_GALLON * 60.0),
    entry(LITER_PER_MINUTE, GALLON_PER_MINUTE, |v| v * LITER_PER_GALLON),
    entry(LITER_PER_MINUTE, LITER_PER_SECOND, |v| v * 60.0),
    entry(LITER_PER_SECOND, GALLON_PER_MINUTE, |v| v * LITER_PER_GALLON / 60.0),
    entry(LITER_PER_SECOND, LITER_PER_MINUTE, |v| v / 60.0),
    // Time
    entry(HOUR, MINUTE, |v| v / 60.0),
    entry(HOUR, SECOND, |v| v / 3600.0),
    entry(MINUTE, HOUR, |v| v * 60.0),
    entry(MINUTE, SECOND, |v| v / 60.0),
    entry(SECOND, HOUR, |v| v * 3600.0),
    entry(SECOND, MINUTE, |v| v * 60.0),
    // Torque and force
    entry(INCH_POUND, NEWTON_METER, |v| v / NEWTON_METER_PER_INCH_POUND),
    entry(NEWTON_METER, INCH_POUND, |v| v * NEWTON_METER_PER_INCH_POUND),
    entry(NEWTON, POUND, |v| v * NEWTON_PER_POUND_FORCE),
    // Energy
    entry(JOULE, KILOWATT_HOUR, |v| v * JOULE_PER_KWH),
    entry(KILOWATT_HOUR, WATT_SECOND, |v| v / JOULE_PER_KWH),
    entry(WATT_SECOND, KILOWATT_HOUR, |v| v * JOULE_PER_KWH),
    // Mass
    entry(KILOGRAM, MILLIGRAM, |v| v / 1_000_000.0),
    entry(KILOGRAM, POUND, |v| v * KG_PER_POUND),
    entry(MILLIGRAM, KILOGRAM, |v| v * 1_000_000.0),
    entry(MILLIGRAM, POUND, |v| v * KG_PER_POUND * 1_000_000.0),
    entry(POUND, MILLIGRAM, |v| v / (KG_PER_POUND * 1_000_000.0)),
    entry(POUND, KILOGRAM, |v| v / KG_PER_POUND),
    // Power
    entry(KILOWATT, WATT, |v| v / 1000.0),
    entry(WATT, KILOWATT, |v| v * 1000.0),
    // Volume
    entry(LITER, MILLILITER, |v| v / 1000.0),
    entry(MILLILITER, LITER, |v| v * 1000.0),
];

static INDEX: Lazy<HashMap<(&'static str, &'static str), Formula>> = Lazy::new(|| {
    CONVERSIONS
        .iter()
        .map(|c| ((c.units, c.native_units), c.formula))
        .collect()
});

fn is_unspecified(unit: Option<&str>) -> bool {
    unit.map_or(true, |u| u.trim().is_empty())
}

/// Look up the formula converting `native_units` values into `units`.
pub fn lookup(units: &str, native_units: &str) -> Option<Formula> {
    INDEX.get(&(units, native_units)).copied()
}

/// Returns true if the table covers the ordered pair.
pub fn is_supported(units: &str, native_units: &str) -> bool {
    INDEX.contains_key(&(units, native_units))
}

/// All `(units, native_units)` pairs the table covers.
pub fn supported_pairs() -> impl Iterator<Item = (&'static str, &'static str)> {
    CONVERSIONS.iter().map(|c| (c.units, c.native_units))
}

/// Convert `value` from `native_units` to `units`.
///
/// Identity when the units are equal or either one is unspecified.
///
/// # Errors
///
/// Returns [`ModelError::UnsupportedConversion`] when the table has no entry
/// for the ordered pair.
pub fn try_convert(value: f64, units: Option<&str>, native_units: Option<&str>) -> Result<f64> {
    if is_unspecified(units) || is_unspecified(native_units) {
        return Ok(value);
    }
    let (units, native_units) = (units.unwrap_or_default(), native_units.unwrap_or_default());
    if units == native_units {
        return Ok(value);
    }
    lookup(units, native_units)
        .map(|f| f(value))
        .ok_or_else(|| ModelError::UnsupportedConversion {
            units: units.to_string(),
            native_units: native_units.to_string(),
        })
}

/// Convert `value` from `native_units` to `units`, returning the input
/// unchanged for unsupported pairs.
pub fn convert(value: f64, units: Option<&str>, native_units: Option<&str>) -> f64 {
    match try_convert(value, units, native_units) {
        Ok(v) => v,
        Err(e) => {
            tracing::trace!("{}, passing value through", e);
            value
        }
    }
}
