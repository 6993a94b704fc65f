use serde::{Deserialize, Serialize};

use crate::core::Unit;
use crate::error::{AxisError, AxisResult};

/// Maximum substituted for a non-positive upper bound when entering log mode.
pub const LOG_FALLBACK_MAX: f64 = 100.0;
/// Ratio between max and a substituted non-positive lower bound (three decades).
pub const LOG_FALLBACK_RATIO: f64 = 1_000.0;

/// Mapping mode of an axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum ScaleMode {
    #[default]
    Linear,
    Log,
}

/// Scalar tagged with a unit of measure.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Value {
    magnitude: f64,
    unit: Unit,
}

impl Value {
    #[must_use]
    pub fn new(magnitude: f64, unit: Unit) -> Self {
        Self { magnitude, unit }
    }

    #[must_use]
    pub fn magnitude(self) -> f64 {
        self.magnitude
    }

    #[must_use]
    pub fn unit(self) -> Unit {
        self.unit
    }

    pub fn convert_to(self, unit: Unit) -> AxisResult<Self> {
        Ok(Self {
            magnitude: self.unit.convert(self.magnitude, unit)?,
            unit,
        })
    }
}

/// Ordered `(min, max)` pair over one unit.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Range {
    min: f64,
    max: f64,
    unit: Unit,
}

impl Range {
    /// Creates a range, rejecting non-finite bounds and `min > max`.
    pub fn new(min: f64, max: f64, unit: Unit) -> AxisResult<Self> {
        if !min.is_finite() || !max.is_finite() || min > max {
            return Err(AxisError::Construction { min, max });
        }
        Ok(Self { min, max, unit })
    }

    /// Creates a range from two bounds in either order.
    pub fn ordered(a: f64, b: f64, unit: Unit) -> AxisResult<Self> {
        if !a.is_finite() || !b.is_finite() {
            return Err(AxisError::Construction { min: a, max: b });
        }
        Ok(Self {
            min: a.min(b),
            max: a.max(b),
            unit,
        })
    }

    /// Caller guarantees finite bounds with `min <= max`.
    pub(crate) fn from_parts(min: f64, max: f64, unit: Unit) -> Self {
        debug_assert!(min.is_finite() && max.is_finite() && min <= max);
        Self { min, max, unit }
    }

    /// Creates a range in `a`'s unit from two values of the same family.
    pub fn from_values(a: Value, b: Value) -> AxisResult<Self> {
        let b = b.convert_to(a.unit())?;
        Self::ordered(a.magnitude(), b.magnitude(), a.unit())
    }

    #[must_use]
    pub fn min(self) -> f64 {
        self.min
    }

    #[must_use]
    pub fn max(self) -> f64 {
        self.max
    }

    #[must_use]
    pub fn unit(self) -> Unit {
        self.unit
    }

    #[must_use]
    pub fn min_value(self) -> Value {
        Value::new(self.min, self.unit)
    }

    #[must_use]
    pub fn max_value(self) -> Value {
        Value::new(self.max, self.unit)
    }

    #[must_use]
    pub fn width(self) -> f64 {
        self.max - self.min
    }

    #[must_use]
    pub fn is_degenerate(self) -> bool {
        self.min == self.max
    }

    #[must_use]
    pub fn contains(self, value: f64) -> bool {
        value >= self.min && value <= self.max
    }

    pub fn convert_to(self, unit: Unit) -> AxisResult<Self> {
        if unit == self.unit {
            return Ok(self);
        }
        let factor = self.unit.conversion_factor(unit)?;
        Self::ordered(self.min * factor, self.max * factor, unit)
    }

    /// Widens a zero-width range by one unit on each side.
    #[must_use]
    pub fn widened_linear(self) -> Self {
        if !self.is_degenerate() {
            return self;
        }
        Self {
            min: self.min - 1.0,
            max: self.max + 1.0,
            unit: self.unit,
        }
    }

    /// Widens a zero-width positive range by one decade on each side.
    #[must_use]
    pub fn widened_log(self) -> Self {
        if !self.is_degenerate() {
            return self;
        }
        Self {
            min: self.min / 10.0,
            max: self.max * 10.0,
            unit: self.unit,
        }
    }
}

/// Replaces non-positive bounds so that the pair is usable on a log axis.
#[must_use]
pub fn log_safe_bounds(min: f64, max: f64) -> (f64, f64) {
    let max = if max <= 0.0 { LOG_FALLBACK_MAX } else { max };
    let min = if min <= 0.0 {
        max / LOG_FALLBACK_RATIO
    } else {
        min
    };
    (min, max)
}
