use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{AxisError, AxisResult};

/// Group of units that can be converted into each other.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UnitFamily {
    Dimensionless,
    /// Categorical positions; only integer tick spacing is meaningful.
    Ordinal,
    Length,
    Duration,
    Frequency,
    /// Absolute UTC instants measured from the Unix epoch.
    Timestamp,
}

/// Unit of measure attached to axis values.
///
/// Every unit belongs to exactly one [`UnitFamily`] and carries a linear
/// factor to the family base unit (meters, seconds, hertz, Unix seconds).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum Unit {
    #[default]
    Dimensionless,
    Ordinal,
    Millimeters,
    Meters,
    Kilometers,
    Nanoseconds,
    Microseconds,
    Milliseconds,
    Seconds,
    Minutes,
    Hours,
    Days,
    Hertz,
    Kilohertz,
    Megahertz,
    UnixMicros,
    UnixMillis,
    UnixSeconds,
}

impl Unit {
    #[must_use]
    pub fn family(self) -> UnitFamily {
        match self {
            Self::Dimensionless => UnitFamily::Dimensionless,
            Self::Ordinal => UnitFamily::Ordinal,
            Self::Millimeters | Self::Meters | Self::Kilometers => UnitFamily::Length,
            Self::Nanoseconds
            | Self::Microseconds
            | Self::Milliseconds
            | Self::Seconds
            | Self::Minutes
            | Self::Hours
            | Self::Days => UnitFamily::Duration,
            Self::Hertz | Self::Kilohertz | Self::Megahertz => UnitFamily::Frequency,
            Self::UnixMicros | Self::UnixMillis | Self::UnixSeconds => UnitFamily::Timestamp,
        }
    }

    /// Multiplier that converts one of `self` into the family base unit.
    #[must_use]
    fn base_factor(self) -> f64 {
        match self {
            Self::Dimensionless | Self::Ordinal => 1.0,
            Self::Millimeters => 1e-3,
            Self::Meters => 1.0,
            Self::Kilometers => 1e3,
            Self::Nanoseconds => 1e-9,
            Self::Microseconds => 1e-6,
            Self::Milliseconds => 1e-3,
            Self::Seconds => 1.0,
            Self::Minutes => 60.0,
            Self::Hours => 3_600.0,
            Self::Days => 86_400.0,
            Self::Hertz => 1.0,
            Self::Kilohertz => 1e3,
            Self::Megahertz => 1e6,
            Self::UnixMicros => 1e-6,
            Self::UnixMillis => 1e-3,
            Self::UnixSeconds => 1.0,
        }
    }

    #[must_use]
    pub fn symbol(self) -> &'static str {
        match self {
            Self::Dimensionless => "",
            Self::Ordinal => "ordinal",
            Self::Millimeters => "mm",
            Self::Meters => "m",
            Self::Kilometers => "km",
            Self::Nanoseconds => "ns",
            Self::Microseconds => "us",
            Self::Milliseconds => "ms",
            Self::Seconds => "s",
            Self::Minutes => "min",
            Self::Hours => "h",
            Self::Days => "d",
            Self::Hertz => "Hz",
            Self::Kilohertz => "kHz",
            Self::Megahertz => "MHz",
            Self::UnixMicros => "unix-us",
            Self::UnixMillis => "unix-ms",
            Self::UnixSeconds => "unix-s",
        }
    }

    #[must_use]
    pub fn is_convertible_to(self, other: Unit) -> bool {
        self.family() == other.family()
    }

    #[must_use]
    pub fn is_timestamp(self) -> bool {
        self.family() == UnitFamily::Timestamp
    }

    #[must_use]
    pub fn is_ordinal(self) -> bool {
        self.family() == UnitFamily::Ordinal
    }

    /// Factor `f` such that `value_in_other = value_in_self * f`.
    pub fn conversion_factor(self, other: Unit) -> AxisResult<f64> {
        if !self.is_convertible_to(other) {
            return Err(AxisError::IncompatibleUnits {
                from: self,
                to: other,
            });
        }
        if self == other {
            return Ok(1.0);
        }
        Ok(self.base_factor() / other.base_factor())
    }

    pub fn convert(self, value: f64, other: Unit) -> AxisResult<f64> {
        if self == other {
            return Ok(value);
        }
        Ok(value * self.conversion_factor(other)?)
    }
}

impl fmt::Display for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Dimensionless => f.write_str("dimensionless"),
            other => f.write_str(other.symbol()),
        }
    }
}
