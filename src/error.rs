use thiserror::Error;

use crate::core::Unit;

pub type AxisResult<T> = Result<T, AxisError>;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum AxisError {
    #[error("invalid range: min={min}, max={max} (bounds must be finite and min <= max)")]
    Construction { min: f64, max: f64 },

    #[error("incompatible units: {from} cannot be converted to {to}")]
    IncompatibleUnits { from: Unit, to: Unit },

    #[error("invalid data: {0}")]
    InvalidData(String),
}
