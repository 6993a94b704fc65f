use serde::{Deserialize, Serialize};

use crate::core::{Range, Unit};
use crate::error::AxisResult;

/// Bare `(min, max)` pair for transient, high-frequency updates.
///
/// Used while dragging or animating an axis: no history, no notifications,
/// no lock and no unit checks. Commit the final value through
/// [`crate::core::RangeState::set_range`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AnimatedRange {
    min: f64,
    max: f64,
}

impl AnimatedRange {
    #[must_use]
    pub fn new(a: f64, b: f64) -> Self {
        let mut range = Self { min: a, max: b };
        range.set(a, b);
        range
    }

    #[must_use]
    pub fn from_range(range: Range) -> Self {
        Self {
            min: range.min(),
            max: range.max(),
        }
    }

    #[must_use]
    pub fn min(self) -> f64 {
        self.min
    }

    #[must_use]
    pub fn max(self) -> f64 {
        self.max
    }

    pub fn set(&mut self, a: f64, b: f64) {
        if a <= b {
            self.min = a;
            self.max = b;
        } else {
            self.min = b;
            self.max = a;
        }
    }

    pub fn pan_by(&mut self, delta: f64) {
        if !delta.is_finite() {
            return;
        }
        self.min += delta;
        self.max += delta;
    }

    /// Moves both bounds a fraction `t` (clamped to `0..=1`) of the way to `target`.
    pub fn interpolate_towards(&mut self, target: Range, t: f64) {
        if !t.is_finite() {
            return;
        }
        let t = t.clamp(0.0, 1.0);
        let min = self.min + (target.min() - self.min) * t;
        let max = self.max + (target.max() - self.max) * t;
        self.set(min, max);
    }

    pub fn to_range(self, unit: Unit) -> AxisResult<Range> {
        Range::new(self.min, self.max, unit)
    }
}

impl From<Range> for AnimatedRange {
    fn from(range: Range) -> Self {
        Self::from_range(range)
    }
}
