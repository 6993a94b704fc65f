//! Tick planning for linear, logarithmic and calendar axes.
//!
//! Every planner is a pure function of its inputs: a range snapshot, the
//! scale mode, the accepted major-count bounds and whether the result should
//! extend past the range so small pans can reuse it.

mod calendar;
pub mod ladder;
mod linear;
mod logarithmic;
mod precision;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::core::{Range, RangeState, ScaleMode, Unit, Value};
use crate::error::{AxisError, AxisResult};

pub use ladder::{CALENDAR_LADDER, CalendarUnit, LadderRung, MinorSubdivision};

use linear::LinearRequest;

/// Spacing rule that produced a [`TickSet`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum TickStep {
    /// Uniform spacing of `mantissa × 10^k` in axis units.
    Linear { spacing: f64, mantissa: u32 },
    /// Majors every `per_major` powers of ten.
    Decades { per_major: u32 },
    /// Majors every `mantissa` whole calendar units.
    Calendar { unit: CalendarUnit, mantissa: u32 },
}

/// Label formatter family chosen for a [`TickSet`].
///
/// Rendering the actual strings is left to the host's label service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FormatterDescriptor {
    FixedPoint { fraction_digits: u8 },
    Scientific { mantissa_digits: u8 },
    Calendar {
        resolution: CalendarUnit,
        fraction_digits: u8,
    },
}

/// Major and minor tick positions for one axis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TickSet {
    unit: Unit,
    major: Vec<f64>,
    minor: Vec<f64>,
    step: TickStep,
    formatter: FormatterDescriptor,
}

impl TickSet {
    #[must_use]
    pub fn unit(&self) -> Unit {
        self.unit
    }

    /// Ascending major positions in [`TickSet::unit`].
    #[must_use]
    pub fn major(&self) -> &[f64] {
        &self.major
    }

    /// Ascending minor positions in [`TickSet::unit`].
    #[must_use]
    pub fn minor(&self) -> &[f64] {
        &self.minor
    }

    #[must_use]
    pub fn step(&self) -> TickStep {
        self.step
    }

    #[must_use]
    pub fn formatter(&self) -> FormatterDescriptor {
        self.formatter
    }

    pub fn major_values(&self) -> impl Iterator<Item = Value> + '_ {
        self.major.iter().map(|tick| Value::new(*tick, self.unit))
    }

    pub fn minor_values(&self) -> impl Iterator<Item = Value> + '_ {
        self.minor.iter().map(|tick| Value::new(*tick, self.unit))
    }

    /// Number of majors that fall inside `range` (converted to this set's unit).
    #[must_use]
    pub fn major_count_within(&self, range: Range) -> usize {
        let Ok(range) = range.convert_to(self.unit) else {
            return 0;
        };
        let tolerance = range.width().abs() * 1e-12;
        self.major
            .iter()
            .filter(|tick| **tick >= range.min() - tolerance && **tick <= range.max() + tolerance)
            .count()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.major.is_empty()
    }
}

/// Planner tuning. All values have working defaults.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TickPlannerConfig {
    /// Preferred major count before clamping into the caller's bounds.
    #[serde(default = "default_target_count")]
    pub default_target_count: usize,
    /// Upper bound on "increment target and retry" passes in linear mode.
    #[serde(default = "default_max_target_retries")]
    pub max_target_retries: usize,
    /// Multiplier applied to `log10(max)` before flooring when counting decades.
    #[serde(default = "default_log_decade_floor_fuzz")]
    pub log_decade_floor_fuzz: f64,
    /// Multiplier applied to `log10(min)` before ceiling when counting decades.
    #[serde(default = "default_log_decade_ceil_fuzz")]
    pub log_decade_ceil_fuzz: f64,
    /// Calendar spans shorter than this use linear seconds from local midnight.
    #[serde(default = "default_calendar_linear_fallback_seconds")]
    pub calendar_linear_fallback_seconds: f64,
    /// Calendar spans longer than this use whole-year nice numbers.
    #[serde(default = "default_calendar_year_fallback_years")]
    pub calendar_year_fallback_years: f64,
    /// Year ticks before this year are dropped.
    #[serde(default = "default_calendar_epoch_cutover_year")]
    pub calendar_epoch_cutover_year: i32,
    /// Offset of the local calendar from UTC used for alignment.
    #[serde(default)]
    pub utc_offset_seconds: i32,
}

impl Default for TickPlannerConfig {
    fn default() -> Self {
        Self {
            default_target_count: default_target_count(),
            max_target_retries: default_max_target_retries(),
            log_decade_floor_fuzz: default_log_decade_floor_fuzz(),
            log_decade_ceil_fuzz: default_log_decade_ceil_fuzz(),
            calendar_linear_fallback_seconds: default_calendar_linear_fallback_seconds(),
            calendar_year_fallback_years: default_calendar_year_fallback_years(),
            calendar_epoch_cutover_year: default_calendar_epoch_cutover_year(),
            utc_offset_seconds: 0,
        }
    }
}

impl TickPlannerConfig {
    pub fn validate(self) -> AxisResult<Self> {
        if self.default_target_count < 2 {
            return Err(AxisError::InvalidData(
                "tick planner target count must be >= 2".to_owned(),
            ));
        }
        if !self.log_decade_floor_fuzz.is_finite()
            || !self.log_decade_ceil_fuzz.is_finite()
            || self.log_decade_floor_fuzz <= 0.0
            || self.log_decade_ceil_fuzz <= 0.0
        {
            return Err(AxisError::InvalidData(
                "log decade fuzz factors must be finite and > 0".to_owned(),
            ));
        }
        if !self.calendar_linear_fallback_seconds.is_finite()
            || self.calendar_linear_fallback_seconds <= 0.0
            || !self.calendar_year_fallback_years.is_finite()
            || self.calendar_year_fallback_years <= 0.0
        {
            return Err(AxisError::InvalidData(
                "calendar fallback thresholds must be finite and > 0".to_owned(),
            ));
        }
        if self.utc_offset_seconds.unsigned_abs() >= 86_400 {
            return Err(AxisError::InvalidData(
                "utc offset must be within one day".to_owned(),
            ));
        }
        Ok(self)
    }
}

fn default_target_count() -> usize {
    6
}

fn default_max_target_retries() -> usize {
    32
}

fn default_log_decade_floor_fuzz() -> f64 {
    0.999
}

fn default_log_decade_ceil_fuzz() -> f64 {
    1.001
}

fn default_calendar_linear_fallback_seconds() -> f64 {
    60.0
}

fn default_calendar_year_fallback_years() -> f64 {
    10.0
}

fn default_calendar_epoch_cutover_year() -> i32 {
    1583
}

/// Stateless tick planner.
///
/// Holds only configuration, so one instance can serve any number of axes
/// and threads as long as each call receives its own range snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct TickPlanner {
    config: TickPlannerConfig,
}

impl TickPlanner {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: TickPlannerConfig) -> AxisResult<Self> {
        Ok(Self {
            config: config.validate()?,
        })
    }

    #[must_use]
    pub fn config(&self) -> TickPlannerConfig {
        self.config
    }

    /// Plans ticks for `range`.
    ///
    /// `min_count`/`max_count` bound the number of majors inside the range;
    /// they are normalised to `2 <= min_count <= max_count`. Majors always
    /// cover the range and, with `expand_for_panning`, extend further on
    /// each side.
    #[must_use]
    pub fn compute(
        &self,
        range: Range,
        mode: ScaleMode,
        min_count: usize,
        max_count: usize,
        expand_for_panning: bool,
    ) -> TickSet {
        let (min_count, max_count) = normalize_counts(min_count, max_count);
        let unit = range.unit();
        let planned = match mode {
            ScaleMode::Log => logarithmic::plan_log(
                range.min(),
                range.max(),
                min_count,
                max_count,
                expand_for_panning,
                &self.config,
            ),
            ScaleMode::Linear if unit.is_timestamp() => {
                self.plan_timestamps(range, min_count, max_count, expand_for_panning)
            }
            ScaleMode::Linear => {
                self.plan_plain(range, min_count, max_count, expand_for_panning)
            }
        };

        debug!(
            ?mode,
            %unit,
            major = planned.major.len(),
            minor = planned.minor.len(),
            step = ?planned.step,
            "planned axis ticks"
        );

        TickSet {
            unit,
            major: planned.major,
            minor: planned.minor,
            step: planned.step,
            formatter: planned.formatter,
        }
    }

    /// Plans ticks for the current snapshot of `state`.
    #[must_use]
    pub fn compute_for(
        &self,
        state: &RangeState,
        min_count: usize,
        max_count: usize,
        expand_for_panning: bool,
    ) -> TickSet {
        self.compute(
            state.range(),
            state.scale_mode(),
            min_count,
            max_count,
            expand_for_panning,
        )
    }

    fn plan_plain(
        &self,
        range: Range,
        min_count: usize,
        max_count: usize,
        expand: bool,
    ) -> PlannedTicks {
        let range = range.widened_linear();
        let plan = linear::plan_linear(LinearRequest {
            min: range.min(),
            max: range.max(),
            min_count,
            max_count,
            target: self.config.default_target_count,
            retries: self.config.max_target_retries,
            integer: range.unit().is_ordinal(),
            expand,
        });
        PlannedTicks::from_linear(plan)
    }

    fn plan_timestamps(
        &self,
        range: Range,
        min_count: usize,
        max_count: usize,
        expand: bool,
    ) -> PlannedTicks {
        let Ok(factor) = range.unit().conversion_factor(Unit::UnixSeconds) else {
            return self.plan_plain(range, min_count, max_count, expand);
        };
        let range = range.widened_linear();
        calendar::plan_calendar(
            range.min() * factor,
            range.max() * factor,
            min_count,
            max_count,
            expand,
            &self.config,
        )
        .scaled(1.0 / factor)
    }
}

/// Planner output before it is tagged with a unit.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct PlannedTicks {
    pub(crate) major: Vec<f64>,
    pub(crate) minor: Vec<f64>,
    pub(crate) step: TickStep,
    pub(crate) formatter: FormatterDescriptor,
}

impl PlannedTicks {
    fn from_linear(plan: linear::LinearPlan) -> Self {
        let formatter = precision::linear_formatter(&plan.major, plan.spacing);
        Self {
            step: TickStep::Linear {
                spacing: plan.spacing,
                mantissa: plan.mantissa,
            },
            major: plan.major,
            minor: plan.minor,
            formatter,
        }
    }

    fn scaled(mut self, factor: f64) -> Self {
        if factor == 1.0 {
            return self;
        }
        self.major.iter_mut().for_each(|tick| *tick *= factor);
        self.minor.iter_mut().for_each(|tick| *tick *= factor);
        if let TickStep::Linear { spacing, mantissa } = self.step {
            self.step = TickStep::Linear {
                spacing: spacing * factor,
                mantissa,
            };
        }
        self
    }
}

fn normalize_counts(min_count: usize, max_count: usize) -> (usize, usize) {
    let low = min_count.min(max_count).max(2);
    let high = min_count.max(max_count).max(low);
    (low, high)
}

/// Exact power of ten for integer exponents.
pub(crate) fn pow10(exponent: i32) -> f64 {
    if exponent >= 0 {
        10f64.powi(exponent)
    } else {
        1.0 / 10f64.powi(-exponent)
    }
}

/// Keeps the ticks that cover `[min, max]`. With a `pad`, keeps the ticks
/// inside `[min, max]` plus `pad` extra ticks per side instead.
///
/// `ticks` must be ascending.
pub(crate) fn trim_covering(ticks: &[f64], min: f64, max: f64, pad: usize) -> Vec<f64> {
    if ticks.is_empty() {
        return Vec::new();
    }
    let last_index = ticks.len() - 1;
    let (first, last) = if pad == 0 {
        (
            ticks.iter().rposition(|tick| *tick <= min).unwrap_or(0),
            ticks
                .iter()
                .position(|tick| *tick >= max)
                .unwrap_or(last_index),
        )
    } else {
        // Padding counts from the inner ticks so nothing lands past one step.
        (
            ticks
                .iter()
                .position(|tick| *tick >= min)
                .unwrap_or(ticks.len())
                .saturating_sub(pad),
            ticks
                .iter()
                .rposition(|tick| *tick <= max)
                .map_or(pad - 1, |index| index + pad),
        )
    };
    let last = last.min(last_index);
    if first > last {
        return Vec::new();
    }
    ticks[first..=last].to_vec()
}
