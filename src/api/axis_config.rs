use serde::{Deserialize, Serialize};

use crate::core::RangeStateConfig;
use crate::error::{AxisError, AxisResult};
use crate::ticks::TickPlannerConfig;

use super::axis_ticks::{DEFAULT_MIN_SPACING_PX, DEFAULT_TARGET_SPACING_PX};

pub const AXIS_CONFIG_JSON_SCHEMA_V1: u32 = 1;

/// Setup for one [`AxisController`](super::AxisController).
///
/// Serializable so hosts can persist axis tuning next to their own settings.
/// Missing JSON fields take their defaults.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AxisConfig {
    #[serde(default)]
    pub range_state: RangeStateConfig,
    #[serde(default)]
    pub ticks: TickPlannerConfig,
    #[serde(default = "default_target_spacing_px")]
    pub target_spacing_px: f64,
    #[serde(default = "default_min_spacing_px")]
    pub min_spacing_px: f64,
    /// Tick bounds used when no pixel size is known.
    #[serde(default = "default_min_ticks")]
    pub min_ticks: usize,
    #[serde(default = "default_max_ticks")]
    pub max_ticks: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AxisConfigJsonContractV1 {
    pub schema_version: u32,
    pub config: AxisConfig,
}

impl Default for AxisConfig {
    fn default() -> Self {
        Self {
            range_state: RangeStateConfig::default(),
            ticks: TickPlannerConfig::default(),
            target_spacing_px: default_target_spacing_px(),
            min_spacing_px: default_min_spacing_px(),
            min_ticks: default_min_ticks(),
            max_ticks: default_max_ticks(),
        }
    }
}

impl AxisConfig {
    #[must_use]
    pub fn with_tick_bounds(mut self, min_ticks: usize, max_ticks: usize) -> Self {
        self.min_ticks = min_ticks;
        self.max_ticks = max_ticks;
        self
    }

    #[must_use]
    pub fn with_tick_planner_config(mut self, ticks: TickPlannerConfig) -> Self {
        self.ticks = ticks;
        self
    }

    #[must_use]
    pub fn with_range_state_config(mut self, range_state: RangeStateConfig) -> Self {
        self.range_state = range_state;
        self
    }

    pub fn validate(self) -> AxisResult<Self> {
        self.ticks.validate()?;
        if self.range_state.history_limit == 0 {
            return Err(AxisError::InvalidData(
                "history limit must be >= 1".to_owned(),
            ));
        }
        if !self.target_spacing_px.is_finite() || self.target_spacing_px <= 0.0 {
            return Err(AxisError::InvalidData(format!(
                "target tick spacing must be finite and > 0, got {}",
                self.target_spacing_px
            )));
        }
        if !self.min_spacing_px.is_finite() || self.min_spacing_px <= 0.0 {
            return Err(AxisError::InvalidData(format!(
                "minimum tick spacing must be finite and > 0, got {}",
                self.min_spacing_px
            )));
        }
        if self.min_ticks < 2 || self.max_ticks < self.min_ticks {
            return Err(AxisError::InvalidData(format!(
                "tick bounds must satisfy 2 <= min <= max, got {}..{}",
                self.min_ticks, self.max_ticks
            )));
        }
        Ok(self)
    }

    pub fn to_json_pretty(self) -> AxisResult<String> {
        serde_json::to_string_pretty(&self)
            .map_err(|e| AxisError::InvalidData(format!("failed to serialize axis config: {e}")))
    }

    pub fn to_json_contract_v1_pretty(self) -> AxisResult<String> {
        let payload = AxisConfigJsonContractV1 {
            schema_version: AXIS_CONFIG_JSON_SCHEMA_V1,
            config: self,
        };
        serde_json::to_string_pretty(&payload).map_err(|e| {
            AxisError::InvalidData(format!("failed to serialize axis config contract v1: {e}"))
        })
    }

    /// Parses either a bare config or a versioned contract payload, then validates it.
    pub fn from_json_str(input: &str) -> AxisResult<Self> {
        if let Ok(config) = serde_json::from_str::<AxisConfig>(input) {
            return config.validate();
        }
        let payload: AxisConfigJsonContractV1 = serde_json::from_str(input).map_err(|e| {
            AxisError::InvalidData(format!("failed to parse axis config json payload: {e}"))
        })?;
        if payload.schema_version != AXIS_CONFIG_JSON_SCHEMA_V1 {
            return Err(AxisError::InvalidData(format!(
                "unsupported axis config schema version: {}",
                payload.schema_version
            )));
        }
        payload.config.validate()
    }
}

fn default_target_spacing_px() -> f64 {
    DEFAULT_TARGET_SPACING_PX
}

fn default_min_spacing_px() -> f64 {
    DEFAULT_MIN_SPACING_PX
}

fn default_min_ticks() -> usize {
    4
}

fn default_max_ticks() -> usize {
    10
}
