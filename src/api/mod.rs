//! Host-facing axis facade.
//!
//! Ties one [`RangeState`](crate::core::RangeState) to a
//! [`TickPlanner`](crate::ticks::TickPlanner) and turns an on-screen axis
//! length into tick-count bounds.

mod axis_config;
mod axis_controller;
pub mod axis_ticks;

pub use axis_config::{AXIS_CONFIG_JSON_SCHEMA_V1, AxisConfig, AxisConfigJsonContractV1};
pub use axis_controller::{AxisController, TickCacheStats};
pub use axis_ticks::{axis_tick_target_count, tick_count_bounds};
