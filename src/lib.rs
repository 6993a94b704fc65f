//! axis-rs: range state and tick planning for plot axes.
//!
//! The crate has no drawing or event-loop code. [`core::RangeState`] owns an
//! axis domain with history and change notifications, [`ticks::TickPlanner`]
//! turns a range snapshot into major/minor tick positions, and
//! [`api::AxisController`] wires the two together for a host application.

pub mod api;
pub mod core;
pub mod error;
pub mod telemetry;
pub mod ticks;

pub use api::{AxisConfig, AxisController};
pub use crate::core::{Range, RangeEvent, RangeState, ScaleMode, Unit, Value};
pub use error::{AxisError, AxisResult};
pub use ticks::{TickPlanner, TickPlannerConfig, TickSet};
