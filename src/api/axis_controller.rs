use tracing::trace;

use crate::core::{Range, RangeState, ScaleMode, Unit};
use crate::error::{AxisError, AxisResult};
use crate::ticks::{TickPlanner, TickSet};

use super::AxisConfig;
use super::axis_ticks::tick_count_bounds;

/// Runtime metrics of the controller's last-tick-set cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TickCacheStats {
    pub hits: u64,
    pub misses: u64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct TickCacheKey {
    range: Range,
    mode: ScaleMode,
    min_count: usize,
    max_count: usize,
    expand: bool,
}

/// One axis: its range state, a tick planner and an optional pixel size.
///
/// Mutate through [`AxisController::range_state_mut`], then ask for
/// [`AxisController::ticks`]; the planner only reruns when the range, scale
/// mode or tick budget changed since the last call.
///
/// The last [`TickSet`] is cached here, in the host-facing facade only.
/// [`RangeState`] and [`TickPlanner`] never hold tick sets; a fresh
/// `TickPlanner::compute` always plans from scratch.
#[derive(Debug)]
pub struct AxisController {
    config: AxisConfig,
    state: RangeState,
    planner: TickPlanner,
    axis_span_px: Option<f64>,
    cached: Option<(TickCacheKey, TickSet)>,
    cache_stats: TickCacheStats,
}

impl AxisController {
    pub fn new(range: Range, config: AxisConfig) -> AxisResult<Self> {
        let config = config.validate()?;
        Ok(Self {
            state: RangeState::with_config(range, config.range_state),
            planner: TickPlanner::with_config(config.ticks)?,
            config,
            axis_span_px: None,
            cached: None,
            cache_stats: TickCacheStats::default(),
        })
    }

    pub fn from_bounds(min: f64, max: f64, unit: Unit) -> AxisResult<Self> {
        Self::new(Range::new(min, max, unit)?, AxisConfig::default())
    }

    #[must_use]
    pub fn config(&self) -> AxisConfig {
        self.config
    }

    #[must_use]
    pub fn range_state(&self) -> &RangeState {
        &self.state
    }

    pub fn range_state_mut(&mut self) -> &mut RangeState {
        &mut self.state
    }

    #[must_use]
    pub fn planner(&self) -> &TickPlanner {
        &self.planner
    }

    #[must_use]
    pub fn axis_span_px(&self) -> Option<f64> {
        self.axis_span_px
    }

    /// Sets the on-screen axis length used to derive tick-count bounds.
    pub fn set_axis_span_px(&mut self, axis_span_px: f64) -> AxisResult<()> {
        if !axis_span_px.is_finite() || axis_span_px <= 0.0 {
            return Err(AxisError::InvalidData(format!(
                "axis span must be finite and > 0, got {axis_span_px}"
            )));
        }
        self.axis_span_px = Some(axis_span_px);
        Ok(())
    }

    pub fn clear_axis_span_px(&mut self) {
        self.axis_span_px = None;
    }

    /// `(min_count, max_count)` handed to the planner.
    #[must_use]
    pub fn tick_count_bounds(&self) -> (usize, usize) {
        match self.axis_span_px {
            Some(span_px) => tick_count_bounds(
                span_px,
                self.config.target_spacing_px,
                self.config.min_spacing_px,
                self.config.min_ticks,
                self.config.max_ticks,
            ),
            None => (self.config.min_ticks, self.config.max_ticks),
        }
    }

    /// Ticks for the current range, reusing the previous result when nothing changed.
    pub fn ticks(&mut self, expand_for_panning: bool) -> TickSet {
        let (min_count, max_count) = self.tick_count_bounds();
        let key = TickCacheKey {
            range: self.state.range(),
            mode: self.state.scale_mode(),
            min_count,
            max_count,
            expand: expand_for_panning,
        };

        if let Some((cached_key, ticks)) = &self.cached {
            if *cached_key == key {
                self.cache_stats.hits += 1;
                trace!(hits = self.cache_stats.hits, "tick cache hit");
                return ticks.clone();
            }
        }

        self.cache_stats.misses += 1;
        let ticks = self
            .planner
            .compute(key.range, key.mode, min_count, max_count, expand_for_panning);
        self.cached = Some((key, ticks.clone()));
        ticks
    }

    #[must_use]
    pub fn tick_cache_stats(&self) -> TickCacheStats {
        self.cache_stats
    }

    pub fn clear_tick_cache(&mut self) {
        self.cached = None;
        self.cache_stats = TickCacheStats::default();
    }
}
