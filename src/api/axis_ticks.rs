pub const DEFAULT_TARGET_SPACING_PX: f64 = 72.0;
pub const DEFAULT_MIN_SPACING_PX: f64 = 40.0;

/// Major count that spaces ticks roughly `target_spacing_px` apart.
///
/// Non-finite or non-positive inputs fall back to `min_ticks`.
#[must_use]
pub fn axis_tick_target_count(
    axis_span_px: f64,
    target_spacing_px: f64,
    min_ticks: usize,
    max_ticks: usize,
) -> usize {
    let (min_ticks, max_ticks) = ordered_bounds(min_ticks, max_ticks);
    if !axis_span_px.is_finite() || axis_span_px <= 0.0 {
        return min_ticks;
    }
    if !target_spacing_px.is_finite() || target_spacing_px <= 0.0 {
        return min_ticks;
    }

    let raw = (axis_span_px / target_spacing_px).floor() as usize + 1;
    raw.clamp(min_ticks, max_ticks)
}

/// `(min_count, max_count)` bounds for the tick planner on an axis of
/// `axis_span_px` pixels.
///
/// The upper bound keeps labels at least `min_spacing_px` apart; the lower
/// bound is the comfortable count at `target_spacing_px`, halved so the
/// planner has room to pick a rounder step.
#[must_use]
pub fn tick_count_bounds(
    axis_span_px: f64,
    target_spacing_px: f64,
    min_spacing_px: f64,
    min_ticks: usize,
    max_ticks: usize,
) -> (usize, usize) {
    let (min_ticks, max_ticks) = ordered_bounds(min_ticks, max_ticks);
    if !axis_span_px.is_finite() || axis_span_px <= 0.0 {
        return (min_ticks, max_ticks);
    }

    let target = axis_tick_target_count(axis_span_px, target_spacing_px, min_ticks, max_ticks);
    let spacing_cap = if min_spacing_px.is_finite() && min_spacing_px > 0.0 {
        (axis_span_px / min_spacing_px).floor() as usize + 1
    } else {
        max_ticks
    };
    let upper = spacing_cap.clamp(min_ticks, max_ticks).max(target);
    let lower = (target / 2).clamp(min_ticks, upper);
    (lower, upper)
}

fn ordered_bounds(min_ticks: usize, max_ticks: usize) -> (usize, usize) {
    let low = min_ticks.min(max_ticks).max(2);
    (low, max_ticks.max(min_ticks).max(low))
}
