use super::pow10;

/// Relative slack used when snapping bounds onto the tick grid.
const GRID_EPSILON: f64 = 1e-9;
/// Hard cap on generated positions per list.
const MAX_GENERATED_TICKS: usize = 100_000;
/// Grid indices at or past 2^53 no longer step by one.
pub(crate) const MAX_EXACT_INDEX: f64 = 9_007_199_254_740_992.0;

#[derive(Debug, Clone, Copy)]
pub(crate) struct LinearRequest {
    pub(crate) min: f64,
    pub(crate) max: f64,
    pub(crate) min_count: usize,
    pub(crate) max_count: usize,
    pub(crate) target: usize,
    pub(crate) retries: usize,
    /// Restricts both spacings to whole numbers >= 1.
    pub(crate) integer: bool,
    pub(crate) expand: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct LinearPlan {
    pub(crate) major: Vec<f64>,
    pub(crate) minor: Vec<f64>,
    pub(crate) spacing: f64,
    pub(crate) mantissa: u32,
}

/// Rounds a raw spacing to `1`, `2` or `5` times a power of ten.
pub(crate) fn nice_spacing(raw: f64) -> (f64, u32) {
    let exponent = raw.log10().floor() as i32;
    let magnitude = pow10(exponent);
    let normalized = raw / magnitude;
    if normalized < 1.666 {
        (magnitude, 1)
    } else if normalized < 3.333 {
        (2.0 * magnitude, 2)
    } else if normalized < 9.0 {
        (5.0 * magnitude, 5)
    } else {
        (10.0 * magnitude, 1)
    }
}

fn next_coarser(spacing: f64, mantissa: u32) -> (f64, u32) {
    match mantissa {
        1 => (spacing * 2.0, 2),
        2 => (spacing * 2.5, 5),
        _ => (spacing * 2.0, 1),
    }
}

fn minor_divisions(mantissa: u32) -> f64 {
    match mantissa {
        5 => 5.0,
        2 => 2.0,
        _ => 10.0,
    }
}

/// Grid positions inside `[min, max]`.
pub(crate) fn count_within(min: f64, max: f64, spacing: f64) -> usize {
    let first = (min / spacing - GRID_EPSILON).ceil();
    let last = (max / spacing + GRID_EPSILON).floor();
    if !(first.is_finite() && last.is_finite()) || last < first {
        return 0;
    }
    ((last - first) as usize).saturating_add(1)
}

/// Positions `k * spacing` for `k` in `first..=last`.
fn grid(first: f64, last: f64, spacing: f64) -> Vec<f64> {
    if !(first.is_finite() && last.is_finite()) || last < first {
        return Vec::new();
    }
    // Dividing by an integral reciprocal keeps 0.1-style steps exact.
    let reciprocal = 1.0 / spacing;
    let divisor = (reciprocal >= 1.0 && (reciprocal - reciprocal.round()).abs() < GRID_EPSILON)
        .then(|| reciprocal.round());

    let mut ticks = Vec::new();
    let mut index = first;
    while index <= last && ticks.len() < MAX_GENERATED_TICKS && index + 1.0 != index {
        let tick = match divisor {
            Some(divisor) => index / divisor,
            None => index * spacing,
        };
        ticks.push(tick);
        index += 1.0;
    }
    ticks
}

fn integer_spacing(spacing: f64, mantissa: u32) -> (f64, u32) {
    if spacing < 1.0 {
        (1.0, 1)
    } else {
        (spacing.floor(), mantissa)
    }
}

pub(crate) fn plan_linear(request: LinearRequest) -> LinearPlan {
    let LinearRequest { min, max, .. } = request;
    let width = max - min;
    if !(width.is_finite() && width > 0.0) {
        return LinearPlan {
            major: if min == max { vec![min] } else { vec![min, max] },
            minor: Vec::new(),
            spacing: 0.0,
            mantissa: 1,
        };
    }

    let floor_count = request.min_count.max(2);
    let ceiling_count = request.max_count.max(floor_count);
    let measure = |target: usize| {
        let (spacing, mantissa) = nice_spacing(width / (target - 1) as f64);
        let (spacing, mantissa) = if request.integer {
            integer_spacing(spacing, mantissa)
        } else {
            (spacing, mantissa)
        };
        (spacing, mantissa, count_within(min, max, spacing))
    };

    let mut target = request.target.clamp(floor_count, ceiling_count);
    let (mut spacing, mut mantissa, mut count) = measure(target);
    let mut attempt = 0;
    while count < floor_count && attempt < request.retries {
        target += 1;
        attempt += 1;
        (spacing, mantissa, count) = measure(target);
    }

    while count > ceiling_count {
        let (coarser, coarser_mantissa) = next_coarser(spacing, mantissa);
        let coarser_count = count_within(min, max, coarser);
        if coarser_count < floor_count {
            break;
        }
        spacing = coarser;
        mantissa = coarser_mantissa;
        count = coarser_count;
    }

    let mut minor_spacing = spacing / minor_divisions(mantissa);
    if request.integer {
        minor_spacing = minor_spacing.floor().max(1.0);
    }
    if min.abs().max(max.abs()) / minor_spacing >= MAX_EXACT_INDEX {
        return LinearPlan {
            major: vec![min, max],
            minor: Vec::new(),
            spacing: width,
            mantissa: 1,
        };
    }

    // Covering majors; expansion reaches one spacing past the inner ticks instead.
    let (first, last) = if request.expand {
        (
            (min / spacing - GRID_EPSILON).ceil() - 1.0,
            (max / spacing + GRID_EPSILON).floor() + 1.0,
        )
    } else {
        (
            (min / spacing + GRID_EPSILON).floor(),
            (max / spacing - GRID_EPSILON).ceil(),
        )
    };
    let major = grid(first, last, spacing);

    let minor = match (major.first(), major.last()) {
        (Some(low), Some(high)) => grid(
            (low / minor_spacing - GRID_EPSILON).ceil(),
            (high / minor_spacing + GRID_EPSILON).floor(),
            minor_spacing,
        ),
        _ => Vec::new(),
    };

    LinearPlan {
        major,
        minor,
        spacing,
        mantissa,
    }
}

#[cfg(test)]
mod tests {
    use super::{LinearRequest, count_within, nice_spacing, plan_linear};

    fn request(min: f64, max: f64) -> LinearRequest {
        LinearRequest {
            min,
            max,
            min_count: 2,
            max_count: 10,
            target: 6,
            retries: 32,
            integer: false,
            expand: false,
        }
    }

    #[test]
    fn nice_spacing_thresholds() {
        assert_eq!(nice_spacing(1.5), (1.0, 1));
        assert_eq!(nice_spacing(19.8), (20.0, 2));
        assert_eq!(nice_spacing(4.0), (5.0, 5));
        assert_eq!(nice_spacing(9.5), (10.0, 1));
        assert_eq!(nice_spacing(0.03), (0.02, 2));
    }

    #[test]
    fn count_within_tolerates_float_noise() {
        assert_eq!(count_within(0.3, 0.9, 0.1), 7);
        assert_eq!(count_within(1.0, 100.0, 20.0), 5);
    }

    #[test]
    fn retries_until_two_ticks_fit() {
        let plan = plan_linear(LinearRequest {
            target: 2,
            ..request(0.5, 1.4)
        });
        assert!(count_within(0.5, 1.4, plan.spacing) >= 2);
    }

    #[test]
    fn integer_requests_never_go_below_one() {
        let plan = plan_linear(LinearRequest {
            integer: true,
            ..request(0.0, 3.0)
        });
        assert_eq!(plan.spacing, 1.0);
        assert!(plan.minor.windows(2).all(|pair| pair[1] - pair[0] >= 1.0));
    }

    #[test]
    fn coarsens_when_over_budget() {
        let plan = plan_linear(LinearRequest {
            max_count: 3,
            min_count: 2,
            target: 6,
            ..request(0.0, 100.0)
        });
        let count = count_within(0.0, 100.0, plan.spacing);
        assert!((2..=3).contains(&count), "count={count}");
    }

    #[test]
    fn expansion_stays_within_one_spacing() {
        let plan = plan_linear(LinearRequest {
            expand: true,
            ..request(1.0, 100.0)
        });
        assert_eq!(plan.spacing, 20.0);
        assert_eq!(plan.major.first().copied(), Some(0.0));
        assert_eq!(plan.major.last().copied(), Some(120.0));
    }

    #[test]
    fn unrepresentable_grid_keeps_only_the_bounds() {
        let plan = plan_linear(request(1e17, 1e17 + 32.0));
        assert_eq!(plan.major, vec![1e17, 1e17 + 32.0]);
        assert!(plan.minor.is_empty());
        assert_eq!(plan.spacing, 32.0);
    }
}
