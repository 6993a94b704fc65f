use crate::core::log_safe_bounds;

use super::linear::{self, LinearRequest};
use super::{FormatterDescriptor, PlannedTicks, TickPlannerConfig, TickStep, pow10, precision};

/// Slack applied to `log10` results before snapping to whole decades.
const DECADE_EPSILON: f64 = 1e-9;
/// Keeps `10^e` finite and normal.
const MAX_DECADE_EXPONENT: f64 = 307.0;

const DECADE_MULTIPLIERS: [f64; 8] = [2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 9.0];

pub(crate) fn plan_log(
    min: f64,
    max: f64,
    min_count: usize,
    max_count: usize,
    expand: bool,
    config: &TickPlannerConfig,
) -> PlannedTicks {
    let (min, max) = log_safe_bounds(min, max);
    let (min, max) = if min == max {
        (min / 10.0, max * 10.0)
    } else {
        (min, max)
    };
    let (log_min, log_max) = (min.log10(), max.log10());

    let decade_count = (log_max * config.log_decade_floor_fuzz).floor()
        - (log_min * config.log_decade_ceil_fuzz).ceil()
        + 1.0;

    if decade_count < 2.0 {
        return plan_within_decade(min, max, min_count, max_count, expand, config);
    }
    if decade_count > max_count as f64 {
        return plan_exponents(log_min, log_max, min_count, max_count, expand, config);
    }
    plan_decades(log_min, log_max, expand)
}

/// Fewer than two decades: linear ticks on raw values, positives only.
fn plan_within_decade(
    min: f64,
    max: f64,
    min_count: usize,
    max_count: usize,
    expand: bool,
    config: &TickPlannerConfig,
) -> PlannedTicks {
    let plan = linear::plan_linear(LinearRequest {
        min,
        max,
        min_count,
        max_count,
        target: config.default_target_count,
        retries: config.max_target_retries,
        integer: false,
        expand,
    });
    let major: Vec<f64> = plan.major.into_iter().filter(|tick| *tick > 0.0).collect();
    let minor: Vec<f64> = plan.minor.into_iter().filter(|tick| *tick > 0.0).collect();
    let formatter = precision::linear_formatter(&major, plan.spacing);
    PlannedTicks {
        major,
        minor,
        step: TickStep::Linear {
            spacing: plan.spacing,
            mantissa: plan.mantissa,
        },
        formatter,
    }
}

/// More decades than the budget allows: nice-number spacing on the exponents.
fn plan_exponents(
    log_min: f64,
    log_max: f64,
    min_count: usize,
    max_count: usize,
    expand: bool,
    config: &TickPlannerConfig,
) -> PlannedTicks {
    let plan = linear::plan_linear(LinearRequest {
        min: log_min,
        max: log_max,
        min_count,
        max_count,
        target: config.default_target_count,
        retries: config.max_target_retries,
        integer: true,
        expand,
    });

    let exponents: Vec<i32> = plan
        .major
        .iter()
        .filter(|exponent| (**exponent - exponent.round()).abs() < DECADE_EPSILON)
        .filter(|exponent| exponent.abs() <= MAX_DECADE_EXPONENT)
        .map(|exponent| exponent.round() as i32)
        .collect();
    let major: Vec<f64> = exponents.iter().map(|exponent| pow10(*exponent)).collect();

    let one_decade_apart = exponents.windows(2).all(|pair| pair[1] - pair[0] == 1);
    let minor = if one_decade_apart {
        match (exponents.first(), exponents.last()) {
            (Some(low), Some(high)) => decade_minors(*low, *high),
            _ => Vec::new(),
        }
    } else {
        plan.minor
            .iter()
            .filter(|exponent| exponent.abs() <= MAX_DECADE_EXPONENT)
            .map(|exponent| pow10(exponent.round() as i32))
            .collect()
    };

    PlannedTicks {
        major,
        minor,
        step: TickStep::Decades {
            per_major: plan.spacing.max(1.0) as u32,
        },
        formatter: FormatterDescriptor::Scientific { mantissa_digits: 0 },
    }
}

/// Every power of ten as a major, `2..9` multiples as minors.
fn plan_decades(log_min: f64, log_max: f64, expand: bool) -> PlannedTicks {
    let mut low = (log_min + DECADE_EPSILON).floor();
    let mut high = (log_max - DECADE_EPSILON).ceil();
    if expand {
        // One full span of slack on each side: min / (max / min) and max * (max / min).
        low = low.min((2.0 * log_min - log_max - DECADE_EPSILON).ceil());
        high = high.max((2.0 * log_max - log_min + DECADE_EPSILON).floor());
    }
    let low = low.max(-MAX_DECADE_EXPONENT) as i32;
    let high = high.min(MAX_DECADE_EXPONENT) as i32;

    PlannedTicks {
        major: (low..=high).map(pow10).collect(),
        minor: decade_minors(low, high),
        step: TickStep::Decades { per_major: 1 },
        formatter: FormatterDescriptor::Scientific { mantissa_digits: 0 },
    }
}

fn decade_minors(low: i32, high: i32) -> Vec<f64> {
    (low..high)
        .flat_map(|exponent| {
            let decade = pow10(exponent);
            DECADE_MULTIPLIERS
                .iter()
                .map(move |multiplier| multiplier * decade)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::{decade_minors, plan_decades};

    #[test]
    fn decade_minors_fill_each_decade() {
        let minors = decade_minors(0, 2);
        assert_eq!(minors.len(), 16);
        assert_eq!(minors[0], 2.0);
        assert_eq!(minors[8], 20.0);
        assert_eq!(minors[15], 90.0);
    }

    #[test]
    fn expanded_decades_add_one_span_each_side() {
        let planned = plan_decades(0.0, 2.0, true);
        assert_eq!(planned.major.first().copied(), Some(0.01));
        assert_eq!(planned.major.last().copied(), Some(10_000.0));
    }
}
