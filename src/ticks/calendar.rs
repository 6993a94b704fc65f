use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime};
use tracing::{debug, trace};

use super::ladder::{CALENDAR_LADDER, CalendarUnit};
use super::linear::{self, LinearRequest, MAX_EXACT_INDEX};
use super::{
    FormatterDescriptor, PlannedTicks, TickPlannerConfig, TickStep, precision, trim_covering,
};

const SECONDS_PER_DAY: f64 = 86_400.0;
const GRID_EPSILON: f64 = 1e-9;
const MAX_CALENDAR_TICKS: usize = 20_000;
/// Sub-range slack around the bracketing spacing; month and year lengths vary.
const BRACKET_SLACK: f64 = 2.0;

#[derive(Debug, Clone, Copy, PartialEq)]
struct Candidate {
    unit: CalendarUnit,
    mantissa: u32,
    count: usize,
}

/// Plans ticks for a Unix-seconds range.
pub(crate) fn plan_calendar(
    min: f64,
    max: f64,
    min_count: usize,
    max_count: usize,
    expand: bool,
    config: &TickPlannerConfig,
) -> PlannedTicks {
    let offset = f64::from(config.utc_offset_seconds);
    let (local_min, local_max) = (min + offset, max + offset);
    let width = local_max - local_min;

    let planned = if width < config.calendar_linear_fallback_seconds {
        Some(plan_from_midnight(
            local_min, local_max, min_count, max_count, expand, config,
        ))
    } else if width > config.calendar_year_fallback_years * CalendarUnit::Year.approx_seconds() {
        plan_whole_years(local_min, local_max, min_count, max_count, expand, config)
    } else {
        plan_on_ladder(local_min, local_max, min_count, max_count, expand)
    };

    match planned {
        Some(planned) => shift(planned, -offset),
        None => {
            debug!(min, max, "no calendar step applies; using linear ticks");
            plan_linear_seconds(min, max, min_count, max_count, expand, config)
        }
    }
}

/// Picks the coarsest ladder step whose covering majors fit the budget.
///
/// Candidates are counted on the visible range only, so panning padding
/// never changes the chosen step.
fn plan_on_ladder(
    min: f64,
    max: f64,
    min_count: usize,
    max_count: usize,
    expand: bool,
) -> Option<PlannedTicks> {
    let width = max - min;
    let finest_spacing = width / max_count as f64;
    let coarsest_spacing = width / (min_count.max(2) - 1) as f64;

    let mut accepted = None;
    let mut best_under: Option<Candidate> = None;
    let mut first_over: Option<Candidate> = None;

    'ladder: for rung in CALENDAR_LADDER.iter().rev() {
        for mantissa in rung.mantissas().into_iter().rev() {
            let spacing = rung.approx_seconds(mantissa);
            if spacing > coarsest_spacing * BRACKET_SLACK {
                continue;
            }
            if spacing < finest_spacing / BRACKET_SLACK {
                break 'ladder;
            }

            let candidate = Candidate {
                unit: rung.unit,
                mantissa,
                count: covering_ticks(min, max, rung.unit, mantissa, 0)?.len(),
            };
            trace!(
                unit = ?candidate.unit,
                mantissa = candidate.mantissa,
                count = candidate.count,
                "calendar candidate"
            );

            if candidate.count < min_count {
                best_under = Some(candidate);
            } else if candidate.count <= max_count {
                accepted = Some(candidate);
                break 'ladder;
            } else {
                first_over = Some(candidate);
                break 'ladder;
            }
        }
    }

    let chosen = accepted.or(best_under).or(first_over)?;
    if accepted.is_none() {
        debug!(
            unit = ?chosen.unit,
            mantissa = chosen.mantissa,
            count = chosen.count,
            "no calendar step fits the tick budget; using closest"
        );
    }

    build_calendar_ticks(min, max, chosen.unit, chosen.mantissa, expand)
}

/// Aligned majors covering `[min, max]`, plus `pad` extra per side.
fn covering_ticks(
    min: f64,
    max: f64,
    unit: CalendarUnit,
    mantissa: u32,
    pad: usize,
) -> Option<Vec<f64>> {
    let margin = unit.approx_seconds() * f64::from(mantissa) * 1.5 * (pad as f64 + 1.0);
    let candidates = calendar_ticks(min - margin, max + margin, unit, mantissa)?;
    // Bounds sitting on a tick within rounding noise count as on it.
    let slack = if pad == 0 { 1.0 } else { -1.0 } * float_slack(min, max);
    Some(trim_covering(&candidates, min + slack, max - slack, pad))
}

fn build_calendar_ticks(
    min: f64,
    max: f64,
    unit: CalendarUnit,
    mantissa: u32,
    expand: bool,
) -> Option<PlannedTicks> {
    let major = covering_ticks(min, max, unit, mantissa, usize::from(expand))?;

    let minor = match (major.first(), major.last()) {
        (Some(first), Some(last)) => {
            let subdivision = if mantissa == 1 {
                unit.rung().minor.map(|minor| (minor.unit, minor.step))
            } else {
                Some((unit, minor_step(mantissa)))
            };
            match subdivision {
                Some((minor_unit, step)) => calendar_ticks(*first, *last, minor_unit, step)?,
                None => Vec::new(),
            }
        }
        _ => Vec::new(),
    };

    Some(PlannedTicks {
        major,
        minor,
        step: TickStep::Calendar { unit, mantissa },
        formatter: FormatterDescriptor::Calendar {
            resolution: unit,
            fraction_digits: 0,
        },
    })
}

/// Largest even subdivision of a multi-unit major interval.
fn minor_step(mantissa: u32) -> u32 {
    [5, 4, 3, 2]
        .into_iter()
        .find(|divisions| mantissa % divisions == 0)
        .map_or(1, |divisions| mantissa / divisions)
}

/// Aligned ticks of `step` units inside `[start, end]` (local seconds).
fn calendar_ticks(start: f64, end: f64, unit: CalendarUnit, step: u32) -> Option<Vec<f64>> {
    let step = step.max(1);
    let slack = float_slack(start, end);
    let (start, end) = (start - slack, end + slack);
    match unit {
        CalendarUnit::Nanosecond
        | CalendarUnit::Second
        | CalendarUnit::Minute
        | CalendarUnit::Hour => fixed_ticks(start, end, f64::from(step) * unit.approx_seconds()),
        CalendarUnit::Day => day_ticks(start, end, step),
        CalendarUnit::Month => month_ticks(start, end, step),
        CalendarUnit::Year => year_ticks(start, end, step),
    }
}

/// Multiples of `period` from the local epoch; every period used divides a day.
/// `None` when the multiples are too far from the epoch to count exactly.
fn fixed_ticks(start: f64, end: f64, period: f64) -> Option<Vec<f64>> {
    if start.abs().max(end.abs()) / period >= MAX_EXACT_INDEX {
        return None;
    }
    let first = (start / period - GRID_EPSILON).ceil();
    let last = (end / period + GRID_EPSILON).floor();
    let mut ticks = Vec::new();
    let mut index = first;
    while index <= last && ticks.len() < MAX_CALENDAR_TICKS {
        ticks.push(index * period);
        index += 1.0;
    }
    Some(ticks)
}

/// Days `1, 1+step, ...` restarted each month; the last one is skipped when
/// it would sit closer than half a step to the next month's first.
fn day_ticks(start: f64, end: f64, step: u32) -> Option<Vec<f64>> {
    let first_day = to_naive(start)?.date();
    let last_day = to_naive(end)?.date();
    let mut month = first_day.with_day(1)?;
    let mut ticks = Vec::new();

    while month <= last_day && ticks.len() < MAX_CALENDAR_TICKS {
        let next = next_month(month)?;
        let days = u32::try_from((next - month).num_days()).ok()?;
        for day in (1..=days).step_by(step as usize) {
            if day != 1 && day + step / 2 > days {
                continue;
            }
            let tick = from_naive(month.with_day(day)?.and_hms_opt(0, 0, 0)?);
            if tick >= start && tick <= end {
                ticks.push(tick);
            }
        }
        month = next;
    }
    Some(ticks)
}

fn month_ticks(start: f64, end: f64, step: u32) -> Option<Vec<f64>> {
    let first_year = to_naive(start)?.year();
    let last_year = to_naive(end)?.year();
    let mut ticks = Vec::new();
    for year in first_year..=last_year {
        for month in (1..=12).step_by(step as usize) {
            let tick = from_naive(NaiveDate::from_ymd_opt(year, month, 1)?.and_hms_opt(0, 0, 0)?);
            if tick >= start && tick <= end {
                ticks.push(tick);
            }
        }
        if ticks.len() >= MAX_CALENDAR_TICKS {
            break;
        }
    }
    Some(ticks)
}

fn year_ticks(start: f64, end: f64, step: u32) -> Option<Vec<f64>> {
    let step = i32::try_from(step).ok()?;
    let first_year = to_naive(start)?.year();
    let last_year = to_naive(end)?.year();
    let mut year = first_year.div_euclid(step) * step;
    let mut ticks = Vec::new();
    while year <= last_year && ticks.len() < MAX_CALENDAR_TICKS {
        let tick = year_start(year)?;
        if tick >= start && tick <= end {
            ticks.push(tick);
        }
        year += step;
    }
    Some(ticks)
}

/// Spans under a minute: linear seconds counted from the preceding midnight.
fn plan_from_midnight(
    min: f64,
    max: f64,
    min_count: usize,
    max_count: usize,
    expand: bool,
    config: &TickPlannerConfig,
) -> PlannedTicks {
    let midnight = (min / SECONDS_PER_DAY).floor() * SECONDS_PER_DAY;
    let plan = linear::plan_linear(LinearRequest {
        min: min - midnight,
        max: max - midnight,
        min_count,
        max_count,
        target: config.default_target_count,
        retries: config.max_target_retries,
        integer: false,
        expand,
    });
    let fraction_digits = match precision::linear_formatter(&plan.major, plan.spacing) {
        FormatterDescriptor::FixedPoint { fraction_digits } => fraction_digits.min(9),
        _ => 9,
    };
    PlannedTicks {
        major: plan.major.iter().map(|tick| tick + midnight).collect(),
        minor: plan.minor.iter().map(|tick| tick + midnight).collect(),
        step: TickStep::Linear {
            spacing: plan.spacing,
            mantissa: plan.mantissa,
        },
        formatter: FormatterDescriptor::Calendar {
            resolution: CalendarUnit::Second,
            fraction_digits,
        },
    }
}

/// Spans over the year threshold: nice numbers on integer years.
fn plan_whole_years(
    min: f64,
    max: f64,
    min_count: usize,
    max_count: usize,
    expand: bool,
    config: &TickPlannerConfig,
) -> Option<PlannedTicks> {
    let plan = linear::plan_linear(LinearRequest {
        min: fractional_year(min)?,
        max: fractional_year(max)?,
        min_count,
        max_count,
        target: config.default_target_count,
        retries: config.max_target_retries,
        integer: true,
        expand,
    });

    let cutover = config.calendar_epoch_cutover_year;
    let to_year_starts = |years: &[f64]| -> Vec<f64> {
        years
            .iter()
            .map(|year| year.round())
            .filter(|year| *year >= f64::from(cutover) && year.abs() < f64::from(i32::MAX))
            .filter_map(|year| year_start(year as i32))
            .collect()
    };

    Some(PlannedTicks {
        major: to_year_starts(&plan.major),
        minor: to_year_starts(&plan.minor),
        step: TickStep::Calendar {
            unit: CalendarUnit::Year,
            mantissa: plan.spacing.max(1.0) as u32,
        },
        formatter: FormatterDescriptor::Calendar {
            resolution: CalendarUnit::Year,
            fraction_digits: 0,
        },
    })
}

fn plan_linear_seconds(
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
    let formatter = precision::linear_formatter(&plan.major, plan.spacing);
    PlannedTicks {
        step: TickStep::Linear {
            spacing: plan.spacing,
            mantissa: plan.mantissa,
        },
        major: plan.major,
        minor: plan.minor,
        formatter,
    }
}

/// Rounding noise of timestamps near `start`/`end` after unit scaling.
fn float_slack(start: f64, end: f64) -> f64 {
    start.abs().max(end.abs()) * 4.0 * f64::EPSILON
}

fn shift(mut planned: PlannedTicks, delta: f64) -> PlannedTicks {
    if delta != 0.0 {
        planned.major.iter_mut().for_each(|tick| *tick += delta);
        planned.minor.iter_mut().for_each(|tick| *tick += delta);
    }
    planned
}

fn to_naive(seconds: f64) -> Option<NaiveDateTime> {
    if !seconds.is_finite() {
        return None;
    }
    let whole = seconds.floor();
    if whole < i64::MIN as f64 || whole > i64::MAX as f64 {
        return None;
    }
    let nanos = ((seconds - whole) * 1e9).round().min(999_999_999.0) as u32;
    DateTime::from_timestamp(whole as i64, nanos).map(|time| time.naive_utc())
}

fn from_naive(time: NaiveDateTime) -> f64 {
    let time = time.and_utc();
    time.timestamp() as f64 + f64::from(time.timestamp_subsec_nanos()) * 1e-9
}

fn next_month(date: NaiveDate) -> Option<NaiveDate> {
    if date.month() == 12 {
        NaiveDate::from_ymd_opt(date.year() + 1, 1, 1)
    } else {
        NaiveDate::from_ymd_opt(date.year(), date.month() + 1, 1)
    }
}

fn year_start(year: i32) -> Option<f64> {
    Some(from_naive(
        NaiveDate::from_ymd_opt(year, 1, 1)?.and_hms_opt(0, 0, 0)?,
    ))
}

fn fractional_year(seconds: f64) -> Option<f64> {
    let year = to_naive(seconds)?.year();
    let start = year_start(year)?;
    let end = year_start(year + 1)?;
    Some(f64::from(year) + (seconds - start) / (end - start))
}

#[cfg(test)]
mod tests {
    use super::{calendar_ticks, day_ticks, fixed_ticks, minor_step};
    use crate::ticks::CalendarUnit;

    // 2024-01-01T00:00:00Z
    const JAN_2024: f64 = 1_704_067_200.0;

    #[test]
    fn minor_step_prefers_five_divisions() {
        assert_eq!(minor_step(30), 6);
        assert_eq!(minor_step(20), 4);
        assert_eq!(minor_step(6), 2);
        assert_eq!(minor_step(2), 1);
        assert_eq!(minor_step(1), 1);
    }

    #[test]
    fn month_ticks_land_on_first_of_month() {
        let ticks = calendar_ticks(JAN_2024, JAN_2024 + 100.0 * 86_400.0, CalendarUnit::Month, 1)
            .expect("representable");
        // Jan 1, Feb 1, Mar 1, Apr 1.
        assert_eq!(
            ticks,
            vec![
                JAN_2024,
                JAN_2024 + 31.0 * 86_400.0,
                JAN_2024 + 60.0 * 86_400.0,
                JAN_2024 + 91.0 * 86_400.0,
            ]
        );
    }

    #[test]
    fn day_ticks_skip_crowded_month_end() {
        let ticks = day_ticks(JAN_2024, JAN_2024 + 31.0 * 86_400.0, 10).expect("representable");
        // Jan 1, 11, 21 then Feb 1; Jan 31 is too close to Feb 1.
        assert_eq!(
            ticks,
            vec![
                JAN_2024,
                JAN_2024 + 10.0 * 86_400.0,
                JAN_2024 + 20.0 * 86_400.0,
                JAN_2024 + 31.0 * 86_400.0,
            ]
        );
    }

    #[test]
    fn fixed_ticks_refuse_inexact_indices() {
        assert!(fixed_ticks(JAN_2024, JAN_2024 + 1.0, 1e-9).is_none());
        assert_eq!(
            fixed_ticks(JAN_2024, JAN_2024 + 60.0, 30.0),
            Some(vec![JAN_2024, JAN_2024 + 30.0, JAN_2024 + 60.0])
        );
    }
}
