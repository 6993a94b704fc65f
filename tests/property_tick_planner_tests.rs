use axis_rs::core::{Range, ScaleMode, Unit};
use axis_rs::ticks::{TickPlanner, TickStep};
use proptest::prelude::*;

fn is_non_decreasing(ticks: &[f64]) -> bool {
    ticks.windows(2).all(|pair| pair[0] <= pair[1])
}

proptest! {
    #[test]
    fn linear_majors_are_ordered_and_near_range_property(
        min in -1.0e6f64..1.0e6,
        span in 1.0e-3f64..1.0e6,
        min_count in 2usize..6,
        extra in 0usize..8,
        expand in any::<bool>()
    ) {
        let range = Range::new(min, min + span, Unit::Dimensionless).expect("valid range");
        let ticks = TickPlanner::new().compute(range, ScaleMode::Linear, min_count, min_count + extra, expand);

        let TickStep::Linear { spacing, .. } = ticks.step() else {
            return Err(TestCaseError::fail("linear range produced a non-linear step"));
        };
        let major = ticks.major();
        let slack = spacing * 1e-6 + range.min().abs().max(range.max().abs()) * 1e-12;

        prop_assert!(!major.is_empty());
        prop_assert!(is_non_decreasing(major));
        prop_assert!(is_non_decreasing(ticks.minor()));
        let all_major_in_bounds = major.iter().all(|tick| {
            *tick >= range.min() - spacing - slack && *tick <= range.max() + spacing + slack
        });
        prop_assert!(all_major_in_bounds);
        prop_assert!(major[0] <= range.min() + slack);
        prop_assert!(major[major.len() - 1] >= range.max() - slack);
    }

    #[test]
    fn compute_is_idempotent_property(
        min in -1.0e6f64..1.0e6,
        span in 1.0e-3f64..1.0e6,
        log in any::<bool>(),
        expand in any::<bool>()
    ) {
        let (min, mode) = if log { (min.abs() + 1e-3, ScaleMode::Log) } else { (min, ScaleMode::Linear) };
        let range = Range::new(min, min + span, Unit::Dimensionless).expect("valid range");
        let planner = TickPlanner::new();

        let first = planner.compute(range, mode, 3, 9, expand);
        let second = planner.compute(range, mode, 3, 9, expand);

        prop_assert_eq!(first, second);
    }

    #[test]
    fn log_majors_are_positive_and_ordered_property(
        low_exponent in -20i32..20,
        decades in 0.05f64..40.0,
        max_count in 2usize..12
    ) {
        let min = 10f64.powi(low_exponent);
        let max = min * 10f64.powf(decades);
        let range = Range::new(min, max, Unit::Dimensionless).expect("valid range");

        let ticks = TickPlanner::new().compute(range, ScaleMode::Log, 2, max_count, false);

        prop_assert!(!ticks.major().is_empty());
        prop_assert!(ticks.major().iter().all(|tick| *tick > 0.0));
        prop_assert!(is_non_decreasing(ticks.major()));
        prop_assert!(is_non_decreasing(ticks.minor()));
    }

    #[test]
    fn calendar_majors_are_ordered_property(
        start in 0.0f64..2.0e9,
        span in 1.0f64..1.0e9,
        min_count in 2usize..6,
        extra in 0usize..8
    ) {
        let range = Range::new(start, start + span, Unit::UnixSeconds).expect("valid range");
        let ticks = TickPlanner::new().compute(range, ScaleMode::Linear, min_count, min_count + extra, false);

        prop_assert!(!ticks.major().is_empty());
        prop_assert!(is_non_decreasing(ticks.major()));
        prop_assert!(is_non_decreasing(ticks.minor()));
    }
}
