//! Calendar unit ladder.
//!
//! Each rung describes one calendar unit: its approximate length, how many
//! of it make up the next rung, which "nice" mantissas are allowed for it and
//! how a single-unit major interval is subdivided into minors.

use serde::{Deserialize, Serialize};

/// Calendar granularity, ordered from finest to coarsest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum CalendarUnit {
    Nanosecond,
    Second,
    Minute,
    Hour,
    Day,
    Month,
    Year,
}

impl CalendarUnit {
    /// Nominal length in seconds (Gregorian averages for month and year).
    #[must_use]
    pub fn approx_seconds(self) -> f64 {
        match self {
            Self::Nanosecond => 1e-9,
            Self::Second => 1.0,
            Self::Minute => 60.0,
            Self::Hour => 3_600.0,
            Self::Day => 86_400.0,
            Self::Month => 2_629_746.0,
            Self::Year => 31_556_952.0,
        }
    }

    #[must_use]
    pub fn approx_nanos(self) -> f64 {
        self.approx_seconds() * 1e9
    }

    #[must_use]
    pub fn rung(self) -> &'static LadderRung {
        let index = CALENDAR_LADDER
            .iter()
            .position(|rung| rung.unit == self)
            .unwrap_or(0);
        &CALENDAR_LADDER[index]
    }
}

/// Shared pool of mantissas a rung may draw from.
pub const PREFERRED_MANTISSAS: &[u32] = &[
    1, 2, 3, 5, 6, 10, 12, 15, 20, 25, 30, 45, 60, 90, 100, 200, 250, 500,
];

/// Minor tick rule used when a major interval is exactly one unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MinorSubdivision {
    pub unit: CalendarUnit,
    pub step: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LadderRung {
    pub unit: CalendarUnit,
    /// Whole units per next rung; `None` on the top rung.
    pub per_next: Option<u32>,
    /// Mantissas allowed regardless of the divisor rule.
    pub include: &'static [u32],
    /// Divisors that produce awkward labels for this unit.
    pub exclude: &'static [u32],
    pub minor: Option<MinorSubdivision>,
}

impl LadderRung {
    /// Allowed mantissas, ascending.
    ///
    /// Preferred mantissas that divide `per_next` (and are smaller than it),
    /// minus `exclude`, plus `include`.
    #[must_use]
    pub fn mantissas(&self) -> Vec<u32> {
        let mut mantissas: Vec<u32> = PREFERRED_MANTISSAS
            .iter()
            .copied()
            .filter(|mantissa| {
                self.per_next
                    .is_some_and(|ratio| *mantissa < ratio && ratio % *mantissa == 0)
            })
            .filter(|mantissa| !self.exclude.contains(mantissa))
            .chain(self.include.iter().copied())
            .collect();
        mantissas.sort_unstable();
        mantissas.dedup();
        mantissas
    }

    #[must_use]
    pub fn approx_seconds(&self, mantissa: u32) -> f64 {
        f64::from(mantissa) * self.unit.approx_seconds()
    }
}

const NANOSECOND_STEPS: &[u32] = &[
    1_000,
    2_000,
    5_000,
    10_000,
    20_000,
    50_000,
    100_000,
    200_000,
    500_000,
    1_000_000,
    2_000_000,
    5_000_000,
    10_000_000,
    20_000_000,
    50_000_000,
    100_000_000,
    200_000_000,
    500_000_000,
];

/// Ladder from finest to coarsest.
pub const CALENDAR_LADDER: &[LadderRung] = &[
    LadderRung {
        unit: CalendarUnit::Nanosecond,
        per_next: Some(1_000_000_000),
        include: NANOSECOND_STEPS,
        exclude: &[],
        minor: None,
    },
    // :00/:30 reads better than :00/:06/:12, so 6 and 12 are skipped.
    LadderRung {
        unit: CalendarUnit::Second,
        per_next: Some(60),
        include: &[],
        exclude: &[6, 12],
        minor: Some(MinorSubdivision {
            unit: CalendarUnit::Nanosecond,
            step: 100_000_000,
        }),
    },
    LadderRung {
        unit: CalendarUnit::Minute,
        per_next: Some(60),
        include: &[],
        exclude: &[6, 12],
        minor: Some(MinorSubdivision {
            unit: CalendarUnit::Second,
            step: 15,
        }),
    },
    LadderRung {
        unit: CalendarUnit::Hour,
        per_next: Some(24),
        include: &[],
        exclude: &[],
        minor: Some(MinorSubdivision {
            unit: CalendarUnit::Minute,
            step: 15,
        }),
    },
    // Months vary in length; 30 only drives the divisor rule.
    LadderRung {
        unit: CalendarUnit::Day,
        per_next: Some(30),
        include: &[],
        exclude: &[6],
        minor: Some(MinorSubdivision {
            unit: CalendarUnit::Hour,
            step: 6,
        }),
    },
    LadderRung {
        unit: CalendarUnit::Month,
        per_next: Some(12),
        include: &[],
        exclude: &[],
        minor: Some(MinorSubdivision {
            unit: CalendarUnit::Day,
            step: 7,
        }),
    },
    LadderRung {
        unit: CalendarUnit::Year,
        per_next: None,
        include: &[1, 2, 5, 10],
        exclude: &[],
        minor: Some(MinorSubdivision {
            unit: CalendarUnit::Month,
            step: 3,
        }),
    },
];

#[cfg(test)]
mod tests {
    use super::{CALENDAR_LADDER, CalendarUnit};

    #[test]
    fn ladder_is_ordered_by_length() {
        assert!(
            CALENDAR_LADDER
                .windows(2)
                .all(|pair| pair[0].unit.approx_seconds() < pair[1].unit.approx_seconds())
        );
    }

    #[test]
    fn seconds_and_minutes_skip_six_and_twelve() {
        let expected = vec![1, 2, 3, 5, 10, 15, 20, 30];
        assert_eq!(CalendarUnit::Second.rung().mantissas(), expected);
        assert_eq!(CalendarUnit::Minute.rung().mantissas(), expected);
    }

    #[test]
    fn hour_day_and_month_mantissas() {
        assert_eq!(CalendarUnit::Hour.rung().mantissas(), vec![1, 2, 3, 6, 12]);
        assert_eq!(CalendarUnit::Day.rung().mantissas(), vec![1, 2, 3, 5, 10, 15]);
        assert_eq!(CalendarUnit::Month.rung().mantissas(), vec![1, 2, 3, 6]);
        assert_eq!(CalendarUnit::Year.rung().mantissas(), vec![1, 2, 5, 10]);
    }

    #[test]
    fn divisor_rungs_only_offer_divisors() {
        for rung in CALENDAR_LADDER {
            let Some(ratio) = rung.per_next else {
                continue;
            };
            for mantissa in rung.mantissas() {
                assert_eq!(ratio % mantissa, 0, "{:?} x{mantissa}", rung.unit);
            }
        }
    }

    #[test]
    fn nanosecond_rung_reaches_half_a_second() {
        let mantissas = CalendarUnit::Nanosecond.rung().mantissas();
        assert_eq!(mantissas.first().copied(), Some(1));
        assert_eq!(mantissas.last().copied(), Some(500_000_000));
    }
}
