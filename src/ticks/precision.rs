use super::{FormatterDescriptor, pow10};

const MAX_FRACTION_DIGITS: u8 = 12;
const SCIENTIFIC_MIN_MAGNITUDE: f64 = 1e6;
const SCIENTIFIC_MAX_SPACING: f64 = 1e-4;

/// Middle third of `ticks` (indices `n/3..2n/3`), never empty for non-empty input.
pub(crate) fn representative_sample(ticks: &[f64]) -> &[f64] {
    let len = ticks.len();
    if len < 3 {
        return ticks;
    }
    let start = len / 3;
    let end = (2 * len / 3).max(start + 1);
    &ticks[start..end]
}

/// Smallest number of fraction digits that reproduces `value` within `tolerance`.
pub(crate) fn fraction_digits(value: f64, tolerance: f64) -> u8 {
    (0..MAX_FRACTION_DIGITS)
        .find(|digits| {
            let scale = 10f64.powi(i32::from(*digits));
            ((value * scale).round() / scale - value).abs() <= tolerance
        })
        .unwrap_or(MAX_FRACTION_DIGITS)
}

/// Picks fixed-point or scientific notation for a uniformly spaced tick list.
pub(crate) fn linear_formatter(ticks: &[f64], spacing: f64) -> FormatterDescriptor {
    let sample = representative_sample(ticks);
    let largest = sample.iter().fold(0.0f64, |acc, tick| acc.max(tick.abs()));
    let spacing = spacing.abs();

    if largest >= SCIENTIFIC_MIN_MAGNITUDE || (spacing > 0.0 && spacing < SCIENTIFIC_MAX_SPACING) {
        let reference = if largest > 0.0 { largest } else { spacing };
        let scale = pow10(reference.log10().floor() as i32);
        let tolerance = spacing / scale * 1e-6;
        let mantissa_digits = sample
            .iter()
            .map(|tick| fraction_digits(tick / scale, tolerance))
            .max()
            .unwrap_or(0);
        return FormatterDescriptor::Scientific { mantissa_digits };
    }

    let tolerance = spacing * 1e-6;
    let digits = sample
        .iter()
        .map(|tick| fraction_digits(*tick, tolerance))
        .max()
        .unwrap_or(0);
    FormatterDescriptor::FixedPoint {
        fraction_digits: digits,
    }
}
