// src/processing/features/frequency.rs
//! Frequency-domain feature functions
//!
//! Every function takes the Nyquist frequency explicitly so it can be used
//! without an extractor. Arrays are indexed by integer Hz bin. Results that
//! are averaged or rescaled are rounded half up in base ten (see
//! [`crate::utils::decimal`]); when an operand cannot be represented as a
//! decimal the plain `f64` result is returned instead.

use rust_decimal::prelude::FromPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};

use crate::config::constants::features::MIN_LOOKUP_FREQUENCY_HZ;
use crate::error::{DspErrorBuilder, DspResult};
use crate::utils::decimal::{
    divide_decimal_half_up, divide_half_up, round_half_up, FEATURE_SCALE, NORMALIZE_SCALE,
};

/// Log power at `frequency_hz`.
///
/// Integral frequencies index the array directly. Anything in between is
/// linearly interpolated from the two surrounding bins; if either bin is
/// infinite the result is 0.
///
/// Valid range: `1 <= frequency_hz <= nyquist - 1`.
pub fn log_power_at(log_powers: &[f64], frequency_hz: f64, nyquist: f64) -> DspResult<f64> {
    let upper_limit = nyquist - 1.0;
    if !(MIN_LOOKUP_FREQUENCY_HZ..=upper_limit).contains(&frequency_hz) {
        return Err(DspErrorBuilder::new("features", "log_power_at").out_of_range(
            "frequency_hz",
            format!("[{}, {}]", MIN_LOOKUP_FREQUENCY_HZ, upper_limit),
            frequency_hz,
        ));
    }

    let lower = frequency_hz.floor() as usize;
    let upper = frequency_hz.ceil() as usize;
    check_len("log_power_at", log_powers, upper)?;

    if lower == upper {
        return Ok(log_powers[lower]);
    }

    let low = log_powers[lower];
    let high = log_powers[upper];
    if low.is_infinite() || high.is_infinite() {
        return Ok(0.0);
    }

    let low_fraction = frequency_hz - lower as f64;
    let high_fraction = upper as f64 - frequency_hz;

    Ok(interpolate(low, high, low_fraction, high_fraction)
        .unwrap_or_else(|| low * high_fraction + high * low_fraction))
}

// (low + high * w) / (1 + w) with w = low_fraction / high_fraction
fn interpolate(low: f64, high: f64, low_fraction: f64, high_fraction: f64) -> Option<f64> {
    let weight = Decimal::from_f64(low_fraction)?
        .checked_div(Decimal::from_f64(high_fraction)?)?
        .round_dp_with_strategy(FEATURE_SCALE, RoundingStrategy::MidpointAwayFromZero);

    let numerator = Decimal::from_f64(low)?.checked_add(Decimal::from_f64(high)?.checked_mul(weight)?)?;
    divide_decimal_half_up(numerator, Decimal::ONE + weight, FEATURE_SCALE)
}

/// Triangularly weighted mean of the bins `lower_hz..=upper_hz`.
///
/// Weights ramp up from 1 towards the centre of the band and back down to
/// 1, so a span of four bins weighs `1, 2, 2, 1` and a span of five
/// `1, 2, 3, 2, 1`.
///
/// Valid range: `0 < lower_hz <= upper_hz < nyquist`.
pub fn band_log_power(log_powers: &[f64], lower_hz: usize, upper_hz: usize, nyquist: f64) -> DspResult<f64> {
    if lower_hz == 0 || lower_hz > upper_hz || upper_hz as f64 >= nyquist {
        return Err(DspErrorBuilder::new("features", "band_log_power").out_of_range(
            "band",
            format!("0 < lower <= upper < {}", nyquist),
            format!("{}..={}", lower_hz, upper_hz),
        ));
    }
    check_len("band_log_power", log_powers, upper_hz)?;

    let span = upper_hz - lower_hz + 1;
    let mut total = 0u64;
    let mut weighted = 0.0;
    for (offset, value) in log_powers[lower_hz..=upper_hz].iter().enumerate() {
        let weight = triangular_weight(offset, span);
        total += weight;
        weighted += value * weight as f64;
    }

    let total = total as f64;
    Ok(divide_half_up(weighted, total, FEATURE_SCALE).unwrap_or(weighted / total))
}

/// Weight of position `offset` in a triangular window `span` wide
pub fn triangular_weight(offset: usize, span: usize) -> u64 {
    (offset + 1).min(span - offset) as u64
}

/// Root mean square of `values[lower_hz..=upper_hz]`.
///
/// The mean divides by the length of the whole `values` slice, not by the
/// width of the range, so callers passing a full spectrum get the energy of
/// the band diluted over every bin.
///
/// Valid range: `1 <= lower_hz < upper_hz < nyquist`.
pub fn rms(lower_hz: usize, upper_hz: usize, values: &[f64], nyquist: f64) -> DspResult<f64> {
    check_cutoffs("rms", lower_hz, upper_hz, nyquist)?;
    check_len("rms", values, upper_hz)?;

    let sum: f64 = values[lower_hz..=upper_hz].iter().map(|v| v * v).sum();
    let divisor = values.len() as f64;

    Ok(divide_half_up(sum, divisor, FEATURE_SCALE)
        .unwrap_or(sum / divisor)
        .sqrt())
}

/// Weighted moving average where the first (oldest) value weighs 1 and each
/// later value one more than its predecessor.
///
/// Never fails: returns 0 for an empty slice or when the accumulated total
/// is not finite.
pub fn weighted_moving_average(values: &[f64]) -> f64 {
    let mut divisor = 0u64;
    let mut total = 0.0;

    for (index, value) in values.iter().enumerate() {
        let weight = index as u64 + 1;
        divisor += weight;
        total += value * weight as f64;
    }

    if divisor == 0 || !total.is_finite() {
        return 0.0;
    }

    let divisor = divisor as f64;
    divide_half_up(total, divisor, FEATURE_SCALE).unwrap_or(total / divisor)
}

/// Min-max normalize `values[lower_cutoff_hz..=upper_cutoff_hz]` into
/// `[0, 1]`, rounded half up to three digits. Bins outside the range are 0
/// in the output.
///
/// If the range minimum or maximum is infinite the raw values are copied
/// through unchanged. A flat range (min == max) normalizes to 0.
///
/// Valid range: `1 <= lower_cutoff_hz < upper_cutoff_hz < nyquist`, and
/// `values` must be longer than `upper_cutoff_hz`.
pub fn normalize_range(
    values: &[f64],
    lower_cutoff_hz: usize,
    upper_cutoff_hz: usize,
    nyquist: f64,
) -> DspResult<Vec<f64>> {
    check_cutoffs("normalize", lower_cutoff_hz, upper_cutoff_hz, nyquist)?;
    check_len("normalize", values, upper_cutoff_hz)?;

    let range = &values[lower_cutoff_hz..=upper_cutoff_hz];
    let min = range.iter().copied().fold(f64::INFINITY, f64::min);
    let max = range.iter().copied().fold(f64::NEG_INFINITY, f64::max);

    let mut normalized = vec![0.0; values.len()];
    let target = &mut normalized[lower_cutoff_hz..=upper_cutoff_hz];

    if min.is_infinite() || max.is_infinite() {
        target.copy_from_slice(range);
        return Ok(normalized);
    }

    let breadth = max - min;
    if breadth == 0.0 {
        return Ok(normalized);
    }

    for (out, value) in target.iter_mut().zip(range) {
        *out = divide_half_up(value - min, breadth, NORMALIZE_SCALE).unwrap_or_else(|| {
            // operands beyond decimal range; the quotient itself is in [0, 1]
            let quotient = (value - min) / breadth;
            round_half_up(quotient, NORMALIZE_SCALE).unwrap_or(quotient)
        });
    }

    Ok(normalized)
}

/// Rescale raw device units: `sample[i] * scale / signal_breadth`, rounded
/// half up to ten digits.
///
/// `signal_breadth` is the range of the raw signal the device can represent,
/// not the range of `sample`.
pub fn normalize_scaled(sample: &[f64], scale: f64, signal_breadth: f64) -> DspResult<Vec<f64>> {
    if sample.is_empty() {
        return Err(DspErrorBuilder::new("features", "normalize_scaled")
            .invalid_argument("sample", "must not be empty"));
    }
    if scale == 0.0 || !scale.is_finite() {
        return Err(DspErrorBuilder::new("features", "normalize_scaled")
            .out_of_range("scale", "finite and non-zero", scale));
    }
    if signal_breadth == 0.0 || !signal_breadth.is_finite() {
        return Err(DspErrorBuilder::new("features", "normalize_scaled")
            .out_of_range("signal_breadth", "finite and non-zero", signal_breadth));
    }

    let decimal_scale = Decimal::from_f64(scale);
    let decimal_breadth = Decimal::from_f64(signal_breadth);

    Ok(sample
        .iter()
        .map(|&value| {
            scale_decimal(value, decimal_scale, decimal_breadth)
                .unwrap_or(value * scale / signal_breadth)
        })
        .collect())
}

fn scale_decimal(value: f64, scale: Option<Decimal>, breadth: Option<Decimal>) -> Option<f64> {
    let numerator = Decimal::from_f64(value)?.checked_mul(scale?)?;
    divide_decimal_half_up(numerator, breadth?, FEATURE_SCALE)
}

/// Element-wise absolute value
pub fn absolute_values(values: &[f64]) -> Vec<f64> {
    values.iter().map(|v| v.abs()).collect()
}

fn check_cutoffs(operation: &str, lower_hz: usize, upper_hz: usize, nyquist: f64) -> DspResult<()> {
    if lower_hz < 1 || lower_hz >= upper_hz || upper_hz as f64 >= nyquist {
        return Err(DspErrorBuilder::new("features", operation).out_of_range(
            "range",
            format!("1 <= lower < upper < {}", nyquist),
            format!("{}..={}", lower_hz, upper_hz),
        ));
    }
    Ok(())
}

fn check_len(operation: &str, values: &[f64], highest_index: usize) -> DspResult<()> {
    if values.len() <= highest_index {
        return Err(DspErrorBuilder::new("features", operation).out_of_range(
            "array length",
            format!("> {}", highest_index),
            values.len(),
        ));
    }
    Ok(())
}
