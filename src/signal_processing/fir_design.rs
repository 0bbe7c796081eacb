//! Windowed-sinc FIR coefficient design
//!
//! Band-pass taps come from the difference of two ideal low-pass impulse
//! responses, shaped by a Blackman-Harris window and rescaled for unity
//! gain at the center of the passband.

use std::f64::consts::PI;

use num_complex::Complex64;

use crate::constants::GAIN_EPSILON;
use crate::error::{LeakError, Result};
use crate::signal_processing::window::blackman_harris;

/// Normalized sinc: sin(πx)/(πx), with sinc(0) = 1.
fn sinc(x: f64) -> f64 {
    if x == 0.0 {
        1.0
    } else {
        let px = PI * x;
        px.sin() / px
    }
}

/// Design band-pass taps for the given edge frequencies.
///
/// # Arguments
/// * `low_hz` - Lower band edge in Hz
/// * `high_hz` - Upper band edge in Hz
/// * `sample_rate` - Sample rate in Hz
/// * `num_taps` - Filter length; used exactly as requested
///
/// # Errors
/// Returns `LeakError::InvalidInput` unless `0 < low_hz < high_hz < sample_rate / 2`
/// and `num_taps >= 1`. Validation runs before any coefficient math.
pub fn bandpass_taps(
    low_hz: f32,
    high_hz: f32,
    sample_rate: f32,
    num_taps: usize,
) -> Result<Vec<f64>> {
    if num_taps == 0 {
        return Err(LeakError::InvalidInput(
            "Filter length must be at least 1 tap".to_string(),
        ));
    }
    if !(sample_rate.is_finite() && sample_rate > 0.0) {
        return Err(LeakError::InvalidInput(format!(
            "Sample rate must be positive, got {}",
            sample_rate
        )));
    }
    let nyquist = sample_rate as f64 / 2.0;
    let low = low_hz as f64 / nyquist;
    let high = high_hz as f64 / nyquist;
    if !(low.is_finite() && high.is_finite()) || low <= 0.0 || high >= 1.0 || low >= high {
        return Err(LeakError::InvalidInput(format!(
            "Band edges must satisfy 0 < low < high < Nyquist: low={} Hz, high={} Hz, sample_rate={} Hz",
            low_hz, high_hz, sample_rate
        )));
    }

    let center = (num_taps - 1) as f64 / 2.0;
    let window = blackman_harris(num_taps);

    let mut taps: Vec<f64> = (0..num_taps)
        .map(|n| {
            let m = n as f64 - center;
            let ideal = high * sinc(high * m) - low * sinc(low * m);
            ideal * window[n]
        })
        .collect();

    // Rescale so the response at the passband center is exactly unity.
    let band_center = (low + high) / 2.0;
    let scale: f64 = taps
        .iter()
        .enumerate()
        .map(|(n, &h)| h * (PI * (n as f64 - center) * band_center).cos())
        .sum();
    if scale.abs() < GAIN_EPSILON {
        return Err(LeakError::InvalidInput(format!(
            "Band-pass design has no gain at its center frequency ({:.1} Hz)",
            band_center * nyquist
        )));
    }
    for h in &mut taps {
        *h /= scale;
    }

    Ok(taps)
}

/// Magnitude of the filter's frequency response at a single frequency.
///
/// Evaluates |H(e^jω)| = |Σ h[n]·e^(-jωn)| directly. Slow but exact;
/// intended for reporting and verification, not per-sample work.
pub fn response_magnitude(taps: &[f64], freq_hz: f64, sample_rate: f64) -> f64 {
    let omega = 2.0 * PI * freq_hz / sample_rate;
    let sum: Complex64 = taps
        .iter()
        .enumerate()
        .map(|(n, &h)| h * Complex64::new(0.0, -omega * n as f64).exp())
        .sum();
    sum.norm()
}
