use crate::constants::SILENCE_PEAK_THRESHOLD;
use crate::error::{LeakError, Result};

/// Replace non-finite samples with silence, returning how many were replaced
pub fn sanitize(samples: &mut [f32]) -> usize {
    let mut replaced = 0;
    for sample in samples.iter_mut() {
        if !sample.is_finite() {
            *sample = 0.0;
            replaced += 1;
        }
    }
    replaced
}

/// Largest absolute sample value
pub fn peak(samples: &[f32]) -> f32 {
    samples.iter().fold(0.0f32, |acc, &x| acc.max(x.abs()))
}

/// Scale the buffer so its peak magnitude is exactly 1.0.
///
/// Returns the peak found before scaling. A buffer whose peak falls below
/// the silence threshold is rejected rather than amplified to full scale.
pub fn normalize_peak(samples: &mut [f32]) -> Result<f32> {
    let p = peak(samples);
    if p <= SILENCE_PEAK_THRESHOLD {
        return Err(LeakError::DegenerateSignal(format!(
            "Peak {:e} is below the silence threshold, nothing to normalize",
            p
        )));
    }
    for sample in samples.iter_mut() {
        *sample /= p;
    }
    Ok(p)
}
