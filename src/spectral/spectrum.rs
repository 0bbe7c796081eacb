use realfft::RealFftPlanner;

use crate::error::{LeakError, Result};

/// Single-sided magnitude spectrum of a whole buffer
#[derive(Debug, Clone)]
pub struct Spectrum {
    /// Bin center frequencies in Hz
    pub frequencies: Vec<f32>,
    /// Magnitude |X[k]| per bin, unnormalized
    pub magnitudes: Vec<f32>,
}

impl Spectrum {
    /// Number of frequency bins
    pub fn len(&self) -> usize {
        self.magnitudes.len()
    }

    /// True when the buffer was too short to produce any bins
    pub fn is_empty(&self) -> bool {
        self.magnitudes.is_empty()
    }
}

/// Compute the magnitude spectrum over the entire buffer.
///
/// One FFT across all samples, keeping the `n / 2` bins below Nyquist
/// (DC included, Nyquist excluded). Bin `k` sits at `k * sample_rate / n` Hz.
/// Arbitrary buffer lengths are accepted; odd lengths simply get odd-sized
/// transforms.
///
/// # Errors
/// Returns `LeakError::InvalidInput` for an empty buffer.
pub fn magnitude_spectrum(samples: &[f32], sample_rate: u32) -> Result<Spectrum> {
    if samples.is_empty() {
        return Err(LeakError::InvalidInput(
            "Cannot compute a spectrum over an empty buffer".to_string(),
        ));
    }

    let n = samples.len();
    let mut planner = RealFftPlanner::<f32>::new();
    let r2c = planner.plan_fft_forward(n);

    // realfft consumes its input buffer as scratch space.
    let mut input = samples.to_vec();
    let mut output = r2c.make_output_vec();
    r2c.process(&mut input, &mut output)
        .map_err(|e| LeakError::InvalidInput(format!("FFT failed: {}", e)))?;

    let keep = n / 2;
    let bin_hz = sample_rate as f32 / n as f32;
    let frequencies = (0..keep).map(|k| k as f32 * bin_hz).collect();
    let magnitudes = output.iter().take(keep).map(|c| c.norm()).collect();

    Ok(Spectrum {
        frequencies,
        magnitudes,
    })
}
