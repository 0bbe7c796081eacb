use log::warn;
use realfft::RealFftPlanner;

use crate::error::{LeakError, Result};
use crate::signal_processing::window::hann;

/// Welch power spectral density estimate
#[derive(Debug, Clone)]
pub struct WelchPsd {
    /// Bin center frequencies in Hz
    pub frequencies: Vec<f32>,
    /// One-sided power spectral density per bin, units²/Hz
    pub power: Vec<f32>,
}

impl WelchPsd {
    /// Index of the strongest bin
    pub fn dominant_bin(&self) -> usize {
        let mut best = 0;
        for (i, &p) in self.power.iter().enumerate() {
            if p > self.power[best] {
                best = i;
            }
        }
        best
    }

    /// Frequency of the strongest bin in Hz
    pub fn dominant_frequency(&self) -> f32 {
        self.frequencies[self.dominant_bin()]
    }
}

/// Estimate the power spectral density by Welch's method.
///
/// Hann-windowed segments with 50% overlap, per-segment mean removal, and
/// density scaling `2|X|² / (fs · Σw²)` with no doubling at DC or Nyquist.
/// Segment periodograms are averaged arithmetically. If the buffer is
/// shorter than `segment_len`, the segment shrinks to the buffer with a
/// warning so short clips still produce an estimate.
///
/// # Errors
/// Returns `LeakError::InvalidInput` for an empty buffer or a zero
/// segment length.
pub fn welch_psd(samples: &[f32], sample_rate: u32, segment_len: usize) -> Result<WelchPsd> {
    if samples.is_empty() {
        return Err(LeakError::InvalidInput(
            "Cannot estimate a PSD over an empty buffer".to_string(),
        ));
    }
    if segment_len == 0 {
        return Err(LeakError::InvalidInput(
            "PSD segment length must be at least 1".to_string(),
        ));
    }

    let segment_len = if segment_len > samples.len() {
        warn!(
            "PSD segment length {} exceeds buffer length {}; shrinking to the buffer",
            segment_len,
            samples.len()
        );
        samples.len()
    } else {
        segment_len
    };
    let step = segment_len - segment_len / 2;

    let window = hann(segment_len);
    let window_power: f64 = window.iter().map(|w| w * w).sum();
    let scale = 1.0 / (sample_rate as f64 * window_power);

    let mut planner = RealFftPlanner::<f32>::new();
    let r2c = planner.plan_fft_forward(segment_len);
    let mut input = r2c.make_input_vec();
    let mut output = r2c.make_output_vec();

    let num_bins = segment_len / 2 + 1;
    let mut accumulated = vec![0.0f64; num_bins];
    let mut segments = 0usize;

    let mut start = 0;
    while start + segment_len <= samples.len() {
        let segment = &samples[start..start + segment_len];

        let mean = segment.iter().sum::<f32>() / segment_len as f32;
        for (dst, (&x, &w)) in input.iter_mut().zip(segment.iter().zip(window.iter())) {
            *dst = (x - mean) * w as f32;
        }

        r2c.process(&mut input, &mut output)
            .map_err(|e| LeakError::InvalidInput(format!("FFT failed: {}", e)))?;

        for (acc, c) in accumulated.iter_mut().zip(output.iter()) {
            *acc += f64::from(c.norm_sqr()) * scale;
        }

        segments += 1;
        start += step;
    }

    // Double everything except DC, and except Nyquist when present
    // (even segment lengths put Nyquist in the last bin).
    let last_doubled = if segment_len.is_multiple_of(2) {
        num_bins.saturating_sub(1)
    } else {
        num_bins
    };
    for p in accumulated[1..last_doubled].iter_mut() {
        *p *= 2.0;
    }

    let bin_hz = sample_rate as f32 / segment_len as f32;
    let frequencies = (0..num_bins).map(|k| k as f32 * bin_hz).collect();
    let power = accumulated
        .iter()
        .map(|&p| (p / segments as f64) as f32)
        .collect();

    Ok(WelchPsd { frequencies, power })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::PI;

    fn tone(freq: f32, sample_rate: f32, len: usize) -> Vec<f32> {
        (0..len)
            .map(|i| (2.0 * PI * freq * i as f32 / sample_rate).sin())
            .collect()
    }

    #[test]
    fn test_psd_dominant_frequency_of_pure_tone() {
        let samples = tone(1000.0, 44100.0, 44100);
        let psd = welch_psd(&samples, 44100, 1024).unwrap();

        assert_eq!(psd.power.len(), 513);
        let bin_hz = 44100.0 / 1024.0;
        assert!(
            (psd.dominant_frequency() - 1000.0).abs() <= bin_hz,
            "Dominant {} Hz should sit within one bin of 1000 Hz",
            psd.dominant_frequency()
        );
    }

    #[test]
    fn test_psd_stronger_tone_wins() {
        let sample_rate = 44100.0;
        let quiet = tone(3000.0, sample_rate, 44100);
        let samples: Vec<f32> = tone(500.0, sample_rate, 44100)
            .iter()
            .zip(quiet.iter())
            .map(|(a, b)| a + 0.2 * b)
            .collect();

        let psd = welch_psd(&samples, 44100, 1024).unwrap();
        assert!((psd.dominant_frequency() - 500.0).abs() < 50.0);
    }

    #[test]
    fn test_psd_shrinks_oversized_segment() {
        let samples = tone(1000.0, 8000.0, 512);
        let psd = welch_psd(&samples, 8000, 1024).unwrap();
        // Segment shrank to 512, so bins span 512 / 2 + 1.
        assert_eq!(psd.power.len(), 257);
        assert!((psd.dominant_frequency() - 1000.0).abs() <= 8000.0 / 512.0);
    }

    #[test]
    fn test_psd_rejects_bad_input() {
        assert!(welch_psd(&[], 44100, 1024).is_err());
        assert!(welch_psd(&[0.5; 64], 44100, 0).is_err());
    }

    #[test]
    fn test_psd_constant_signal_has_no_dominant_tone() {
        // Per-segment mean removal leaves nothing behind for DC input.
        let samples = vec![0.8f32; 4096];
        let psd = welch_psd(&samples, 8000, 1024).unwrap();
        let total: f32 = psd.power.iter().sum();
        assert!(total < 1e-6, "Detrended DC should be near-silent: {}", total);
    }
}
