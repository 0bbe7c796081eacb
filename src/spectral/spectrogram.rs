use log::warn;
use realfft::RealFftPlanner;

use crate::constants::POWER_EPSILON;
use crate::error::{LeakError, Result};
use crate::signal_processing::window::hann;

/// Short-time power spectrum, one row of dB values per frame
#[derive(Debug, Clone)]
pub struct Spectrogram {
    /// Bin center frequencies in Hz
    pub frequencies: Vec<f32>,
    /// Frame center times in seconds
    pub times: Vec<f32>,
    /// Power in dB, indexed `[frame][bin]`
    pub power_db: Vec<Vec<f32>>,
}

impl Spectrogram {
    /// Number of frames
    pub fn num_frames(&self) -> usize {
        self.power_db.len()
    }

    /// Lowest and highest dB values across all frames, for colormap scaling
    pub fn db_range(&self) -> (f32, f32) {
        let mut lo = f32::INFINITY;
        let mut hi = f32::NEG_INFINITY;
        for row in &self.power_db {
            for &v in row {
                lo = lo.min(v);
                hi = hi.max(v);
            }
        }
        (lo, hi)
    }
}

/// Compute a Hann-windowed short-time power spectrum.
///
/// Frames advance by `window_len - overlap` samples; only full frames are
/// taken. Power is `10·log10(|X|²)` with a floor that keeps silent bins
/// finite. A buffer shorter than the window shrinks the window with a
/// warning, like the PSD estimator does.
///
/// # Errors
/// Returns `LeakError::InvalidInput` for an empty buffer, a zero-length
/// window, or `overlap >= window_len`.
pub fn spectrogram(
    samples: &[f32],
    sample_rate: u32,
    window_len: usize,
    overlap: usize,
) -> Result<Spectrogram> {
    if samples.is_empty() {
        return Err(LeakError::InvalidInput(
            "Cannot compute a spectrogram over an empty buffer".to_string(),
        ));
    }
    if window_len == 0 {
        return Err(LeakError::InvalidInput(
            "Spectrogram window length must be at least 1".to_string(),
        ));
    }
    if overlap >= window_len {
        return Err(LeakError::InvalidInput(format!(
            "Spectrogram overlap {} must be smaller than the window length {}",
            overlap, window_len
        )));
    }

    let (window_len, overlap) = if window_len > samples.len() {
        warn!(
            "Spectrogram window {} exceeds buffer length {}; shrinking to the buffer",
            window_len,
            samples.len()
        );
        let shrunk = samples.len();
        (shrunk, overlap.min(shrunk - 1))
    } else {
        (window_len, overlap)
    };
    let step = window_len - overlap;

    let window = hann(window_len);
    let mut planner = RealFftPlanner::<f32>::new();
    let r2c = planner.plan_fft_forward(window_len);
    let mut input = r2c.make_input_vec();
    let mut output = r2c.make_output_vec();

    let num_bins = window_len / 2 + 1;
    let mut power_db = Vec::new();
    let mut times = Vec::new();

    let mut start = 0;
    while start + window_len <= samples.len() {
        for (dst, (&x, &w)) in input
            .iter_mut()
            .zip(samples[start..start + window_len].iter().zip(window.iter()))
        {
            *dst = x * w as f32;
        }

        r2c.process(&mut input, &mut output)
            .map_err(|e| LeakError::InvalidInput(format!("FFT failed: {}", e)))?;

        let row: Vec<f32> = output
            .iter()
            .map(|c| 10.0 * c.norm_sqr().max(POWER_EPSILON).log10())
            .collect();
        power_db.push(row);
        times.push((start + window_len / 2) as f32 / sample_rate as f32);

        start += step;
    }

    let bin_hz = sample_rate as f32 / window_len as f32;
    let frequencies = (0..num_bins).map(|k| k as f32 * bin_hz).collect();

    Ok(Spectrogram {
        frequencies,
        times,
        power_db,
    })
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
    fn test_spectrogram_frame_layout() {
        let samples = tone(1000.0, 44100.0, 44100);
        let gram = spectrogram(&samples, 44100, 2048, 1024).unwrap();

        // (44100 - 2048) / 1024 full steps, plus the initial frame.
        assert_eq!(gram.num_frames(), 42);
        assert_eq!(gram.frequencies.len(), 1025);
        assert_eq!(gram.times.len(), 42);
        assert!(gram.times[0] < gram.times[41]);
    }

    #[test]
    fn test_spectrogram_tracks_tone() {
        let samples = tone(1000.0, 44100.0, 44100);
        let gram = spectrogram(&samples, 44100, 2048, 1024).unwrap();

        for row in &gram.power_db {
            let peak_bin = row
                .iter()
                .enumerate()
                .max_by(|(_, a), (_, b)| a.total_cmp(b))
                .map(|(i, _)| i)
                .unwrap();
            let peak_hz = gram.frequencies[peak_bin];
            assert!(
                (peak_hz - 1000.0).abs() < 44100.0 / 2048.0 * 1.5,
                "Every frame should peak near 1 kHz, got {} Hz",
                peak_hz
            );
        }
    }

    #[test]
    fn test_spectrogram_rejects_bad_params() {
        let samples = tone(1000.0, 8000.0, 4096);
        assert!(spectrogram(&[], 8000, 2048, 1024).is_err());
        assert!(spectrogram(&samples, 8000, 0, 0).is_err());
        assert!(spectrogram(&samples, 8000, 1024, 1024).is_err());
        assert!(spectrogram(&samples, 8000, 1024, 2048).is_err());
    }

    #[test]
    fn test_spectrogram_short_buffer_shrinks_window() {
        let samples = tone(400.0, 8000.0, 1000);
        let gram = spectrogram(&samples, 8000, 2048, 1024).unwrap();
        assert_eq!(gram.num_frames(), 1);
        assert_eq!(gram.frequencies.len(), 501);
    }

    #[test]
    fn test_db_range_is_ordered() {
        let samples = tone(1000.0, 44100.0, 8192);
        let gram = spectrogram(&samples, 44100, 2048, 1024).unwrap();
        let (lo, hi) = gram.db_range();
        assert!(lo < hi);
        assert!(lo.is_finite() && hi.is_finite());
    }
}
