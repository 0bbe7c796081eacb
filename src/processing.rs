//! Per-source pipeline: decode, band-pass filter, peak-normalize.

use std::fmt;
use std::path::{Path, PathBuf};

use log::info;
use rolling_stats::Stats;

use crate::config::{DownmixMode, FilterConfig, SourceEntry};
use crate::error::Result;
use crate::signal_processing::{FirBandpass, normalize_peak};
use crate::spectral;
use crate::wav::{self, AudioClip};

/// One source recording taken through the full pipeline, holding both the
/// decoded original and the filtered, normalized copy.
#[derive(Debug, Clone)]
pub struct ProcessedSource {
    pub name: String,
    pub original: AudioClip,
    pub filtered: Vec<f32>,
    pub band_low_hz: f32,
    pub band_high_hz: f32,
    pub num_taps: usize,
}

impl ProcessedSource {
    /// Loads a configured source from disk and runs the pipeline on it.
    pub fn load(entry: &SourceEntry, filter: &FilterConfig, downmix: DownmixMode) -> Result<Self> {
        let clip = wav::load_wav(&entry.path, downmix)?;
        Self::from_clip(
            &entry.name,
            clip,
            entry.band_low_hz,
            entry.band_high_hz,
            filter.num_taps,
        )
    }

    /// Runs the pipeline on an already decoded clip.
    ///
    /// # Errors
    /// `InvalidInput` when the clip's sample rate cannot carry the band,
    /// `DegenerateSignal` when the filtered signal has no energy left to
    /// normalize.
    pub fn from_clip(
        name: &str,
        clip: AudioClip,
        band_low_hz: f32,
        band_high_hz: f32,
        num_taps: usize,
    ) -> Result<Self> {
        let mut bandpass =
            FirBandpass::new(band_low_hz, band_high_hz, clip.sample_rate as f32, num_taps)?;
        let mut filtered = bandpass.apply(&clip.samples);
        let peak_before = normalize_peak(&mut filtered)?;
        info!(
            "{}: band {:.0}-{:.0} Hz, {} taps, peak before normalization {:.4}",
            name, band_low_hz, band_high_hz, num_taps, peak_before
        );

        Ok(Self {
            name: name.to_string(),
            original: clip,
            filtered,
            band_low_hz,
            band_high_hz,
            num_taps,
        })
    }

    pub fn sample_rate(&self) -> u32 {
        self.original.sample_rate
    }

    pub fn duration_secs(&self) -> f32 {
        self.original.duration_secs()
    }
}

/// Destination for the filtered copy of `source`: the same directory,
/// file stem suffixed with `_filtered.wav`.
pub fn filtered_wav_path(source: &Path) -> PathBuf {
    let stem = source
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| "output".to_string());
    source.with_file_name(format!("{}_filtered.wav", stem))
}

/// Measurements printed after filtered playback.
#[derive(Debug, Clone)]
pub struct AudioSummary {
    pub duration_secs: f32,
    pub sample_rate: u32,
    pub dominant_frequency_hz: f32,
    pub std_dev: f32,
}

impl AudioSummary {
    /// Measures a buffer: duration, Welch dominant frequency, and the
    /// sample standard deviation.
    pub fn measure(samples: &[f32], sample_rate: u32, psd_segment_len: usize) -> Result<Self> {
        let psd = spectral::welch_psd(samples, sample_rate, psd_segment_len)?;

        let mut stats: Stats<f32> = Stats::new();
        for &s in samples {
            stats.update(s);
        }

        Ok(Self {
            duration_secs: samples.len() as f32 / sample_rate as f32,
            sample_rate,
            dominant_frequency_hz: psd.dominant_frequency(),
            std_dev: stats.std_dev,
        })
    }
}

impl fmt::Display for AudioSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "  Duration:           {:.2} s", self.duration_secs)?;
        writeln!(f, "  Sample rate:        {} Hz", self.sample_rate)?;
        writeln!(
            f,
            "  Dominant frequency: {:.1} Hz",
            self.dominant_frequency_hz
        )?;
        write!(f, "  Std dev:            {:.4}", self.std_dev)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::LeakError;

    fn tone(freq: f32, sample_rate: f32, len: usize) -> Vec<f32> {
        (0..len)
            .map(|i| (2.0 * std::f32::consts::PI * freq * i as f32 / sample_rate).sin())
            .collect()
    }

    #[test]
    fn test_pipeline_normalizes_in_band_tone() {
        let clip = AudioClip {
            samples: tone(1000.0, 44100.0, 44100),
            sample_rate: 44100,
        };
        let processed = ProcessedSource::from_clip("leak_site_1", clip, 600.0, 2200.0, 201)
            .expect("pipeline should succeed");

        let peak = processed
            .filtered
            .iter()
            .fold(0.0_f32, |acc, &s| acc.max(s.abs()));
        assert!(
            (peak - 1.0).abs() < 1e-6,
            "filtered output should be peak-normalized, got {}",
            peak
        );
        assert_eq!(
            processed.filtered.len(),
            processed.original.samples.len(),
            "filtering should preserve length"
        );
        assert_eq!(processed.sample_rate(), 44100);
    }

    #[test]
    fn test_silent_clip_is_degenerate() {
        let clip = AudioClip {
            samples: vec![0.0; 8192],
            sample_rate: 44100,
        };
        let err = ProcessedSource::from_clip("silent", clip, 600.0, 2200.0, 201).unwrap_err();
        assert!(
            matches!(err, LeakError::DegenerateSignal(_)),
            "expected DegenerateSignal, got {:?}",
            err
        );
    }

    #[test]
    fn test_band_above_nyquist_is_rejected() {
        let clip = AudioClip {
            samples: tone(1000.0, 8000.0, 8000),
            sample_rate: 8000,
        };
        let err = ProcessedSource::from_clip("narrow", clip, 600.0, 6000.0, 201).unwrap_err();
        assert!(
            matches!(err, LeakError::InvalidInput(_)),
            "expected InvalidInput for a band above Nyquist, got {:?}",
            err
        );
    }

    #[test]
    fn test_summary_reports_dominant_tone() {
        let samples = tone(1000.0, 44100.0, 44100);
        let summary = AudioSummary::measure(&samples, 44100, 1024).expect("summary should succeed");

        assert!(
            (summary.dominant_frequency_hz - 1000.0).abs() < 50.0,
            "dominant frequency should be near 1 kHz, got {}",
            summary.dominant_frequency_hz
        );
        assert!((summary.duration_secs - 1.0).abs() < 1e-3);
        assert_eq!(summary.sample_rate, 44100);
        // A unit sine has standard deviation 1/sqrt(2).
        assert!(
            (summary.std_dev - std::f32::consts::FRAC_1_SQRT_2).abs() < 0.01,
            "std dev of a unit sine should be ~0.707, got {}",
            summary.std_dev
        );
    }

    #[test]
    fn test_filtered_wav_path_keeps_directory() {
        let path = filtered_wav_path(Path::new("recordings/leak_site_1.wav"));
        assert_eq!(path, PathBuf::from("recordings/leak_site_1_filtered.wav"));
    }
}
