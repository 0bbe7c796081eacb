//! Diagnostic chart data and the rendering seam.
//!
//! Chart series are assembled here as plain point vectors so they can be
//! built and tested without a display. The egui viewer lives in `viewer`
//! behind the `gui` feature; builds without it still expose
//! [`ChartRenderer`] and report a configuration error when asked to draw.

use crate::config::AnalysisConfig;
use crate::constants::POWER_EPSILON;
use crate::error::{LeakError, Result};
use crate::spectral::{self, Spectrogram, Spectrum, WelchPsd};

#[cfg(feature = "gui")]
pub mod viewer;

/// Maximum min/max buckets per waveform trace.
const WAVEFORM_MAX_BUCKETS: usize = 4096;

/// Point series for every chart of one processed source.
#[derive(Debug, Clone)]
pub struct ChartData {
    pub source_name: String,
    pub sample_rate: u32,
    /// Time-domain envelope points `[seconds, amplitude]`.
    pub waveform_original: Vec<[f64; 2]>,
    pub waveform_filtered: Vec<[f64; 2]>,
    /// Magnitude spectrum points `[Hz, magnitude]`, clamped to the view bound.
    pub spectrum_original: Vec<[f64; 2]>,
    pub spectrum_filtered: Vec<[f64; 2]>,
    /// Welch PSD points `[Hz, dB]`.
    pub psd_original: Vec<[f64; 2]>,
    pub psd_filtered: Vec<[f64; 2]>,
    pub spectrogram_original: Spectrogram,
    pub spectrogram_filtered: Spectrogram,
}

impl ChartData {
    /// Assembles every chart series for one source.
    ///
    /// `original` and `filtered` must share `sample_rate`. Spectral
    /// parameters come from `analysis`; the spectrum x-axis stops at
    /// `analysis.spectrum_view_max_hz`.
    pub fn build(
        source_name: &str,
        original: &[f32],
        filtered: &[f32],
        sample_rate: u32,
        analysis: &AnalysisConfig,
    ) -> Result<Self> {
        let spectrum_original = spectral::magnitude_spectrum(original, sample_rate)?;
        let spectrum_filtered = spectral::magnitude_spectrum(filtered, sample_rate)?;
        let psd_original = spectral::welch_psd(original, sample_rate, analysis.psd_segment_len)?;
        let psd_filtered = spectral::welch_psd(filtered, sample_rate, analysis.psd_segment_len)?;
        let spectrogram_original = spectral::spectrogram(
            original,
            sample_rate,
            analysis.spectrogram_window,
            analysis.spectrogram_overlap,
        )?;
        let spectrogram_filtered = spectral::spectrogram(
            filtered,
            sample_rate,
            analysis.spectrogram_window,
            analysis.spectrogram_overlap,
        )?;

        Ok(Self {
            source_name: source_name.to_string(),
            sample_rate,
            waveform_original: decimate_waveform(original, sample_rate, WAVEFORM_MAX_BUCKETS),
            waveform_filtered: decimate_waveform(filtered, sample_rate, WAVEFORM_MAX_BUCKETS),
            spectrum_original: spectrum_series(&spectrum_original, analysis.spectrum_view_max_hz),
            spectrum_filtered: spectrum_series(&spectrum_filtered, analysis.spectrum_view_max_hz),
            psd_original: psd_db_series(&psd_original),
            psd_filtered: psd_db_series(&psd_filtered),
            spectrogram_original,
            spectrogram_filtered,
        })
    }
}

/// Capability seam between the menu loop and whatever can draw charts.
pub trait ChartRenderer {
    /// Presents the charts and blocks until the viewer is dismissed.
    fn render(&mut self, data: &ChartData) -> Result<()>;
}

/// Stand-in for builds without the `gui` feature.
#[derive(Debug, Default, Clone, Copy)]
pub struct UnavailableRenderer;

impl ChartRenderer for UnavailableRenderer {
    fn render(&mut self, _data: &ChartData) -> Result<()> {
        Err(LeakError::Config(
            "chart rendering requires the `gui` feature; rebuild with `--features gui`".to_string(),
        ))
    }
}

/// Renderer matching the build: the egui viewer when `gui` is enabled.
#[cfg(feature = "gui")]
pub fn default_renderer() -> Box<dyn ChartRenderer> {
    Box::new(viewer::ChartViewer::default())
}

/// Renderer matching the build: reports the missing `gui` feature.
#[cfg(not(feature = "gui"))]
pub fn default_renderer() -> Box<dyn ChartRenderer> {
    Box::new(UnavailableRenderer)
}

/// Reduces a long waveform to a min/max envelope with at most
/// `max_buckets` buckets, two points per bucket. Short buffers pass
/// through one point per sample. Inputs are sanitized upstream, so
/// non-finite samples are not handled here.
fn decimate_waveform(samples: &[f32], sample_rate: u32, max_buckets: usize) -> Vec<[f64; 2]> {
    let dt = 1.0 / sample_rate as f64;
    if samples.len() <= 2 * max_buckets {
        return samples
            .iter()
            .enumerate()
            .map(|(i, &s)| [i as f64 * dt, s as f64])
            .collect();
    }

    let bucket = samples.len().div_ceil(max_buckets);
    let mut points = Vec::with_capacity(2 * max_buckets);
    for (b, chunk) in samples.chunks(bucket).enumerate() {
        let start = b * bucket;
        let mut min_idx = 0;
        let mut max_idx = 0;
        for (i, &s) in chunk.iter().enumerate() {
            if s < chunk[min_idx] {
                min_idx = i;
            }
            if s > chunk[max_idx] {
                max_idx = i;
            }
        }
        let (first, second) = if min_idx <= max_idx {
            (min_idx, max_idx)
        } else {
            (max_idx, min_idx)
        };
        points.push([(start + first) as f64 * dt, chunk[first] as f64]);
        if second != first {
            points.push([(start + second) as f64 * dt, chunk[second] as f64]);
        }
    }
    points
}

/// Spectrum bins up to `max_hz`, as plot points.
fn spectrum_series(spectrum: &Spectrum, max_hz: f32) -> Vec<[f64; 2]> {
    spectrum
        .frequencies
        .iter()
        .zip(&spectrum.magnitudes)
        .take_while(|(f, _)| **f <= max_hz)
        .map(|(f, m)| [*f as f64, *m as f64])
        .collect()
}

/// PSD bins as log-power plot points, floored at `POWER_EPSILON`.
fn psd_db_series(psd: &WelchPsd) -> Vec<[f64; 2]> {
    psd.frequencies
        .iter()
        .zip(&psd.power)
        .map(|(f, p)| [*f as f64, 10.0 * (p.max(POWER_EPSILON) as f64).log10()])
        .collect()
}
