//! Configuration for the leakscope analysis pipeline.
//!
//! ## Source registry
//!
//! Each `[[sources]]` entry names a recording and the acoustic band where
//! its leak signature is expected:
//!
//! ```toml
//! [[sources]]
//! name = "leak_site_1"
//! path = "recordings/leak_site_1.wav"
//! band_low_hz = 700.0
//! band_high_hz = 1500.0
//! ```
//!
//! Omitted sections keep their defaults, so a config file only needs the
//! values it changes.

use std::path::PathBuf;

use serde::Deserialize;

use crate::error::{LeakError, Result};

/// How multi-channel recordings are reduced to mono at load time
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum DownmixMode {
    /// Keep channel 0 and discard the rest (logged as a warning)
    #[default]
    FirstChannel,
    /// Average all channels per frame
    Average,
}

/// One recording with its expected leak band
#[derive(Debug, Clone, Deserialize)]
pub struct SourceEntry {
    /// Display name shown in the source menu
    pub name: String,
    /// Path to the WAV recording
    pub path: PathBuf,
    /// Lower edge of the leak band in Hz
    pub band_low_hz: f32,
    /// Upper edge of the leak band in Hz
    pub band_high_hz: f32,
}

/// Band-pass filter parameters shared by all sources
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct FilterConfig {
    /// Number of FIR taps, used exactly as given
    pub num_taps: usize,
}

/// Spectral analysis parameters
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Welch PSD segment length in samples
    pub psd_segment_len: usize,
    /// Spectrogram window length in samples
    pub spectrogram_window: usize,
    /// Spectrogram overlap in samples
    pub spectrogram_overlap: usize,
    /// Upper bound of the spectrum chart's frequency axis in Hz
    pub spectrum_view_max_hz: f32,
}

/// Top-level configuration
///
/// # Example
/// ```
/// use leakscope::config::AppConfig;
///
/// let config = AppConfig::default();
/// assert_eq!(config.filter.num_taps, 201);
/// assert_eq!(config.sources.len(), 2);
/// ```
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Filter parameters
    pub filter: FilterConfig,
    /// Spectral analysis parameters
    pub analysis: AnalysisConfig,
    /// Multi-channel reduction mode
    pub downmix: DownmixMode,
    /// Recordings offered by the source menu
    pub sources: Vec<SourceEntry>,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self { num_taps: 201 }
    }
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            psd_segment_len: 1024,
            spectrogram_window: 2048,
            spectrogram_overlap: 1024,
            spectrum_view_max_hz: 5100.0,
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            filter: FilterConfig::default(),
            analysis: AnalysisConfig::default(),
            downmix: DownmixMode::default(),
            sources: vec![
                SourceEntry {
                    name: "leak_site_1".to_string(),
                    path: PathBuf::from("recordings/leak_site_1.wav"),
                    band_low_hz: 700.0,
                    band_high_hz: 1500.0,
                },
                SourceEntry {
                    name: "leak_site_3".to_string(),
                    path: PathBuf::from("recordings/leak_site_3.wav"),
                    band_low_hz: 600.0,
                    band_high_hz: 2200.0,
                },
            ],
        }
    }
}

impl AppConfig {
    /// Parse and validate a TOML configuration document
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let config: AppConfig = toml::from_str(text)
            .map_err(|e| LeakError::Config(format!("Bad configuration: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Check the invariants that hold regardless of any loaded recording.
    ///
    /// Band edges are only checked for ordering here; the check against a
    /// recording's Nyquist frequency happens when its filter is built.
    pub fn validate(&self) -> Result<()> {
        if self.filter.num_taps == 0 {
            return Err(LeakError::Config(
                "filter.num_taps must be at least 1".to_string(),
            ));
        }
        if self.analysis.psd_segment_len == 0 {
            return Err(LeakError::Config(
                "analysis.psd_segment_len must be at least 1".to_string(),
            ));
        }
        if self.analysis.spectrogram_window == 0 {
            return Err(LeakError::Config(
                "analysis.spectrogram_window must be at least 1".to_string(),
            ));
        }
        if self.analysis.spectrogram_overlap >= self.analysis.spectrogram_window {
            return Err(LeakError::Config(format!(
                "analysis.spectrogram_overlap ({}) must be smaller than the window ({})",
                self.analysis.spectrogram_overlap, self.analysis.spectrogram_window
            )));
        }
        if !(self.analysis.spectrum_view_max_hz > 0.0) {
            return Err(LeakError::Config(
                "analysis.spectrum_view_max_hz must be positive".to_string(),
            ));
        }
        for source in &self.sources {
            if !(source.band_low_hz > 0.0 && source.band_low_hz < source.band_high_hz) {
                return Err(LeakError::Config(format!(
                    "Source '{}': band {}..{} Hz must be positive and ascending",
                    source.name, source.band_low_hz, source.band_high_hz
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(AppConfig::default().validate().is_ok());
    }

    #[test]
    fn test_empty_toml_yields_defaults() {
        let config = AppConfig::from_toml_str("").unwrap();
        assert_eq!(config.filter.num_taps, 201);
        assert_eq!(config.analysis.psd_segment_len, 1024);
        assert_eq!(config.downmix, DownmixMode::FirstChannel);
        assert_eq!(config.sources.len(), 2);
        assert_eq!(config.sources[1].name, "leak_site_3");
    }

    #[test]
    fn test_partial_toml_overrides_one_field() {
        let config = AppConfig::from_toml_str("[filter]\nnum_taps = 65\n").unwrap();
        assert_eq!(config.filter.num_taps, 65);
        assert_eq!(config.analysis.spectrogram_window, 2048);
    }

    #[test]
    fn test_source_table_replaces_defaults() {
        let text = r#"
downmix = "average"

[[sources]]
name = "test_rig"
path = "rig.wav"
band_low_hz = 100.0
band_high_hz = 400.0
"#;
        let config = AppConfig::from_toml_str(text).unwrap();
        assert_eq!(config.downmix, DownmixMode::Average);
        assert_eq!(config.sources.len(), 1);
        assert_eq!(config.sources[0].name, "test_rig");
        assert_eq!(config.sources[0].band_high_hz, 400.0);
    }

    #[test]
    fn test_rejects_zero_taps() {
        let err = AppConfig::from_toml_str("[filter]\nnum_taps = 0\n");
        assert!(matches!(err, Err(LeakError::Config(_))));
    }

    #[test]
    fn test_rejects_inverted_band() {
        let text = r#"
[[sources]]
name = "bad"
path = "bad.wav"
band_low_hz = 1500.0
band_high_hz = 700.0
"#;
        assert!(AppConfig::from_toml_str(text).is_err());
    }

    #[test]
    fn test_rejects_overlap_not_smaller_than_window() {
        let text = "[analysis]\nspectrogram_window = 1024\nspectrogram_overlap = 1024\n";
        assert!(AppConfig::from_toml_str(text).is_err());
    }

    #[test]
    fn test_rejects_unparseable_toml() {
        assert!(matches!(
            AppConfig::from_toml_str("filter = nonsense"),
            Err(LeakError::Config(_))
        ));
    }
}
