//! Numeric constants for signal processing stability
//!
//! These constants define thresholds and epsilon values used throughout
//! the analysis pipeline to ensure numerical stability.

/// Peak magnitude below which a buffer is treated as silent.
/// Normalizing such a buffer would amplify numerical residue to full scale,
/// so the pipeline reports a degenerate signal instead.
pub const SILENCE_PEAK_THRESHOLD: f32 = 1e-12;

/// Floor applied inside `10 * log10(power)` conversions.
/// Keeps spectrogram and PSD dB values finite for zero-power bins.
pub const POWER_EPSILON: f32 = 1e-12;

/// Minimum acceptable passband-center gain when scaling filter taps.
/// A design whose response at the band center falls below this cannot be
/// normalized to unity gain and is rejected.
pub const GAIN_EPSILON: f64 = 1e-12;
