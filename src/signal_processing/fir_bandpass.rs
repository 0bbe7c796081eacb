use log::debug;

use crate::error::Result;
use crate::signal_processing::fir_core::FirCore;
use crate::signal_processing::fir_design::bandpass_taps;

/// Linear-phase FIR band-pass filter
///
/// Coefficients come from the windowed-sinc method under a Blackman-Harris
/// window, rescaled for unity gain at the center of the passband. Linear
/// phase delays every frequency component equally, so filtered waveforms
/// keep their shape for listening and charting.
pub struct FirBandpass {
    core: FirCore,
    low_hz: f32,
    high_hz: f32,
}

impl FirBandpass {
    /// Create a new FIR band-pass filter
    ///
    /// # Arguments
    /// * `low_hz` - Lower band edge in Hz
    /// * `high_hz` - Upper band edge in Hz
    /// * `sample_rate` - Audio sample rate in Hz
    /// * `num_taps` - Number of filter taps, used exactly as requested
    ///
    /// # Errors
    /// Returns `LeakError::InvalidInput` unless the band satisfies
    /// `0 < low < high < sample_rate / 2` and `num_taps >= 1`
    pub fn new(low_hz: f32, high_hz: f32, sample_rate: f32, num_taps: usize) -> Result<Self> {
        let taps = bandpass_taps(low_hz, high_hz, sample_rate, num_taps)?;
        debug!(
            "designed {}-tap band-pass {:.0}-{:.0} Hz at {:.0} Hz, group delay {} samples",
            num_taps,
            low_hz,
            high_hz,
            sample_rate,
            (num_taps - 1) / 2
        );
        Ok(Self {
            core: FirCore::new(taps),
            low_hz,
            high_hz,
        })
    }

    /// Process a single audio sample through the filter
    pub fn process(&mut self, sample: f32) -> f32 {
        self.core.process(sample)
    }

    /// Process an entire buffer of audio samples in-place
    pub fn process_buffer(&mut self, buffer: &mut [f32]) {
        self.core.process_buffer(buffer)
    }

    /// Filter a buffer from zero initial state, leaving the input untouched.
    ///
    /// The delay line is reset first, so repeated calls over the same input
    /// produce identical output.
    pub fn apply(&mut self, input: &[f32]) -> Vec<f32> {
        self.core.reset();
        let mut output = input.to_vec();
        self.core.process_buffer(&mut output);
        output
    }

    /// Band edges in Hz, as configured
    pub fn band(&self) -> (f32, f32) {
        (self.low_hz, self.high_hz)
    }

    /// Get the number of taps (filter length)
    pub fn num_taps(&self) -> usize {
        self.core.num_taps()
    }

    /// Get the group delay in samples (half the filter length for linear phase)
    pub fn group_delay_samples(&self) -> usize {
        self.core.group_delay_samples()
    }

    /// Tap coefficients, for reporting and response checks
    pub fn taps(&self) -> &[f64] {
        self.core.taps()
    }
}
