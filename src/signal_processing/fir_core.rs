/// Direct-form FIR convolution state.
///
/// Holds the tap coefficients and a ring-buffer delay line. The delay line
/// starts zeroed, so the first `num_taps - 1` outputs include the filter's
/// startup transient.
pub struct FirCore {
    taps: Vec<f64>,
    state: Vec<f64>,
    write_idx: usize,
}

impl FirCore {
    /// Create a filter core over the given tap coefficients
    pub fn new(taps: Vec<f64>) -> Self {
        Self {
            state: vec![0.0; taps.len()],
            taps,
            write_idx: 0,
        }
    }

    /// Push one sample through the filter and return the filtered sample
    pub fn process(&mut self, sample: f32) -> f32 {
        let n = self.taps.len();
        self.state[self.write_idx] = f64::from(sample);

        // taps[0] pairs with the newest sample; walk the delay line backwards.
        let mut read_idx = self.write_idx;
        let mut acc = 0.0f64;
        for &tap in &self.taps {
            acc += tap * self.state[read_idx];
            read_idx = if read_idx == 0 { n - 1 } else { read_idx - 1 };
        }

        self.write_idx += 1;
        if self.write_idx == n {
            self.write_idx = 0;
        }
        acc as f32
    }

    /// Filter a whole buffer in place
    pub fn process_buffer(&mut self, buffer: &mut [f32]) {
        for sample in buffer.iter_mut() {
            *sample = self.process(*sample);
        }
    }

    /// Zero the delay line, as if no samples had been seen
    pub fn reset(&mut self) {
        self.state.fill(0.0);
        self.write_idx = 0;
    }

    /// Number of taps (filter length)
    pub fn num_taps(&self) -> usize {
        self.taps.len()
    }

    /// Group delay in samples (half the filter length for linear phase)
    pub fn group_delay_samples(&self) -> usize {
        (self.taps.len() - 1) / 2
    }

    /// Tap coefficients
    pub fn taps(&self) -> &[f64] {
        &self.taps
    }
}
