//! Deterministic test-signal synthesis, compiled with the `simulation`
//! feature. Used by the WAV generator binary and the integration tests.

mod noise;
mod signal;

pub use noise::{add_white_noise, signal_power, white_noise};
pub use signal::{Tone, mixed_tones, sine};
