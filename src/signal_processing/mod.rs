pub mod fir_bandpass;
pub mod fir_core;
pub mod fir_design;
pub mod level;
pub mod window;

pub use fir_bandpass::FirBandpass;
pub use fir_core::FirCore;
pub use fir_design::{bandpass_taps, response_magnitude};
pub use level::{normalize_peak, peak, sanitize};
