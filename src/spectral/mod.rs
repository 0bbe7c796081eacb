pub mod psd;
pub mod spectrogram;
pub mod spectrum;

pub use psd::{WelchPsd, welch_psd};
pub use spectrogram::{Spectrogram, spectrogram};
pub use spectrum::{Spectrum, magnitude_spectrum};
