pub mod audio;
pub mod charts;
pub mod config;
pub mod constants;
pub mod error;
pub mod menu;
pub mod processing;
pub mod signal_processing;
pub mod spectral;
pub mod wav;

#[cfg(feature = "simulation")]
pub mod simulation;

pub use config::AppConfig;
pub use error::{LeakError, Result};
pub use wav::{load_wav, save_wav};
