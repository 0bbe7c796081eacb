use thiserror::Error;

#[derive(Error, Debug)]
pub enum LeakError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("WAV file error: {0}")]
    File(#[from] hound::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Audio device error: {0}")]
    AudioDevice(String),

    #[error("Audio stream error: {0}")]
    AudioStream(String),

    #[error("Degenerate signal: {0}")]
    DegenerateSignal(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, LeakError>;
