use thiserror::Error;

#[derive(Error, Debug)]
pub enum MelodyError {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Invalid seed melody: expected {expected} steps, got {actual}")]
    InvalidSeed { expected: usize, actual: usize },

    #[error("Scoring error: {0}")]
    Scoring(String),

    #[error("Model error: {0}")]
    Model(String),

    #[error("MIDI error: {0}")]
    Midi(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serde error: {0}")]
    Serde(#[from] serde_json::Error),

    #[error("Config source error: {0}")]
    ConfigSource(#[from] config::ConfigError),

    #[error("MIDI parse error: {0}")]
    MidiParse(#[from] midly::Error),
}

pub type Result<T> = std::result::Result<T, MelodyError>;
