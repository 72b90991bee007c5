//! Error types for Mote

use thiserror::Error;

/// The main error type for Mote operations
#[derive(Debug, Error)]
pub enum MoteError {
    #[error("Emitter {emitter} is missing its {field} template")]
    MissingTemplate { emitter: usize, field: &'static str },

    #[error("Emitter not found: {0}")]
    EmitterNotFound(usize),

    #[error("Invalid color: {0}")]
    InvalidColor(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Value out of range: {field} must be between {min} and {max}, got {value}")]
    ValueOutOfRange {
        field: String,
        min: f64,
        max: f64,
        value: f64,
    },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    TomlParseError(String),
}

/// Result type alias for Mote operations
pub type Result<T> = std::result::Result<T, MoteError>;

impl From<toml::de::Error> for MoteError {
    fn from(err: toml::de::Error) -> Self {
        MoteError::TomlParseError(err.to_string())
    }
}
