//! Error types for the sales assistant

use thiserror::Error;

/// Result type alias for assistant operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in the sales assistant
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration error
    #[error("configuration error: {0}")]
    Config(String),

    /// CSV parsing error
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    /// Record requested before any CSV was loaded
    #[error("no CSV context loaded")]
    MissingContext,

    /// Record requested while a turn is still in flight
    #[error("assistant is busy ({0})")]
    Busy(String),

    /// Speech-to-text error
    #[error("STT error: {0}")]
    Stt(String),

    /// Text-to-speech error
    #[error("TTS error: {0}")]
    Tts(String),

    /// The on-device model runtime is not reachable
    #[error("on-device model not available")]
    ModelUnavailable,

    /// Session creation or prompting failed
    #[error("{0}")]
    Inference(String),

    /// IO error
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// HTTP error
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    /// Serialization error
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// TOML parsing error
    #[error("toml error: {0}")]
    Toml(#[from] toml::de::Error),
}
