//! Error types for the announcement generator.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum GenerationError {
    #[error("TTS request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("TTS provider returned HTTP {status}: {detail}")]
    Provider { status: u16, detail: String },

    #[error("TTS provider returned an empty audio payload")]
    EmptyAudio,

    #[error("Failed to decode audio content: {0}")]
    Decode(#[from] base64::DecodeError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}
