//! Error types for synthesis adapter operations

use thiserror::Error;

pub type Result<T> = std::result::Result<T, TtsError>;

#[derive(Error, Debug)]
pub enum TtsError {
    #[error("Unknown voice: {0}")]
    UnknownVoice(String),

    #[error("Synthesis error: {0}")]
    SynthesisError(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl TtsError {
    pub fn unknown_voice<S: Into<String>>(voice: S) -> Self {
        Self::UnknownVoice(voice.into())
    }

    pub fn synthesis<S: Into<String>>(msg: S) -> Self {
        Self::SynthesisError(msg.into())
    }
}
