//! Error types for recognizer adapter operations

use thiserror::Error;

pub type Result<T> = std::result::Result<T, SttError>;

#[derive(Error, Debug)]
pub enum SttError {
    #[error("Recognizer launch error: {0}")]
    LaunchError(String),

    #[error("Recognition error: {0}")]
    RecognitionError(String),

    #[error("Invalid audio: {0}")]
    InvalidAudio(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl SttError {
    pub fn launch<S: Into<String>>(msg: S) -> Self {
        Self::LaunchError(msg.into())
    }

    pub fn recognition<S: Into<String>>(msg: S) -> Self {
        Self::RecognitionError(msg.into())
    }

    pub fn invalid_audio<S: Into<String>>(msg: S) -> Self {
        Self::InvalidAudio(msg.into())
    }
}
