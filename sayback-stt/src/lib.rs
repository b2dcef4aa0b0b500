//! Sayback speech-to-text adapter
//!
//! The recognizer itself is an opaque external program: this crate
//! spawns it on a finished WAV recording and reads the transcript from
//! its stdout. Model internals, sample handling, and decoding all live
//! on the far side of the process boundary.
//!
//! ## Quick Start
//!
//! ```no_run
//! use sayback_stt::{CommandRecognizer, SttEngine};
//!
//! let engine = SttEngine::Tiny(CommandRecognizer::new(
//!     "whisper-cli",
//!     Some("/opt/sayback/models/whisper-tiny".into()),
//! ));
//!
//! let result = engine.transcribe_file("attempt.wav".as_ref())?;
//! println!("Transcript: {}", result.text);
//! # Ok::<(), sayback_stt::SttError>(())
//! ```

pub mod audio;
pub mod engine;
pub mod error;

pub use audio::{validate_recording, WavInfo};
pub use engine::{CommandRecognizer, ModelTier, RecognitionResult, SttEngine};
pub use error::{Result, SttError};

/// Sample rate every recording is expected to carry.
pub const EXPECTED_SAMPLE_RATE: u32 = 16_000;
