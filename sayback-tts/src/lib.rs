//! Sayback text-to-speech adapter
//!
//! Produces the audible prompt the user repeats. Synthesis itself is
//! an opaque external program (a Piper-style binary reading text on
//! stdin and writing a WAV); this crate owns voice selection and a
//! disk cache so repeated prompts never re-run the synthesizer.
//!
//! The prompt is never part of scoring; the scoring core only ever
//! sees the target text and the recognizer's transcript.

pub mod error;
pub mod synth;

pub use error::{Result, TtsError};
pub use synth::{Synthesizer, VoiceConfig};
