//! Recording validation before recognition
//!
//! Catches broken captures (truncated files, wrong device settings,
//! button taps too short to contain speech) before paying for a
//! recognizer invocation.

use std::path::Path;

use tracing::debug;

use crate::error::{Result, SttError};
use crate::EXPECTED_SAMPLE_RATE;

/// Shape of a WAV recording as read from its header.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WavInfo {
    pub sample_rate: u32,
    pub channels: u16,
    pub duration_s: f64,
}

/// Read a WAV header and derive its duration.
pub fn inspect_wav(path: &Path) -> Result<WavInfo> {
    let reader = hound::WavReader::open(path)
        .map_err(|e| SttError::invalid_audio(format!("{}: {e}", path.display())))?;

    let spec = reader.spec();
    let frames = reader.duration(); // samples per channel
    let duration_s = f64::from(frames) / f64::from(spec.sample_rate);

    Ok(WavInfo {
        sample_rate: spec.sample_rate,
        channels: spec.channels,
        duration_s,
    })
}

/// Validate a finished recording for recognition.
///
/// Rejects unreadable or empty files, recordings shorter than
/// `min_duration_s`, and anything that is not 16 kHz mono, since that is the
/// contract every recognizer backend expects.
pub fn validate_recording(path: &Path, min_duration_s: f64) -> Result<WavInfo> {
    let info = inspect_wav(path)?;

    if info.duration_s == 0.0 {
        return Err(SttError::invalid_audio(format!(
            "{} contains no samples",
            path.display()
        )));
    }
    if info.duration_s < min_duration_s {
        return Err(SttError::invalid_audio(format!(
            "recording is {:.2}s, minimum is {:.1}s",
            info.duration_s, min_duration_s
        )));
    }
    if info.channels != 1 {
        return Err(SttError::invalid_audio(format!(
            "expected mono audio, got {} channels",
            info.channels
        )));
    }
    if info.sample_rate != EXPECTED_SAMPLE_RATE {
        return Err(SttError::invalid_audio(format!(
            "expected {EXPECTED_SAMPLE_RATE} Hz, got {} Hz",
            info.sample_rate
        )));
    }

    debug!(
        path = %path.display(),
        duration_s = info.duration_s,
        "recording validated"
    );
    Ok(info)
}
