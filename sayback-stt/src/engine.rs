//! Unified recognizer interface over external STT processes

use std::path::{Path, PathBuf};
use std::process::Command;
use std::time::Instant;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{Result, SttError};

/// Recognition result from an engine invocation.
#[derive(Debug, Clone)]
pub struct RecognitionResult {
    /// Transcribed text; empty means the recognizer heard no words,
    /// which is a valid (scoreable) outcome rather than an error.
    pub text: String,
    /// Wall-clock time spent inside the external process.
    pub processing_time_ms: f64,
}

/// Model tier requested in configuration.
///
/// Selection is a configuration decision, not runtime type inspection:
/// the daemon reads `stt_model` from its config file and constructs
/// the matching variant once at startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModelTier {
    /// Compact model, fast enough for CPU-only machines.
    Tiny,
    /// Larger model, better accuracy when the machine can afford it.
    Base,
}

impl std::fmt::Display for ModelTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ModelTier::Tiny => write!(f, "tiny"),
            ModelTier::Base => write!(f, "base"),
        }
    }
}

/// Recognizer backed by an external command-line program.
///
/// The program is expected to take a model directory (optional) and a
/// WAV path, and print the transcript to stdout. Everything past the
/// process boundary is opaque to Sayback.
#[derive(Debug, Clone)]
pub struct CommandRecognizer {
    program: PathBuf,
    model_path: Option<PathBuf>,
    extra_args: Vec<String>,
}

impl CommandRecognizer {
    pub fn new<P: Into<PathBuf>>(program: P, model_path: Option<PathBuf>) -> Self {
        Self {
            program: program.into(),
            model_path,
            extra_args: Vec::new(),
        }
    }

    /// Additional arguments inserted before the WAV path.
    pub fn with_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.extra_args = args.into_iter().map(Into::into).collect();
        self
    }

    pub fn program(&self) -> &Path {
        &self.program
    }

    /// Run the external recognizer on a finished recording.
    pub fn transcribe_file(&self, wav: &Path) -> Result<RecognitionResult> {
        let start = Instant::now();

        let mut command = Command::new(&self.program);
        if let Some(model) = &self.model_path {
            command.arg("--model").arg(model);
        }
        command.args(&self.extra_args);
        command.arg(wav);

        debug!(program = %self.program.display(), wav = %wav.display(), "invoking recognizer");

        let output = command.output().map_err(|e| {
            SttError::launch(format!("failed to run {}: {e}", self.program.display()))
        })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(SttError::recognition(format!(
                "{} exited with {}: {}",
                self.program.display(),
                output.status,
                stderr.trim()
            )));
        }

        let text = String::from_utf8(output.stdout)
            .map_err(|e| SttError::recognition(format!("transcript is not UTF-8: {e}")))?
            .trim()
            .to_string();

        let processing_time_ms = start.elapsed().as_secs_f64() * 1000.0;
        info!(
            processing_time_ms,
            transcript = %text,
            "recognition complete"
        );

        Ok(RecognitionResult {
            text,
            processing_time_ms,
        })
    }
}

/// Unified STT engine over the configured recognizer tiers.
pub enum SttEngine {
    Tiny(CommandRecognizer),
    Base(CommandRecognizer),
}

impl SttEngine {
    /// Build the engine for a configured tier.
    pub fn for_tier(tier: ModelTier, recognizer: CommandRecognizer) -> Self {
        match tier {
            ModelTier::Tiny => SttEngine::Tiny(recognizer),
            ModelTier::Base => SttEngine::Base(recognizer),
        }
    }

    /// Transcribe a finished recording.
    pub fn transcribe_file(&self, wav: &Path) -> Result<RecognitionResult> {
        let recognizer = match self {
            SttEngine::Tiny(r) | SttEngine::Base(r) => r,
        };
        recognizer.transcribe_file(wav)
    }

    /// Model name for logging and events.
    pub fn model_name(&self) -> &'static str {
        match self {
            SttEngine::Tiny(_) => "whisper-tiny",
            SttEngine::Base(_) => "whisper-base",
        }
    }

    pub fn tier(&self) -> ModelTier {
        match self {
            SttEngine::Tiny(_) => ModelTier::Tiny,
            SttEngine::Base(_) => ModelTier::Base,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tier_roundtrip_through_config_strings() {
        let tiny: ModelTier = serde_json::from_str("\"tiny\"").unwrap();
        assert_eq!(tiny, ModelTier::Tiny);
        let base: ModelTier = serde_json::from_str("\"base\"").unwrap();
        assert_eq!(base, ModelTier::Base);
        assert_eq!(tiny.to_string(), "tiny");
    }

    #[test]
    fn test_engine_metadata() {
        let recognizer = CommandRecognizer::new("whisper-cli", None);
        let engine = SttEngine::for_tier(ModelTier::Tiny, recognizer.clone());
        assert_eq!(engine.model_name(), "whisper-tiny");
        assert_eq!(engine.tier(), ModelTier::Tiny);

        let engine = SttEngine::for_tier(ModelTier::Base, recognizer);
        assert_eq!(engine.model_name(), "whisper-base");
    }

    #[test]
    fn test_missing_program_is_launch_error() {
        let recognizer = CommandRecognizer::new("/nonexistent/recognizer-binary", None);
        let err = recognizer
            .transcribe_file(Path::new("whatever.wav"))
            .unwrap_err();
        assert!(matches!(err, SttError::LaunchError(_)));
    }

    #[test]
    fn test_successful_transcription_via_echo() {
        // `echo` stands in for a recognizer: prints its last argument
        // (the wav path) and exits 0; trim drops the newline
        let recognizer = CommandRecognizer::new("echo", None);
        let result = recognizer.transcribe_file(Path::new("hello.wav")).unwrap();
        assert_eq!(result.text, "hello.wav");
        assert!(result.processing_time_ms >= 0.0);
    }

    #[test]
    fn test_failing_program_is_recognition_error() {
        let recognizer = CommandRecognizer::new("false", None);
        let err = recognizer
            .transcribe_file(Path::new("whatever.wav"))
            .unwrap_err();
        assert!(matches!(err, SttError::RecognitionError(_)));
    }
}
