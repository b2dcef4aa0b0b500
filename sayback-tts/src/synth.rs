//! Prompt synthesis through an external Piper-style process

use std::collections::HashMap;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tracing::{debug, info};

use crate::error::{Result, TtsError};

/// One installed voice: a model file plus its optional config.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VoiceConfig {
    /// Label shown in voice pickers ("Woman", "Man", ...).
    pub label: String,
    pub model: PathBuf,
    #[serde(default)]
    pub config: Option<PathBuf>,
}

/// Synthesizer over an external TTS binary with a voice table and a
/// content-addressed WAV cache.
pub struct Synthesizer {
    program: PathBuf,
    voices: HashMap<String, VoiceConfig>,
    default_voice: String,
    cache_dir: PathBuf,
}

impl Synthesizer {
    pub fn new<P: Into<PathBuf>>(
        program: P,
        voices: HashMap<String, VoiceConfig>,
        default_voice: String,
        cache_dir: PathBuf,
    ) -> Self {
        Self {
            program: program.into(),
            voices,
            default_voice,
            cache_dir,
        }
    }

    /// Voice keys and labels, sorted by key for stable display.
    pub fn voices(&self) -> Vec<(&str, &str)> {
        let mut entries: Vec<(&str, &str)> = self
            .voices
            .iter()
            .map(|(key, cfg)| (key.as_str(), cfg.label.as_str()))
            .collect();
        entries.sort();
        entries
    }

    pub fn default_voice(&self) -> &str {
        &self.default_voice
    }

    /// Path a given prompt would be cached at.
    pub fn cache_path(&self, voice: &str, text: &str) -> PathBuf {
        self.cache_dir.join(format!("{}.wav", cache_key(voice, text)))
    }

    /// Synthesize `text` with the named voice (default voice when
    /// `None`), returning the path of the resulting WAV.
    ///
    /// A cache hit skips the subprocess entirely; prompts are static
    /// catalog sentences, so the hit rate is high after the first
    /// session.
    pub fn synthesize(&self, text: &str, voice: Option<&str>) -> Result<PathBuf> {
        let key = voice.unwrap_or(&self.default_voice);
        let voice_cfg = self
            .voices
            .get(key)
            .ok_or_else(|| TtsError::unknown_voice(key))?;

        let out_path = self.cache_path(key, text);
        if out_path.exists() {
            debug!(voice = key, path = %out_path.display(), "prompt cache hit");
            return Ok(out_path);
        }

        std::fs::create_dir_all(&self.cache_dir)?;

        let mut command = Command::new(&self.program);
        command.arg("--model").arg(&voice_cfg.model);
        if let Some(config) = &voice_cfg.config {
            command.arg("--config").arg(config);
        }
        command
            .arg("--output_file")
            .arg(&out_path)
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::piped());

        let mut child = command.spawn().map_err(|e| {
            TtsError::synthesis(format!("failed to run {}: {e}", self.program.display()))
        })?;

        // Piper reads the sentence from stdin
        child
            .stdin
            .take()
            .ok_or_else(|| TtsError::synthesis("synthesizer stdin unavailable"))?
            .write_all(text.as_bytes())?;

        let output = child.wait_with_output()?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            // A failed run must not leave a half-written cache entry
            let _ = std::fs::remove_file(&out_path);
            return Err(TtsError::synthesis(format!(
                "{} exited with {}: {}",
                self.program.display(),
                output.status,
                stderr.trim()
            )));
        }

        info!(voice = key, path = %out_path.display(), "prompt synthesized");
        Ok(out_path)
    }
}

/// Stable cache key for a (voice, text) pair.
fn cache_key(voice: &str, text: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(voice.as_bytes());
    hasher.update([0u8]);
    hasher.update(text.as_bytes());
    let digest = format!("{:x}", hasher.finalize());
    digest[..16].to_string()
}
