//! Configuration management

use std::collections::HashMap;
use std::path::PathBuf;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use sayback_stt::ModelTier;
use sayback_tts::VoiceConfig;

/// Daemon configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SaybackConfig {
    /// Path to configuration file
    #[serde(skip)]
    pub config_path: PathBuf,

    /// Unix socket path for IPC
    pub socket_path: String,

    /// Directory holding recordings and the prompt cache
    pub data_dir: PathBuf,

    /// History key for attempt records
    pub user: String,

    /// External capture command writing a 16 kHz mono WAV (arecord-style)
    pub capture_program: String,

    /// Capture device name (None = default device)
    pub capture_device: Option<String>,

    /// Recordings shorter than this are rejected before recognition
    pub min_recording_secs: f64,

    /// Hard stop for a recording; also passed to the capture command
    pub max_recording_secs: u64,

    /// External recognizer command (transcript on stdout)
    pub stt_program: String,

    /// Recognizer tier selection: "tiny" or "base"
    pub stt_model: ModelTier,

    /// Path to the tiny model directory
    pub stt_tiny_model_path: String,

    /// Path to the base model directory
    pub stt_base_model_path: String,

    /// External synthesizer command (Piper-style)
    pub tts_program: String,

    /// Voice used when none is named
    pub tts_default_voice: String,

    /// External playback command for prompt WAVs
    pub player_program: String,

    /// Sentence library JSON; the builtin catalog backs a missing file
    pub library_path: PathBuf,

    /// Installed voices, keyed by name (kept last: TOML tables follow
    /// plain values)
    pub tts_voices: HashMap<String, VoiceConfig>,
}

impl Default for SaybackConfig {
    fn default() -> Self {
        let mut tts_voices = HashMap::new();
        tts_voices.insert(
            "female".to_string(),
            VoiceConfig {
                label: "Woman".to_string(),
                model: PathBuf::from("/opt/sayback/models/piper/en_US-amy-low.onnx"),
                config: Some(PathBuf::from(
                    "/opt/sayback/models/piper/en_US-amy-low.onnx.json",
                )),
            },
        );
        tts_voices.insert(
            "male".to_string(),
            VoiceConfig {
                label: "Man".to_string(),
                model: PathBuf::from("/opt/sayback/models/piper/en_US-hfc_male-medium.onnx"),
                config: Some(PathBuf::from(
                    "/opt/sayback/models/piper/en_US-hfc_male-medium.onnx.json",
                )),
            },
        );

        Self {
            config_path: Self::default_config_path(),
            socket_path: "/tmp/sayback.sock".to_string(),
            data_dir: dirs::data_local_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join("sayback"),
            user: "guest".to_string(),
            capture_program: "arecord".to_string(),
            capture_device: None,
            min_recording_secs: 1.0,
            max_recording_secs: 30,
            stt_program: "whisper-cli".to_string(),
            stt_model: ModelTier::Tiny,
            stt_tiny_model_path: "/opt/sayback/models/whisper-tiny".to_string(),
            stt_base_model_path: "/opt/sayback/models/whisper-base".to_string(),
            tts_program: "piper".to_string(),
            tts_default_voice: "female".to_string(),
            tts_voices,
            player_program: "aplay".to_string(),
            library_path: PathBuf::from("/opt/sayback/sentence_library.json"),
        }
    }
}

impl SaybackConfig {
    /// Load configuration from the default path, or create it
    pub fn load() -> Result<Self> {
        Self::load_from(Self::default_config_path())
    }

    /// Load configuration from a specific file, or create default
    pub fn load_from(config_path: PathBuf) -> Result<Self> {
        if config_path.exists() {
            let contents = std::fs::read_to_string(&config_path)
                .context("Failed to read config file")?;

            let mut config: SaybackConfig = toml::from_str(&contents)
                .context("Failed to parse config file")?;

            config.config_path = config_path;
            Ok(config)
        } else {
            let config = Self {
                config_path,
                ..Self::default()
            };
            config.save().context("Failed to save default config")?;
            Ok(config)
        }
    }

    /// Save configuration to file
    pub fn save(&self) -> Result<()> {
        if let Some(parent) = self.config_path.parent() {
            std::fs::create_dir_all(parent)
                .context("Failed to create config directory")?;
        }

        let contents = toml::to_string_pretty(self)
            .context("Failed to serialize config")?;

        std::fs::write(&self.config_path, contents)
            .context("Failed to write config file")?;

        Ok(())
    }

    /// Model path matching the configured recognizer tier
    pub fn stt_model_path(&self) -> &str {
        match self.stt_model {
            ModelTier::Tiny => &self.stt_tiny_model_path,
            ModelTier::Base => &self.stt_base_model_path,
        }
    }

    /// Directory new recordings are written to
    pub fn recordings_dir(&self) -> PathBuf {
        self.data_dir.join("recordings")
    }

    /// Directory cached prompt WAVs live in
    pub fn tts_cache_dir(&self) -> PathBuf {
        self.data_dir.join("tts_cache")
    }

    /// Get default config path
    fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("sayback")
            .join("config.toml")
    }
}
