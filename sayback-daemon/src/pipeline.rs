//! Prompt → capture → recognize → score pipeline integration

use std::process::{Command, Stdio};
use std::sync::Arc;

use anyhow::{anyhow, Context, Result};
use chrono::Utc;
use tokio::sync::{mpsc, RwLock};
use tracing::{info, warn};
use uuid::Uuid;

use sayback_session::{
    Attempt, AttemptRecord, HistoryStore, Sentence, SentenceLibrary, SessionEvent,
};
use sayback_stt::{validate_recording, SttEngine};
use sayback_tts::Synthesizer;

use crate::config::SaybackConfig;
use crate::recorder::{start_capture, CaptureHandle};

fn now_ts() -> f64 {
    Utc::now().timestamp_millis() as f64 / 1000.0
}

/// Pipeline state for practice attempts.
///
/// The current sentence and attempt are explicit fields here: one
/// context object owns them, and a fresh [`Attempt`] replaces the old
/// one when the next attempt starts.
pub struct PracticePipeline {
    config: SaybackConfig,
    engine: SttEngine,
    synthesizer: Synthesizer,
    library: SentenceLibrary,
    history: Arc<dyn HistoryStore>,

    /// Session event channel sender
    events: mpsc::UnboundedSender<SessionEvent>,

    current_sentence: Option<Sentence>,
    attempt: Option<Attempt>,
    capture: Option<CaptureHandle>,
}

impl PracticePipeline {
    /// Create a new pipeline.
    /// Returns (Pipeline, session_event_receiver)
    pub fn new(
        config: SaybackConfig,
        engine: SttEngine,
        synthesizer: Synthesizer,
        library: SentenceLibrary,
        history: Arc<dyn HistoryStore>,
    ) -> (Self, mpsc::UnboundedReceiver<SessionEvent>) {
        let (events, rx) = mpsc::unbounded_channel();

        let pipeline = Self {
            config,
            engine,
            synthesizer,
            library,
            history,
            events,
            current_sentence: None,
            attempt: None,
            capture: None,
        };

        (pipeline, rx)
    }

    fn emit(&self, event: SessionEvent) {
        // Receiver dropping just means nobody is listening
        let _ = self.events.send(event);
    }

    fn attempt_active(&self) -> bool {
        self.attempt.as_ref().is_some_and(|a| !a.is_terminal())
    }

    /// Select a sentence by catalog id.
    pub fn select_sentence(&mut self, id: i64) -> Result<String> {
        if self.attempt_active() {
            return Err(anyhow!("attempt in progress, stop it first"));
        }
        let sentence = self
            .library
            .get(id)
            .cloned()
            .ok_or_else(|| anyhow!("unknown sentence id {id}"))?;

        let response = format!("Sentence {}: {}", sentence.id, sentence.text);
        self.current_sentence = Some(sentence);
        Ok(response)
    }

    /// Advance to the next sentence in catalog order.
    pub fn next_sentence(&mut self) -> Result<String> {
        if self.attempt_active() {
            return Err(anyhow!("attempt in progress, stop it first"));
        }
        let sentence = self
            .library
            .next()
            .cloned()
            .ok_or_else(|| anyhow!("sentence library is empty"))?;

        let response = format!("Sentence {}: {}", sentence.id, sentence.text);
        self.current_sentence = Some(sentence);
        Ok(response)
    }

    /// Synthesize and play the prompt for the current sentence.
    pub fn play_prompt(&mut self, voice: Option<&str>) -> Result<String> {
        let sentence = self
            .current_sentence
            .as_ref()
            .ok_or_else(|| anyhow!("no sentence selected"))?;

        let wav = self.synthesizer.synthesize(&sentence.text, voice)?;

        // Playback is fire-and-forget through the configured player
        Command::new(&self.config.player_program)
            .arg(&wav)
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .with_context(|| {
                format!("failed to start player {}", self.config.player_program)
            })?;

        let voice = voice.unwrap_or(self.synthesizer.default_voice()).to_string();
        self.emit(SessionEvent::PromptPlayed {
            sentence_id: sentence.id,
            voice,
        });
        Ok("Playing prompt".to_string())
    }

    /// Begin a new attempt for the current sentence.
    pub fn start_attempt(&mut self) -> Result<String> {
        if self.attempt_active() {
            // Out-of-order start is a no-op, not an error
            return Ok("Attempt already in progress".to_string());
        }
        let sentence = self
            .current_sentence
            .as_ref()
            .ok_or_else(|| anyhow!("no sentence selected"))?
            .clone();

        let mut attempt = Attempt::new(sentence.id, &sentence.text);
        attempt.start();

        self.emit(SessionEvent::AttemptStart {
            sentence_id: sentence.id,
            target: sentence.text.clone(),
            timestamp: now_ts(),
        });
        self.emit(SessionEvent::StateChange {
            state: attempt.state().to_string(),
            timestamp: now_ts(),
        });

        let recordings_dir = self.config.recordings_dir();
        std::fs::create_dir_all(&recordings_dir)
            .context("failed to create recordings directory")?;
        let wav_path = recordings_dir.join(format!("{}.wav", Uuid::new_v4()));

        match start_capture(
            &self.config.capture_program,
            self.config.capture_device.as_deref(),
            self.config.max_recording_secs,
            wav_path,
        ) {
            Ok(handle) => {
                self.capture = Some(handle);
                self.attempt = Some(attempt);
                info!(sentence_id = sentence.id, "recording started");
                Ok("Recording started".to_string())
            }
            Err(e) => {
                attempt.fail(e.to_string());
                self.emit(SessionEvent::AttemptFailed {
                    sentence_id: sentence.id,
                    reason: e.to_string(),
                });
                self.emit(SessionEvent::StateChange {
                    state: attempt.state().to_string(),
                    timestamp: now_ts(),
                });
                self.attempt = Some(attempt);
                Err(e)
            }
        }
    }

    /// Stop the capture and run the recording through recognition and
    /// scoring. Also invoked by the timeout watchdog.
    pub fn stop_attempt(&mut self) -> Result<String> {
        let Some(attempt) = self.attempt.as_mut() else {
            return Ok("No attempt in progress".to_string());
        };

        if !attempt.finish_recording().applied() {
            // Stop while not recording (double stop, stop during
            // transcription) leaves the machine untouched
            return Ok(format!("Ignored stop in state {}", attempt.state()));
        }

        let sentence_id = attempt.sentence_id();
        let events = self.events.clone();
        let emit = |event: SessionEvent| {
            let _ = events.send(event);
        };
        emit(SessionEvent::StateChange {
            state: attempt.state().to_string(),
            timestamp: now_ts(),
        });

        let Some(capture) = self.capture.take() else {
            attempt.fail("capture handle missing");
            emit(SessionEvent::AttemptFailed {
                sentence_id,
                reason: "capture handle missing".to_string(),
            });
            return Err(anyhow!("capture handle missing"));
        };
        let (wav_path, duration_s) = capture.stop();

        if let Err(e) = validate_recording(&wav_path, self.config.min_recording_secs) {
            attempt.fail(e.to_string());
            emit(SessionEvent::AttemptFailed {
                sentence_id,
                reason: e.to_string(),
            });
            emit(SessionEvent::StateChange {
                state: attempt.state().to_string(),
                timestamp: now_ts(),
            });
            warn!(error = %e, "recording rejected");
            return Err(e.into());
        }

        let recognition = match self.engine.transcribe_file(&wav_path) {
            Ok(recognition) => recognition,
            Err(e) => {
                attempt.fail(e.to_string());
                emit(SessionEvent::AttemptFailed {
                    sentence_id,
                    reason: e.to_string(),
                });
                emit(SessionEvent::StateChange {
                    state: attempt.state().to_string(),
                    timestamp: now_ts(),
                });
                warn!(error = %e, "recognition failed");
                return Err(e.into());
            }
        };

        attempt.transcript_ready(&recognition.text);
        let Some(result) = attempt.result().cloned() else {
            return Err(anyhow!("attempt reached no score"));
        };

        info!(
            "Score: {}% ({}) | target: '{}' | heard: '{}'",
            result.accuracy,
            result.category,
            attempt.target(),
            recognition.text,
        );

        emit(SessionEvent::AttemptScored {
            sentence_id,
            transcript: recognition.text.clone(),
            accuracy: result.accuracy,
            category: result.category,
            substitutions: result.alignment.substitutions,
            insertions: result.alignment.insertions,
            deletions: result.alignment.deletions,
        });
        emit(SessionEvent::StateChange {
            state: attempt.state().to_string(),
            timestamp: now_ts(),
        });

        if let Some(record) = AttemptRecord::from_scored(attempt, &self.config.user, duration_s) {
            self.history
                .save(record)
                .context("failed to save attempt record")?;
        }

        Ok(format!("{}% - {}", result.accuracy, result.category.label()))
    }

    /// Current attempt state name for the `status` command.
    pub fn status(&self) -> String {
        match &self.attempt {
            Some(attempt) => attempt.state().to_string(),
            None => "idle".to_string(),
        }
    }

    /// Stop the attempt when the capture has hit the configured
    /// maximum duration. Called periodically by the watchdog task.
    pub fn check_timeout(&mut self) -> Option<Result<String>> {
        let overrun = self
            .capture
            .as_ref()
            .is_some_and(|c| c.elapsed_secs() >= self.config.max_recording_secs as f64);
        if overrun {
            info!("max recording duration reached, stopping attempt");
            Some(self.stop_attempt())
        } else {
            None
        }
    }

    /// Aggregate stats for the configured user.
    pub fn user_stats(&self) -> Result<String> {
        let stats = self.history.stats(&self.config.user)?;
        Ok(format!(
            "{} attempts | avg {}% | excellent {} / good {} / needs improvement {}",
            stats.total_attempts,
            stats.average_accuracy,
            stats.excellent,
            stats.good,
            stats.needs_improvement
        ))
    }

    /// Latest attempts for the configured user, newest first.
    pub fn recent_history(&self, limit: usize) -> Result<String> {
        let records = self.history.recent(&self.config.user, limit)?;
        if records.is_empty() {
            return Ok("No attempts yet".to_string());
        }
        let lines: Vec<String> = records
            .iter()
            .map(|r| {
                format!(
                    "{} | {:>3}% {} | {}",
                    r.recorded_at.format("%Y-%m-%d %H:%M"),
                    r.accuracy,
                    r.category,
                    r.target_text,
                )
            })
            .collect();
        Ok(lines.join("\n"))
    }

    pub fn history(&self) -> &Arc<dyn HistoryStore> {
        &self.history
    }
}

/// Shared daemon state behind the IPC surface.
pub struct Daemon {
    pipeline: RwLock<PracticePipeline>,
}

impl Daemon {
    pub fn new(pipeline: PracticePipeline) -> Self {
        Self {
            pipeline: RwLock::new(pipeline),
        }
    }

    pub async fn select_sentence(&self, id: i64) -> Result<String> {
        self.pipeline.write().await.select_sentence(id)
    }

    pub async fn next_sentence(&self) -> Result<String> {
        self.pipeline.write().await.next_sentence()
    }

    pub async fn play_prompt(&self, voice: Option<&str>) -> Result<String> {
        self.pipeline.write().await.play_prompt(voice)
    }

    pub async fn start_attempt(&self) -> Result<String> {
        self.pipeline.write().await.start_attempt()
    }

    pub async fn stop_attempt(&self) -> Result<String> {
        self.pipeline.write().await.stop_attempt()
    }

    pub async fn status(&self) -> String {
        self.pipeline.read().await.status()
    }

    pub async fn user_stats(&self) -> Result<String> {
        self.pipeline.read().await.user_stats()
    }

    pub async fn recent_history(&self, limit: usize) -> Result<String> {
        self.pipeline.read().await.recent_history(limit)
    }

    pub async fn enforce_timeout(&self) -> Option<Result<String>> {
        self.pipeline.write().await.check_timeout()
    }
}
