//! Session events broadcast to UI and signaling clients

use serde::{Deserialize, Serialize};

use sayback_score::FeedbackCategory;

/// Event types emitted over the feedback boundary as JSON lines.
///
/// Consumers map the category to their own presentation (screen
/// colors, an LED, a sound); the events carry only the enumeration.
#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(tag = "type")]
pub enum SessionEvent {
    /// A new attempt began for a target sentence.
    #[serde(rename = "attempt_start")]
    AttemptStart {
        sentence_id: i64,
        target: String,
        timestamp: f64,
    },

    /// The attempt state machine moved.
    #[serde(rename = "state_change")]
    StateChange { state: String, timestamp: f64 },

    /// The prompt for the current sentence finished playing.
    #[serde(rename = "prompt_played")]
    PromptPlayed { sentence_id: i64, voice: String },

    /// The attempt reached `Scored`.
    #[serde(rename = "attempt_scored")]
    AttemptScored {
        sentence_id: i64,
        transcript: String,
        accuracy: u8,
        category: FeedbackCategory,
        substitutions: usize,
        insertions: usize,
        deletions: usize,
    },

    /// The attempt reached `Errored`.
    #[serde(rename = "attempt_failed")]
    AttemptFailed { sentence_id: i64, reason: String },
}

impl SessionEvent {
    /// Convert event to a JSON string with trailing newline.
    pub fn to_json_line(&self) -> Result<String, serde_json::Error> {
        let json = serde_json::to_string(self)?;
        Ok(format!("{}\n", json))
    }
}
