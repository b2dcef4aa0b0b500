//! State machine for one practice attempt

use serde::{Deserialize, Serialize};
use tracing::debug;

use sayback_score::{score, ScoreResult};

/// Lifecycle state of a practice attempt.
///
/// `Scored` and `Errored` are terminal; a new attempt is a fresh
/// [`Attempt`] value starting from `Idle`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AttemptState {
    Idle,
    Recording,
    Transcribing,
    Scored,
    Errored,
}

impl std::fmt::Display for AttemptState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AttemptState::Idle => write!(f, "idle"),
            AttemptState::Recording => write!(f, "recording"),
            AttemptState::Transcribing => write!(f, "transcribing"),
            AttemptState::Scored => write!(f, "scored"),
            AttemptState::Errored => write!(f, "errored"),
        }
    }
}

/// Outcome of feeding an event into the state machine.
///
/// Out-of-order events (a stop while already transcribing, a second
/// start, anything after a terminal state) are ignored, never errors:
/// IPC noise and double-fired timers must not wedge an attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    Applied,
    Ignored,
}

impl Transition {
    pub fn applied(self) -> bool {
        self == Transition::Applied
    }
}

/// One practice attempt: a target sentence plus the state accumulated
/// while the user records, the recognizer runs, and the scorer fires.
#[derive(Debug, Clone)]
pub struct Attempt {
    sentence_id: i64,
    target: String,
    state: AttemptState,
    transcript: Option<String>,
    result: Option<ScoreResult>,
    error: Option<String>,
}

impl Attempt {
    /// New attempt in `Idle` for the given target sentence.
    pub fn new<S: Into<String>>(sentence_id: i64, target: S) -> Self {
        Self {
            sentence_id,
            target: target.into(),
            state: AttemptState::Idle,
            transcript: None,
            result: None,
            error: None,
        }
    }

    pub fn sentence_id(&self) -> i64 {
        self.sentence_id
    }

    pub fn target(&self) -> &str {
        &self.target
    }

    pub fn state(&self) -> AttemptState {
        self.state
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self.state, AttemptState::Scored | AttemptState::Errored)
    }

    /// Transcript, once the recognizer has produced one.
    pub fn transcript(&self) -> Option<&str> {
        self.transcript.as_deref()
    }

    /// Score, once the attempt reached `Scored`.
    pub fn result(&self) -> Option<&ScoreResult> {
        self.result.as_ref()
    }

    /// Failure reason, once the attempt reached `Errored`.
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// User start action: `Idle -> Recording`.
    pub fn start(&mut self) -> Transition {
        match self.state {
            AttemptState::Idle => self.advance(AttemptState::Recording),
            _ => self.ignore("start"),
        }
    }

    /// User stop action or max-duration timeout: `Recording ->
    /// Transcribing`. The captured audio is handed to the recognizer
    /// by the caller; the machine only tracks the phase.
    pub fn finish_recording(&mut self) -> Transition {
        match self.state {
            AttemptState::Recording => self.advance(AttemptState::Transcribing),
            _ => self.ignore("finish_recording"),
        }
    }

    /// Recognizer returned a transcript: `Transcribing -> Scored`.
    /// Invokes the scorer against the attempt's target and stores the
    /// result. An empty transcript is scoreable (accuracy 0).
    pub fn transcript_ready(&mut self, transcript: &str) -> Transition {
        match self.state {
            AttemptState::Transcribing => {
                self.result = Some(score(&self.target, transcript));
                self.transcript = Some(transcript.to_string());
                self.advance(AttemptState::Scored)
            }
            _ => self.ignore("transcript_ready"),
        }
    }

    /// Device or recognizer failure: `Recording | Transcribing ->
    /// Errored`.
    pub fn fail<S: Into<String>>(&mut self, reason: S) -> Transition {
        match self.state {
            AttemptState::Recording | AttemptState::Transcribing => {
                self.error = Some(reason.into());
                self.advance(AttemptState::Errored)
            }
            _ => self.ignore("fail"),
        }
    }

    fn advance(&mut self, next: AttemptState) -> Transition {
        debug!(sentence_id = self.sentence_id, from = %self.state, to = %next, "attempt transition");
        self.state = next;
        Transition::Applied
    }

    fn ignore(&self, event: &str) -> Transition {
        debug!(sentence_id = self.sentence_id, state = %self.state, event, "event ignored");
        Transition::Ignored
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sayback_score::FeedbackCategory;

    fn attempt() -> Attempt {
        Attempt::new(7, "the quick brown fox")
    }

    #[test]
    fn test_happy_path_to_scored() {
        let mut a = attempt();
        assert_eq!(a.state(), AttemptState::Idle);

        assert!(a.start().applied());
        assert_eq!(a.state(), AttemptState::Recording);

        assert!(a.finish_recording().applied());
        assert_eq!(a.state(), AttemptState::Transcribing);

        assert!(a.transcript_ready("the quick brown fox").applied());
        assert_eq!(a.state(), AttemptState::Scored);
        assert!(a.is_terminal());

        let result = a.result().unwrap();
        assert_eq!(result.accuracy, 100);
        assert_eq!(result.category, FeedbackCategory::Excellent);
        assert_eq!(a.transcript(), Some("the quick brown fox"));
    }

    #[test]
    fn test_stop_while_transcribing_is_noop() {
        let mut a = attempt();
        a.start();
        a.finish_recording();

        // Stop event arriving again while transcribing must not move
        // the machine
        assert_eq!(a.finish_recording(), Transition::Ignored);
        assert_eq!(a.state(), AttemptState::Transcribing);
    }

    #[test]
    fn test_no_transition_skipping() {
        let mut a = attempt();
        // Can't finish or score straight from Idle
        assert_eq!(a.finish_recording(), Transition::Ignored);
        assert_eq!(a.transcript_ready("anything"), Transition::Ignored);
        assert_eq!(a.state(), AttemptState::Idle);
        assert!(a.result().is_none());

        a.start();
        // Can't score straight from Recording
        assert_eq!(a.transcript_ready("anything"), Transition::Ignored);
        assert_eq!(a.state(), AttemptState::Recording);
    }

    #[test]
    fn test_double_start_is_noop() {
        let mut a = attempt();
        assert!(a.start().applied());
        assert_eq!(a.start(), Transition::Ignored);
        assert_eq!(a.state(), AttemptState::Recording);
    }

    #[test]
    fn test_failure_from_recording() {
        let mut a = attempt();
        a.start();
        assert!(a.fail("audio device unplugged").applied());
        assert_eq!(a.state(), AttemptState::Errored);
        assert!(a.is_terminal());
        assert_eq!(a.error(), Some("audio device unplugged"));
        assert!(a.result().is_none());
    }

    #[test]
    fn test_failure_from_transcribing() {
        let mut a = attempt();
        a.start();
        a.finish_recording();
        assert!(a.fail("recognizer timed out").applied());
        assert_eq!(a.state(), AttemptState::Errored);
    }

    #[test]
    fn test_fail_from_idle_or_terminal_is_noop() {
        let mut a = attempt();
        assert_eq!(a.fail("too early"), Transition::Ignored);
        assert_eq!(a.state(), AttemptState::Idle);

        a.start();
        a.finish_recording();
        a.transcript_ready("the quick brown fox");
        assert_eq!(a.fail("too late"), Transition::Ignored);
        assert_eq!(a.state(), AttemptState::Scored);
        assert!(a.error().is_none());
    }

    #[test]
    fn test_terminal_states_reject_everything() {
        let mut a = attempt();
        a.start();
        a.fail("device gone");

        assert_eq!(a.start(), Transition::Ignored);
        assert_eq!(a.finish_recording(), Transition::Ignored);
        assert_eq!(a.transcript_ready("text"), Transition::Ignored);
        assert_eq!(a.state(), AttemptState::Errored);
    }

    #[test]
    fn test_empty_transcript_scores_zero() {
        let mut a = Attempt::new(1, "hello world");
        a.start();
        a.finish_recording();
        assert!(a.transcript_ready("").applied());
        let result = a.result().unwrap();
        assert_eq!(result.accuracy, 0);
        assert_eq!(result.category, FeedbackCategory::NeedsImprovement);
    }

    #[test]
    fn test_state_display() {
        assert_eq!(AttemptState::Idle.to_string(), "idle");
        assert_eq!(AttemptState::Transcribing.to_string(), "transcribing");
        assert_eq!(AttemptState::Errored.to_string(), "errored");
    }
}
