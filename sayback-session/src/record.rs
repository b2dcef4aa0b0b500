//! Attempt records and the persistence boundary

use std::sync::Mutex;

use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use sayback_score::{Alignment, FeedbackCategory};

use crate::attempt::Attempt;

/// The value handed across the persistence boundary after a scored
/// attempt: score plus metadata, keyed by user and timestamp. The
/// store behind the boundary defines its own schema; this shape is
/// the whole contract.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttemptRecord {
    pub user: String,
    pub sentence_id: i64,
    pub target_text: String,
    pub transcript: String,
    pub accuracy: u8,
    pub wer: f64,
    pub category: FeedbackCategory,
    pub alignment: Alignment,
    /// Length of the captured recording.
    pub duration_s: f64,
    pub recorded_at: DateTime<Utc>,
}

impl AttemptRecord {
    /// Build a record from a scored attempt. Returns `None` unless the
    /// attempt actually reached `Scored`.
    pub fn from_scored(attempt: &Attempt, user: &str, duration_s: f64) -> Option<Self> {
        let result = attempt.result()?;
        Some(Self {
            user: user.to_string(),
            sentence_id: attempt.sentence_id(),
            target_text: attempt.target().to_string(),
            transcript: attempt.transcript().unwrap_or_default().to_string(),
            accuracy: result.accuracy,
            wer: result.wer,
            category: result.category,
            alignment: result.alignment,
            duration_s,
            recorded_at: Utc::now(),
        })
    }
}

/// Aggregate statistics for one user's history.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct UserStats {
    pub total_attempts: usize,
    /// Mean accuracy, rounded to the nearest percent.
    pub average_accuracy: u32,
    pub excellent: usize,
    pub good: usize,
    pub needs_improvement: usize,
}

/// Persistence boundary for scored attempts.
///
/// Implementations live outside the core (the daemon ships an
/// in-memory one; a real deployment plugs in whatever store it has).
pub trait HistoryStore: Send + Sync {
    fn save(&self, record: AttemptRecord) -> Result<()>;

    /// Most recent records for a user, newest first.
    fn recent(&self, user: &str, limit: usize) -> Result<Vec<AttemptRecord>>;

    fn stats(&self, user: &str) -> Result<UserStats>;
}

/// In-memory history, good for a single daemon run and for tests.
#[derive(Default)]
pub struct MemoryHistory {
    records: Mutex<Vec<AttemptRecord>>,
}

impl MemoryHistory {
    pub fn new() -> Self {
        Self::default()
    }
}

impl HistoryStore for MemoryHistory {
    fn save(&self, record: AttemptRecord) -> Result<()> {
        self.records.lock().unwrap().push(record);
        Ok(())
    }

    fn recent(&self, user: &str, limit: usize) -> Result<Vec<AttemptRecord>> {
        let records = self.records.lock().unwrap();
        Ok(records
            .iter()
            .rev()
            .filter(|r| r.user == user)
            .take(limit)
            .cloned()
            .collect())
    }

    fn stats(&self, user: &str) -> Result<UserStats> {
        let records = self.records.lock().unwrap();
        let mut stats = UserStats::default();
        let mut accuracy_sum: u64 = 0;

        for record in records.iter().filter(|r| r.user == user) {
            stats.total_attempts += 1;
            accuracy_sum += u64::from(record.accuracy);
            match record.category {
                FeedbackCategory::Excellent => stats.excellent += 1,
                FeedbackCategory::Good => stats.good += 1,
                FeedbackCategory::NeedsImprovement => stats.needs_improvement += 1,
            }
        }

        if stats.total_attempts > 0 {
            stats.average_accuracy =
                (accuracy_sum as f64 / stats.total_attempts as f64).round() as u32;
        }
        Ok(stats)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scored_attempt(target: &str, transcript: &str) -> Attempt {
        let mut a = Attempt::new(3, target);
        a.start();
        a.finish_recording();
        a.transcript_ready(transcript);
        a
    }

    fn record(user: &str, target: &str, transcript: &str) -> AttemptRecord {
        AttemptRecord::from_scored(&scored_attempt(target, transcript), user, 2.5).unwrap()
    }

    #[test]
    fn test_record_from_scored_attempt() {
        let r = record("alice", "the quick brown fox", "the quick brown");
        assert_eq!(r.user, "alice");
        assert_eq!(r.sentence_id, 3);
        assert_eq!(r.accuracy, 75);
        assert_eq!(r.category, FeedbackCategory::Excellent);
        assert_eq!(r.transcript, "the quick brown");
        assert_eq!(r.alignment.deletions, 1);
    }

    #[test]
    fn test_record_requires_scored_state() {
        let mut a = Attempt::new(1, "hello world");
        assert!(AttemptRecord::from_scored(&a, "alice", 1.0).is_none());
        a.start();
        a.fail("device gone");
        assert!(AttemptRecord::from_scored(&a, "alice", 1.0).is_none());
    }

    #[test]
    fn test_recent_is_newest_first_and_per_user() {
        let history = MemoryHistory::new();
        history.save(record("alice", "one two", "one two")).unwrap();
        history.save(record("bob", "one two", "")).unwrap();
        history.save(record("alice", "three four", "three")).unwrap();

        let recent = history.recent("alice", 10).unwrap();
        assert_eq!(recent.len(), 2);
        assert_eq!(recent[0].target_text, "three four");
        assert_eq!(recent[1].target_text, "one two");

        let limited = history.recent("alice", 1).unwrap();
        assert_eq!(limited.len(), 1);
        assert_eq!(limited[0].target_text, "three four");
    }

    #[test]
    fn test_stats_aggregation() {
        let history = MemoryHistory::new();
        // 100, 0, 50 -> mean 50
        history.save(record("alice", "a b", "a b")).unwrap();
        history.save(record("alice", "a b", "")).unwrap();
        history.save(record("alice", "a b c d", "a b x y")).unwrap();
        history.save(record("bob", "a b", "a b")).unwrap();

        let stats = history.stats("alice").unwrap();
        assert_eq!(stats.total_attempts, 3);
        assert_eq!(stats.average_accuracy, 50);
        assert_eq!(stats.excellent, 1);
        assert_eq!(stats.good, 1);
        assert_eq!(stats.needs_improvement, 1);
    }

    #[test]
    fn test_stats_empty_user() {
        let history = MemoryHistory::new();
        assert_eq!(history.stats("nobody").unwrap(), UserStats::default());
    }

    #[test]
    fn test_record_serializes_with_snake_case_category() {
        let r = record("alice", "a b c d", "a b x y");
        let json = serde_json::to_string(&r).unwrap();
        assert!(json.contains("\"category\":\"good\""));
        assert!(json.contains("\"accuracy\":50"));
    }
}
