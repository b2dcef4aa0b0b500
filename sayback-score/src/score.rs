//! WER-based accuracy scoring and feedback categories

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::align::{align, Alignment};
use crate::normalize::normalize;

/// Minimum accuracy for the Excellent category.
pub const EXCELLENT_MIN: u8 = 70;

/// Minimum accuracy for the Good category.
pub const GOOD_MIN: u8 = 50;

/// Feedback category shown (and signaled) to the user.
///
/// The thresholds are fixed; presentation (colors, LEDs, labels in
/// other languages) belongs to whatever consumes the category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeedbackCategory {
    Excellent,
    Good,
    NeedsImprovement,
}

impl FeedbackCategory {
    /// Map an accuracy percentage to its category.
    pub fn from_accuracy(accuracy: u8) -> Self {
        if accuracy >= EXCELLENT_MIN {
            FeedbackCategory::Excellent
        } else if accuracy >= GOOD_MIN {
            FeedbackCategory::Good
        } else {
            FeedbackCategory::NeedsImprovement
        }
    }

    /// Human-readable label.
    pub fn label(&self) -> &'static str {
        match self {
            FeedbackCategory::Excellent => "Excellent",
            FeedbackCategory::Good => "Good",
            FeedbackCategory::NeedsImprovement => "Needs Improvement",
        }
    }
}

impl std::fmt::Display for FeedbackCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FeedbackCategory::Excellent => write!(f, "excellent"),
            FeedbackCategory::Good => write!(f, "good"),
            FeedbackCategory::NeedsImprovement => write!(f, "needs_improvement"),
        }
    }
}

/// Result of scoring one attempt. Created once, never mutated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreResult {
    /// Accuracy percentage in 0..=100.
    pub accuracy: u8,
    /// Raw word error rate; unbounded above for wildly long hypotheses.
    pub wer: f64,
    pub category: FeedbackCategory,
    /// Operation counts kept for diagnostic display.
    pub alignment: Alignment,
}

/// Score a hypothesis transcript against a target sentence.
///
/// `WER = edit_distance / max(1, target_words)` and
/// `accuracy = clamp(round((1 - WER) * 100), 0, 100)`.
///
/// A target that normalizes to nothing is a content defect upstream;
/// the floored denominator keeps the result defined instead of
/// panicking, and the defect is logged here.
pub fn score(target: &str, hypothesis: &str) -> ScoreResult {
    let target_words = normalize(target);
    let hypothesis_words = normalize(hypothesis);

    if target_words.is_empty() {
        warn!(sentence = target, "target sentence normalizes to no words");
    }

    let alignment = align(&target_words, &hypothesis_words);
    let wer = alignment.distance() as f64 / target_words.len().max(1) as f64;
    let accuracy = ((1.0 - wer) * 100.0).round().clamp(0.0, 100.0) as u8;
    let category = FeedbackCategory::from_accuracy(accuracy);

    debug!(
        accuracy,
        %category,
        wer,
        distance = alignment.distance(),
        "scored attempt"
    );

    ScoreResult {
        accuracy,
        wer,
        category,
        alignment,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_perfect_match() {
        let r = score("the quick brown fox", "the quick brown fox");
        assert_eq!(r.accuracy, 100);
        assert_eq!(r.category, FeedbackCategory::Excellent);
        assert_eq!(r.alignment.distance(), 0);
        assert_eq!(r.alignment.matches, 4);
    }

    #[test]
    fn test_one_deletion() {
        let r = score("the quick brown fox", "the quick brown");
        assert_eq!(r.alignment.deletions, 1);
        assert!((r.wer - 0.25).abs() < f64::EPSILON);
        assert_eq!(r.accuracy, 75);
        assert_eq!(r.category, FeedbackCategory::Excellent);
    }

    #[test]
    fn test_two_substitutions() {
        let r = score("the quick brown fox", "a slow brown fox");
        assert_eq!(r.alignment.substitutions, 2);
        assert!((r.wer - 0.5).abs() < f64::EPSILON);
        assert_eq!(r.accuracy, 50);
        assert_eq!(r.category, FeedbackCategory::Good);
    }

    #[test]
    fn test_empty_hypothesis() {
        let r = score("hello world", "");
        assert_eq!(r.alignment.deletions, 2);
        assert!((r.wer - 1.0).abs() < f64::EPSILON);
        assert_eq!(r.accuracy, 0);
        assert_eq!(r.category, FeedbackCategory::NeedsImprovement);
    }

    #[test]
    fn test_both_empty_is_perfect() {
        // Floored denominator: zero distance over max(1, 0) words
        let r = score("", "");
        assert_eq!(r.accuracy, 100);
        assert_eq!(r.category, FeedbackCategory::Excellent);
    }

    #[test]
    fn test_empty_target_nonempty_hypothesis() {
        // Degenerate but defined: every hypothesis word is an insertion
        // against a denominator floored at 1
        let r = score("...", "one two three");
        assert_eq!(r.alignment.insertions, 3);
        assert!((r.wer - 3.0).abs() < f64::EPSILON);
        assert_eq!(r.accuracy, 0);
    }

    #[test]
    fn test_accuracy_clamped_at_zero() {
        // WER > 1 must clamp, never go negative
        let r = score("hi", "a b c d e f g h");
        assert_eq!(r.accuracy, 0);
        assert_eq!(r.category, FeedbackCategory::NeedsImprovement);
    }

    #[test]
    fn test_normalization_applied_before_alignment() {
        let r = score("The Quick, Brown Fox!", "the quick brown fox");
        assert_eq!(r.accuracy, 100);
    }

    #[test]
    fn test_category_boundaries_exact() {
        assert_eq!(FeedbackCategory::from_accuracy(100), FeedbackCategory::Excellent);
        assert_eq!(FeedbackCategory::from_accuracy(70), FeedbackCategory::Excellent);
        assert_eq!(FeedbackCategory::from_accuracy(69), FeedbackCategory::Good);
        assert_eq!(FeedbackCategory::from_accuracy(50), FeedbackCategory::Good);
        assert_eq!(FeedbackCategory::from_accuracy(49), FeedbackCategory::NeedsImprovement);
        assert_eq!(FeedbackCategory::from_accuracy(0), FeedbackCategory::NeedsImprovement);
    }

    #[test]
    fn test_accuracy_monotone_in_edit_distance() {
        // Fixed target, hypotheses with strictly growing edit distance
        let target = "one two three four";
        let hypotheses = [
            "one two three four",
            "one two three floor",
            "one two tree floor",
            "won too tree floor",
            "won too tree floor more",
            "won too tree floor more words here",
        ];
        let mut previous = 101i16;
        for hypothesis in hypotheses {
            let r = score(target, hypothesis);
            assert!(
                i16::from(r.accuracy) <= previous,
                "accuracy rose from {previous} to {} for {hypothesis:?}",
                r.accuracy
            );
            previous = i16::from(r.accuracy);
        }
    }

    #[test]
    fn test_category_serde_snake_case() {
        let json = serde_json::to_string(&FeedbackCategory::NeedsImprovement).unwrap();
        assert_eq!(json, "\"needs_improvement\"");
        let back: FeedbackCategory = serde_json::from_str("\"excellent\"").unwrap();
        assert_eq!(back, FeedbackCategory::Excellent);
    }

    #[test]
    fn test_labels() {
        assert_eq!(FeedbackCategory::Excellent.label(), "Excellent");
        assert_eq!(FeedbackCategory::Good.label(), "Good");
        assert_eq!(FeedbackCategory::NeedsImprovement.label(), "Needs Improvement");
        assert_eq!(FeedbackCategory::NeedsImprovement.to_string(), "needs_improvement");
    }
}
