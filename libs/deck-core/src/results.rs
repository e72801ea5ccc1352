//! Session result aggregation and deadline arithmetic.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// Scoreboard derived from a session's stored answers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionSummary {
    pub total_questions: usize,
    pub answered: usize,
    pub correct: usize,
    pub unanswered: usize,
    /// Correct answers as a rounded percentage of all questions in the deck.
    pub percentage: u32,
}

/// Summarize answers given their `is_correct` flags.
///
/// Ungraded answers (free text) count as answered but not correct.
pub fn summarize<I>(total_questions: usize, answers: I) -> SessionSummary
where
    I: IntoIterator<Item = Option<bool>>,
{
    let mut answered = 0;
    let mut correct = 0;
    for is_correct in answers {
        answered += 1;
        if is_correct == Some(true) {
            correct += 1;
        }
    }

    let percentage = if answered > 0 && total_questions > 0 {
        ((correct as f64 / total_questions as f64) * 100.0).round() as u32
    } else {
        0
    };

    SessionSummary {
        total_questions,
        answered,
        correct,
        unanswered: total_questions.saturating_sub(answered),
        percentage,
    }
}

/// Nominal end of a timed session.
pub fn deadline(start: DateTime<Utc>, time_limit_seconds: Option<i32>) -> Option<DateTime<Utc>> {
    time_limit_seconds.map(|secs| start + Duration::seconds(i64::from(secs.max(0))))
}

/// Whole seconds left before the deadline, clamped at zero.
pub fn remaining_seconds(
    start: DateTime<Utc>,
    time_limit_seconds: Option<i32>,
    now: DateTime<Utc>,
) -> Option<i64> {
    deadline(start, time_limit_seconds).map(|end| (end - now).num_seconds().max(0))
}

/// Whether the nominal deadline has passed. Untimed sessions never expire.
pub fn is_expired(start: DateTime<Utc>, time_limit_seconds: Option<i32>, now: DateTime<Utc>) -> bool {
    deadline(start, time_limit_seconds).is_some_and(|end| now >= end)
}
