//! Core study-deck library shared by the backend and its tests.
//!
//! Provides:
//! - Question and answer payload types (match, multiple choice, free text)
//! - Deterministic grading for match and multiple-choice answers
//! - Session result summaries and deadline arithmetic

pub mod error;
pub mod grading;
pub mod results;
pub mod types;

pub use error::{QuestionError, Result};
pub use grading::{grade, grade_match, grade_multiple_choice};
pub use results::{deadline, is_expired, remaining_seconds, summarize, SessionSummary};
pub use types::{AnswerPayload, MatchAnswer, MatchPair, QuestionBody, QuestionKind, SessionMode};
