//! Error types for deck-core.

use thiserror::Error;

/// Result type alias using QuestionError.
pub type Result<T> = std::result::Result<T, QuestionError>;

/// Errors raised while validating or grading a question.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QuestionError {
    #[error("correct index {index} is out of range for {len} choices")]
    CorrectIndexOutOfRange { index: usize, len: usize },

    #[error("match index {index} is out of range for {len} pairs")]
    MatchIndexOutOfRange { index: usize, len: usize },
}
