//! Core types for study decks.

use serde::{Deserialize, Serialize};

use crate::error::{QuestionError, Result};

/// Question variant discriminant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuestionKind {
    Match,
    MultipleChoice,
    FreeText,
}

impl QuestionKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Match => "match",
            Self::MultipleChoice => "multiple_choice",
            Self::FreeText => "free_text",
        }
    }
}

/// One row of a match question. Pairing is by position in the list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchPair {
    pub question: String,
    pub answer: String,
}

/// Type-specific payload of a question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum QuestionBody {
    Match {
        pairs: Vec<MatchPair>,
    },
    MultipleChoice {
        question: String,
        choices: Vec<String>,
        correct_indices: Vec<usize>,
    },
    FreeText {
        prompt: String,
    },
}

impl QuestionBody {
    pub fn kind(&self) -> QuestionKind {
        match self {
            Self::Match { .. } => QuestionKind::Match,
            Self::MultipleChoice { .. } => QuestionKind::MultipleChoice,
            Self::FreeText { .. } => QuestionKind::FreeText,
        }
    }

    /// Question text shown to the student; also sent to the evaluator as the question.
    pub fn prompt_text(&self) -> String {
        match self {
            Self::Match { pairs } => pairs
                .iter()
                .map(|p| p.question.as_str())
                .collect::<Vec<_>>()
                .join("\n"),
            Self::MultipleChoice { question, .. } => question.clone(),
            Self::FreeText { prompt } => prompt.clone(),
        }
    }

    /// Reject bodies that can never be answered correctly.
    pub fn validate(&self) -> Result<()> {
        match self {
            Self::Match { .. } | Self::FreeText { .. } => Ok(()),
            Self::MultipleChoice {
                choices,
                correct_indices,
                ..
            } => {
                if let Some(&index) = correct_indices.iter().find(|&&i| i >= choices.len()) {
                    return Err(QuestionError::CorrectIndexOutOfRange {
                        index,
                        len: choices.len(),
                    });
                }
                Ok(())
            }
        }
    }
}

/// A student's pairing of a match question row with an answer row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchAnswer {
    pub question_index: usize,
    pub answer_index: usize,
}

/// Submitted response, one variant per question kind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AnswerPayload {
    Match { match_answers: Vec<MatchAnswer> },
    MultipleChoice { selected_indices: Vec<usize> },
    FreeText { text_answer: String },
}

impl AnswerPayload {
    pub fn text_answer(&self) -> Option<&str> {
        match self {
            Self::FreeText { text_answer } => Some(text_answer),
            _ => None,
        }
    }
}

/// How a session is played.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionMode {
    /// Time-boxed; results are shown after completion.
    Exam,
    /// Immediate feedback per answer.
    Practice,
}

impl Default for SessionMode {
    fn default() -> Self {
        Self::Practice
    }
}

impl SessionMode {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Exam => "exam",
            Self::Practice => "practice",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "exam" => Some(Self::Exam),
            "practice" => Some(Self::Practice),
            _ => None,
        }
    }
}
