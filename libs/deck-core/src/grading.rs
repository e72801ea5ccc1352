//! Deterministic grading of submitted answers.

use std::collections::HashSet;

use crate::error::{QuestionError, Result};
use crate::types::{AnswerPayload, MatchAnswer, MatchPair, QuestionBody};

/// Grade a response against a question.
///
/// Returns `Ok(None)` when correctness is not computed: free-text questions,
/// a missing response, or a response of a different kind than the question.
pub fn grade(body: &QuestionBody, response: Option<&AnswerPayload>) -> Result<Option<bool>> {
    let Some(response) = response else {
        return Ok(None);
    };

    match (body, response) {
        (QuestionBody::Match { pairs }, AnswerPayload::Match { match_answers }) => {
            grade_match(pairs, match_answers).map(Some)
        }
        (
            QuestionBody::MultipleChoice {
                correct_indices, ..
            },
            AnswerPayload::MultipleChoice { selected_indices },
        ) => Ok(Some(grade_multiple_choice(correct_indices, selected_indices))),
        (QuestionBody::FreeText { .. }, _) => Ok(None),
        (QuestionBody::Match { .. }, _) | (QuestionBody::MultipleChoice { .. }, _) => Ok(None),
    }
}

/// Every submitted pairing must point at two rows with the same answer text.
///
/// The comparison is on the `answer` field at both indices, so two rows
/// sharing answer text are interchangeable. An empty submission is correct.
pub fn grade_match(pairs: &[MatchPair], answers: &[MatchAnswer]) -> Result<bool> {
    let lookup = |index: usize| {
        pairs
            .get(index)
            .ok_or(QuestionError::MatchIndexOutOfRange {
                index,
                len: pairs.len(),
            })
    };

    for answer in answers {
        let pair = lookup(answer.question_index)?;
        let expected = lookup(answer.answer_index)?;
        if pair.answer != expected.answer {
            return Ok(false);
        }
    }

    Ok(true)
}

/// Exact set equality between selected and correct indices.
pub fn grade_multiple_choice(correct: &[usize], selected: &[usize]) -> bool {
    let correct: HashSet<usize> = correct.iter().copied().collect();
    let selected: HashSet<usize> = selected.iter().copied().collect();

    correct.len() == selected.len() && correct.iter().all(|i| selected.contains(i))
}
