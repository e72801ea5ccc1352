//! Answer grading engine.
//!
//! Each submission is graded synchronously and written with a single upsert
//! keyed by (session, question), so a session holds at most one answer per
//! question. Free-text feedback is produced separately by the evaluation
//! worker and written through its own feedback-only path.

use chrono::Utc;
use uuid::Uuid;

use crate::db::Database;
use crate::error::{ApiError, Result};
use crate::models::{Answer, AnswerPayload, DbAnswer, QuestionBody};
use crate::routes::auth::require;
use crate::services::evaluation::EvaluationQueue;
use crate::services::sessions::{owned_session, require_owned_session};

/// Grade and store a response, replacing any earlier one for the same question.
///
/// When `background` is given and the response is free text for a free-text
/// question, an evaluation job is queued for the stored answer.
pub async fn submit_answer(
    db: &Database,
    background: Option<&EvaluationQueue>,
    caller: Option<Uuid>,
    session_id: Uuid,
    question_id: Uuid,
    response: Option<AnswerPayload>,
) -> Result<DbAnswer> {
    require_owned_session(db, caller, session_id).await?;

    let question = db
        .get_question(question_id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("question {question_id}")))?;
    let body = &question.body.0;

    let is_correct = deck_core::grade(body, response.as_ref())?;

    let answer = db
        .upsert_answer(session_id, question_id, response.as_ref(), is_correct, Utc::now())
        .await?;

    tracing::info!(
        "Stored answer {} for question {} in session {} (correct: {:?})",
        answer.id,
        question_id,
        session_id,
        is_correct
    );

    if let (Some(queue), QuestionBody::FreeText { .. }, Some(text)) = (
        background,
        body,
        response.as_ref().and_then(AnswerPayload::text_answer),
    ) {
        queue.enqueue(answer.id, body.prompt_text(), text.to_string());
    }

    Ok(answer)
}

/// Answers of a session; empty when hidden from the caller.
pub async fn get_answers(db: &Database, caller: Option<Uuid>, session_id: Uuid) -> Result<Vec<Answer>> {
    let Some(owner) = caller else {
        return Ok(Vec::new());
    };
    if owned_session(db, owner, session_id).await?.is_none() {
        return Ok(Vec::new());
    }

    let answers = db.list_answers(session_id).await?;
    Ok(answers.iter().map(DbAnswer::to_api_answer).collect())
}

/// Ask the evaluator for feedback on a stored answer and wait for it.
///
/// The feedback is written to the answer by the worker. On failure the
/// answer keeps no feedback and the error reaches the caller unretried,
/// unless the evaluation policy allows retries.
pub async fn evaluate_free_text(
    db: &Database,
    queue: &EvaluationQueue,
    caller: Option<Uuid>,
    answer_id: Uuid,
    question: String,
    answer: String,
) -> Result<String> {
    let owner = require(caller)?;
    let not_found = || ApiError::NotFound(format!("answer {answer_id}"));

    let stored = db.get_answer(answer_id).await?.ok_or_else(not_found)?;
    owned_session(db, owner, stored.session_id)
        .await?
        .ok_or_else(not_found)?;

    queue.evaluate(answer_id, question, answer).await
}
