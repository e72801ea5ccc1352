//! Question store operations. Authorization flows through the parent deck.

use uuid::Uuid;

use crate::db::Database;
use crate::error::{ApiError, Result};
use crate::models::{DbQuestion, Question, QuestionBody};
use crate::routes::auth::require;
use crate::services::decks::owned_deck;

/// Load a question only if `owner` owns its deck.
async fn require_owned_question(db: &Database, owner: Uuid, question_id: Uuid) -> Result<DbQuestion> {
    let not_found = || ApiError::NotFound(format!("question {question_id}"));

    let question = db.get_question(question_id).await?.ok_or_else(not_found)?;
    owned_deck(db, owner, question.deck_id)
        .await?
        .ok_or_else(not_found)?;

    Ok(question)
}

/// Questions of a deck in insertion order; empty when hidden from the caller.
pub async fn list(db: &Database, caller: Option<Uuid>, deck_id: Uuid) -> Result<Vec<Question>> {
    let Some(owner) = caller else {
        return Ok(Vec::new());
    };
    if owned_deck(db, owner, deck_id).await?.is_none() {
        return Ok(Vec::new());
    }

    let questions = db.list_questions(deck_id).await?;
    Ok(questions.iter().map(DbQuestion::to_api_question).collect())
}

/// Append a question; its order is the deck's current question count.
pub async fn create(
    db: &Database,
    caller: Option<Uuid>,
    deck_id: Uuid,
    body: &QuestionBody,
) -> Result<Uuid> {
    let owner = require(caller)?;
    owned_deck(db, owner, deck_id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("deck {deck_id}")))?;
    body.validate()?;

    let question = db.insert_question(deck_id, body).await?;

    tracing::info!(
        "Created {} question {} at position {} in deck {}",
        body.kind().as_str(),
        question.id,
        question.order_index,
        deck_id
    );
    Ok(question.id)
}

/// Replace a question's payload. The question kind cannot change.
pub async fn update(
    db: &Database,
    caller: Option<Uuid>,
    question_id: Uuid,
    body: &QuestionBody,
) -> Result<()> {
    let owner = require(caller)?;
    let existing = require_owned_question(db, owner, question_id).await?;

    let current = existing.body.0.kind();
    if current != body.kind() {
        return Err(ApiError::BadRequest(format!(
            "cannot change a {} question into {}",
            current.as_str(),
            body.kind().as_str()
        )));
    }
    body.validate()?;

    db.update_question_body(question_id, body).await?;
    Ok(())
}

/// Delete a question. Existing answers to it stay behind.
pub async fn remove(db: &Database, caller: Option<Uuid>, question_id: Uuid) -> Result<()> {
    let owner = require(caller)?;
    require_owned_question(db, owner, question_id).await?;

    db.delete_question(question_id).await?;
    tracing::info!("Deleted question {}", question_id);
    Ok(())
}
