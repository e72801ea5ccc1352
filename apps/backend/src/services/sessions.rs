//! Session engine.
//!
//! A session moves from active to completed exactly once in spirit;
//! completing again only rewrites `end_time`. Exam deadlines are reported but
//! never enforced here: the client is expected to call `complete` when the
//! timer runs out.

use chrono::Utc;
use uuid::Uuid;

use crate::db::Database;
use crate::error::{ApiError, Result};
use crate::models::{DbSession, Session, SessionMode, SessionSummary};
use crate::routes::auth::require;
use crate::services::decks::owned_deck;

/// Load a session only if `owner` owns it.
pub async fn owned_session(db: &Database, owner: Uuid, session_id: Uuid) -> Result<Option<DbSession>> {
    Ok(db
        .get_session(session_id)
        .await?
        .filter(|session| session.owner_id == owner))
}

/// Load a session for a mutation, failing when it is hidden from the caller.
pub async fn require_owned_session(
    db: &Database,
    caller: Option<Uuid>,
    session_id: Uuid,
) -> Result<DbSession> {
    let owner = require(caller)?;
    owned_session(db, owner, session_id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("session {session_id}")))
}

fn describe_limit(time_limit_seconds: Option<i32>) -> String {
    match time_limit_seconds {
        Some(secs) => format!("{secs}s"),
        None => "none".to_string(),
    }
}

/// Start a session over a deck the caller owns.
pub async fn create(
    db: &Database,
    caller: Option<Uuid>,
    deck_id: Uuid,
    mode: SessionMode,
    time_limit_seconds: Option<i32>,
) -> Result<Uuid> {
    let owner = require(caller)?;
    owned_deck(db, owner, deck_id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("deck {deck_id}")))?;

    let session = db
        .create_session(deck_id, owner, mode, time_limit_seconds, Utc::now())
        .await?;

    tracing::info!(
        "Started {} session {} on deck {} (time limit: {})",
        mode.as_str(),
        session.id,
        deck_id,
        describe_limit(time_limit_seconds)
    );
    Ok(session.id)
}

/// The session, or `None` when the caller is anonymous or not the owner.
pub async fn get(db: &Database, caller: Option<Uuid>, session_id: Uuid) -> Result<Option<Session>> {
    let Some(owner) = caller else {
        return Ok(None);
    };

    let now = Utc::now();
    Ok(owned_session(db, owner, session_id)
        .await?
        .map(|session| session.to_api_session(now)))
}

pub async fn complete(db: &Database, caller: Option<Uuid>, session_id: Uuid) -> Result<()> {
    let session = require_owned_session(db, caller, session_id).await?;

    if session.completed {
        tracing::debug!("Session {} completed again", session_id);
    }

    db.complete_session(session_id, Utc::now()).await?;
    tracing::info!("Completed session {}", session_id);
    Ok(())
}

/// Score the session by scanning its stored answers.
pub async fn results(
    db: &Database,
    caller: Option<Uuid>,
    session_id: Uuid,
) -> Result<Option<SessionSummary>> {
    let Some(owner) = caller else {
        return Ok(None);
    };
    let Some(session) = owned_session(db, owner, session_id).await? else {
        return Ok(None);
    };

    let total = db.count_questions(session.deck_id).await?;
    let answers = db.list_answers(session_id).await?;

    Ok(Some(deck_core::summarize(
        usize::try_from(total).unwrap_or(0),
        answers.iter().map(|a| a.is_correct),
    )))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_describe_limit() {
        assert_eq!(describe_limit(Some(60)), "60s");
        assert_eq!(describe_limit(None), "none");
    }
}
