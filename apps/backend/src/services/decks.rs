//! Deck store operations.
//!
//! Queries hide decks the caller does not own; mutations report them as
//! missing.

use uuid::Uuid;

use crate::db::Database;
use crate::error::{ApiError, Result};
use crate::models::{Deck, DeckSummary};
use crate::routes::auth::require;

/// Load a deck only if `owner` owns it.
pub async fn owned_deck(db: &Database, owner: Uuid, deck_id: Uuid) -> Result<Option<Deck>> {
    Ok(db
        .get_deck(deck_id)
        .await?
        .filter(|deck| deck.owner_id == owner))
}

async fn require_owned_deck(db: &Database, owner: Uuid, deck_id: Uuid) -> Result<Deck> {
    owned_deck(db, owner, deck_id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("deck {deck_id}")))
}

fn clean_name(name: &str) -> Result<String> {
    let name = name.trim();
    if name.is_empty() {
        return Err(ApiError::BadRequest("deck name must not be empty".to_string()));
    }
    Ok(name.to_string())
}

fn clean_description(description: Option<&str>) -> Option<&str> {
    description.map(str::trim).filter(|d| !d.is_empty())
}

pub async fn list(db: &Database, caller: Option<Uuid>) -> Result<Vec<DeckSummary>> {
    match caller {
        Some(owner) => db.list_decks(owner).await,
        None => Ok(Vec::new()),
    }
}

pub async fn get(db: &Database, caller: Option<Uuid>, deck_id: Uuid) -> Result<Option<Deck>> {
    match caller {
        Some(owner) => owned_deck(db, owner, deck_id).await,
        None => Ok(None),
    }
}

pub async fn create(
    db: &Database,
    caller: Option<Uuid>,
    name: &str,
    description: Option<&str>,
) -> Result<Uuid> {
    let owner = require(caller)?;
    let name = clean_name(name)?;

    let deck = db
        .create_deck(owner, &name, clean_description(description))
        .await?;

    tracing::info!("Created deck {} for user {}", deck.id, owner);
    Ok(deck.id)
}

pub async fn update(
    db: &Database,
    caller: Option<Uuid>,
    deck_id: Uuid,
    name: &str,
    description: Option<&str>,
) -> Result<()> {
    let owner = require(caller)?;
    let name = clean_name(name)?;
    require_owned_deck(db, owner, deck_id).await?;

    db.update_deck(deck_id, &name, clean_description(description))
        .await?;
    Ok(())
}

/// Delete a deck and every question in it.
pub async fn remove(db: &Database, caller: Option<Uuid>, deck_id: Uuid) -> Result<()> {
    let owner = require(caller)?;
    require_owned_deck(db, owner, deck_id).await?;

    let removed = db.delete_deck(deck_id).await?;
    tracing::info!("Deleted deck {} with {} questions", deck_id, removed);
    Ok(())
}
