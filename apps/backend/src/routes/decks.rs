//! Deck endpoints

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use uuid::Uuid;

use crate::error::Result;
use crate::models::*;
use crate::routes::auth::Caller;
use crate::services::decks;
use crate::AppState;

/// GET /api/decks
pub async fn list(
    State(state): State<AppState>,
    Extension(caller): Extension<Caller>,
) -> Result<Json<DeckListResponse>> {
    let decks = decks::list(&state.db, caller.user_id()).await?;
    Ok(Json(DeckListResponse { decks }))
}

/// GET /api/decks/:deck_id
/// Returns null for decks the caller cannot see
pub async fn get(
    State(state): State<AppState>,
    Extension(caller): Extension<Caller>,
    Path(deck_id): Path<Uuid>,
) -> Result<Json<Option<Deck>>> {
    let deck = decks::get(&state.db, caller.user_id(), deck_id).await?;
    Ok(Json(deck))
}

/// POST /api/decks
pub async fn create(
    State(state): State<AppState>,
    Extension(caller): Extension<Caller>,
    Json(payload): Json<CreateDeckRequest>,
) -> Result<(StatusCode, Json<CreatedResponse>)> {
    let id = decks::create(
        &state.db,
        caller.user_id(),
        &payload.name,
        payload.description.as_deref(),
    )
    .await?;
    Ok((StatusCode::CREATED, Json(CreatedResponse { id })))
}

/// PUT /api/decks/:deck_id
pub async fn update(
    State(state): State<AppState>,
    Extension(caller): Extension<Caller>,
    Path(deck_id): Path<Uuid>,
    Json(payload): Json<UpdateDeckRequest>,
) -> Result<StatusCode> {
    decks::update(
        &state.db,
        caller.user_id(),
        deck_id,
        &payload.name,
        payload.description.as_deref(),
    )
    .await?;
    Ok(StatusCode::NO_CONTENT)
}

/// DELETE /api/decks/:deck_id
/// Deletes the deck and all of its questions
pub async fn remove(
    State(state): State<AppState>,
    Extension(caller): Extension<Caller>,
    Path(deck_id): Path<Uuid>,
) -> Result<StatusCode> {
    decks::remove(&state.db, caller.user_id(), deck_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
