//! Question endpoints

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use uuid::Uuid;

use crate::error::Result;
use crate::models::*;
use crate::routes::auth::Caller;
use crate::services::questions;
use crate::AppState;

/// GET /api/decks/:deck_id/questions
pub async fn list(
    State(state): State<AppState>,
    Extension(caller): Extension<Caller>,
    Path(deck_id): Path<Uuid>,
) -> Result<Json<QuestionListResponse>> {
    let questions = questions::list(&state.db, caller.user_id(), deck_id).await?;
    Ok(Json(QuestionListResponse { questions }))
}

/// POST /api/decks/:deck_id/questions
/// Body is a tagged question: `{"type": "match" | "multiple_choice" | "free_text", ...}`
pub async fn create(
    State(state): State<AppState>,
    Extension(caller): Extension<Caller>,
    Path(deck_id): Path<Uuid>,
    Json(body): Json<QuestionBody>,
) -> Result<(StatusCode, Json<CreatedResponse>)> {
    let id = questions::create(&state.db, caller.user_id(), deck_id, &body).await?;
    Ok((StatusCode::CREATED, Json(CreatedResponse { id })))
}

/// PUT /api/questions/:question_id
pub async fn update(
    State(state): State<AppState>,
    Extension(caller): Extension<Caller>,
    Path(question_id): Path<Uuid>,
    Json(body): Json<QuestionBody>,
) -> Result<StatusCode> {
    questions::update(&state.db, caller.user_id(), question_id, &body).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// DELETE /api/questions/:question_id
pub async fn remove(
    State(state): State<AppState>,
    Extension(caller): Extension<Caller>,
    Path(question_id): Path<Uuid>,
) -> Result<StatusCode> {
    questions::remove(&state.db, caller.user_id(), question_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
