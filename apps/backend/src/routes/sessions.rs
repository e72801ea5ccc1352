//! Session and answer endpoints

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use uuid::Uuid;

use crate::error::Result;
use crate::models::*;
use crate::routes::auth::Caller;
use crate::services::{answers, sessions};
use crate::AppState;

/// POST /api/sessions
pub async fn create(
    State(state): State<AppState>,
    Extension(caller): Extension<Caller>,
    Json(payload): Json<CreateSessionRequest>,
) -> Result<(StatusCode, Json<CreatedResponse>)> {
    let id = sessions::create(
        &state.db,
        caller.user_id(),
        payload.deck_id,
        payload.mode,
        payload.time_limit_seconds,
    )
    .await?;
    Ok((StatusCode::CREATED, Json(CreatedResponse { id })))
}

/// GET /api/sessions/:session_id
/// Returns null for sessions the caller cannot see
pub async fn get(
    State(state): State<AppState>,
    Extension(caller): Extension<Caller>,
    Path(session_id): Path<Uuid>,
) -> Result<Json<Option<Session>>> {
    let session = sessions::get(&state.db, caller.user_id(), session_id).await?;
    Ok(Json(session))
}

/// POST /api/sessions/:session_id/complete
pub async fn complete(
    State(state): State<AppState>,
    Extension(caller): Extension<Caller>,
    Path(session_id): Path<Uuid>,
) -> Result<StatusCode> {
    sessions::complete(&state.db, caller.user_id(), session_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/sessions/:session_id/results
pub async fn results(
    State(state): State<AppState>,
    Extension(caller): Extension<Caller>,
    Path(session_id): Path<Uuid>,
) -> Result<Json<Option<SessionSummary>>> {
    let summary = sessions::results(&state.db, caller.user_id(), session_id).await?;
    Ok(Json(summary))
}

/// POST /api/sessions/:session_id/answers
pub async fn submit_answer(
    State(state): State<AppState>,
    Extension(caller): Extension<Caller>,
    Path(session_id): Path<Uuid>,
    Json(payload): Json<SubmitAnswerRequest>,
) -> Result<Json<SubmitAnswerResponse>> {
    let background = state
        .config
        .evaluate_on_submit
        .then_some(&state.evaluations);

    let answer = answers::submit_answer(
        &state.db,
        background,
        caller.user_id(),
        session_id,
        payload.question_id,
        payload.response,
    )
    .await?;

    Ok(Json(SubmitAnswerResponse {
        answer_id: answer.id,
        is_correct: answer.is_correct,
    }))
}

/// GET /api/sessions/:session_id/answers
pub async fn list_answers(
    State(state): State<AppState>,
    Extension(caller): Extension<Caller>,
    Path(session_id): Path<Uuid>,
) -> Result<Json<AnswerListResponse>> {
    let answers = answers::get_answers(&state.db, caller.user_id(), session_id).await?;
    Ok(Json(AnswerListResponse { answers }))
}

/// POST /api/answers/:answer_id/evaluate
/// Waits for free-text feedback and returns it
pub async fn evaluate(
    State(state): State<AppState>,
    Extension(caller): Extension<Caller>,
    Path(answer_id): Path<Uuid>,
    Json(payload): Json<EvaluateRequest>,
) -> Result<Json<EvaluateResponse>> {
    let feedback = answers::evaluate_free_text(
        &state.db,
        &state.evaluations,
        caller.user_id(),
        answer_id,
        payload.question,
        payload.answer,
    )
    .await?;
    Ok(Json(EvaluateResponse { feedback }))
}
