//! Database models and API types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::FromRow;
use uuid::Uuid;

// Re-export shared types from deck-core
pub use deck_core::{
    AnswerPayload, MatchAnswer, MatchPair, QuestionBody, QuestionKind, SessionMode,
    SessionSummary,
};

// === Database Entity Types ===

/// Registered user
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: Uuid,
    pub token: String,
    pub name: Option<String>,
    pub created_at: DateTime<Utc>,
    pub last_seen_at: DateTime<Utc>,
}

/// Deck row
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Deck {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Deck with its question count, for listings
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DeckSummary {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub question_count: i64,
}

/// Question row; the body is stored as JSONB
#[derive(Debug, Clone, FromRow)]
pub struct DbQuestion {
    pub id: Uuid,
    pub deck_id: Uuid,
    pub body: Json<QuestionBody>,
    pub order_index: i32,
    pub created_at: DateTime<Utc>,
}

impl DbQuestion {
    /// Convert to API question type
    pub fn to_api_question(&self) -> Question {
        Question {
            id: self.id,
            deck_id: self.deck_id,
            order: self.order_index,
            body: self.body.0.clone(),
            created_at: self.created_at,
        }
    }
}

/// Question as returned by the API
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Question {
    pub id: Uuid,
    pub deck_id: Uuid,
    pub order: i32,
    #[serde(flatten)]
    pub body: QuestionBody,
    pub created_at: DateTime<Utc>,
}

/// Session row
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DbSession {
    pub id: Uuid,
    pub deck_id: Uuid,
    pub owner_id: Uuid,
    pub mode: String,
    pub time_limit_seconds: Option<i32>,
    pub start_time: DateTime<Utc>,
    pub end_time: Option<DateTime<Utc>>,
    pub completed: bool,
}

impl DbSession {
    pub fn mode(&self) -> SessionMode {
        SessionMode::from_str(&self.mode).unwrap_or_default()
    }

    /// Convert to API session type, deriving the informational deadline
    pub fn to_api_session(&self, now: DateTime<Utc>) -> Session {
        Session {
            id: self.id,
            deck_id: self.deck_id,
            owner_id: self.owner_id,
            mode: self.mode(),
            time_limit_seconds: self.time_limit_seconds,
            start_time: self.start_time,
            end_time: self.end_time,
            completed: self.completed,
            deadline: deck_core::deadline(self.start_time, self.time_limit_seconds),
            expired: deck_core::is_expired(self.start_time, self.time_limit_seconds, now),
            remaining_seconds: deck_core::remaining_seconds(
                self.start_time,
                self.time_limit_seconds,
                now,
            ),
        }
    }
}

/// Session as returned by the API
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    pub id: Uuid,
    pub deck_id: Uuid,
    pub owner_id: Uuid,
    pub mode: SessionMode,
    pub time_limit_seconds: Option<i32>,
    pub start_time: DateTime<Utc>,
    pub end_time: Option<DateTime<Utc>>,
    pub completed: bool,
    /// Nominal end of an exam; never enforced server-side.
    pub deadline: Option<DateTime<Utc>>,
    pub expired: bool,
    /// Seconds left before `deadline`, clamped at zero.
    pub remaining_seconds: Option<i64>,
}

/// Answer row
#[derive(Debug, Clone, FromRow)]
pub struct DbAnswer {
    pub id: Uuid,
    pub session_id: Uuid,
    pub question_id: Uuid,
    pub response: Option<Json<AnswerPayload>>,
    pub is_correct: Option<bool>,
    pub llm_feedback: Option<String>,
    pub answered_at: DateTime<Utc>,
}

impl DbAnswer {
    /// Convert to API answer type
    pub fn to_api_answer(&self) -> Answer {
        Answer {
            id: self.id,
            session_id: self.session_id,
            question_id: self.question_id,
            response: self.response.as_ref().map(|r| r.0.clone()),
            is_correct: self.is_correct,
            llm_feedback: self.llm_feedback.clone(),
            answered_at: self.answered_at,
        }
    }
}

/// Answer as returned by the API
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Answer {
    pub id: Uuid,
    pub session_id: Uuid,
    pub question_id: Uuid,
    pub response: Option<AnswerPayload>,
    pub is_correct: Option<bool>,
    pub llm_feedback: Option<String>,
    pub answered_at: DateTime<Utc>,
}

// === API Request/Response Types ===

// User types
#[derive(Debug, Serialize, Deserialize)]
pub struct RegisterRequest {
    pub name: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct RegisterResponse {
    pub user_id: Uuid,
    pub token: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct UserProfileResponse {
    pub user_id: Uuid,
    pub name: Option<String>,
    pub last_seen_at: DateTime<Utc>,
}

// Deck types
#[derive(Debug, Serialize, Deserialize)]
pub struct DeckListResponse {
    pub decks: Vec<DeckSummary>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CreateDeckRequest {
    pub name: String,
    pub description: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct UpdateDeckRequest {
    pub name: String,
    pub description: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CreatedResponse {
    pub id: Uuid,
}

// Question types
#[derive(Debug, Serialize, Deserialize)]
pub struct QuestionListResponse {
    pub questions: Vec<Question>,
}

// Session types
#[derive(Debug, Serialize, Deserialize)]
pub struct CreateSessionRequest {
    pub deck_id: Uuid,
    pub mode: SessionMode,
    pub time_limit_seconds: Option<i32>,
}

// Answer types
#[derive(Debug, Serialize, Deserialize)]
pub struct SubmitAnswerRequest {
    pub question_id: Uuid,
    pub response: Option<AnswerPayload>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SubmitAnswerResponse {
    pub answer_id: Uuid,
    pub is_correct: Option<bool>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct AnswerListResponse {
    pub answers: Vec<Answer>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct EvaluateRequest {
    pub question: String,
    pub answer: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct EvaluateResponse {
    pub feedback: String,
}
