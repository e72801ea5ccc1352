//! PostgreSQL database operations

use chrono::{DateTime, Utc};
use sqlx::{postgres::PgPoolOptions, types::Json, PgPool};
use uuid::Uuid;

use crate::error::{ApiError, Result};
use crate::models::*;

const QUESTION_COLUMNS: &str = "id, deck_id, body, order_index, created_at";
const SESSION_COLUMNS: &str =
    "id, deck_id, owner_id, mode, time_limit_seconds, start_time, end_time, completed";
const ANSWER_COLUMNS: &str =
    "id, session_id, question_id, response, is_correct, llm_feedback, answered_at";

/// Database wrapper with connection pool
#[derive(Clone)]
pub struct Database {
    pool: PgPool,
}

impl Database {
    /// Connect to PostgreSQL and create connection pool
    pub async fn connect(database_url: &str, max_connections: u32) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(database_url)
            .await?;

        Ok(Self { pool })
    }

    /// Run database migrations
    pub async fn run_migrations(&self) -> Result<()> {
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .map_err(|e| ApiError::Migration(e.to_string()))?;
        Ok(())
    }

    /// Get the connection pool
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    // === User Repository ===

    /// Create a new user with generated token
    pub async fn create_user(&self, name: Option<&str>) -> Result<User> {
        let token = Uuid::new_v4().to_string();
        let user = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (token, name)
            VALUES ($1, $2)
            RETURNING id, token, name, created_at, last_seen_at
            "#,
        )
        .bind(&token)
        .bind(name)
        .fetch_one(&self.pool)
        .await?;

        Ok(user)
    }

    /// Get user by token
    pub async fn get_user_by_token(&self, token: &str) -> Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, token, name, created_at, last_seen_at
            FROM users
            WHERE token = $1
            "#,
        )
        .bind(token)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    /// Get user by ID
    pub async fn get_user(&self, user_id: Uuid) -> Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, token, name, created_at, last_seen_at
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    /// Update user last_seen_at timestamp
    pub async fn update_last_seen(&self, user_id: Uuid) -> Result<()> {
        sqlx::query(
            r#"
            UPDATE users
            SET last_seen_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(user_id)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    // === Deck Repository ===

    /// Get deck by ID, regardless of owner
    pub async fn get_deck(&self, deck_id: Uuid) -> Result<Option<Deck>> {
        let deck = sqlx::query_as::<_, Deck>(
            r#"
            SELECT id, owner_id, name, description, created_at
            FROM decks
            WHERE id = $1
            "#,
        )
        .bind(deck_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(deck)
    }

    /// Get all decks owned by a user, with question counts
    pub async fn list_decks(&self, owner_id: Uuid) -> Result<Vec<DeckSummary>> {
        let decks = sqlx::query_as::<_, DeckSummary>(
            r#"
            SELECT d.id, d.owner_id, d.name, d.description, d.created_at,
                   COUNT(q.id) as question_count
            FROM decks d
            LEFT JOIN questions q ON q.deck_id = d.id
            WHERE d.owner_id = $1
            GROUP BY d.id
            ORDER BY d.created_at
            "#,
        )
        .bind(owner_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(decks)
    }

    /// Insert a deck
    pub async fn create_deck(
        &self,
        owner_id: Uuid,
        name: &str,
        description: Option<&str>,
    ) -> Result<Deck> {
        let deck = sqlx::query_as::<_, Deck>(
            r#"
            INSERT INTO decks (owner_id, name, description)
            VALUES ($1, $2, $3)
            RETURNING id, owner_id, name, description, created_at
            "#,
        )
        .bind(owner_id)
        .bind(name)
        .bind(description)
        .fetch_one(&self.pool)
        .await?;

        Ok(deck)
    }

    /// Update deck name and description
    pub async fn update_deck(
        &self,
        deck_id: Uuid,
        name: &str,
        description: Option<&str>,
    ) -> Result<bool> {
        let result = sqlx::query(
            r#"
            UPDATE decks
            SET name = $2, description = $3
            WHERE id = $1
            "#,
        )
        .bind(deck_id)
        .bind(name)
        .bind(description)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Delete a deck and all of its questions. Returns the number of questions removed.
    pub async fn delete_deck(&self, deck_id: Uuid) -> Result<u64> {
        let mut tx = self.pool.begin().await?;

        let questions = sqlx::query("DELETE FROM questions WHERE deck_id = $1")
            .bind(deck_id)
            .execute(&mut *tx)
            .await?;

        sqlx::query("DELETE FROM decks WHERE id = $1")
            .bind(deck_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        Ok(questions.rows_affected())
    }

    // === Question Repository ===

    /// Get question by ID
    pub async fn get_question(&self, question_id: Uuid) -> Result<Option<DbQuestion>> {
        let question = sqlx::query_as::<_, DbQuestion>(&format!(
            "SELECT {QUESTION_COLUMNS} FROM questions WHERE id = $1"
        ))
        .bind(question_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(question)
    }

    /// Get all questions of a deck in insertion order
    pub async fn list_questions(&self, deck_id: Uuid) -> Result<Vec<DbQuestion>> {
        let questions = sqlx::query_as::<_, DbQuestion>(&format!(
            "SELECT {QUESTION_COLUMNS} FROM questions WHERE deck_id = $1 ORDER BY order_index, created_at"
        ))
        .bind(deck_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(questions)
    }

    /// Count questions in a deck
    pub async fn count_questions(&self, deck_id: Uuid) -> Result<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM questions WHERE deck_id = $1")
            .bind(deck_id)
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }

    /// Append a question to a deck.
    ///
    /// The deck row is locked so concurrent inserts see each other's count.
    pub async fn insert_question(&self, deck_id: Uuid, body: &QuestionBody) -> Result<DbQuestion> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("SELECT id FROM decks WHERE id = $1 FOR UPDATE")
            .bind(deck_id)
            .execute(&mut *tx)
            .await?;

        let order: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM questions WHERE deck_id = $1")
            .bind(deck_id)
            .fetch_one(&mut *tx)
            .await?;

        let question = sqlx::query_as::<_, DbQuestion>(&format!(
            r#"
            INSERT INTO questions (deck_id, kind, body, order_index)
            VALUES ($1, $2, $3, $4)
            RETURNING {QUESTION_COLUMNS}
            "#
        ))
        .bind(deck_id)
        .bind(body.kind().as_str())
        .bind(Json(body))
        .bind(order as i32)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(question)
    }

    /// Replace a question's body
    pub async fn update_question_body(&self, question_id: Uuid, body: &QuestionBody) -> Result<bool> {
        let result = sqlx::query(
            r#"
            UPDATE questions
            SET kind = $2, body = $3
            WHERE id = $1
            "#,
        )
        .bind(question_id)
        .bind(body.kind().as_str())
        .bind(Json(body))
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Delete a question. Answers referencing it are left in place.
    pub async fn delete_question(&self, question_id: Uuid) -> Result<bool> {
        let result = sqlx::query("DELETE FROM questions WHERE id = $1")
            .bind(question_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    // === Session Repository ===

    /// Insert a new active session
    pub async fn create_session(
        &self,
        deck_id: Uuid,
        owner_id: Uuid,
        mode: SessionMode,
        time_limit_seconds: Option<i32>,
        start_time: DateTime<Utc>,
    ) -> Result<DbSession> {
        let session = sqlx::query_as::<_, DbSession>(&format!(
            r#"
            INSERT INTO sessions (deck_id, owner_id, mode, time_limit_seconds, start_time, completed)
            VALUES ($1, $2, $3, $4, $5, FALSE)
            RETURNING {SESSION_COLUMNS}
            "#
        ))
        .bind(deck_id)
        .bind(owner_id)
        .bind(mode.as_str())
        .bind(time_limit_seconds)
        .bind(start_time)
        .fetch_one(&self.pool)
        .await?;

        Ok(session)
    }

    /// Get session by ID, regardless of owner
    pub async fn get_session(&self, session_id: Uuid) -> Result<Option<DbSession>> {
        let session = sqlx::query_as::<_, DbSession>(&format!(
            "SELECT {SESSION_COLUMNS} FROM sessions WHERE id = $1"
        ))
        .bind(session_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(session)
    }

    /// Mark a session completed. Re-completion rewrites end_time.
    pub async fn complete_session(&self, session_id: Uuid, end_time: DateTime<Utc>) -> Result<bool> {
        let result = sqlx::query(
            r#"
            UPDATE sessions
            SET completed = TRUE, end_time = $2
            WHERE id = $1
            "#,
        )
        .bind(session_id)
        .bind(end_time)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    // === Answer Repository ===

    /// Insert or replace the answer for a (session, question) pair.
    ///
    /// The UNIQUE (session_id, question_id) constraint makes concurrent
    /// submissions converge on a single row. llm_feedback is left untouched.
    pub async fn upsert_answer(
        &self,
        session_id: Uuid,
        question_id: Uuid,
        response: Option<&AnswerPayload>,
        is_correct: Option<bool>,
        answered_at: DateTime<Utc>,
    ) -> Result<DbAnswer> {
        let answer = sqlx::query_as::<_, DbAnswer>(&format!(
            r#"
            INSERT INTO answers (session_id, question_id, response, is_correct, answered_at)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (session_id, question_id) DO UPDATE SET
                response = EXCLUDED.response,
                is_correct = EXCLUDED.is_correct,
                answered_at = EXCLUDED.answered_at
            RETURNING {ANSWER_COLUMNS}
            "#
        ))
        .bind(session_id)
        .bind(question_id)
        .bind(response.map(Json))
        .bind(is_correct)
        .bind(answered_at)
        .fetch_one(&self.pool)
        .await?;

        Ok(answer)
    }

    /// Get answer by ID
    pub async fn get_answer(&self, answer_id: Uuid) -> Result<Option<DbAnswer>> {
        let answer = sqlx::query_as::<_, DbAnswer>(&format!(
            "SELECT {ANSWER_COLUMNS} FROM answers WHERE id = $1"
        ))
        .bind(answer_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(answer)
    }

    /// Get all answers of a session
    pub async fn list_answers(&self, session_id: Uuid) -> Result<Vec<DbAnswer>> {
        let answers = sqlx::query_as::<_, DbAnswer>(&format!(
            "SELECT {ANSWER_COLUMNS} FROM answers WHERE session_id = $1 ORDER BY answered_at"
        ))
        .bind(session_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(answers)
    }

    /// Patch only the feedback of an answer
    pub async fn update_feedback(&self, answer_id: Uuid, feedback: &str) -> Result<bool> {
        let result = sqlx::query(
            r#"
            UPDATE answers
            SET llm_feedback = $2
            WHERE id = $1
            "#,
        )
        .bind(answer_id)
        .bind(feedback)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }
}
