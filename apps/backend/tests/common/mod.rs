//! Common test utilities and fixtures for integration tests.
//!
//! This module provides shared test infrastructure including:
//! - TestContext wiring the real router to a database and a canned evaluator
//! - Helpers for registering users and building auth headers
//!
//! # Requirements
//! Integration tests require a PostgreSQL database (set DATABASE_URL env var).

pub mod fixtures;

use std::sync::Arc;

use axum::Router;
use axum_test::TestServer;
use uuid::Uuid;

use deck_backend::config::Config;
use deck_backend::db::Database;
use deck_backend::services::evaluation::{spawn_worker, EvaluationQueue};
use deck_backend::services::evaluator::{EvaluatorError, TextEvaluator};
use deck_backend::AppState;

/// Evaluator that answers without leaving the process.
pub enum StubEvaluator {
    /// Echoes the answer back inside fixed feedback text.
    Canned,
    /// Always reports a backend failure.
    Failing,
}

impl TextEvaluator for StubEvaluator {
    async fn evaluate(&self, _question: &str, answer: &str) -> Result<String, EvaluatorError> {
        match self {
            StubEvaluator::Canned => Ok(format!("Good attempt: {answer}")),
            StubEvaluator::Failing => Err(EvaluatorError::Backend {
                status: 503,
                message: "unavailable".to_string(),
            }),
        }
    }
}

/// Test context containing database connection and test server.
///
/// Requires DATABASE_URL environment variable to be set.
pub struct TestContext {
    pub db: Arc<Database>,
    app: Router,
}

impl TestContext {
    /// Create a context whose evaluator returns canned feedback.
    ///
    /// # Panics
    /// Panics if DATABASE_URL is not set or database connection fails.
    pub async fn new() -> Self {
        Self::with_evaluator(StubEvaluator::Canned, false).await
    }

    /// Create a context with a specific evaluator and submit-time evaluation switch.
    pub async fn with_evaluator(evaluator: StubEvaluator, evaluate_on_submit: bool) -> Self {
        dotenvy::dotenv().ok();

        let database_url =
            std::env::var("DATABASE_URL").expect("DATABASE_URL must be set for integration tests");

        let mut config = Config::from_lookup(|key| match key {
            "DATABASE_URL" => Some(database_url.clone()),
            _ => None,
        })
        .expect("Failed to build test config");
        config.evaluate_on_submit = evaluate_on_submit;

        let db = Database::connect(&config.database_url, 2)
            .await
            .expect("Failed to connect to test database");

        db.run_migrations()
            .await
            .expect("Failed to run migrations");

        let db = Arc::new(db);

        let (evaluations, receiver) = EvaluationQueue::channel(config.queue_capacity);
        spawn_worker(
            db.clone(),
            Arc::new(evaluator),
            config.evaluation.clone(),
            receiver,
        );

        let state = AppState {
            db: db.clone(),
            evaluations,
            config: Arc::new(config),
        };

        let app = deck_backend::router(state);

        Self { db, app }
    }

    /// Get the router for use with axum-test.
    pub fn router(&self) -> Router {
        self.app.clone()
    }

    /// Build a test server over the router.
    pub fn server(&self) -> TestServer {
        TestServer::new(self.router()).expect("Failed to start test server")
    }

    /// Create a test user and return its ID and token.
    pub async fn register_user(&self, name: Option<&str>) -> (Uuid, String) {
        let user = self
            .db
            .create_user(name)
            .await
            .expect("Failed to create test user");
        (user.id, user.token)
    }

    /// Format authorization header value.
    pub fn auth_header_value(token: &str) -> String {
        format!("Bearer {}", token)
    }

    /// Clean up test data for a user.
    ///
    /// Call this after tests to remove test data.
    pub async fn cleanup_user(&self, user_id: Uuid) {
        // Sessions cascade to answers; decks cascade to questions.
        let _ = sqlx::query("DELETE FROM sessions WHERE owner_id = $1")
            .bind(user_id)
            .execute(self.db.pool())
            .await;

        let _ = sqlx::query("DELETE FROM decks WHERE owner_id = $1")
            .bind(user_id)
            .execute(self.db.pool())
            .await;

        let _ = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(user_id)
            .execute(self.db.pool())
            .await;
    }
}
