pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod routes;
pub mod services;

use std::sync::Arc;

use axum::{
    middleware,
    routing::{get, post, put},
    Router,
};
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::Config;
use crate::db::Database;
use crate::services::evaluation::{self, EvaluationQueue};
use crate::services::evaluator::OpenAiEvaluator;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub db: Arc<Database>,
    pub evaluations: EvaluationQueue,
    pub config: Arc<Config>,
}

/// Build the HTTP router. Every `/api` route except registration resolves
/// the bearer token into a [`routes::auth::Caller`] first.
pub fn router(state: AppState) -> Router {
    let api_routes = Router::new()
        // User routes
        .route("/api/users/me", get(routes::users::me))
        // Deck routes
        .route("/api/decks", get(routes::decks::list).post(routes::decks::create))
        .route(
            "/api/decks/:deck_id",
            get(routes::decks::get)
                .put(routes::decks::update)
                .delete(routes::decks::remove),
        )
        // Question routes
        .route(
            "/api/decks/:deck_id/questions",
            get(routes::questions::list).post(routes::questions::create),
        )
        .route(
            "/api/questions/:question_id",
            put(routes::questions::update).delete(routes::questions::remove),
        )
        // Session routes
        .route("/api/sessions", post(routes::sessions::create))
        .route("/api/sessions/:session_id", get(routes::sessions::get))
        .route(
            "/api/sessions/:session_id/complete",
            post(routes::sessions::complete),
        )
        .route(
            "/api/sessions/:session_id/results",
            get(routes::sessions::results),
        )
        // Answer routes
        .route(
            "/api/sessions/:session_id/answers",
            get(routes::sessions::list_answers).post(routes::sessions::submit_answer),
        )
        .route(
            "/api/answers/:answer_id/evaluate",
            post(routes::sessions::evaluate),
        )
        .layer(middleware::from_fn_with_state(
            state.clone(),
            routes::auth::resolve_caller,
        ));

    Router::new()
        .route("/health", get(health_check))
        .route("/api/users/register", post(routes::users::register))
        .merge(api_routes)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive()),
        )
        .with_state(state)
}

pub async fn run() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env()?;

    tracing::info!("Connecting to database...");
    let db = Arc::new(Database::connect(&config.database_url, config.max_connections).await?);

    tracing::info!("Running migrations...");
    db.run_migrations().await?;

    if config.evaluator.api_key.is_none() {
        tracing::warn!("EVALUATOR_API_KEY is not set; free-text evaluation will fail");
    }
    let evaluator = Arc::new(OpenAiEvaluator::new(
        config.evaluator.base_url.clone(),
        config.evaluator.api_key.clone(),
        config.evaluator.model.clone(),
    ));

    let (evaluations, receiver) = EvaluationQueue::channel(config.queue_capacity);
    let worker = evaluation::spawn_worker(
        db.clone(),
        evaluator,
        config.evaluation.clone(),
        receiver,
    );

    let addr = config.bind_addr();
    let state = AppState {
        db,
        evaluations,
        config: Arc::new(config),
    };
    let app = router(state);

    tracing::info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    worker.abort();
    Ok(())
}

async fn health_check() -> &'static str {
    "OK"
}
