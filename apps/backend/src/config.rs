//! Application configuration.
//!
//! Values come from the environment, after loading `.env` if present.

use std::str::FromStr;
use std::time::Duration;

use thiserror::Error;

use crate::services::evaluation::EvaluationPolicy;

pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 3000;
pub const DEFAULT_MAX_CONNECTIONS: u32 = 10;
pub const DEFAULT_EVALUATOR_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_EVALUATOR_MODEL: &str = "gpt-4o-mini";
pub const DEFAULT_QUEUE_CAPACITY: usize = 64;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("{key} has an invalid value: {value}")]
    Invalid { key: &'static str, value: String },
}

/// Connection settings for the text evaluator.
#[derive(Debug, Clone)]
pub struct EvaluatorConfig {
    pub base_url: String,
    pub api_key: Option<String>,
    pub model: String,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub host: String,
    pub port: u16,
    pub max_connections: u32,
    pub evaluator: EvaluatorConfig,
    pub evaluation: EvaluationPolicy,
    pub queue_capacity: usize,
    /// Queue a background evaluation whenever a free-text answer is submitted.
    pub evaluate_on_submit: bool,
}

impl Config {
    /// Load configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let database_url = get("DATABASE_URL").ok_or(ConfigError::Missing("DATABASE_URL"))?;
        let defaults = EvaluationPolicy::default();

        Ok(Self {
            database_url,
            host: get("HOST").unwrap_or_else(|| DEFAULT_HOST.to_string()),
            port: parse(&get, "PORT", DEFAULT_PORT)?,
            max_connections: parse(&get, "DATABASE_MAX_CONNECTIONS", DEFAULT_MAX_CONNECTIONS)?,
            evaluator: EvaluatorConfig {
                base_url: get("EVALUATOR_BASE_URL")
                    .unwrap_or_else(|| DEFAULT_EVALUATOR_BASE_URL.to_string()),
                api_key: get("EVALUATOR_API_KEY"),
                model: get("EVALUATOR_MODEL").unwrap_or_else(|| DEFAULT_EVALUATOR_MODEL.to_string()),
            },
            evaluation: EvaluationPolicy {
                timeout: Duration::from_secs(parse(
                    &get,
                    "EVALUATION_TIMEOUT_SECS",
                    defaults.timeout.as_secs(),
                )?),
                max_attempts: parse(&get, "EVALUATION_MAX_ATTEMPTS", defaults.max_attempts)?,
                concurrency: parse(&get, "EVALUATION_CONCURRENCY", defaults.concurrency)?,
            },
            queue_capacity: parse(&get, "EVALUATION_QUEUE_CAPACITY", DEFAULT_QUEUE_CAPACITY)?,
            evaluate_on_submit: parse(&get, "EVALUATE_ON_SUBMIT", false)?,
        })
    }

    /// Address the server binds to
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn parse<T, G>(get: &G, key: &'static str, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    G: Fn(&str) -> Option<String>,
{
    match get(key) {
        Some(value) => value.trim().parse().map_err(|_| ConfigError::Invalid { key, value }),
        None => Ok(default),
    }
}
