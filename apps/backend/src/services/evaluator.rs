//! Free-text answer evaluation through an OpenAI-compatible chat API.

use std::future::Future;
use std::time::Duration;

use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Fixed instruction framing the model as a subject-matter evaluator.
pub const SYSTEM_INSTRUCTION: &str = "You are an expert subject-matter evaluator reviewing \
student answers. Provide constructive feedback on the student's answer, noting what they got \
right and what could be improved. Be encouraging but accurate. Keep your response concise \
(2-3 sentences).";

/// Returned when the model produces no content.
pub const FALLBACK_FEEDBACK: &str = "Unable to evaluate answer.";

#[derive(Debug, Error)]
pub enum EvaluatorError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("Backend error: {status} - {message}")]
    Backend { status: u16, message: String },

    #[error("Timed out after {0:?}")]
    Timeout(Duration),

    #[error("Parse error: {0}")]
    Parse(String),
}

/// External service that turns a question and a student answer into feedback.
pub trait TextEvaluator: Send + Sync + 'static {
    fn evaluate(
        &self,
        question: &str,
        answer: &str,
    ) -> impl Future<Output = Result<String, EvaluatorError>> + Send;
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage>,
}

#[derive(Debug, Serialize)]
struct ChatMessage {
    role: &'static str,
    content: String,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChatChoiceMessage {
    content: Option<String>,
}

impl ChatResponse {
    fn feedback(self) -> String {
        self.choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .filter(|c| !c.trim().is_empty())
            .unwrap_or_else(|| FALLBACK_FEEDBACK.to_string())
    }
}

/// Build the user message sent alongside the system instruction.
pub fn user_prompt(question: &str, answer: &str) -> String {
    format!("Question: {question}\n\nStudent Answer: {answer}\n\nProvide feedback on this answer.")
}

fn chat_request<'a>(model: &'a str, question: &str, answer: &str) -> ChatRequest<'a> {
    ChatRequest {
        model,
        messages: vec![
            ChatMessage {
                role: "system",
                content: SYSTEM_INSTRUCTION.to_string(),
            },
            ChatMessage {
                role: "user",
                content: user_prompt(question, answer),
            },
        ],
    }
}

/// Chat-completions client.
pub struct OpenAiEvaluator {
    client: Client,
    base_url: String,
    api_key: Option<String>,
    model: String,
}

impl OpenAiEvaluator {
    pub fn new(base_url: String, api_key: Option<String>, model: String) -> Self {
        Self {
            client: Client::new(),
            base_url,
            api_key,
            model,
        }
    }

    fn completions_url(&self) -> String {
        format!("{}/chat/completions", self.base_url.trim_end_matches('/'))
    }
}

impl TextEvaluator for OpenAiEvaluator {
    async fn evaluate(&self, question: &str, answer: &str) -> Result<String, EvaluatorError> {
        let mut request = self
            .client
            .post(self.completions_url())
            .json(&chat_request(&self.model, question, answer));

        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }

        let response = request
            .send()
            .await
            .map_err(|e| EvaluatorError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(EvaluatorError::Backend {
                status: status.as_u16(),
                message,
            });
        }

        let body: ChatResponse = response
            .json()
            .await
            .map_err(|e| EvaluatorError::Parse(e.to_string()))?;

        Ok(body.feedback())
    }
}
