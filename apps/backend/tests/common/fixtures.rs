//! Request bodies and small helpers shared by the API tests.

use axum::http::header::AUTHORIZATION;
use axum_test::TestServer;
use serde_json::{json, Value};
use uuid::Uuid;

use super::TestContext;

pub fn deck_request(name: &str) -> Value {
    json!({ "name": name, "description": "test deck" })
}

/// A match question whose answers are all distinct.
pub fn capitals_match() -> Value {
    json!({
        "type": "match",
        "pairs": [
            { "question": "France", "answer": "Paris" },
            { "question": "Italy", "answer": "Rome" }
        ]
    })
}

/// A multiple-choice question with two correct choices.
pub fn primes_multiple_choice() -> Value {
    json!({
        "type": "multiple_choice",
        "question": "Which are prime?",
        "choices": ["2", "3", "4", "6"],
        "correct_indices": [0, 1]
    })
}

pub fn free_text(prompt: &str) -> Value {
    json!({ "type": "free_text", "prompt": prompt })
}

pub fn match_answer(pairs: &[(usize, usize)]) -> Value {
    let match_answers: Vec<Value> = pairs
        .iter()
        .map(|(q, a)| json!({ "question_index": q, "answer_index": a }))
        .collect();
    json!({ "type": "match", "match_answers": match_answers })
}

pub fn choice_answer(selected: &[usize]) -> Value {
    json!({ "type": "multiple_choice", "selected_indices": selected })
}

pub fn text_answer(text: &str) -> Value {
    json!({ "type": "free_text", "text_answer": text })
}

pub fn submit_request(question_id: Uuid, response: Value) -> Value {
    json!({ "question_id": question_id, "response": response })
}

fn id_of(body: &Value) -> Uuid {
    body["id"]
        .as_str()
        .and_then(|id| id.parse().ok())
        .expect("response carries an id")
}

/// Create a deck through the API and return its id.
pub async fn create_deck(server: &TestServer, token: &str, name: &str) -> Uuid {
    let response = server
        .post("/api/decks")
        .add_header(AUTHORIZATION, TestContext::auth_header_value(token))
        .json(&deck_request(name))
        .await;
    response.assert_status(axum::http::StatusCode::CREATED);
    id_of(&response.json())
}

/// Add a question to a deck through the API and return its id.
pub async fn create_question(server: &TestServer, token: &str, deck_id: Uuid, body: Value) -> Uuid {
    let response = server
        .post(&format!("/api/decks/{deck_id}/questions"))
        .add_header(AUTHORIZATION, TestContext::auth_header_value(token))
        .json(&body)
        .await;
    response.assert_status(axum::http::StatusCode::CREATED);
    id_of(&response.json())
}

/// Start a session through the API and return its id.
pub async fn create_session(server: &TestServer, token: &str, deck_id: Uuid, mode: &str) -> Uuid {
    let response = server
        .post("/api/sessions")
        .add_header(AUTHORIZATION, TestContext::auth_header_value(token))
        .json(&json!({ "deck_id": deck_id, "mode": mode }))
        .await;
    response.assert_status(axum::http::StatusCode::CREATED);
    id_of(&response.json())
}
