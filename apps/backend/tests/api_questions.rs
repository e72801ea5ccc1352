//! Questions API tests.
//!
//! These tests require a running PostgreSQL database.
//! Set DATABASE_URL environment variable before running.

mod common;

use axum::http::{header::AUTHORIZATION, StatusCode};
use pretty_assertions::assert_eq;
use serde_json::json;

use common::fixtures;
use common::TestContext;

#[tokio::test]
#[ignore = "requires database"]
async fn test_questions_are_ordered_by_insertion() {
    let ctx = TestContext::new().await;
    let server = ctx.server();
    let (user_id, token) = ctx.register_user(None).await;
    let deck_id = fixtures::create_deck(&server, &token, "Mixed").await;

    fixtures::create_question(&server, &token, deck_id, fixtures::capitals_match()).await;
    fixtures::create_question(&server, &token, deck_id, fixtures::primes_multiple_choice()).await;
    fixtures::create_question(&server, &token, deck_id, fixtures::free_text("Explain")).await;

    let response = server
        .get(&format!("/api/decks/{deck_id}/questions"))
        .add_header(AUTHORIZATION, TestContext::auth_header_value(&token))
        .await;

    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    let questions = body["questions"].as_array().unwrap();

    let kinds: Vec<&str> = questions.iter().map(|q| q["type"].as_str().unwrap()).collect();
    assert_eq!(kinds, vec!["match", "multiple_choice", "free_text"]);

    let orders: Vec<i64> = questions.iter().map(|q| q["order"].as_i64().unwrap()).collect();
    assert_eq!(orders, vec![0, 1, 2]);

    ctx.cleanup_user(user_id).await;
}

#[tokio::test]
#[ignore = "requires database"]
async fn test_create_question_rejects_out_of_range_choice() {
    let ctx = TestContext::new().await;
    let server = ctx.server();
    let (user_id, token) = ctx.register_user(None).await;
    let deck_id = fixtures::create_deck(&server, &token, "Broken").await;

    let response = server
        .post(&format!("/api/decks/{deck_id}/questions"))
        .add_header(AUTHORIZATION, TestContext::auth_header_value(&token))
        .json(&json!({
            "type": "multiple_choice",
            "question": "Pick one",
            "choices": ["a", "b"],
            "correct_indices": [2]
        }))
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);

    ctx.cleanup_user(user_id).await;
}

#[tokio::test]
#[ignore = "requires database"]
async fn test_create_question_in_foreign_deck_is_not_found() {
    let ctx = TestContext::new().await;
    let server = ctx.server();
    let (owner_id, owner_token) = ctx.register_user(None).await;
    let (other_id, other_token) = ctx.register_user(None).await;
    let deck_id = fixtures::create_deck(&server, &owner_token, "Mine").await;

    let response = server
        .post(&format!("/api/decks/{deck_id}/questions"))
        .add_header(AUTHORIZATION, TestContext::auth_header_value(&other_token))
        .json(&fixtures::free_text("Intruder"))
        .await;

    response.assert_status(StatusCode::NOT_FOUND);
    assert_eq!(ctx.db.count_questions(deck_id).await.unwrap(), 0);

    ctx.cleanup_user(owner_id).await;
    ctx.cleanup_user(other_id).await;
}

#[tokio::test]
#[ignore = "requires database"]
async fn test_update_question_keeps_kind() {
    let ctx = TestContext::new().await;
    let server = ctx.server();
    let (user_id, token) = ctx.register_user(None).await;
    let deck_id = fixtures::create_deck(&server, &token, "Editable").await;
    let question_id =
        fixtures::create_question(&server, &token, deck_id, fixtures::free_text("Old")).await;

    let response = server
        .put(&format!("/api/questions/{question_id}"))
        .add_header(AUTHORIZATION, TestContext::auth_header_value(&token))
        .json(&fixtures::free_text("New"))
        .await;
    response.assert_status(StatusCode::NO_CONTENT);

    let response = server
        .put(&format!("/api/questions/{question_id}"))
        .add_header(AUTHORIZATION, TestContext::auth_header_value(&token))
        .json(&fixtures::capitals_match())
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);

    let stored = ctx.db.get_question(question_id).await.unwrap().unwrap();
    assert_eq!(stored.body.0.prompt_text(), "New");

    ctx.cleanup_user(user_id).await;
}

#[tokio::test]
#[ignore = "requires database"]
async fn test_delete_question() {
    let ctx = TestContext::new().await;
    let server = ctx.server();
    let (user_id, token) = ctx.register_user(None).await;
    let deck_id = fixtures::create_deck(&server, &token, "Shrinking").await;
    let question_id =
        fixtures::create_question(&server, &token, deck_id, fixtures::free_text("Gone")).await;

    let response = server
        .delete(&format!("/api/questions/{question_id}"))
        .add_header(AUTHORIZATION, TestContext::auth_header_value(&token))
        .await;
    response.assert_status(StatusCode::NO_CONTENT);

    assert_eq!(ctx.db.count_questions(deck_id).await.unwrap(), 0);

    ctx.cleanup_user(user_id).await;
}

#[tokio::test]
#[ignore = "requires database"]
async fn test_order_is_not_renumbered_after_delete() {
    let ctx = TestContext::new().await;
    let server = ctx.server();
    let (user_id, token) = ctx.register_user(None).await;
    let deck_id = fixtures::create_deck(&server, &token, "Append only").await;

    let first = fixtures::create_question(&server, &token, deck_id, fixtures::free_text("a")).await;
    fixtures::create_question(&server, &token, deck_id, fixtures::free_text("b")).await;

    let response = server
        .delete(&format!("/api/questions/{first}"))
        .add_header(AUTHORIZATION, TestContext::auth_header_value(&token))
        .await;
    response.assert_status(StatusCode::NO_CONTENT);

    fixtures::create_question(&server, &token, deck_id, fixtures::free_text("c")).await;

    let response = server
        .get(&format!("/api/decks/{deck_id}/questions"))
        .add_header(AUTHORIZATION, TestContext::auth_header_value(&token))
        .await;
    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    let questions = body["questions"].as_array().unwrap();

    let orders: Vec<i64> = questions.iter().map(|q| q["order"].as_i64().unwrap()).collect();
    assert_eq!(orders, vec![1, 1]);

    let mut prompts: Vec<&str> = questions.iter().map(|q| q["prompt"].as_str().unwrap()).collect();
    prompts.sort_unstable();
    assert_eq!(prompts, vec!["b", "c"]);

    ctx.cleanup_user(user_id).await;
}
