pub mod answers;
pub mod decks;
pub mod evaluation;
pub mod evaluator;
pub mod questions;
pub mod sessions;
