pub mod auth;
pub mod decks;
pub mod questions;
pub mod sessions;
pub mod users;
