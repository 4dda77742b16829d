//! Route table and handlers.

mod accounts;
mod questions;
mod replies;
mod votes;

use axum::{
    Json, Router,
    routing::{get, post},
};
use serde_json::{Value, json};

use crate::error::AppError;
use crate::state::AppState;

/// Build the application routes. Middleware is layered by [`crate::app`].
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health))
        .route("/", get(questions::list))
        .route("/question/{id}", get(questions::detail))
        .route("/question/{id}/answer", post(questions::answer))
        .route("/ask", post(questions::ask))
        .route("/answer-or-comment", post(replies::answer_or_comment))
        .route("/vote", post(votes::vote))
        .route("/register", post(accounts::register))
        .route("/login", post(accounts::login))
        .route("/logout", post(accounts::logout))
        .route("/logouts", post(accounts::logout))
        .route("/dashboard", get(accounts::dashboard))
}

async fn health() -> Json<Value> {
    Json(json!({ "ok": true }))
}

/// Parse a numeric id from a form field; a malformed id is a validation error.
fn form_id(field: &str, raw: &str) -> Result<i64, AppError> {
    raw.trim()
        .parse()
        .map_err(|_| AppError::validation(field, "Enter a whole number."))
}

/// Parse a numeric id from the URL path; a malformed id is simply not found.
fn path_id(raw: &str) -> Result<i64, AppError> {
    raw.parse()
        .map_err(|_| AppError::NotFound(format!("question {raw}")))
}
