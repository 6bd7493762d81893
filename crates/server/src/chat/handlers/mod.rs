//! Chat Handlers and Router

use crate::core::AppState;
use axum::{routing::get, Router};

pub mod token;

pub fn router() -> Router<AppState> {
    Router::new().route("/chat/token", get(token::chat_token))
}
