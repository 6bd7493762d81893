use crate::chat::{issue_credentials, ChatCredentials};
use crate::core::config::AppState;
use crate::core::ctx::Ctx;
use crate::core::error::Result;
use axum::{extract::State, Json};
use tracing::info;

/// GET /api/chat/token
pub async fn chat_token(State(state): State<AppState>, ctx: Ctx) -> Result<Json<ChatCredentials>> {
    info!("GET /api/chat/token - {}", ctx.user_id());

    let user = state.auth.get_user(ctx.user_id()).await?;
    let credentials = issue_credentials(state.chat.as_ref(), &user)?;

    Ok(Json(credentials))
}
