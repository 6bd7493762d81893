use crate::core::config::AppState;
use crate::core::ctx::Ctx;
use crate::core::error::Result;
use crate::core::models::User;
use axum::extract::State;
use axum::Json;
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct MeResponse {
    pub success: bool,
    pub user: User,
}

/// GET /api/auth/me
pub async fn me(State(state): State<AppState>, ctx: Ctx) -> Result<Json<MeResponse>> {
    // The middleware already validated the session behind `ctx`.
    let user = state.auth.get_user(ctx.user_id()).await?;

    Ok(Json(MeResponse {
        success: true,
        user,
    }))
}
