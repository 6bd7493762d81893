use crate::chat;
use crate::core::auth::OnboardingProfile;
use crate::core::config::AppState;
use crate::core::ctx::Ctx;
use crate::core::error::Result;
use crate::core::extract::ApiJson;
use axum::{extract::State, Json};
use tracing::info;

use super::auth::AuthResponse;

/// POST /api/auth/onboarding
pub async fn onboard(
    State(state): State<AppState>,
    ctx: Ctx,
    ApiJson(profile): ApiJson<OnboardingProfile>,
) -> Result<Json<AuthResponse>> {
    info!("POST /api/auth/onboarding - {}", ctx.user_id());

    let user = state
        .auth
        .complete_onboarding(ctx.user_id(), profile)
        .await?;

    chat::sync_user(state.chat.as_ref(), &user).await;

    Ok(Json(AuthResponse {
        success: true,
        user,
    }))
}
