//! Auth handlers

use crate::chat;
use crate::core::auth::session::{cleared_cookie, session_cookie};
use crate::core::config::AppState;
use crate::core::error::Result;
use crate::core::extract::ApiJson;
use crate::core::models::User;
use axum::{
    extract::State,
    http::{header, StatusCode},
    response::IntoResponse,
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{info, warn};

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SignupRequest {
    pub full_name: String,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub success: bool,
    pub user: User,
}

/// POST /api/auth/signup
pub async fn signup(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<SignupRequest>,
) -> Result<impl IntoResponse> {
    info!("POST /api/auth/signup - {}", req.email);

    let (user, token) = state
        .auth
        .signup(&req.full_name, &req.email, &req.password)
        .await
        .inspect_err(|e| warn!("Signup failed for {}: {}", req.email, e))?;

    chat::sync_user(state.chat.as_ref(), &user).await;

    let cookie = session_cookie(&token, state.auth.session_ttl(), state.config.cookie_secure);
    Ok((
        StatusCode::CREATED,
        [(header::SET_COOKIE, cookie)],
        Json(AuthResponse {
            success: true,
            user,
        }),
    ))
}

/// POST /api/auth/login
pub async fn login(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<LoginRequest>,
) -> Result<impl IntoResponse> {
    info!("POST /api/auth/login - {}", req.email);

    let (user, token) = state
        .auth
        .login(&req.email, &req.password)
        .await
        .inspect_err(|e| warn!("Login failed for {}: {}", req.email, e))?;

    let cookie = session_cookie(&token, state.auth.session_ttl(), state.config.cookie_secure);
    Ok((
        [(header::SET_COOKIE, cookie)],
        Json(AuthResponse {
            success: true,
            user,
        }),
    ))
}

/// POST /api/auth/logout
pub async fn logout(State(state): State<AppState>) -> impl IntoResponse {
    info!("POST /api/auth/logout");
    (
        [(header::SET_COOKIE, cleared_cookie(state.config.cookie_secure))],
        Json(json!({ "success": true, "message": "Logout successful" })),
    )
}
