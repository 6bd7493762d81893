//! Core Router
//!
//! Mounts every service router under `/api`. Everything except signup,
//! login and logout sits behind the session middleware.

use crate::core::auth::handlers as auth_handlers;
use crate::core::auth::middleware::mw_require_auth;
use crate::core::AppState;
use crate::{chat, friends};
use axum::{
    middleware,
    routing::{get, post},
    Router,
};

pub fn router(state: AppState) -> Router {
    let public = Router::new()
        .route("/auth/signup", post(auth_handlers::signup))
        .route("/auth/login", post(auth_handlers::login))
        .route("/auth/logout", post(auth_handlers::logout));

    let protected = Router::new()
        .route("/auth/me", get(auth_handlers::me))
        .route("/auth/onboarding", post(auth_handlers::onboard))
        .merge(friends::router())
        .merge(chat::router())
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            mw_require_auth,
        ));

    Router::new()
        .nest("/api", public.merge(protected))
        .route("/health", get(health_check))
        .with_state(state)
}

async fn health_check() -> &'static str {
    "OK - Streamify API"
}
