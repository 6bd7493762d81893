use crate::core::auth::session::token_from_headers;
use crate::core::config::AppState;
use crate::core::ctx::Ctx;
use crate::core::error::{Error, Result};
use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use tracing::debug;

pub async fn mw_require_auth(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response> {
    debug!("MIDDLEWARE: require_auth");

    let token = token_from_headers(req.headers())
        .ok_or_else(|| Error::Unauthorized("Unauthorized - No token provided".to_string()))?;

    let user = state.auth.authenticate(&token).await?;

    req.extensions_mut().insert(Ctx::new(user.id));

    Ok(next.run(req).await)
}
