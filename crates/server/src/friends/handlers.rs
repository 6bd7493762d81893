//! Friend Request Handlers

use crate::core::config::AppState;
use crate::core::ctx::Ctx;
use crate::core::error::Result;
use crate::core::models::{FriendRequest, FriendRequestSummary, IncomingRequests, PublicProfile};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post, put},
    Json, Router,
};
use serde::Serialize;
use tracing::info;

#[derive(Debug, Serialize)]
pub struct AcceptResponse {
    pub message: String,
    pub request: FriendRequest,
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/users", get(recommended_users))
        .route("/users/friends", get(my_friends))
        .route("/users/friend-request/{id}", post(send_friend_request))
        .route("/users/friend-request/{id}/accept", put(accept_friend_request))
        .route("/users/friend-requests", get(friend_requests))
        .route("/users/outgoing-friend-requests", get(outgoing_friend_requests))
}

/// GET /api/users
pub async fn recommended_users(
    State(state): State<AppState>,
    ctx: Ctx,
) -> Result<Json<Vec<PublicProfile>>> {
    Ok(Json(state.friends.list_recommendations(ctx.user_id()).await?))
}

/// GET /api/users/friends
pub async fn my_friends(
    State(state): State<AppState>,
    ctx: Ctx,
) -> Result<Json<Vec<PublicProfile>>> {
    Ok(Json(state.friends.list_friends(ctx.user_id()).await?))
}

/// POST /api/users/friend-request/{id}
pub async fn send_friend_request(
    State(state): State<AppState>,
    ctx: Ctx,
    Path(recipient_id): Path<String>,
) -> Result<(StatusCode, Json<FriendRequest>)> {
    info!("POST /api/users/friend-request/{} - {}", recipient_id, ctx.user_id());

    let request = state
        .friends
        .send_request(ctx.user_id(), &recipient_id)
        .await?;
    Ok((StatusCode::CREATED, Json(request)))
}

/// PUT /api/users/friend-request/{id}/accept
pub async fn accept_friend_request(
    State(state): State<AppState>,
    ctx: Ctx,
    Path(request_id): Path<String>,
) -> Result<Json<AcceptResponse>> {
    info!("PUT /api/users/friend-request/{}/accept - {}", request_id, ctx.user_id());

    let request = state
        .friends
        .accept_request(&request_id, ctx.user_id())
        .await?;
    Ok(Json(AcceptResponse {
        message: "Friend request accepted".to_string(),
        request,
    }))
}

/// GET /api/users/friend-requests
pub async fn friend_requests(
    State(state): State<AppState>,
    ctx: Ctx,
) -> Result<Json<IncomingRequests>> {
    Ok(Json(state.friends.list_incoming_requests(ctx.user_id()).await?))
}

/// GET /api/users/outgoing-friend-requests
pub async fn outgoing_friend_requests(
    State(state): State<AppState>,
    ctx: Ctx,
) -> Result<Json<Vec<FriendRequestSummary>>> {
    Ok(Json(state.friends.list_outgoing_requests(ctx.user_id()).await?))
}
