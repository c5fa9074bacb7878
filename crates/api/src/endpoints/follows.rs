//! Follow endpoints.

use axum::{
    Json, Router,
    extract::{Path, State},
    response::IntoResponse,
    routing::{delete, post},
};
use mantel_common::AppResult;
use serde::{Deserialize, Serialize};

use crate::{
    extractors::AuthUser,
    middleware::AppState,
    response::{ApiResponse, no_content},
};

/// Follow request.
#[derive(Debug, Deserialize)]
pub struct FollowRequest {
    /// User to follow.
    pub followee_id: i64,
}

/// Follow result response.
#[derive(Debug, Serialize)]
pub struct FollowResponse {
    /// Human-readable outcome.
    pub message: &'static str,
    /// Whether this call created the row.
    pub created: bool,
}

/// Follow a user.
async fn follow(
    AuthUser(user_id): AuthUser,
    State(state): State<AppState>,
    Json(req): Json<FollowRequest>,
) -> AppResult<ApiResponse<FollowResponse>> {
    let result = state
        .following_service
        .follow(user_id, req.followee_id)
        .await?;

    let message = if result.created() {
        "followed"
    } else {
        "already following"
    };

    Ok(ApiResponse::ok(FollowResponse {
        message,
        created: result.created(),
    }))
}

/// Unfollow a user.
async fn unfollow(
    AuthUser(user_id): AuthUser,
    State(state): State<AppState>,
    Path(followee_id): Path<i64>,
) -> AppResult<impl IntoResponse> {
    state.following_service.unfollow(user_id, followee_id).await?;
    Ok(no_content())
}

/// Routes for follows.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(follow))
        .route("/{followee_id}", delete(unfollow))
}
