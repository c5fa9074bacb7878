//! Friendship endpoints.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::{get, patch, post},
};
use mantel_common::{AppResult, PageMeta, TimeSort};
use mantel_db::entities::friendship::{self, FriendshipStatus};
use mantel_db::repositories::RequestDirection;
use sea_orm::prelude::DateTimeWithTimeZone;
use serde::{Deserialize, Serialize};

use crate::{
    extractors::{AuthUser, ListQuery},
    middleware::AppState,
    response::ApiResponse,
};

/// Send friend request.
#[derive(Debug, Deserialize)]
pub struct SendRequest {
    /// User the request is sent to.
    pub receiver_id: i64,
}

/// Send result response.
#[derive(Debug, Serialize)]
pub struct SendResponse {
    /// Human-readable outcome.
    pub message: &'static str,
    /// When the row was first stored.
    pub created_at: DateTimeWithTimeZone,
    /// Current status of the pair.
    pub status: FriendshipStatus,
    /// Whether this call created the row.
    pub created: bool,
}

/// Patch request. The status is raw text so unknown values reach the
/// service and come back as `INVALID_STATUS`.
#[derive(Debug, Deserialize)]
pub struct PatchRequest {
    /// Target status: `accepted` or `blocked`.
    pub status: String,
}

/// Patched friendship response.
#[derive(Debug, Serialize)]
pub struct FriendshipResponse {
    /// The updated friendship.
    pub friendship: friendship::Model,
}

/// Pending requests page.
#[derive(Debug, Serialize)]
pub struct PendingResponse {
    /// Pending requests.
    pub requests: Vec<friendship::Model>,
    /// Page that was served.
    pub meta: PageMeta,
}

/// Send a friend request.
async fn send(
    AuthUser(user_id): AuthUser,
    State(state): State<AppState>,
    Json(req): Json<SendRequest>,
) -> AppResult<ApiResponse<SendResponse>> {
    let result = state
        .friendship_service
        .send_request(user_id, req.receiver_id)
        .await?;

    let row = result.friendship();
    let body = SendResponse {
        message: if result.created() {
            "friend request sent"
        } else {
            "friendship already exists"
        },
        created_at: row.created_at,
        status: row.status,
        created: result.created(),
    };

    Ok(if result.created() {
        ApiResponse::created(body)
    } else {
        ApiResponse::ok(body)
    })
}

/// Accept or block a received request.
async fn update(
    AuthUser(user_id): AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(req): Json<PatchRequest>,
) -> AppResult<ApiResponse<FriendshipResponse>> {
    let friendship = state
        .friendship_service
        .patch(id, user_id, &req.status)
        .await?;
    Ok(ApiResponse::ok(FriendshipResponse { friendship }))
}

/// List pending requests sent (`by=sent`, default) or received.
async fn pending(
    AuthUser(user_id): AuthUser,
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> AppResult<ApiResponse<PendingResponse>> {
    let page = query.pagination(state.pagination);
    let requests = state
        .friendship_service
        .pending(
            user_id,
            RequestDirection::parse(query.by.as_deref()),
            page,
            TimeSort::parse(query.sort(), TimeSort::Newest),
        )
        .await?;

    Ok(ApiResponse::ok(PendingResponse {
        requests,
        meta: page.meta(),
    }))
}

/// Routes for friend requests.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(send))
        .route("/pending", get(pending))
        .route("/{id}", patch(update))
}
