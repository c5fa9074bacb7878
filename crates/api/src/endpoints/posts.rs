//! Post and like endpoints.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use mantel_common::{AppResult, PageMeta, TimeSort};
use mantel_core::{LikeResult, PostInput};
use mantel_db::entities::{like, post as post_entity};
use mantel_db::views::LikeSummary;
use serde::Serialize;

use crate::{
    extractors::{AuthUser, ListQuery},
    middleware::AppState,
    response::{ApiResponse, no_content},
};

/// Single post response.
#[derive(Debug, Serialize)]
pub struct PostResponse {
    /// The post.
    pub post: post_entity::Model,
}

/// Stored like response.
#[derive(Debug, Serialize)]
pub struct LikeResponse {
    /// The stored like.
    pub like: like::Model,
}

/// Message-only response.
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    /// Human-readable outcome.
    pub message: &'static str,
}

/// Likes page.
#[derive(Debug, Serialize)]
pub struct LikesResponse {
    /// Likes on the post.
    pub likes: Vec<LikeSummary>,
    /// Page that was served.
    pub meta: PageMeta,
}

/// Like count response.
#[derive(Debug, Serialize)]
pub struct LikeCountResponse {
    /// Number of likes on the post.
    pub count: u64,
}

/// Publish a post.
async fn create(
    AuthUser(user_id): AuthUser,
    State(state): State<AppState>,
    Json(input): Json<PostInput>,
) -> AppResult<ApiResponse<PostResponse>> {
    let post = state.post_service.create(user_id, input).await?;
    Ok(ApiResponse::created(PostResponse { post }))
}

/// Show a post.
async fn show(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> AppResult<ApiResponse<PostResponse>> {
    let post = state.post_service.get(id).await?;
    Ok(ApiResponse::ok(PostResponse { post }))
}

/// Edit one of the caller's posts.
async fn update(
    AuthUser(user_id): AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(input): Json<PostInput>,
) -> AppResult<ApiResponse<PostResponse>> {
    let post = state.post_service.update(id, user_id, input).await?;
    Ok(ApiResponse::ok(PostResponse { post }))
}

/// Delete one of the caller's posts.
async fn remove(
    AuthUser(user_id): AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> AppResult<impl IntoResponse> {
    state.post_service.delete(id, user_id).await?;
    Ok(no_content())
}

/// Like a post.
async fn like_post(
    AuthUser(user_id): AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> AppResult<Response> {
    let response = match state.like_service.like(user_id, id).await? {
        LikeResult::Liked(like) => ApiResponse::created(LikeResponse { like }).into_response(),
        LikeResult::AlreadyLiked => ApiResponse::ok(MessageResponse {
            message: "post already liked",
        })
        .into_response(),
    };
    Ok(response)
}

/// Remove the caller's like.
async fn unlike_post(
    AuthUser(user_id): AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> AppResult<impl IntoResponse> {
    state.like_service.dislike(user_id, id).await?;
    Ok(no_content())
}

/// List likes on a post, newest first unless asked otherwise.
async fn likes(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Query(query): Query<ListQuery>,
) -> AppResult<ApiResponse<LikesResponse>> {
    let page = query.pagination(state.pagination);
    let likes = state
        .like_service
        .likes(id, page, TimeSort::parse(query.sort(), TimeSort::Newest))
        .await?;

    Ok(ApiResponse::ok(LikesResponse {
        likes,
        meta: page.meta(),
    }))
}

/// Count likes on a post.
async fn like_count(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> AppResult<ApiResponse<LikeCountResponse>> {
    let count = state.like_service.count(id).await?;
    Ok(ApiResponse::ok(LikeCountResponse { count }))
}

/// Routes for posts.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(create))
        .route("/{id}", get(show).patch(update).delete(remove))
        .route(
            "/{id}/likes",
            get(likes).post(like_post).delete(unlike_post),
        )
        .route("/{id}/likes/count", get(like_count))
}
