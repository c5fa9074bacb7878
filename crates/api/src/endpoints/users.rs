//! Per-user graph and post listings.

use axum::{
    Router,
    extract::{Path, Query, State},
    routing::get,
};
use mantel_common::{AppResult, PageMeta, TimeSort, UserSort};
use mantel_core::UserProfile;
use mantel_db::views::{FollowCounts, PostSummary, RelationshipStatus, UserSummary};
use serde::Serialize;

use crate::{
    extractors::{AuthUser, ListQuery},
    middleware::AppState,
    response::ApiResponse,
};

/// Followers page.
#[derive(Debug, Serialize)]
pub struct FollowersResponse {
    /// Users following the subject.
    pub followers: Vec<UserSummary>,
    /// Page that was served.
    pub meta: PageMeta,
}

/// Followees page.
#[derive(Debug, Serialize)]
pub struct FollowingResponse {
    /// Users the subject follows.
    pub following: Vec<UserSummary>,
    /// Page that was served.
    pub meta: PageMeta,
}

/// Friends page.
#[derive(Debug, Serialize)]
pub struct FriendsResponse {
    /// Accepted friends.
    pub friends: Vec<UserSummary>,
    /// Page that was served.
    pub meta: PageMeta,
}

/// Posts page.
#[derive(Debug, Serialize)]
pub struct PostsResponse {
    /// The user's posts.
    pub posts: Vec<PostSummary>,
    /// Page that was served.
    pub meta: PageMeta,
}

/// Relationship status response.
#[derive(Debug, Serialize)]
pub struct FriendshipStatusResponse {
    /// Relationship between the caller and the user.
    pub status: RelationshipStatus,
}

/// User lookup response.
#[derive(Debug, Serialize)]
pub struct UserResponse {
    /// The user with graph totals.
    pub user: UserProfile,
}

/// Follow check response.
#[derive(Debug, Serialize)]
pub struct FollowStatusResponse {
    /// Whether the user follows the followee.
    pub following: bool,
}

/// Show a user with follower, following and friend counts.
async fn show(
    State(state): State<AppState>,
    Path(user_id): Path<i64>,
) -> AppResult<ApiResponse<UserResponse>> {
    let user = state.user_service.profile(user_id).await?;
    Ok(ApiResponse::ok(UserResponse { user }))
}

/// Whether `id` follows `followee_id`.
async fn follow_status(
    State(state): State<AppState>,
    Path((user_id, followee_id)): Path<(i64, i64)>,
) -> AppResult<ApiResponse<FollowStatusResponse>> {
    let following = state
        .following_service
        .is_following(user_id, followee_id)
        .await?;
    Ok(ApiResponse::ok(FollowStatusResponse { following }))
}

/// List a user's followers.
async fn followers(
    State(state): State<AppState>,
    Path(user_id): Path<i64>,
    Query(query): Query<ListQuery>,
) -> AppResult<ApiResponse<FollowersResponse>> {
    let page = query.pagination(state.pagination);
    let followers = state
        .following_service
        .followers(user_id, page, UserSort::parse(query.sort()))
        .await?;

    Ok(ApiResponse::ok(FollowersResponse {
        followers,
        meta: page.meta(),
    }))
}

/// List the users a user follows.
async fn following(
    State(state): State<AppState>,
    Path(user_id): Path<i64>,
    Query(query): Query<ListQuery>,
) -> AppResult<ApiResponse<FollowingResponse>> {
    let page = query.pagination(state.pagination);
    let following = state
        .following_service
        .following(user_id, page, UserSort::parse(query.sort()))
        .await?;

    Ok(ApiResponse::ok(FollowingResponse {
        following,
        meta: page.meta(),
    }))
}

/// Follower and following counts.
async fn follow_data(
    State(state): State<AppState>,
    Path(user_id): Path<i64>,
) -> AppResult<ApiResponse<FollowCounts>> {
    let counts = state.following_service.counts(user_id).await?;
    Ok(ApiResponse::ok(counts))
}

/// List a user's accepted friends.
async fn friends(
    State(state): State<AppState>,
    Path(user_id): Path<i64>,
    Query(query): Query<ListQuery>,
) -> AppResult<ApiResponse<FriendsResponse>> {
    let page = query.pagination(state.pagination);
    let friends = state.friendship_service.friends(user_id, page).await?;

    Ok(ApiResponse::ok(FriendsResponse {
        friends,
        meta: page.meta(),
    }))
}

/// Relationship between the caller and a user.
async fn friendship(
    AuthUser(me): AuthUser,
    State(state): State<AppState>,
    Path(user_id): Path<i64>,
) -> AppResult<ApiResponse<FriendshipStatusResponse>> {
    let status = state.friendship_service.status_between(me, user_id).await?;
    Ok(ApiResponse::ok(FriendshipStatusResponse { status }))
}

/// List a user's posts, oldest first unless asked otherwise.
async fn posts(
    State(state): State<AppState>,
    Path(user_id): Path<i64>,
    Query(query): Query<ListQuery>,
) -> AppResult<ApiResponse<PostsResponse>> {
    let page = query.pagination(state.pagination);
    let posts = state
        .post_service
        .by_user(user_id, page, TimeSort::parse(query.sort(), TimeSort::Oldest))
        .await?;

    Ok(ApiResponse::ok(PostsResponse {
        posts,
        meta: page.meta(),
    }))
}

/// Routes for users.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/{id}", get(show))
        .route("/{id}/follows/{followee_id}", get(follow_status))
        .route("/{id}/followers", get(followers))
        .route("/{id}/following", get(following))
        .route("/{id}/follow-data", get(follow_data))
        .route("/{id}/friends", get(friends))
        .route("/{id}/friendship", get(friendship))
        .route("/{id}/posts", get(posts))
}
