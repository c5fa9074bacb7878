//! API middleware and shared state.

use axum::{body::Body, http::Request, middleware::Next, response::Response};
use mantel_common::PaginationDefaults;
use mantel_core::{
    FeedService, FollowingService, FriendshipService, LikeService, PostService, Services,
    UserService,
};
use tracing::debug;

use crate::extractors::AuthenticatedUser;

/// Header carrying the acting user's id, set by the authenticating gateway.
pub const USER_ID_HEADER: &str = "x-user-id";

/// Application state.
#[derive(Clone)]
pub struct AppState {
    /// Follow graph operations.
    pub following_service: FollowingService,
    /// Friend requests and friendships.
    pub friendship_service: FriendshipService,
    /// Likes on posts.
    pub like_service: LikeService,
    /// Post storage.
    pub post_service: PostService,
    /// Home feed.
    pub feed_service: FeedService,
    /// User profiles.
    pub user_service: UserService,
    /// Fallbacks for listing parameters.
    pub pagination: PaginationDefaults,
}

impl AppState {
    /// Build the state from wired services and pagination defaults.
    #[must_use]
    pub fn new(services: Services, pagination: PaginationDefaults) -> Self {
        Self {
            following_service: services.following,
            friendship_service: services.friendship,
            like_service: services.like,
            post_service: services.post,
            feed_service: services.feed,
            user_service: services.user,
            pagination,
        }
    }
}

/// Authentication middleware.
///
/// Token verification happens upstream; this only lifts the resolved user id
/// into the request extensions. Requests without a valid id stay anonymous.
pub async fn auth_middleware(mut req: Request<Body>, next: Next) -> Response {
    let user_id = req
        .headers()
        .get(USER_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.trim().parse::<i64>().ok());

    if let Some(id) = user_id {
        req.extensions_mut().insert(AuthenticatedUser(id));
    } else if req.headers().contains_key(USER_ID_HEADER) {
        debug!("Ignoring malformed user id header");
    }

    next.run(req).await
}
