//! Core business logic for mantel.
//!
//! Services check invariants (self-edges, unknown targets, content limits)
//! before any storage call and turn repository outcomes into explicit
//! result enums.

pub mod services;

pub use services::*;

use mantel_db::Repositories;

/// Every service, built over one set of repositories.
#[derive(Clone)]
pub struct Services {
    /// Follow edges.
    pub following: FollowingService,
    /// Friend requests and friendships.
    pub friendship: FriendshipService,
    /// Likes on posts.
    pub like: LikeService,
    /// Posts.
    pub post: PostService,
    /// Home feed.
    pub feed: FeedService,
    /// User profiles.
    pub user: UserService,
}

impl Services {
    /// Wire services to their repositories.
    #[must_use]
    pub fn new(repos: Repositories) -> Self {
        Self {
            following: FollowingService::new(repos.following.clone(), repos.user.clone()),
            friendship: FriendshipService::new(repos.friendship.clone(), repos.user.clone()),
            like: LikeService::new(repos.like, repos.post.clone()),
            post: PostService::new(repos.post, repos.user.clone()),
            feed: FeedService::new(repos.feed),
            user: UserService::new(repos.user, repos.following, repos.friendship),
        }
    }
}
