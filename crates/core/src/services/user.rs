//! User service.

use mantel_common::AppResult;
use mantel_db::repositories::{FollowingRepository, FriendshipRepository, UserRepository};
use serde::Serialize;

/// Public view of a user with graph totals.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserProfile {
    /// User ID.
    pub id: i64,
    /// Username.
    pub username: String,
    /// Users following this user.
    pub followers_count: i64,
    /// Users this user follows.
    pub following_count: i64,
    /// Accepted friendships, in either direction.
    pub friends_count: u64,
}

/// User service for business logic.
#[derive(Clone)]
pub struct UserService {
    user_repo: UserRepository,
    following_repo: FollowingRepository,
    friendship_repo: FriendshipRepository,
}

impl UserService {
    /// Create a new user service.
    #[must_use]
    pub const fn new(
        user_repo: UserRepository,
        following_repo: FollowingRepository,
        friendship_repo: FriendshipRepository,
    ) -> Self {
        Self {
            user_repo,
            following_repo,
            friendship_repo,
        }
    }

    /// Look up a user with follower, following and friend totals.
    pub async fn profile(&self, user_id: i64) -> AppResult<UserProfile> {
        let user = self.user_repo.get_by_id(user_id).await?;
        let counts = self.following_repo.count_edges(user_id).await?;
        let friends_count = self.friendship_repo.count_accepted(user_id).await?;

        Ok(UserProfile {
            id: user.id,
            username: user.username,
            followers_count: counts.followers_count,
            following_count: counts.following_count,
            friends_count,
        })
    }
}
