//! Following service.

use mantel_common::{AppError, AppResult, Pagination, UserSort};
use mantel_db::repositories::{FollowingRepository, UserRepository};
use mantel_db::views::{FollowCounts, UserSummary};
use serde::Serialize;
use tracing::info;

/// Outcome of a follow request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FollowResult {
    /// A new edge was created.
    Followed,
    /// The edge already existed; nothing changed.
    AlreadyFollowing,
}

impl FollowResult {
    /// Whether this call created the edge.
    #[must_use]
    pub const fn created(self) -> bool {
        matches!(self, Self::Followed)
    }
}

/// Following service for business logic.
#[derive(Clone)]
pub struct FollowingService {
    following_repo: FollowingRepository,
    user_repo: UserRepository,
}

impl FollowingService {
    /// Create a new following service.
    #[must_use]
    pub const fn new(following_repo: FollowingRepository, user_repo: UserRepository) -> Self {
        Self {
            following_repo,
            user_repo,
        }
    }

    /// Follow a user.
    pub async fn follow(&self, follower_id: i64, followee_id: i64) -> AppResult<FollowResult> {
        if follower_id == followee_id {
            return Err(AppError::SelfFollow);
        }

        if !self.user_repo.exists(followee_id).await? {
            return Err(AppError::UserNotFound(followee_id));
        }

        if self.following_repo.insert(follower_id, followee_id).await? {
            info!(follower_id, followee_id, "User followed");
            Ok(FollowResult::Followed)
        } else {
            Ok(FollowResult::AlreadyFollowing)
        }
    }

    /// Unfollow a user. Unfollowing someone you don't follow is a no-op.
    pub async fn unfollow(&self, follower_id: i64, followee_id: i64) -> AppResult<()> {
        let rows = self.following_repo.delete(follower_id, followee_id).await?;
        if rows > 0 {
            info!(follower_id, followee_id, "User unfollowed");
        }
        Ok(())
    }

    /// Check if a user is following another user.
    pub async fn is_following(&self, follower_id: i64, followee_id: i64) -> AppResult<bool> {
        self.ensure_user(follower_id).await?;
        self.following_repo.exists(follower_id, followee_id).await
    }

    /// Users following `user_id`.
    pub async fn followers(
        &self,
        user_id: i64,
        page: Pagination,
        sort: UserSort,
    ) -> AppResult<Vec<UserSummary>> {
        self.ensure_user(user_id).await?;
        self.following_repo.list_followers(user_id, page, sort).await
    }

    /// Users that `user_id` follows.
    pub async fn following(
        &self,
        user_id: i64,
        page: Pagination,
        sort: UserSort,
    ) -> AppResult<Vec<UserSummary>> {
        self.ensure_user(user_id).await?;
        self.following_repo.list_followees(user_id, page, sort).await
    }

    /// Follower and followee totals.
    pub async fn counts(&self, user_id: i64) -> AppResult<FollowCounts> {
        self.ensure_user(user_id).await?;
        self.following_repo.count_edges(user_id).await
    }

    async fn ensure_user(&self, user_id: i64) -> AppResult<()> {
        if self.user_repo.exists(user_id).await? {
            Ok(())
        } else {
            Err(AppError::UserNotFound(user_id))
        }
    }
}
