//! Like service.

use mantel_common::{AppError, AppResult, Pagination, TimeSort};
use mantel_db::entities::like;
use mantel_db::repositories::{LikeRepository, PostRepository};
use mantel_db::views::LikeSummary;
use tracing::info;

/// Outcome of liking a post.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LikeResult {
    /// The like was stored.
    Liked(like::Model),
    /// The user already liked the post; nothing changed.
    AlreadyLiked,
}

/// Like service for business logic.
#[derive(Clone)]
pub struct LikeService {
    like_repo: LikeRepository,
    post_repo: PostRepository,
}

impl LikeService {
    /// Create a new like service.
    #[must_use]
    pub const fn new(like_repo: LikeRepository, post_repo: PostRepository) -> Self {
        Self {
            like_repo,
            post_repo,
        }
    }

    /// Like a post.
    pub async fn like(&self, user_id: i64, post_id: i64) -> AppResult<LikeResult> {
        self.ensure_post(post_id).await?;

        match self.like_repo.insert(user_id, post_id).await? {
            Some(row) => {
                info!(user_id, post_id, "Post liked");
                Ok(LikeResult::Liked(row))
            }
            None => Ok(LikeResult::AlreadyLiked),
        }
    }

    /// Remove a like.
    ///
    /// Unlike unfollowing, removing a like that does not exist is an error.
    pub async fn dislike(&self, user_id: i64, post_id: i64) -> AppResult<()> {
        if self.like_repo.delete(user_id, post_id).await? == 0 {
            return Err(AppError::NotFound(format!(
                "like by user {user_id} on post {post_id}"
            )));
        }

        info!(user_id, post_id, "Post unliked");
        Ok(())
    }

    /// Likes on a post.
    pub async fn likes(
        &self,
        post_id: i64,
        page: Pagination,
        sort: TimeSort,
    ) -> AppResult<Vec<LikeSummary>> {
        self.ensure_post(post_id).await?;
        self.like_repo.list_for_post(post_id, page, sort).await
    }

    /// Number of likes on a post.
    pub async fn count(&self, post_id: i64) -> AppResult<u64> {
        self.ensure_post(post_id).await?;
        self.like_repo.count_for_post(post_id).await
    }

    async fn ensure_post(&self, post_id: i64) -> AppResult<()> {
        if self.post_repo.exists(post_id).await? {
            Ok(())
        } else {
            Err(AppError::PostNotFound(post_id))
        }
    }
}
