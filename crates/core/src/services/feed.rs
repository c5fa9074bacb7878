//! Feed service.

use mantel_common::{AppResult, Pagination};
use mantel_db::repositories::FeedRepository;
use mantel_db::views::PostSummary;

/// Feed service for business logic.
#[derive(Clone)]
pub struct FeedService {
    feed_repo: FeedRepository,
}

impl FeedService {
    /// Create a new feed service.
    #[must_use]
    pub const fn new(feed_repo: FeedRepository) -> Self {
        Self { feed_repo }
    }

    /// Posts by the user, their followees and their accepted friends,
    /// newest first.
    pub async fn fetch(&self, user_id: i64, page: Pagination) -> AppResult<Vec<PostSummary>> {
        self.feed_repo.fetch(user_id, page).await
    }
}
