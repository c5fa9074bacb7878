//! Feed repository.
//!
//! The audience (self, followees, accepted friends) and the post selection
//! are one statement, so a page is always a consistent snapshot.

use std::sync::Arc;

use crate::deadline::{self, Deadline};
use crate::repositories::bounds;
use crate::views::PostSummary;
use mantel_common::{AppResult, Pagination};
use sea_orm::{DatabaseConnection, DbBackend, FromQueryResult, Statement};
use tracing::debug;

const FEED_SQL: &str = r"
    WITH audience AS (
        SELECT $1::BIGINT AS user_id
        UNION
        SELECT followee_id FROM follows WHERE follower_id = $1
        UNION
        SELECT CASE WHEN sender_id = $1 THEN receiver_id ELSE sender_id END
        FROM friendships
        WHERE status = 'accepted' AND (sender_id = $1 OR receiver_id = $1)
    )
    SELECT p.id, p.user_id, p.content, p.created_at
    FROM posts p
    JOIN audience a ON a.user_id = p.user_id
    ORDER BY p.created_at DESC, p.id DESC
    LIMIT $2 OFFSET $3
";

/// Feed repository for database operations.
#[derive(Clone)]
pub struct FeedRepository {
    db: Arc<DatabaseConnection>,
    timeout: Deadline,
}

impl FeedRepository {
    /// Create a new feed repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self {
            db,
            timeout: Deadline::DEFAULT,
        }
    }

    /// Override the per-call deadline.
    #[must_use]
    pub const fn with_deadline(mut self, deadline: Deadline) -> Self {
        self.timeout = deadline;
        self
    }

    /// Posts visible to `user_id`, newest first.
    pub async fn fetch(&self, user_id: i64, page: Pagination) -> AppResult<Vec<PostSummary>> {
        let (limit, offset) = bounds(&page);

        let posts = deadline::run(
            self.timeout,
            "feed.fetch",
            PostSummary::find_by_statement(Statement::from_sql_and_values(
                DbBackend::Postgres,
                FEED_SQL,
                [user_id.into(), limit.into(), offset.into()],
            ))
            .all(self.db.as_ref()),
        )
        .await?;

        debug!(user_id, page = page.page, count = posts.len(), "Fetched feed");
        Ok(posts)
    }
}
