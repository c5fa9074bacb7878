//! Like repository.

use std::sync::Arc;

use crate::deadline::{self, Deadline};
use crate::entities::{Like, like};
use crate::repositories::order;
use crate::views::LikeSummary;
use mantel_common::{AppResult, Pagination, TimeSort};
use sea_orm::{
    ColumnTrait, DatabaseConnection, DbBackend, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect, Statement,
};
use tracing::debug;

const INSERT_SQL: &str = r"
    INSERT INTO likes (user_id, post_id)
    VALUES ($1, $2)
    ON CONFLICT (user_id, post_id) DO NOTHING
    RETURNING id, user_id, post_id, created_at
";

/// Like repository for database operations.
#[derive(Clone)]
pub struct LikeRepository {
    db: Arc<DatabaseConnection>,
    timeout: Deadline,
}

impl LikeRepository {
    /// Create a new like repository.
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

    /// Insert a like. `None` when the user already likes the post.
    pub async fn insert(&self, user_id: i64, post_id: i64) -> AppResult<Option<like::Model>> {
        let row = deadline::run(
            self.timeout,
            "likes.insert",
            Like::find()
                .from_raw_sql(Statement::from_sql_and_values(
                    DbBackend::Postgres,
                    INSERT_SQL,
                    [user_id.into(), post_id.into()],
                ))
                .one(self.db.as_ref()),
        )
        .await?;

        debug!(user_id, post_id, created = row.is_some(), "Inserted like");
        Ok(row)
    }

    /// Delete a like, returning the number of rows removed.
    pub async fn delete(&self, user_id: i64, post_id: i64) -> AppResult<u64> {
        let result = deadline::run(
            self.timeout,
            "likes.delete",
            Like::delete_many()
                .filter(like::Column::UserId.eq(user_id))
                .filter(like::Column::PostId.eq(post_id))
                .exec(self.db.as_ref()),
        )
        .await?;

        debug!(user_id, post_id, rows = result.rows_affected, "Deleted like");
        Ok(result.rows_affected)
    }

    /// Likes on a post in chronological order.
    pub async fn list_for_post(
        &self,
        post_id: i64,
        page: Pagination,
        sort: TimeSort,
    ) -> AppResult<Vec<LikeSummary>> {
        let ordering = order(sort.direction());

        deadline::run(
            self.timeout,
            "likes.list_for_post",
            Like::find()
                .select_only()
                .column(like::Column::UserId)
                .column(like::Column::CreatedAt)
                .filter(like::Column::PostId.eq(post_id))
                .order_by(like::Column::CreatedAt, ordering.clone())
                .order_by(like::Column::Id, ordering)
                .limit(page.limit())
                .offset(page.offset())
                .into_model::<LikeSummary>()
                .all(self.db.as_ref()),
        )
        .await
    }

    /// Number of likes on a post.
    pub async fn count_for_post(&self, post_id: i64) -> AppResult<u64> {
        deadline::run(
            self.timeout,
            "likes.count_for_post",
            Like::find()
                .filter(like::Column::PostId.eq(post_id))
                .count(self.db.as_ref()),
        )
        .await
    }
}
