//! Post repository.

use std::sync::Arc;

use crate::deadline::{self, Deadline};
use crate::entities::{Post, post};
use crate::repositories::order;
use crate::views::PostSummary;
use mantel_common::{AppError, AppResult, Pagination, TimeSort};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbBackend, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, Set, Statement,
};
use tracing::debug;

const UPDATE_SQL: &str = r"
    UPDATE posts
    SET content = $1, version = version + 1, updated_at = NOW()
    WHERE id = $2 AND user_id = $3
    RETURNING id, user_id, content, created_at, updated_at, version
";

/// Post repository for database operations.
#[derive(Clone)]
pub struct PostRepository {
    db: Arc<DatabaseConnection>,
    timeout: Deadline,
}

impl PostRepository {
    /// Create a new post repository.
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

    /// Insert a post.
    pub async fn create(&self, user_id: i64, content: &str) -> AppResult<post::Model> {
        let model = post::ActiveModel {
            user_id: Set(user_id),
            content: Set(content.to_string()),
            ..Default::default()
        };

        let post = deadline::run(self.timeout, "posts.create", model.insert(self.db.as_ref())).await?;
        debug!(post_id = post.id, user_id, "Created post");
        Ok(post)
    }

    /// Find a post by ID.
    pub async fn find_by_id(&self, id: i64) -> AppResult<Option<post::Model>> {
        deadline::run(
            self.timeout,
            "posts.find_by_id",
            Post::find_by_id(id).one(self.db.as_ref()),
        )
        .await
    }

    /// Get a post by ID, returning an error if not found.
    pub async fn get_by_id(&self, id: i64) -> AppResult<post::Model> {
        self.find_by_id(id)
            .await?
            .ok_or(AppError::PostNotFound(id))
    }

    /// Check whether a post exists.
    pub async fn exists(&self, id: i64) -> AppResult<bool> {
        let count = deadline::run(
            self.timeout,
            "posts.exists",
            Post::find()
                .filter(post::Column::Id.eq(id))
                .count(self.db.as_ref()),
        )
        .await?;

        Ok(count > 0)
    }

    /// Replace the content of a post owned by `user_id`.
    ///
    /// `None` when no post with that id belongs to the user.
    pub async fn update_content(
        &self,
        id: i64,
        user_id: i64,
        content: &str,
    ) -> AppResult<Option<post::Model>> {
        deadline::run(
            self.timeout,
            "posts.update_content",
            Post::find()
                .from_raw_sql(Statement::from_sql_and_values(
                    DbBackend::Postgres,
                    UPDATE_SQL,
                    [content.into(), id.into(), user_id.into()],
                ))
                .one(self.db.as_ref()),
        )
        .await
    }

    /// Delete a post owned by `user_id`, returning the number of rows removed.
    pub async fn delete(&self, id: i64, user_id: i64) -> AppResult<u64> {
        let result = deadline::run(
            self.timeout,
            "posts.delete",
            Post::delete_many()
                .filter(post::Column::Id.eq(id))
                .filter(post::Column::UserId.eq(user_id))
                .exec(self.db.as_ref()),
        )
        .await?;

        debug!(post_id = id, user_id, rows = result.rows_affected, "Deleted post");
        Ok(result.rows_affected)
    }

    /// Posts authored by `user_id` in chronological order.
    pub async fn list_by_user(
        &self,
        user_id: i64,
        page: Pagination,
        sort: TimeSort,
    ) -> AppResult<Vec<PostSummary>> {
        let ordering = order(sort.direction());

        deadline::run(
            self.timeout,
            "posts.list_by_user",
            Post::find()
                .select_only()
                .columns([
                    post::Column::Id,
                    post::Column::UserId,
                    post::Column::Content,
                    post::Column::CreatedAt,
                ])
                .filter(post::Column::UserId.eq(user_id))
                .order_by(post::Column::CreatedAt, ordering.clone())
                .order_by(post::Column::Id, ordering)
                .limit(page.limit())
                .offset(page.offset())
                .into_model::<PostSummary>()
                .all(self.db.as_ref()),
        )
        .await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::Utc;
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult};

    fn create_test_post(id: i64, user_id: i64, content: &str) -> post::Model {
        post::Model {
            id,
            user_id,
            content: content.to_string(),
            created_at: Utc::now().into(),
            updated_at: Utc::now().into(),
            version: 1,
        }
    }

    #[tokio::test]
    async fn test_create() {
        let post = create_test_post(1, 10, "hello");
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[post.clone()]])
                .into_connection(),
        );

        let repo = PostRepository::new(db);
        assert_eq!(repo.create(10, "hello").await.unwrap(), post);
    }

    #[tokio::test]
    async fn test_get_by_id_not_found() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<post::Model>::new()])
                .into_connection(),
        );

        let repo = PostRepository::new(db);
        let err = repo.get_by_id(9).await.unwrap_err();
        assert!(matches!(err, AppError::PostNotFound(9)));
    }

    #[tokio::test]
    async fn test_update_content_by_other_user_matches_nothing() {
        let mut updated = create_test_post(1, 10, "edited");
        updated.version = 2;
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([vec![updated.clone()], vec![]])
                .into_connection(),
        );

        let repo = PostRepository::new(db);
        let own = repo.update_content(1, 10, "edited").await.unwrap().unwrap();
        assert_eq!(own.version, 2);
        assert!(repo.update_content(1, 11, "edited").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_delete_rows() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_exec_results([MockExecResult {
                    last_insert_id: 0,
                    rows_affected: 1,
                }])
                .into_connection(),
        );

        let repo = PostRepository::new(db);
        assert_eq!(repo.delete(1, 10).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_list_by_user_default_oldest_first() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<post::Model>::new()])
                .into_connection(),
        );

        let repo = PostRepository::new(db.clone());
        let posts = repo
            .list_by_user(10, Pagination::default(), TimeSort::Oldest)
            .await
            .unwrap();
        assert!(posts.is_empty());

        drop(repo);
        let db = Arc::try_unwrap(db).unwrap();
        let log = db.into_transaction_log();
        let sql = &log[0].statements()[0].sql;
        assert!(sql.contains(r#"ORDER BY "posts"."created_at" ASC, "posts"."id" ASC"#));
    }
}
