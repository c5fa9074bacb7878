//! Post service.

use mantel_common::{AppError, AppResult, Pagination, TimeSort};
use mantel_db::entities::post::{self, MAX_CONTENT_BYTES};
use mantel_db::repositories::{PostRepository, UserRepository};
use mantel_db::views::PostSummary;
use serde::Deserialize;
use tracing::info;
use validator::{Validate, ValidationError};

/// Input for creating or editing a post.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct PostInput {
    /// Post body.
    #[validate(custom(function = "validate_content"))]
    pub content: String,
}

/// Content must be non-empty and fit in [`MAX_CONTENT_BYTES`] bytes.
fn validate_content(content: &str) -> Result<(), ValidationError> {
    if content.is_empty() {
        return Err(ValidationError::new("empty").with_message("must be provided".into()));
    }
    if content.len() > MAX_CONTENT_BYTES {
        return Err(ValidationError::new("too_long")
            .with_message(format!("must not be more than {MAX_CONTENT_BYTES} bytes long").into()));
    }
    Ok(())
}

/// Post service for business logic.
#[derive(Clone)]
pub struct PostService {
    post_repo: PostRepository,
    user_repo: UserRepository,
}

impl PostService {
    /// Create a new post service.
    #[must_use]
    pub const fn new(post_repo: PostRepository, user_repo: UserRepository) -> Self {
        Self {
            post_repo,
            user_repo,
        }
    }

    /// Publish a post.
    pub async fn create(&self, user_id: i64, input: PostInput) -> AppResult<post::Model> {
        input.validate()?;

        let post = self.post_repo.create(user_id, &input.content).await?;
        info!(post_id = post.id, user_id, "Post created");
        Ok(post)
    }

    /// Get a post by ID.
    pub async fn get(&self, id: i64) -> AppResult<post::Model> {
        self.post_repo.get_by_id(id).await
    }

    /// Edit a post. Only the author can; anyone else sees `PostNotFound`.
    pub async fn update(&self, id: i64, user_id: i64, input: PostInput) -> AppResult<post::Model> {
        input.validate()?;

        let post = self
            .post_repo
            .update_content(id, user_id, &input.content)
            .await?
            .ok_or(AppError::PostNotFound(id))?;

        info!(post_id = id, user_id, version = post.version, "Post updated");
        Ok(post)
    }

    /// Delete a post. Only the author can.
    pub async fn delete(&self, id: i64, user_id: i64) -> AppResult<()> {
        if self.post_repo.delete(id, user_id).await? == 0 {
            return Err(AppError::PostNotFound(id));
        }

        info!(post_id = id, user_id, "Post deleted");
        Ok(())
    }

    /// Posts by an author.
    pub async fn by_user(
        &self,
        user_id: i64,
        page: Pagination,
        sort: TimeSort,
    ) -> AppResult<Vec<PostSummary>> {
        if !self.user_repo.exists(user_id).await? {
            return Err(AppError::UserNotFound(user_id));
        }

        self.post_repo.list_by_user(user_id, page, sort).await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::Utc;
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult, Value};
    use std::sync::Arc;

    fn input(content: &str) -> PostInput {
        PostInput {
            content: content.to_string(),
        }
    }

    fn service(db: MockDatabase) -> PostService {
        service_with_users(db, MockDatabase::new(DatabaseBackend::Postgres))
    }

    fn service_with_users(db: MockDatabase, user_db: MockDatabase) -> PostService {
        PostService::new(
            PostRepository::new(Arc::new(db.into_connection())),
            UserRepository::new(Arc::new(user_db.into_connection())),
        )
    }

    fn user_count(n: i64) -> MockDatabase {
        MockDatabase::new(DatabaseBackend::Postgres).append_query_results([[maplit::btreemap! {
            "num_items" => Value::BigInt(Some(n))
        }]])
    }

    #[test]
    fn test_content_limits_are_bytes() {
        assert!(input("").validate().is_err());
        assert!(input(&"a".repeat(500)).validate().is_ok());
        assert!(input(&"a".repeat(501)).validate().is_err());
        // 167 three-byte characters exceed the limit despite the short char count.
        assert!(input(&"あ".repeat(167)).validate().is_err());
    }

    #[tokio::test]
    async fn test_create_rejects_empty_content_before_io() {
        let service = service(MockDatabase::new(DatabaseBackend::Postgres));
        let err = service.create(1, input("")).await.unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[tokio::test]
    async fn test_create() {
        let post = post::Model {
            id: 1,
            user_id: 1,
            content: "hello".to_string(),
            created_at: Utc::now().into(),
            updated_at: Utc::now().into(),
            version: 1,
        };
        let service = service(
            MockDatabase::new(DatabaseBackend::Postgres).append_query_results([[post.clone()]]),
        );

        assert_eq!(service.create(1, input("hello")).await.unwrap(), post);
    }

    #[tokio::test]
    async fn test_update_by_non_author() {
        let service = service(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<post::Model>::new()]),
        );

        let err = service.update(1, 2, input("edit")).await.unwrap_err();
        assert!(matches!(err, AppError::PostNotFound(1)));
    }

    #[tokio::test]
    async fn test_delete_missing() {
        let service = service(MockDatabase::new(DatabaseBackend::Postgres).append_exec_results([
            MockExecResult {
                last_insert_id: 0,
                rows_affected: 0,
            },
        ]));

        let err = service.delete(1, 2).await.unwrap_err();
        assert!(matches!(err, AppError::PostNotFound(1)));
    }

    #[tokio::test]
    async fn test_by_unknown_user() {
        let service = service_with_users(MockDatabase::new(DatabaseBackend::Postgres), user_count(0));

        let err = service
            .by_user(8, Pagination::default(), TimeSort::Oldest)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::UserNotFound(8)));
    }

    #[tokio::test]
    async fn test_by_user_without_posts() {
        let service = service_with_users(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<post::Model>::new()]),
            user_count(1),
        );

        let posts = service
            .by_user(8, Pagination::default(), TimeSort::Oldest)
            .await
            .unwrap();
        assert!(posts.is_empty());
    }
}
