//! User repository.

use std::sync::Arc;

use crate::deadline::{self, Deadline};
use crate::entities::{User, user};
use mantel_common::{AppError, AppResult};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    Set,
};

/// User repository for database operations.
#[derive(Clone)]
pub struct UserRepository {
    db: Arc<DatabaseConnection>,
    timeout: Deadline,
}

impl UserRepository {
    /// Create a new user repository.
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

    /// Find a user by ID.
    pub async fn find_by_id(&self, id: i64) -> AppResult<Option<user::Model>> {
        deadline::run(
            self.timeout,
            "users.find_by_id",
            User::find_by_id(id).one(self.db.as_ref()),
        )
        .await
    }

    /// Get a user by ID, returning an error if not found.
    pub async fn get_by_id(&self, id: i64) -> AppResult<user::Model> {
        self.find_by_id(id)
            .await?
            .ok_or(AppError::UserNotFound(id))
    }

    /// Check whether a user exists.
    pub async fn exists(&self, id: i64) -> AppResult<bool> {
        let count = deadline::run(
            self.timeout,
            "users.exists",
            User::find()
                .filter(user::Column::Id.eq(id))
                .count(self.db.as_ref()),
        )
        .await?;

        Ok(count > 0)
    }

    /// Create a user. A taken username or email yields `AppError::Duplicate`.
    pub async fn create(&self, username: &str, email: &str) -> AppResult<user::Model> {
        let model = user::ActiveModel {
            username: Set(username.to_string()),
            email: Set(email.to_string()),
            ..Default::default()
        };

        deadline::run(self.timeout, "users.create", model.insert(self.db.as_ref())).await
    }
}
