//! Database layer for mantel.

pub mod deadline;
pub mod entities;
pub mod migrations;
pub mod repositories;
pub mod test_utils;
pub mod views;

use std::sync::Arc;
use std::time::Duration;

use mantel_common::config::DatabaseConfig;
use deadline::Deadline;
use mantel_common::{AppError, Config};
use repositories::{
    FeedRepository, FollowingRepository, FriendshipRepository, LikeRepository, PostRepository,
    UserRepository,
};
use sea_orm::{ConnectOptions, Database, DatabaseConnection};
use tracing::log::LevelFilter;

/// Initialize database connection.
pub async fn init(config: &Config) -> Result<DatabaseConnection, AppError> {
    let mut opt = ConnectOptions::new(connection_url(&config.database));

    opt.max_connections(config.database.max_connections)
        .min_connections(config.database.min_connections)
        .connect_timeout(Duration::from_secs(10))
        .acquire_timeout(config.database.query_timeout())
        .idle_timeout(Duration::from_secs(600))
        .max_lifetime(Duration::from_secs(1800))
        .sqlx_logging(true)
        .sqlx_logging_level(LevelFilter::Debug);

    Database::connect(opt)
        .await
        .map_err(|e| AppError::Database(e.to_string()))
}

/// Run pending migrations.
pub async fn migrate(db: &DatabaseConnection) -> Result<(), AppError> {
    use sea_orm_migration::MigratorTrait;
    migrations::Migrator::up(db, None)
        .await
        .map_err(|e| AppError::Database(e.to_string()))
}

/// Connection URL with `statement_timeout` applied to every session.
fn connection_url(config: &DatabaseConfig) -> String {
    let separator = if config.url.contains('?') { '&' } else { '?' };
    format!(
        "{}{separator}options=-c%20statement_timeout%3D{}",
        config.url,
        config.statement_timeout_ms()
    )
}

/// Every repository over one shared pool, all using the same deadline.
#[derive(Clone)]
pub struct Repositories {
    /// Follow edges.
    pub following: FollowingRepository,
    /// Friendship rows and transitions.
    pub friendship: FriendshipRepository,
    /// Likes on posts.
    pub like: LikeRepository,
    /// Posts.
    pub post: PostRepository,
    /// Users.
    pub user: UserRepository,
    /// Feed query.
    pub feed: FeedRepository,
}

impl Repositories {
    /// Build all repositories over `db` with the given per-call deadline.
    #[must_use]
    pub fn new(db: Arc<DatabaseConnection>, deadline: impl Into<Deadline>) -> Self {
        let deadline = deadline.into();
        Self {
            following: FollowingRepository::new(Arc::clone(&db)).with_deadline(deadline),
            friendship: FriendshipRepository::new(Arc::clone(&db)).with_deadline(deadline),
            like: LikeRepository::new(Arc::clone(&db)).with_deadline(deadline),
            post: PostRepository::new(Arc::clone(&db)).with_deadline(deadline),
            user: UserRepository::new(Arc::clone(&db)).with_deadline(deadline),
            feed: FeedRepository::new(db).with_deadline(deadline),
        }
    }
}
