//! Test utilities for database operations.
//!
//! Integration tests run against a real `PostgreSQL` configured through
//! `TEST_DB_*` environment variables. Each [`TestDatabase`] gets its own
//! freshly migrated database so tests can run in parallel.

use std::sync::Arc;

use sea_orm::{ConnectionTrait, Database, DatabaseBackend, DatabaseConnection, DbErr, Statement};
use tracing::info;

use crate::entities::{friendship, post, user};
use crate::repositories::{
    FollowingRepository, FriendshipRepository, PostRepository, UserRepository,
};

/// Tables truncated by [`TestDatabase::reset`], children first.
const TABLES: [&str; 5] = ["likes", "friendships", "follows", "posts", "users"];

/// Test database configuration.
#[derive(Debug, Clone)]
pub struct TestDbConfig {
    /// Database host.
    pub host: String,
    /// Database port.
    pub port: u16,
    /// Database username.
    pub username: String,
    /// Database password.
    pub password: String,
    /// Database name.
    pub database: String,
}

impl Default for TestDbConfig {
    fn default() -> Self {
        Self {
            host: std::env::var("TEST_DB_HOST").unwrap_or_else(|_| "localhost".to_string()),
            port: std::env::var("TEST_DB_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(5433),
            username: std::env::var("TEST_DB_USER").unwrap_or_else(|_| "mantel_test".to_string()),
            password: std::env::var("TEST_DB_PASSWORD")
                .unwrap_or_else(|_| "mantel_test".to_string()),
            database: std::env::var("TEST_DB_NAME").unwrap_or_else(|_| "mantel_test".to_string()),
        }
    }
}

impl TestDbConfig {
    /// Get the database URL.
    #[must_use]
    pub fn database_url(&self) -> String {
        format!(
            "postgres://{}:{}@{}:{}/{}",
            self.username, self.password, self.host, self.port, self.database
        )
    }

    /// URL of the maintenance database used to create and drop test databases.
    #[must_use]
    pub fn postgres_url(&self) -> String {
        format!(
            "postgres://{}:{}@{}:{}/postgres",
            self.username, self.password, self.host, self.port
        )
    }
}

/// A migrated, uniquely named test database.
pub struct TestDatabase {
    /// Shared connection, ready to hand to repositories.
    pub conn: Arc<DatabaseConnection>,
    /// Database configuration.
    pub config: TestDbConfig,
}

impl TestDatabase {
    /// Create a fresh database with a unique name and run all migrations.
    pub async fn create_unique() -> Result<Self, DbErr> {
        let mut config = TestDbConfig::default();
        let unique_suffix = uuid::Uuid::new_v4().simple().to_string();
        config.database = format!("mantel_test_{}", &unique_suffix[..12]);

        let postgres_conn = Database::connect(&config.postgres_url()).await?;
        let create_db = format!("CREATE DATABASE \"{}\"", config.database);
        postgres_conn
            .execute(Statement::from_string(DatabaseBackend::Postgres, create_db))
            .await?;
        postgres_conn.close().await?;

        let conn = Database::connect(&config.database_url()).await?;
        {
            use sea_orm_migration::MigratorTrait;
            crate::migrations::Migrator::up(&conn, None).await?;
        }

        info!(database = %config.database, "Created test database");

        Ok(Self {
            conn: Arc::new(conn),
            config,
        })
    }

    /// Get the shared connection.
    #[must_use]
    pub fn connection(&self) -> Arc<DatabaseConnection> {
        Arc::clone(&self.conn)
    }

    /// Remove all rows and reset id sequences.
    pub async fn reset(&self) -> Result<(), DbErr> {
        let truncate = format!("TRUNCATE TABLE {} RESTART IDENTITY CASCADE", TABLES.join(", "));
        self.conn
            .execute(Statement::from_string(DatabaseBackend::Postgres, truncate))
            .await?;
        Ok(())
    }

    /// Drop the database. Fails if a repository still holds the connection.
    pub async fn drop_database(self) -> Result<(), DbErr> {
        let Self { conn, config } = self;
        match Arc::try_unwrap(conn) {
            Ok(conn) => conn.close().await?,
            Err(_) => return Err(DbErr::Custom("test connection still shared".to_string())),
        }

        let postgres_conn = Database::connect(&config.postgres_url()).await?;

        let terminate = format!(
            "SELECT pg_terminate_backend(pid) FROM pg_stat_activity WHERE datname = '{}'",
            config.database
        );
        postgres_conn
            .execute(Statement::from_string(DatabaseBackend::Postgres, terminate))
            .await
            .ok();

        let drop_db = format!("DROP DATABASE IF EXISTS \"{}\"", config.database);
        postgres_conn
            .execute(Statement::from_string(DatabaseBackend::Postgres, drop_db))
            .await?;
        postgres_conn.close().await?;

        info!(database = %config.database, "Dropped test database");
        Ok(())
    }

    /// Insert a user named `username` with a derived email.
    pub async fn seed_user(&self, username: &str) -> Result<user::Model, DbErr> {
        UserRepository::new(self.connection())
            .create(username, &format!("{username}@example.test"))
            .await
            .map_err(|e| DbErr::Custom(e.to_string()))
    }

    /// Insert a post by `user_id`.
    pub async fn seed_post(&self, user_id: i64, content: &str) -> Result<post::Model, DbErr> {
        PostRepository::new(self.connection())
            .create(user_id, content)
            .await
            .map_err(|e| DbErr::Custom(e.to_string()))
    }

    /// Make `follower_id` follow `followee_id`.
    pub async fn seed_follow(&self, follower_id: i64, followee_id: i64) -> Result<(), DbErr> {
        FollowingRepository::new(self.connection())
            .insert(follower_id, followee_id)
            .await
            .map(|_| ())
            .map_err(|e| DbErr::Custom(e.to_string()))
    }

    /// Create an accepted friendship between two users.
    pub async fn seed_friends(&self, sender_id: i64, receiver_id: i64) -> Result<(), DbErr> {
        let repo = FriendshipRepository::new(self.connection());
        let request = repo
            .insert_pending(sender_id, receiver_id)
            .await
            .map_err(|e| DbErr::Custom(e.to_string()))?
            .ok_or_else(|| DbErr::Custom("friendship already exists".to_string()))?;

        repo.transition(request.id, receiver_id, friendship::FriendshipStatus::Accepted)
            .await
            .map_err(|e| DbErr::Custom(e.to_string()))?
            .map(|_| ())
            .ok_or_else(|| DbErr::Custom("friend request not accepted".to_string()))
    }
}
