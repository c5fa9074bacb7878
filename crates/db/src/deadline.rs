//! Per-call query deadline and storage error mapping.
//!
//! Every repository call runs under a client-side deadline, and every pooled
//! session carries a server-side `statement_timeout`. Either one firing
//! surfaces as [`AppError::Timeout`] carrying the limit that fired, distinct
//! from [`AppError::Database`]. On client expiry the in-flight future is
//! dropped, which releases its pooled connection.

use std::future::Future;
use std::time::Duration;

use mantel_common::config::DatabaseConfig;
use mantel_common::{AppError, AppResult};
use sea_orm::{DbErr, RuntimeErr, SqlErr};
use tracing::warn;

/// Deadline used when a repository is built without an explicit one.
pub const DEFAULT_QUERY_TIMEOUT: Duration = Duration::from_secs(3);

/// `PostgreSQL` SQLSTATE for `query_canceled` (raised by `statement_timeout`).
const QUERY_CANCELED: &str = "57014";

/// The two limits a repository call runs under.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Deadline {
    /// Client-side limit enforced around the whole call.
    pub query: Duration,
    /// Server-side `statement_timeout` configured on every session.
    pub statement: Duration,
}

impl Deadline {
    /// [`DEFAULT_QUERY_TIMEOUT`] on both sides.
    pub const DEFAULT: Self = Self::uniform(DEFAULT_QUERY_TIMEOUT);

    /// Build a deadline from explicit client and server limits.
    #[must_use]
    pub const fn new(query: Duration, statement: Duration) -> Self {
        Self { query, statement }
    }

    /// Same limit on both sides.
    #[must_use]
    pub const fn uniform(limit: Duration) -> Self {
        Self::new(limit, limit)
    }

    /// Limits taken from the database configuration.
    #[must_use]
    pub fn from_config(config: &DatabaseConfig) -> Self {
        Self::new(
            config.query_timeout(),
            Duration::from_millis(config.statement_timeout_ms()),
        )
    }
}

impl Default for Deadline {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl From<Duration> for Deadline {
    fn from(limit: Duration) -> Self {
        Self::uniform(limit)
    }
}

/// Await `fut` under `deadline`, mapping storage errors into [`AppError`].
///
/// `op` names the call in logs.
pub async fn run<T, F>(deadline: Deadline, op: &'static str, fut: F) -> AppResult<T>
where
    F: Future<Output = Result<T, DbErr>>,
{
    match tokio::time::timeout(deadline.query, fut).await {
        Ok(result) => result.map_err(|e| map_db_err(op, deadline, e)),
        Err(_) => {
            warn!(
                op,
                side = "client",
                timeout_ms = deadline.query.as_millis(),
                "Query deadline exceeded"
            );
            Err(AppError::Timeout(deadline.query))
        }
    }
}

/// Convert a sea-orm error into the application error space.
pub fn map_db_err(op: &'static str, deadline: Deadline, err: DbErr) -> AppError {
    let code = sqlstate(&err);
    classify(op, deadline, code.as_deref(), err)
}

fn classify(op: &'static str, deadline: Deadline, code: Option<&str>, err: DbErr) -> AppError {
    if code == Some(QUERY_CANCELED) {
        warn!(
            op,
            side = "server",
            timeout_ms = deadline.statement.as_millis(),
            "Statement cancelled by statement_timeout"
        );
        return AppError::Timeout(deadline.statement);
    }

    if let Some(SqlErr::UniqueConstraintViolation(detail)) = err.sql_err() {
        return AppError::Duplicate(detail);
    }

    AppError::Database(err.to_string())
}

fn sqlstate(err: &DbErr) -> Option<String> {
    match err {
        DbErr::Query(RuntimeErr::SqlxError(e)) | DbErr::Exec(RuntimeErr::SqlxError(e)) => e
            .as_database_error()
            .and_then(|db| db.code())
            .map(|code| code.into_owned()),
        _ => None,
    }
}
