//! Friendship repository.
//!
//! One row per unordered pair. Every pair lookup goes through the canonical
//! `(LEAST, GREATEST)` form, which is also what the unique index covers.

use std::sync::Arc;

use crate::deadline::{self, Deadline};
use crate::entities::friendship::{self, FriendshipStatus};
use crate::entities::Friendship;
use crate::repositories::{bounds, order};
use crate::views::{RelationshipStatus, UserSummary};
use mantel_common::{AppResult, Pagination, TimeSort};
use sea_orm::{
    ColumnTrait, Condition, DatabaseConnection, DbBackend, EntityTrait, FromQueryResult,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Statement,
};
use tracing::debug;

const INSERT_PENDING_SQL: &str = r"
    INSERT INTO friendships (sender_id, receiver_id, status)
    VALUES ($1, $2, 'pending')
    ON CONFLICT DO NOTHING
    RETURNING id, sender_id, receiver_id, status, created_at, updated_at, version
";

const FIND_PAIR_SQL: &str = r"
    SELECT id, sender_id, receiver_id, status, created_at, updated_at, version
    FROM friendships
    WHERE LEAST(sender_id, receiver_id) = $1
        AND GREATEST(sender_id, receiver_id) = $2
";

const STATUS_SQL: &str = r"
    SELECT COALESCE(
        (SELECT status FROM friendships
         WHERE LEAST(sender_id, receiver_id) = $1
            AND GREATEST(sender_id, receiver_id) = $2),
        'none'
    ) AS status
";

// Allowed source states are fixed per target; nothing caller-supplied is
// spliced into these statements.
const ACCEPT_SQL: &str = r"
    UPDATE friendships
    SET status = 'accepted', version = version + 1, updated_at = NOW()
    WHERE id = $1 AND receiver_id = $2 AND status = 'pending'
    RETURNING id, sender_id, receiver_id, status, created_at, updated_at, version
";

const BLOCK_SQL: &str = r"
    UPDATE friendships
    SET status = 'blocked', version = version + 1, updated_at = NOW()
    WHERE id = $1 AND receiver_id = $2 AND status IN ('pending', 'accepted')
    RETURNING id, sender_id, receiver_id, status, created_at, updated_at, version
";

const LIST_FRIENDS_SQL: &str = r"
    SELECT u.id, u.username
    FROM friendships f
    JOIN users u
        ON u.id = CASE WHEN f.sender_id = $1 THEN f.receiver_id ELSE f.sender_id END
    WHERE f.status = 'accepted'
        AND (f.sender_id = $1 OR f.receiver_id = $1)
    ORDER BY u.username ASC, u.id ASC
    LIMIT $2 OFFSET $3
";

/// Which side of pending requests to list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RequestDirection {
    /// Requests the user sent.
    #[default]
    Sent,
    /// Requests waiting for the user.
    Received,
}

impl RequestDirection {
    /// Parse a raw `by` value. Unknown values select [`RequestDirection::Sent`].
    #[must_use]
    pub fn parse(raw: Option<&str>) -> Self {
        match raw.map(|s| s.trim().to_ascii_lowercase()).as_deref() {
            Some("received") => Self::Received,
            _ => Self::Sent,
        }
    }
}

#[derive(FromQueryResult)]
struct StatusRow {
    status: String,
}

/// Friendship repository for database operations.
#[derive(Clone)]
pub struct FriendshipRepository {
    db: Arc<DatabaseConnection>,
    timeout: Deadline,
}

impl FriendshipRepository {
    /// Create a new friendship repository.
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

    /// Insert a pending request. Returns `None` when a row already exists for
    /// the pair, in either direction.
    pub async fn insert_pending(
        &self,
        sender_id: i64,
        receiver_id: i64,
    ) -> AppResult<Option<friendship::Model>> {
        let row = deadline::run(
            self.timeout,
            "friendships.insert_pending",
            Friendship::find()
                .from_raw_sql(Statement::from_sql_and_values(
                    DbBackend::Postgres,
                    INSERT_PENDING_SQL,
                    [sender_id.into(), receiver_id.into()],
                ))
                .one(self.db.as_ref()),
        )
        .await?;

        debug!(sender_id, receiver_id, created = row.is_some(), "Inserted friend request");
        Ok(row)
    }

    /// Find the row for an unordered pair.
    pub async fn find_between(
        &self,
        a: i64,
        b: i64,
    ) -> AppResult<Option<friendship::Model>> {
        let (low, high) = canonical(a, b);

        deadline::run(
            self.timeout,
            "friendships.find_between",
            Friendship::find()
                .from_raw_sql(Statement::from_sql_and_values(
                    DbBackend::Postgres,
                    FIND_PAIR_SQL,
                    [low.into(), high.into()],
                ))
                .one(self.db.as_ref()),
        )
        .await
    }

    /// Status of the pair, `none` when there is no row. Symmetric in `a`/`b`.
    pub async fn status_between(&self, a: i64, b: i64) -> AppResult<RelationshipStatus> {
        let (low, high) = canonical(a, b);

        let row = deadline::run(
            self.timeout,
            "friendships.status_between",
            StatusRow::find_by_statement(Statement::from_sql_and_values(
                DbBackend::Postgres,
                STATUS_SQL,
                [low.into(), high.into()],
            ))
            .one(self.db.as_ref()),
        )
        .await?;

        Ok(row.map_or(RelationshipStatus::None, |r| RelationshipStatus::from_db(&r.status)))
    }

    /// Move request `id` to `target` if `receiver_id` is its receiver and the
    /// current status is an allowed source for `target`.
    ///
    /// `None` means no row matched: missing id, wrong receiver, or a
    /// disallowed source state. `Pending` is never a valid target and also
    /// yields `None` without touching storage.
    pub async fn transition(
        &self,
        id: i64,
        receiver_id: i64,
        target: FriendshipStatus,
    ) -> AppResult<Option<friendship::Model>> {
        let sql = match target {
            FriendshipStatus::Accepted => ACCEPT_SQL,
            FriendshipStatus::Blocked => BLOCK_SQL,
            FriendshipStatus::Pending => return Ok(None),
        };

        let row = deadline::run(
            self.timeout,
            "friendships.transition",
            Friendship::find()
                .from_raw_sql(Statement::from_sql_and_values(
                    DbBackend::Postgres,
                    sql,
                    [id.into(), receiver_id.into()],
                ))
                .one(self.db.as_ref()),
        )
        .await?;

        debug!(id, receiver_id, %target, applied = row.is_some(), "Friendship transition");
        Ok(row)
    }

    /// Pending requests sent or received by `user_id`.
    pub async fn list_pending(
        &self,
        user_id: i64,
        direction: RequestDirection,
        page: Pagination,
        sort: TimeSort,
    ) -> AppResult<Vec<friendship::Model>> {
        let side = match direction {
            RequestDirection::Sent => friendship::Column::SenderId,
            RequestDirection::Received => friendship::Column::ReceiverId,
        };
        let ordering = order(sort.direction());

        deadline::run(
            self.timeout,
            "friendships.list_pending",
            Friendship::find()
                .filter(side.eq(user_id))
                .filter(friendship::Column::Status.eq(FriendshipStatus::Pending))
                .order_by(friendship::Column::CreatedAt, ordering.clone())
                .order_by(friendship::Column::Id, ordering)
                .limit(page.limit())
                .offset(page.offset())
                .all(self.db.as_ref()),
        )
        .await
    }

    /// Number of accepted friendships involving `user_id`.
    pub async fn count_accepted(&self, user_id: i64) -> AppResult<u64> {
        deadline::run(
            self.timeout,
            "friendships.count_accepted",
            Friendship::find()
                .filter(friendship::Column::Status.eq(FriendshipStatus::Accepted))
                .filter(
                    Condition::any()
                        .add(friendship::Column::SenderId.eq(user_id))
                        .add(friendship::Column::ReceiverId.eq(user_id)),
                )
                .count(self.db.as_ref()),
        )
        .await
    }

    /// The other side of each accepted friendship, ordered by username.
    pub async fn list_friends(
        &self,
        user_id: i64,
        page: Pagination,
    ) -> AppResult<Vec<UserSummary>> {
        let (limit, offset) = bounds(&page);

        deadline::run(
            self.timeout,
            "friendships.list_friends",
            UserSummary::find_by_statement(Statement::from_sql_and_values(
                DbBackend::Postgres,
                LIST_FRIENDS_SQL,
                [user_id.into(), limit.into(), offset.into()],
            ))
            .all(self.db.as_ref()),
        )
        .await
    }
}

/// `(LEAST, GREATEST)` of a pair.
const fn canonical(a: i64, b: i64) -> (i64, i64) {
    if a <= b { (a, b) } else { (b, a) }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::Utc;
    use sea_orm::{DatabaseBackend, MockDatabase, Value};

    fn create_test_friendship(
        id: i64,
        sender_id: i64,
        receiver_id: i64,
        status: FriendshipStatus,
    ) -> friendship::Model {
        friendship::Model {
            id,
            sender_id,
            receiver_id,
            status,
            created_at: Utc::now().into(),
            updated_at: Utc::now().into(),
            version: 1,
        }
    }

    fn bound_values(db: Arc<DatabaseConnection>) -> Vec<Value> {
        let db = Arc::try_unwrap(db).unwrap();
        let log = db.into_transaction_log();
        log[0].statements()[0]
            .values
            .as_ref()
            .map(|v| v.0.clone())
            .unwrap_or_default()
    }

    #[test]
    fn test_canonical_pair() {
        assert_eq!(canonical(5, 2), (2, 5));
        assert_eq!(canonical(2, 5), (2, 5));
    }

    #[test]
    fn test_request_direction_parse() {
        assert_eq!(RequestDirection::parse(None), RequestDirection::Sent);
        assert_eq!(RequestDirection::parse(Some("received")), RequestDirection::Received);
        assert_eq!(RequestDirection::parse(Some("bogus")), RequestDirection::Sent);
    }

    #[tokio::test]
    async fn test_insert_pending_created() {
        let row = create_test_friendship(1, 10, 20, FriendshipStatus::Pending);
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[row.clone()]])
                .into_connection(),
        );

        let repo = FriendshipRepository::new(db);
        assert_eq!(repo.insert_pending(10, 20).await.unwrap(), Some(row));
    }

    #[tokio::test]
    async fn test_insert_pending_conflict_returns_none() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<friendship::Model>::new()])
                .into_connection(),
        );

        let repo = FriendshipRepository::new(db);
        assert!(repo.insert_pending(10, 20).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_find_between_binds_canonical_pair() {
        let row = create_test_friendship(1, 20, 10, FriendshipStatus::Accepted);
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[row]])
                .into_connection(),
        );

        let repo = FriendshipRepository::new(db.clone());
        let found = repo.find_between(20, 10).await.unwrap().unwrap();
        assert_eq!(found.sender_id, 20);

        drop(repo);
        assert_eq!(bound_values(db), vec![Value::from(10i64), Value::from(20i64)]);
    }

    #[tokio::test]
    async fn test_status_between_none_and_accepted() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([
                    [maplit::btreemap! { "status" => Value::from("none") }],
                    [maplit::btreemap! { "status" => Value::from("accepted") }],
                ])
                .into_connection(),
        );

        let repo = FriendshipRepository::new(db);
        assert_eq!(repo.status_between(1, 2).await.unwrap(), RelationshipStatus::None);
        assert_eq!(repo.status_between(2, 1).await.unwrap(), RelationshipStatus::Accepted);
    }

    #[tokio::test]
    async fn test_transition_applied() {
        let row = create_test_friendship(7, 1, 2, FriendshipStatus::Accepted);
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[row]])
                .into_connection(),
        );

        let repo = FriendshipRepository::new(db.clone());
        let updated = repo
            .transition(7, 2, FriendshipStatus::Accepted)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(updated.status, FriendshipStatus::Accepted);

        drop(repo);
        let db = Arc::try_unwrap(db).unwrap();
        let log = db.into_transaction_log();
        let sql = &log[0].statements()[0].sql;
        assert!(sql.contains("status = 'pending'"));
        assert!(sql.contains("receiver_id = $2"));
    }

    #[tokio::test]
    async fn test_transition_no_match() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<friendship::Model>::new()])
                .into_connection(),
        );

        let repo = FriendshipRepository::new(db);
        assert!(
            repo.transition(7, 3, FriendshipStatus::Blocked)
                .await
                .unwrap()
                .is_none()
        );
    }

    #[tokio::test]
    async fn test_transition_to_pending_skips_storage() {
        let db = Arc::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection());

        let repo = FriendshipRepository::new(db.clone());
        assert!(
            repo.transition(7, 2, FriendshipStatus::Pending)
                .await
                .unwrap()
                .is_none()
        );

        drop(repo);
        let db = Arc::try_unwrap(db).unwrap();
        assert!(db.into_transaction_log().is_empty());
    }

    #[tokio::test]
    async fn test_list_pending_received() {
        let rows = vec![
            create_test_friendship(2, 5, 1, FriendshipStatus::Pending),
            create_test_friendship(1, 4, 1, FriendshipStatus::Pending),
        ];
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([rows])
                .into_connection(),
        );

        let repo = FriendshipRepository::new(db.clone());
        let pending = repo
            .list_pending(1, RequestDirection::Received, Pagination::default(), TimeSort::Newest)
            .await
            .unwrap();
        assert_eq!(pending.len(), 2);

        drop(repo);
        let db = Arc::try_unwrap(db).unwrap();
        let log = db.into_transaction_log();
        let sql = &log[0].statements()[0].sql;
        assert!(sql.contains(r#""friendships"."receiver_id" = $1"#));
        assert!(sql.contains(r#"ORDER BY "friendships"."created_at" DESC"#));
    }

    #[tokio::test]
    async fn test_count_accepted() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[maplit::btreemap! {
                    "num_items" => Value::BigInt(Some(4))
                }]])
                .into_connection(),
        );

        let repo = FriendshipRepository::new(db);
        assert_eq!(repo.count_accepted(1).await.unwrap(), 4);
    }

    #[tokio::test]
    async fn test_list_friends() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[maplit::btreemap! {
                    "id" => Value::BigInt(Some(3)),
                    "username" => Value::from("carol"),
                }]])
                .into_connection(),
        );

        let repo = FriendshipRepository::new(db.clone());
        let friends = repo.list_friends(1, Pagination::new(2, 5)).await.unwrap();
        assert_eq!(friends, vec![UserSummary { id: 3, username: "carol".to_string() }]);

        drop(repo);
        assert_eq!(
            bound_values(db),
            vec![Value::from(1i64), Value::from(5i64), Value::from(5i64)]
        );
    }
}
