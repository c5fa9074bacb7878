//! Following repository.

use std::sync::Arc;

use crate::deadline::{self, Deadline};
use crate::entities::{Following, User, following, user};
use crate::repositories::order;
use crate::views::{FollowCounts, UserSummary};
use mantel_common::{AppResult, Pagination, UserSort};
use sea_orm::sea_query::OnConflict;
use sea_orm::{
    ColumnTrait, DatabaseConnection, DbBackend, EntityTrait, FromQueryResult, JoinType,
    QueryFilter, QueryOrder, QuerySelect, RelationTrait, Set, Statement,
};
use tracing::debug;

const COUNT_EDGES_SQL: &str = r"
    SELECT
        (SELECT COUNT(*) FROM follows WHERE followee_id = $1) AS followers_count,
        (SELECT COUNT(*) FROM follows WHERE follower_id = $1) AS following_count
";

/// Following repository for database operations.
#[derive(Clone)]
pub struct FollowingRepository {
    db: Arc<DatabaseConnection>,
    timeout: Deadline,
}

impl FollowingRepository {
    /// Create a new following repository.
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

    /// Insert a follow edge unless it already exists.
    ///
    /// Returns `true` when a new edge was written.
    pub async fn insert(&self, follower_id: i64, followee_id: i64) -> AppResult<bool> {
        let model = following::ActiveModel {
            follower_id: Set(follower_id),
            followee_id: Set(followee_id),
            ..Default::default()
        };

        let rows = deadline::run(
            self.timeout,
            "follows.insert",
            Following::insert(model)
                .on_conflict(
                    OnConflict::columns([
                        following::Column::FollowerId,
                        following::Column::FolloweeId,
                    ])
                    .do_nothing()
                    .to_owned(),
                )
                .exec_without_returning(self.db.as_ref()),
        )
        .await?;

        debug!(follower_id, followee_id, rows, "Inserted follow edge");
        Ok(rows == 1)
    }

    /// Delete a follow edge. Deleting a missing edge is not an error.
    pub async fn delete(&self, follower_id: i64, followee_id: i64) -> AppResult<u64> {
        let result = deadline::run(
            self.timeout,
            "follows.delete",
            Following::delete_many()
                .filter(following::Column::FollowerId.eq(follower_id))
                .filter(following::Column::FolloweeId.eq(followee_id))
                .exec(self.db.as_ref()),
        )
        .await?;

        debug!(
            follower_id,
            followee_id,
            rows = result.rows_affected,
            "Deleted follow edge"
        );
        Ok(result.rows_affected)
    }

    /// Check if `follower_id` follows `followee_id`.
    pub async fn exists(&self, follower_id: i64, followee_id: i64) -> AppResult<bool> {
        let edge = deadline::run(
            self.timeout,
            "follows.exists",
            Following::find_by_id((follower_id, followee_id)).one(self.db.as_ref()),
        )
        .await?;

        Ok(edge.is_some())
    }

    /// Users following `user_id`, ordered by username.
    pub async fn list_followers(
        &self,
        user_id: i64,
        page: Pagination,
        sort: UserSort,
    ) -> AppResult<Vec<UserSummary>> {
        self.list_edge_users(
            "follows.list_followers",
            following::Relation::Follower,
            following::Column::FolloweeId,
            user_id,
            page,
            sort,
        )
        .await
    }

    /// Users that `user_id` follows, ordered by username.
    pub async fn list_followees(
        &self,
        user_id: i64,
        page: Pagination,
        sort: UserSort,
    ) -> AppResult<Vec<UserSummary>> {
        self.list_edge_users(
            "follows.list_followees",
            following::Relation::Followee,
            following::Column::FollowerId,
            user_id,
            page,
            sort,
        )
        .await
    }

    /// Join users onto the edge side given by `relation`, filtered by the
    /// opposite column.
    async fn list_edge_users(
        &self,
        op: &'static str,
        relation: following::Relation,
        anchor: following::Column,
        user_id: i64,
        page: Pagination,
        sort: UserSort,
    ) -> AppResult<Vec<UserSummary>> {
        deadline::run(
            self.timeout,
            op,
            User::find()
                .select_only()
                .column(user::Column::Id)
                .column(user::Column::Username)
                .join_rev(JoinType::InnerJoin, relation.def())
                .filter(anchor.eq(user_id))
                .order_by(user::Column::Username, order(sort.direction()))
                .order_by_asc(user::Column::Id)
                .limit(page.limit())
                .offset(page.offset())
                .into_model::<UserSummary>()
                .all(self.db.as_ref()),
        )
        .await
    }

    /// Follower and followee totals in one statement.
    pub async fn count_edges(&self, user_id: i64) -> AppResult<FollowCounts> {
        let counts = deadline::run(
            self.timeout,
            "follows.count_edges",
            FollowCounts::find_by_statement(Statement::from_sql_and_values(
                DbBackend::Postgres,
                COUNT_EDGES_SQL,
                [user_id.into()],
            ))
            .one(self.db.as_ref()),
        )
        .await?;

        Ok(counts.unwrap_or_default())
    }
}
