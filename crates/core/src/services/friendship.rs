//! Friendship service.
//!
//! Requests start `pending`; only the receiver can move them to `accepted`
//! or `blocked`, and `blocked` is terminal.

use mantel_common::{AppError, AppResult, Pagination, TimeSort};
use mantel_db::entities::friendship::{self, FriendshipStatus};
use mantel_db::repositories::{FriendshipRepository, RequestDirection, UserRepository};
use mantel_db::views::{RelationshipStatus, UserSummary};
use tracing::info;

/// Outcome of sending a friend request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FriendRequestResult {
    /// A new pending request was stored.
    Created(friendship::Model),
    /// A row already existed for the pair, in either direction.
    Existing(friendship::Model),
}

impl FriendRequestResult {
    /// Whether this call created the row.
    #[must_use]
    pub const fn created(&self) -> bool {
        matches!(self, Self::Created(_))
    }

    /// The stored row.
    #[must_use]
    pub const fn friendship(&self) -> &friendship::Model {
        match self {
            Self::Created(row) | Self::Existing(row) => row,
        }
    }
}

/// Friendship service for business logic.
#[derive(Clone)]
pub struct FriendshipService {
    friendship_repo: FriendshipRepository,
    user_repo: UserRepository,
}

impl FriendshipService {
    /// Create a new friendship service.
    #[must_use]
    pub const fn new(friendship_repo: FriendshipRepository, user_repo: UserRepository) -> Self {
        Self {
            friendship_repo,
            user_repo,
        }
    }

    /// Send a friend request from `sender_id` to `receiver_id`.
    pub async fn send_request(
        &self,
        sender_id: i64,
        receiver_id: i64,
    ) -> AppResult<FriendRequestResult> {
        if sender_id == receiver_id {
            return Err(AppError::SelfRequest);
        }

        if !self.user_repo.exists(receiver_id).await? {
            return Err(AppError::UserNotFound(receiver_id));
        }

        if let Some(row) = self
            .friendship_repo
            .insert_pending(sender_id, receiver_id)
            .await?
        {
            info!(id = row.id, sender_id, receiver_id, "Friend request sent");
            return Ok(FriendRequestResult::Created(row));
        }

        self.friendship_repo
            .find_between(sender_id, receiver_id)
            .await?
            .map(FriendRequestResult::Existing)
            .ok_or_else(|| AppError::Internal("friendship row disappeared after conflict".to_string()))
    }

    /// Apply a status change requested by `receiver_id`.
    ///
    /// `status` is the raw value from the caller. Unknown values and
    /// `pending` are rejected with [`AppError::InvalidStatus`]. Anything that
    /// does not match a row (wrong id, not the receiver, already terminal)
    /// is [`AppError::NoSuchRequest`].
    pub async fn patch(
        &self,
        request_id: i64,
        receiver_id: i64,
        status: &str,
    ) -> AppResult<friendship::Model> {
        let target = parse_target(status)?;

        let row = self
            .friendship_repo
            .transition(request_id, receiver_id, target)
            .await?
            .ok_or(AppError::NoSuchRequest)?;

        info!(
            id = row.id,
            sender_id = row.sender_id,
            receiver_id,
            status = %row.status,
            version = row.version,
            "Friendship updated"
        );
        Ok(row)
    }

    /// Relationship between two users, symmetric in its arguments.
    pub async fn status_between(&self, a: i64, b: i64) -> AppResult<RelationshipStatus> {
        self.friendship_repo.status_between(a, b).await
    }

    /// Pending requests sent or received by `user_id`.
    pub async fn pending(
        &self,
        user_id: i64,
        direction: RequestDirection,
        page: Pagination,
        sort: TimeSort,
    ) -> AppResult<Vec<friendship::Model>> {
        self.friendship_repo
            .list_pending(user_id, direction, page, sort)
            .await
    }

    /// Accepted friends of `user_id`.
    pub async fn friends(&self, user_id: i64, page: Pagination) -> AppResult<Vec<UserSummary>> {
        if !self.user_repo.exists(user_id).await? {
            return Err(AppError::UserNotFound(user_id));
        }

        self.friendship_repo.list_friends(user_id, page).await
    }
}

fn parse_target(raw: &str) -> AppResult<FriendshipStatus> {
    match raw.trim().to_ascii_lowercase().parse::<FriendshipStatus>() {
        Ok(FriendshipStatus::Pending) => Err(AppError::InvalidStatus(
            "a request cannot be moved back to pending".to_string(),
        )),
        Ok(status) => Ok(status),
        Err(other) => Err(AppError::InvalidStatus(other)),
    }
}
