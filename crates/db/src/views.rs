//! Read models returned by list and aggregate queries.

use sea_orm::FromQueryResult;
use sea_orm::prelude::DateTimeWithTimeZone;
use serde::Serialize;

use crate::entities::friendship::FriendshipStatus;

/// `{id, username}` projection of a user.
#[derive(Debug, Clone, PartialEq, Eq, FromQueryResult, Serialize)]
pub struct UserSummary {
    /// User ID.
    pub id: i64,
    /// Username.
    pub username: String,
}

/// Post as shown in feeds and author listings.
#[derive(Debug, Clone, PartialEq, Eq, FromQueryResult, Serialize)]
pub struct PostSummary {
    /// Post ID.
    pub id: i64,
    /// Author ID.
    pub user_id: i64,
    /// Post text.
    pub content: String,
    /// Creation time.
    pub created_at: DateTimeWithTimeZone,
}

/// A like on a post, as listed for that post.
#[derive(Debug, Clone, PartialEq, Eq, FromQueryResult, Serialize)]
pub struct LikeSummary {
    /// User who liked the post.
    pub user_id: i64,
    /// When the like was recorded.
    pub created_at: DateTimeWithTimeZone,
}

/// Follower/followee totals for one user.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, FromQueryResult, Serialize)]
pub struct FollowCounts {
    /// Users following this user.
    pub followers_count: i64,
    /// Users this user follows.
    pub following_count: i64,
}

/// Relationship between two users as seen from outside.
///
/// Unlike [`FriendshipStatus`] this includes `None` for pairs with no row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RelationshipStatus {
    /// No friendship row exists.
    None,
    /// A request is waiting for an answer.
    Pending,
    /// The users are friends.
    Accepted,
    /// The request was blocked.
    Blocked,
}

impl RelationshipStatus {
    /// Parse the value produced by the status lookup query.
    #[must_use]
    pub fn from_db(raw: &str) -> Self {
        match raw.parse::<FriendshipStatus>() {
            Ok(status) => status.into(),
            Err(_) => Self::None,
        }
    }
}

impl From<FriendshipStatus> for RelationshipStatus {
    fn from(status: FriendshipStatus) -> Self {
        match status {
            FriendshipStatus::Pending => Self::Pending,
            FriendshipStatus::Accepted => Self::Accepted,
            FriendshipStatus::Blocked => Self::Blocked,
        }
    }
}
