//! Friendship entity (one row per unordered user pair).

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Stored friendship status.
///
/// There is no stored "none" state: a missing row means the two users have
/// no relationship.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "lowercase")]
pub enum FriendshipStatus {
    /// Sent by `sender_id`, waiting for `receiver_id`.
    #[sea_orm(string_value = "pending")]
    Pending,
    /// Both users are friends.
    #[sea_orm(string_value = "accepted")]
    Accepted,
    /// The receiver blocked the sender. Terminal.
    #[sea_orm(string_value = "blocked")]
    Blocked,
}

impl FriendshipStatus {
    /// The wire/database name of this status.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Accepted => "accepted",
            Self::Blocked => "blocked",
        }
    }
}

impl std::str::FromStr for FriendshipStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "accepted" => Ok(Self::Accepted),
            "blocked" => Ok(Self::Blocked),
            other => Err(other.to_string()),
        }
    }
}

impl std::fmt::Display for FriendshipStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A friendship between two users, stored once per pair.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "friendships")]
pub struct Model {
    /// Friendship ID
    #[sea_orm(primary_key)]
    pub id: i64,

    /// The user who sent the request
    pub sender_id: i64,

    /// The user who may accept or block it
    pub receiver_id: i64,

    /// Current status
    pub status: FriendshipStatus,

    /// When the request was sent
    pub created_at: DateTimeWithTimeZone,

    /// Last status change
    #[serde(skip)]
    pub updated_at: DateTimeWithTimeZone,

    /// Bumped on every status change
    #[serde(skip)]
    pub version: i32,
}

/// Relations to other entities.
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::SenderId",
        to = "super::user::Column::Id",
        on_delete = "Cascade"
    )]
    /// The requesting user
    Sender,

    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::ReceiverId",
        to = "super::user::Column::Id",
        on_delete = "Cascade"
    )]
    /// The requested user
    Receiver,
}

impl ActiveModelBehavior for ActiveModel {}
