//! Follow edge entity (directed: follower -> followee).

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// A directed follow edge.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "follows")]
pub struct Model {
    /// The user who is following
    #[sea_orm(primary_key, auto_increment = false)]
    pub follower_id: i64,

    /// The user being followed
    #[sea_orm(primary_key, auto_increment = false)]
    pub followee_id: i64,

    /// When the follow was created
    pub created_at: DateTimeWithTimeZone,
}

/// Relations to other entities.
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::FollowerId",
        to = "super::user::Column::Id",
        on_delete = "Cascade"
    )]
    /// The following user
    Follower,

    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::FolloweeId",
        to = "super::user::Column::Id",
        on_delete = "Cascade"
    )]
    /// The followed user
    Followee,
}

impl ActiveModelBehavior for ActiveModel {}
