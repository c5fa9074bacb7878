//! Like entity (user <-> post edge).

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// A like on a post.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "likes")]
pub struct Model {
    /// Like ID
    #[sea_orm(primary_key)]
    pub id: i64,

    /// The user who liked
    pub user_id: i64,

    /// The post being liked
    pub post_id: i64,

    /// When the like was recorded
    pub created_at: DateTimeWithTimeZone,
}

/// Relations to other entities.
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::UserId",
        to = "super::user::Column::Id",
        on_delete = "Cascade"
    )]
    /// The liking user
    User,

    #[sea_orm(
        belongs_to = "super::post::Entity",
        from = "Column::PostId",
        to = "super::post::Column::Id",
        on_delete = "Cascade"
    )]
    /// The liked post
    Post,
}

impl Related<super::post::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Post.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
