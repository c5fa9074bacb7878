//! Post entity.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Maximum post content length, in bytes.
pub const MAX_CONTENT_BYTES: usize = 500;

/// A post.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "posts")]
pub struct Model {
    /// Post ID
    #[sea_orm(primary_key)]
    pub id: i64,

    /// Author
    #[sea_orm(indexed)]
    pub user_id: i64,

    /// Post text
    #[sea_orm(column_type = "Text")]
    pub content: String,

    /// Creation time
    pub created_at: DateTimeWithTimeZone,

    /// Last edit time
    #[serde(skip)]
    pub updated_at: DateTimeWithTimeZone,

    /// Bumped on every edit
    #[serde(skip)]
    pub version: i32,
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
    /// The author
    User,

    /// Likes on this post
    #[sea_orm(has_many = "super::like::Entity")]
    Like,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl Related<super::like::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Like.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
