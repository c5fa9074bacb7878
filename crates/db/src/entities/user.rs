//! User entity.
//!
//! Accounts are owned by the account collaborator; the social graph only
//! reads `id` and `username` from this table.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// A user account.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "users")]
pub struct Model {
    /// User ID
    #[sea_orm(primary_key)]
    pub id: i64,

    /// Unique username
    #[sea_orm(unique)]
    pub username: String,

    /// Email address, never serialized
    #[sea_orm(unique)]
    #[serde(skip_serializing)]
    pub email: String,

    /// Account creation time
    pub created_at: DateTimeWithTimeZone,

    /// Row version
    #[serde(skip)]
    pub version: i32,
}

/// Relations to other entities.
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Posts by this user
    #[sea_orm(has_many = "super::post::Entity")]
    Post,
}

impl Related<super::post::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Post.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
