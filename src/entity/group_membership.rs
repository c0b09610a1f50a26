//! GroupMembership entity
//!
//! Table: club_group_membership
//!
//! The (user_id, group_id) pair is unique; the composite index created in
//! `db::init_database` enforces it at the storage layer so concurrent joins
//! cannot slip a duplicate past the application check.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "club_group_membership")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,

    pub user_id: i64,

    #[sea_orm(indexed)]
    pub group_id: i64,

    pub joined_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::UserId",
        to = "super::user::Column::Id",
        on_update = "Cascade",
        on_delete = "Cascade"
    )]
    User,
    #[sea_orm(
        belongs_to = "super::reading_group::Entity",
        from = "Column::GroupId",
        to = "super::reading_group::Column::Id",
        on_update = "Cascade",
        on_delete = "Cascade"
    )]
    Group,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl Related<super::reading_group::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Group.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

/// Membership response (username filled in by the group service)
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MemberResponse {
    pub id: i64,
    pub user_id: i64,
    pub username: String,
    pub joined_at: DateTimeWithTimeZone,
}

impl From<Model> for MemberResponse {
    fn from(model: Model) -> Self {
        Self {
            id: model.id,
            user_id: model.user_id,
            username: String::new(),
            joined_at: model.joined_at,
        }
    }
}

impl MemberResponse {
    pub fn with_username(mut self, username: String) -> Self {
        self.username = username;
        self
    }
}
