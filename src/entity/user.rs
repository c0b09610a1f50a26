//! User entity
//!
//! Table: club_user

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "club_user")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,

    /// Username (unique, max 32 chars)
    #[sea_orm(column_type = "String(Some(32))", unique)]
    pub username: String,

    /// Password (bcrypt hash)
    #[sea_orm(column_type = "String(Some(128))")]
    #[serde(skip_serializing)]
    pub password: String,

    #[sea_orm(column_type = "String(Some(64))", default_value = "")]
    pub first_name: String,

    #[sea_orm(column_type = "String(Some(64))", default_value = "")]
    pub last_name: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

// Memberships, posts and comments reference users via their own foreign keys

impl ActiveModelBehavior for ActiveModel {}

/// User response (no password)
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    pub id: i64,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
}

impl From<Model> for UserResponse {
    fn from(model: Model) -> Self {
        Self {
            id: model.id,
            username: model.username,
            first_name: model.first_name,
            last_name: model.last_name,
        }
    }
}
