//! Comment entity
//!
//! Table: club_comment

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "club_comment")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,

    #[sea_orm(indexed)]
    pub post_id: i64,

    pub author_id: i64,

    #[sea_orm(column_type = "Text")]
    pub content: String,

    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::discussion_post::Entity",
        from = "Column::PostId",
        to = "super::discussion_post::Column::Id",
        on_update = "Cascade",
        on_delete = "Cascade"
    )]
    Post,
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::AuthorId",
        to = "super::user::Column::Id",
        on_update = "Cascade",
        on_delete = "Cascade"
    )]
    Author,
}

impl Related<super::discussion_post::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Post.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

/// Comment response (author name filled in by the discussion service)
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentResponse {
    pub id: i64,
    pub post: i64,
    pub author: i64,
    pub author_name: String,
    pub content: String,
    pub created_at: DateTimeWithTimeZone,
}

impl From<Model> for CommentResponse {
    fn from(model: Model) -> Self {
        Self {
            id: model.id,
            post: model.post_id,
            author: model.author_id,
            author_name: String::new(),
            content: model.content,
            created_at: model.created_at,
        }
    }
}

impl CommentResponse {
    pub fn with_author_name(mut self, name: String) -> Self {
        self.author_name = name;
        self
    }
}
