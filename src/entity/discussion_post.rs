//! DiscussionPost entity
//!
//! Table: club_post
//!
//! A post may reference one chapter of its group's book; deleting the chapter
//! clears the reference (set-null) rather than deleting the post.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "club_post")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,

    #[sea_orm(indexed)]
    pub group_id: i64,

    pub author_id: i64,

    #[sea_orm(nullable)]
    pub chapter_id: Option<i64>,

    #[sea_orm(column_type = "Text")]
    pub content: String,

    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::reading_group::Entity",
        from = "Column::GroupId",
        to = "super::reading_group::Column::Id",
        on_update = "Cascade",
        on_delete = "Cascade"
    )]
    Group,
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::AuthorId",
        to = "super::user::Column::Id",
        on_update = "Cascade",
        on_delete = "Cascade"
    )]
    Author,
    #[sea_orm(
        belongs_to = "super::chapter::Entity",
        from = "Column::ChapterId",
        to = "super::chapter::Column::Id",
        on_update = "Cascade",
        on_delete = "SetNull"
    )]
    Chapter,
}

impl Related<super::reading_group::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Group.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

/// Post response with nested comments (names and comments filled in by the
/// discussion service)
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostResponse {
    pub id: i64,
    pub group: i64,
    pub author: i64,
    pub author_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chapter: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chapter_title: Option<String>,
    pub content: String,
    pub created_at: DateTimeWithTimeZone,
    pub comments: Vec<super::comment::CommentResponse>,
}

impl From<Model> for PostResponse {
    fn from(model: Model) -> Self {
        Self {
            id: model.id,
            group: model.group_id,
            author: model.author_id,
            author_name: String::new(),
            chapter: model.chapter_id,
            chapter_title: None,
            content: model.content,
            created_at: model.created_at,
            comments: Vec::new(),
        }
    }
}

impl PostResponse {
    pub fn with_author_name(mut self, name: String) -> Self {
        self.author_name = name;
        self
    }

    pub fn with_chapter_title(mut self, title: Option<String>) -> Self {
        self.chapter_title = title;
        self
    }

    pub fn with_comments(mut self, comments: Vec<super::comment::CommentResponse>) -> Self {
        self.comments = comments;
        self
    }
}
