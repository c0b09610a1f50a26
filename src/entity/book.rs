//! Book entity
//!
//! Table: club_book

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "club_book")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,

    #[sea_orm(column_type = "String(Some(255))")]
    pub title: String,

    #[sea_orm(column_type = "String(Some(255))")]
    pub author: String,

    #[sea_orm(column_type = "String(Some(100))")]
    pub genre: String,

    #[sea_orm(column_type = "Text")]
    pub description: String,

    /// Positive page count
    pub total_pages: i32,

    /// Positive chapter count
    pub total_chapters: i32,

    /// Cover image URL (optional)
    #[sea_orm(column_type = "String(Some(255))", nullable)]
    pub cover_url: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

// Chapters and reading groups reference books via their own foreign keys;
// deleting a book cascades to both.

impl ActiveModelBehavior for ActiveModel {}

/// Book response
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookResponse {
    pub id: i64,
    pub title: String,
    pub author: String,
    pub genre: String,
    pub description: String,
    pub total_pages: i32,
    pub total_chapters: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cover_url: Option<String>,
}

impl From<Model> for BookResponse {
    fn from(model: Model) -> Self {
        Self {
            id: model.id,
            title: model.title,
            author: model.author,
            genre: model.genre,
            description: model.description,
            total_pages: model.total_pages,
            total_chapters: model.total_chapters,
            cover_url: model.cover_url,
        }
    }
}
