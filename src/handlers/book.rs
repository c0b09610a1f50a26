//! Book handlers
//!
//! Catalog browsing: filtered listing and book detail with available groups

use axum::{
    extract::{Path, Query},
    Extension, Json,
};
use sea_orm::sea_query::extension::postgres::PgExpr;
use sea_orm::sea_query::Expr;
use sea_orm::{Condition, EntityTrait, QueryFilter, QueryOrder};
use serde::{Deserialize, Serialize};

use crate::entity::book::{self, BookResponse};
use crate::entity::reading_group::GroupResponse;
use crate::error::AppResult;
use crate::middleware::DbConn;
use crate::service;

/// Book list query parameters
#[derive(Debug, Deserialize)]
pub struct BookQuery {
    #[serde(default)]
    pub search: Option<String>,
    #[serde(default)]
    pub genre: Option<String>,
}

/// Book detail response with its not-full groups
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BookDetailResponse {
    #[serde(flatten)]
    pub book: BookResponse,
    pub available_groups: Vec<GroupResponse>,
}

/// GET /books?search=&genre=
pub async fn list_books(
    Extension(db): Extension<DbConn>,
    Query(params): Query<BookQuery>,
) -> AppResult<Json<Vec<BookResponse>>> {
    let mut query = book::Entity::find().order_by_asc(book::Column::Id);

    if let Some(search) = params.search.as_deref().filter(|s| !s.is_empty()) {
        let pattern = format!("%{}%", search);
        query = query.filter(
            Condition::any()
                .add(Expr::col((book::Entity, book::Column::Title)).ilike(pattern.clone()))
                .add(Expr::col((book::Entity, book::Column::Author)).ilike(pattern)),
        );
    }

    if let Some(genre) = params.genre.as_deref().filter(|s| !s.is_empty()) {
        // Case-insensitive exact match on genre
        query = query.filter(Expr::col((book::Entity, book::Column::Genre)).ilike(genre));
    }

    let books = query.all(&*db).await?;
    Ok(Json(books.into_iter().map(BookResponse::from).collect()))
}

/// GET /books/:id
pub async fn book_detail(
    Extension(db): Extension<DbConn>,
    Path(book_id): Path<i64>,
) -> AppResult<Json<BookDetailResponse>> {
    let (book, available_groups) = service::group::book_with_available_groups(&db, book_id).await?;

    Ok(Json(BookDetailResponse {
        book: BookResponse::from(book),
        available_groups,
    }))
}
