//! Discussion handlers
//!
//! Membership-gated posts and comments within a group

use axum::{extract::Path, http::StatusCode, Extension, Json};
use serde::Deserialize;

use crate::entity::discussion_post::PostResponse;
use crate::error::AppResult;
use crate::middleware::auth::{CurrentUser, DbConn};
use crate::service;
use crate::service::discussion::NewPost;

/// Create post request body. Group and author come from path and session.
#[derive(Debug, Deserialize)]
pub struct CreatePostRequest {
    pub content: String,
    #[serde(default, alias = "chapter_id")]
    pub chapter: Option<i64>,
}

/// Add comment request body
#[derive(Debug, Deserialize)]
pub struct AddCommentRequest {
    pub content: String,
}

/// GET /groups/:group_id/discussion
pub async fn list_posts(
    Extension(db): Extension<DbConn>,
    Extension(current_user): Extension<CurrentUser>,
    Path(group_id): Path<i64>,
) -> AppResult<Json<Vec<PostResponse>>> {
    let posts = service::discussion::list_posts(&db, current_user.id, group_id).await?;
    Ok(Json(posts))
}

/// POST /groups/:group_id/discussion
pub async fn create_post(
    Extension(db): Extension<DbConn>,
    Extension(current_user): Extension<CurrentUser>,
    Path(group_id): Path<i64>,
    Json(req): Json<CreatePostRequest>,
) -> AppResult<(StatusCode, Json<PostResponse>)> {
    let post = service::discussion::create_post(
        &db,
        current_user.id,
        group_id,
        NewPost {
            content: req.content,
            chapter_id: req.chapter,
        },
    )
    .await?;

    Ok((StatusCode::CREATED, Json(post)))
}

/// POST /groups/:group_id/discussion/:post_id/comments
///
/// Returns the whole updated post so clients can refresh it atomically.
pub async fn add_comment(
    Extension(db): Extension<DbConn>,
    Extension(current_user): Extension<CurrentUser>,
    Path((group_id, post_id)): Path<(i64, i64)>,
    Json(req): Json<AddCommentRequest>,
) -> AppResult<(StatusCode, Json<PostResponse>)> {
    let post =
        service::discussion::add_comment(&db, current_user.id, group_id, post_id, req.content)
            .await?;

    Ok((StatusCode::CREATED, Json(post)))
}
