//! Group handlers
//!
//! Group creation, the caller's group list, group detail and joining

use axum::{extract::Path, http::StatusCode, Extension, Json};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::entity::reading_group::{GroupDetailResponse, GroupResponse};
use crate::error::{AppError, AppResult};
use crate::middleware::auth::{CurrentUser, DbConn};
use crate::service;
use crate::service::group::NewGroup;

/// Create group request body. The creator comes from the session, never the
/// payload.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateGroupRequest {
    pub name: String,
    pub book: i64,
    #[serde(alias = "start_date")]
    pub start_date: chrono::NaiveDate,
    #[serde(alias = "end_date")]
    pub end_date: chrono::NaiveDate,
}

/// GET /groups
pub async fn list_groups(
    Extension(db): Extension<DbConn>,
    Extension(current_user): Extension<CurrentUser>,
) -> AppResult<Json<Vec<GroupResponse>>> {
    let groups = service::group::list_for_user(&db, current_user.id).await?;
    Ok(Json(groups))
}

/// POST /groups
pub async fn create_group(
    Extension(db): Extension<DbConn>,
    Extension(current_user): Extension<CurrentUser>,
    Json(req): Json<CreateGroupRequest>,
) -> AppResult<(StatusCode, Json<GroupResponse>)> {
    let group = service::group::create(
        &db,
        current_user.id,
        NewGroup {
            name: req.name,
            book_id: req.book,
            start_date: req.start_date,
            end_date: req.end_date,
        },
    )
    .await?;

    Ok((StatusCode::CREATED, Json(group)))
}

/// GET /groups/:group_id
pub async fn group_detail(
    Extension(db): Extension<DbConn>,
    Extension(current_user): Extension<CurrentUser>,
    Path(group_id): Path<i64>,
) -> AppResult<Json<GroupDetailResponse>> {
    let detail = service::group::detail(&db, current_user.id, group_id).await?;
    Ok(Json(detail))
}

/// POST /groups/:group_id/join
pub async fn join_group(
    Extension(db): Extension<DbConn>,
    Extension(current_user): Extension<CurrentUser>,
    Path(group_id): Path<i64>,
) -> AppResult<Json<Value>> {
    service::membership::try_join(&db, current_user.id, group_id)
        .await
        .map_err(AppError::from)?;

    Ok(Json(json!({"message": "Joined group successfully"})))
}
