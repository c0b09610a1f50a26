//! Authentication handlers
//!
//! Registration, login, logout and the current-user endpoint

use axum::{http::StatusCode, Extension, Json};
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, Set};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::entity::user::{self, UserResponse};
use crate::error::{AppError, AppResult};
use crate::middleware::auth::{CurrentUser, DbConn, SESSION_USER_KEY};
use tower_sessions::Session;

/// Register request body
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub username: String,
    pub password: String,
    #[serde(default, alias = "first_name")]
    pub first_name: Option<String>,
    #[serde(default, alias = "last_name")]
    pub last_name: Option<String>,
}

/// Login request body
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// POST /auth/register
pub async fn register(
    Extension(db): Extension<DbConn>,
    Json(req): Json<RegisterRequest>,
) -> AppResult<(StatusCode, Json<Value>)> {
    if req.username.is_empty() || req.password.is_empty() {
        return Err(AppError::BadRequest(
            "Username and password required".to_string(),
        ));
    }

    let existing = user::Entity::find()
        .filter(user::Column::Username.eq(&req.username))
        .one(&*db)
        .await?;
    if existing.is_some() {
        return Err(AppError::BadRequest("Username already taken".to_string()));
    }

    let password_hash = bcrypt::hash(&req.password, bcrypt::DEFAULT_COST)
        .map_err(|e| AppError::Internal(format!("Password hashing failed: {}", e)))?;

    let new_user = user::ActiveModel {
        username: Set(req.username.clone()),
        password: Set(password_hash),
        first_name: Set(req.first_name.unwrap_or_default()),
        last_name: Set(req.last_name.unwrap_or_default()),
        ..Default::default()
    };
    new_user.insert(&*db).await?;

    tracing::info!("User registered: {}", req.username);

    Ok((
        StatusCode::CREATED,
        Json(json!({"message": "User created. Please log in."})),
    ))
}

/// POST /auth/login
pub async fn login(
    Extension(db): Extension<DbConn>,
    session: Session,
    Json(req): Json<LoginRequest>,
) -> AppResult<Json<UserResponse>> {
    let db_user = user::Entity::find()
        .filter(user::Column::Username.eq(&req.username))
        .one(&*db)
        .await?;

    let Some(db_user) = db_user else {
        tracing::warn!("Login failed: user not found - {}", req.username);
        return Err(AppError::Unauthorized);
    };

    let password_valid = bcrypt::verify(&req.password, &db_user.password).unwrap_or(false);
    if !password_valid {
        tracing::warn!("Login failed: wrong password - {}", req.username);
        return Err(AppError::Unauthorized);
    }

    session
        .insert(SESSION_USER_KEY, db_user.id)
        .await
        .map_err(|e| AppError::Internal(format!("Failed to save session: {}", e)))?;

    tracing::info!("User logged in: {}", req.username);

    Ok(Json(UserResponse::from(db_user)))
}

/// POST /auth/logout
pub async fn logout(session: Session) -> AppResult<Json<Value>> {
    session
        .flush()
        .await
        .map_err(|e| AppError::Internal(format!("Failed to flush session: {}", e)))?;

    Ok(Json(json!({"message": "Logged out"})))
}

/// GET /auth/user
pub async fn current_user(Extension(user): Extension<CurrentUser>) -> Json<UserResponse> {
    Json(UserResponse {
        id: user.id,
        username: user.username,
        first_name: user.first_name,
        last_name: user.last_name,
    })
}
