//! Authentication middleware
//!
//! Provides session-based authentication for API routes. Identity is resolved
//! from the session on every request by re-reading the user row, then threaded
//! into handlers as an explicit `CurrentUser` extension; no handler reads
//! ambient session state itself.

use axum::{
    body::Body,
    extract::State,
    http::{Request, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use sea_orm::{DatabaseConnection, EntityTrait};
use serde_json::json;
use std::ops::Deref;
use std::sync::Arc;
use tower_sessions::Session;

use crate::entity::user;
use crate::state::AppState;

/// Session key for storing the authenticated user id
pub const SESSION_USER_KEY: &str = "user_id";

/// Database connection wrapper for use in handlers via Extension
#[derive(Clone)]
pub struct DbConn(pub Arc<DatabaseConnection>);

impl Deref for DbConn {
    type Target = DatabaseConnection;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

/// Extension to store current user in request
#[derive(Clone, Debug)]
pub struct CurrentUser {
    pub id: i64,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
}

impl From<user::Model> for CurrentUser {
    fn from(model: user::Model) -> Self {
        Self {
            id: model.id,
            username: model.username,
            first_name: model.first_name,
            last_name: model.last_name,
        }
    }
}

/// Paths that don't require authentication
fn is_public_path(path: &str) -> bool {
    matches!(path, "/auth/register" | "/auth/login" | "/health")
}

/// Authentication middleware
pub async fn auth_layer(
    State(state): State<AppState>,
    session: Session,
    mut request: Request<Body>,
    next: Next,
) -> Response {
    let path = request.uri().path().to_string();

    // All handlers access the database via Extension<DbConn>
    request.extensions_mut().insert(DbConn(state.db.clone()));

    // Skip auth for public paths
    if is_public_path(&path) {
        return next.run(request).await;
    }

    // Get user id from session
    let user_id: Option<i64> = session.get(SESSION_USER_KEY).await.unwrap_or(None);

    let Some(user_id) = user_id else {
        return (
            StatusCode::UNAUTHORIZED,
            Json(json!({"error": "unauthorized"})),
        )
            .into_response();
    };

    // Look up user in database
    let user_result = user::Entity::find_by_id(user_id).one(&*state.db).await;

    match user_result {
        Ok(Some(user_model)) => {
            request.extensions_mut().insert(CurrentUser::from(user_model));
            next.run(request).await
        }
        Ok(None) => {
            tracing::warn!("Session user not found in database: {}", user_id);
            (
                StatusCode::UNAUTHORIZED,
                Json(json!({"error": "invalid_session"})),
            )
                .into_response()
        }
        Err(e) => {
            tracing::error!("Database error during auth: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({"error": "internal error"})),
            )
                .into_response()
        }
    }
}
