use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tower_sessions::{MemoryStore, SessionManagerLayer};

use crate::handlers;
use crate::middleware::auth_layer;
use crate::state::AppState;

pub mod health;

/// Create the main router
pub fn create_router(state: AppState) -> Router {
    // Session store (in-memory for now)
    let session_store = MemoryStore::default();
    let session_layer = SessionManagerLayer::new(session_store)
        .with_secure(false) // Set to true in production with HTTPS
        .with_http_only(true);

    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        // Health check
        .route("/health", get(health::health_check))
        // Auth routes
        .route("/auth/register", post(handlers::auth::register))
        .route("/auth/login", post(handlers::auth::login))
        .route("/auth/logout", post(handlers::auth::logout))
        .route("/auth/user", get(handlers::auth::current_user))
        // Book routes
        .route("/books", get(handlers::book::list_books))
        .route("/books/:id", get(handlers::book::book_detail))
        // Group routes
        .route(
            "/groups",
            get(handlers::group::list_groups).post(handlers::group::create_group),
        )
        .route("/groups/:group_id", get(handlers::group::group_detail))
        .route("/groups/:group_id/join", post(handlers::group::join_group))
        // Discussion routes
        .route(
            "/groups/:group_id/discussion",
            get(handlers::discussion::list_posts).post(handlers::discussion::create_post),
        )
        .route(
            "/groups/:group_id/discussion/:post_id/comments",
            post(handlers::discussion::add_comment),
        )
        .layer(middleware::from_fn_with_state(state.clone(), auth_layer))
        .layer(session_layer)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use sea_orm::{DatabaseBackend, MockDatabase};

    #[tokio::test]
    async fn test_router_builds() {
        // Route registration panics on path conflicts, so building is the test
        let db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();
        let state = AppState::new(db, Config::default());
        let _router = create_router(state);
    }
}
