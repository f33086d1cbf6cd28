//! # melodia_api
//!
//! HTTP API library for Melodia.

pub mod config;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod services;

use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use sqlx::PgPool;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::{Any, CorsLayer};

use crate::config::ApiConfig;
use crate::handlers::{auth, csrf, users};

/// Shared application state passed to all handlers.
#[derive(Clone)]
pub struct AppState {
    /// PostgreSQL connection pool.
    pub pool: PgPool,
    /// API configuration.
    pub config: ApiConfig,
}

/// Run embedded database migrations.
///
/// Delegates to `melodia_core::migrate::migrate()` which owns the
/// migration files.
pub async fn migrate(pool: &PgPool) -> Result<(), sqlx::migrate::MigrateError> {
    melodia_core::migrate::migrate(pool).await
}

/// Builds the Axum router with all routes and shared state.
///
/// Layer order (outermost first): panic guard, CORS, body limit,
/// request id, logging, authorization; CSRF and owner checks are
/// route-scoped and run innermost.
pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // Routes where authentication, when present, is resolved by the
    // authorization middleware but never required up front.
    let open = Router::new()
        .route("/auth/signup", post(auth::signup_handler))
        .route("/auth/login", post(auth::login_handler))
        .route("/auth/", get(auth::auth_handler))
        .route("/auth/check", get(auth::check_handler))
        .route("/auth/logout", get(auth::logout_handler))
        .route("/csrf", get(csrf::get_csrf_handler));

    // State-changing routes carry the CSRF check.
    let csrf_guarded = Router::new()
        .route("/auth/changepass", post(auth::change_password_handler))
        .route_layer(axum::middleware::from_fn_with_state(
            state.clone(),
            middleware::csrf::verify_csrf,
        ));

    // User-scoped routes carry the owner check.
    let owner_guarded = Router::new()
        .route("/users/{userID}", get(users::get_user_handler))
        .route_layer(axum::middleware::from_fn(middleware::owner::check_owner));

    let api = open
        .merge(csrf_guarded)
        .merge(owner_guarded)
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            middleware::auth::authorize,
        ))
        .layer(axum::middleware::from_fn(middleware::logging::log_request))
        .layer(axum::middleware::from_fn(
            middleware::request_id::set_request_id,
        ))
        .layer(DefaultBodyLimit::max(state.config.max_body_bytes))
        .layer(cors)
        .layer(CatchPanicLayer::custom(
            middleware::panic::handle_panic
                as fn(Box<dyn std::any::Any + Send + 'static>) -> axum::response::Response,
        ));

    Router::new().nest("/api", api).with_state(state)
}
