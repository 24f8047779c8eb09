//! # ca-auth-server
//!
//! HTTP transport for ca-auth: login, administrator-only user creation,
//! token checks and health endpoints.

pub mod api;
pub mod config;
pub mod error;
pub mod extractors;
pub mod middleware;
pub mod state;

pub use config::Config;
pub use state::AppState;

use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, TraceLayer},
};

pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        // Health checks
        .route("/health", get(api::health::health_check))
        .route("/ready", get(api::health::readiness_check))

        // Accounts
        .route("/v1/jwt/user/login", post(api::users::login))
        .route("/v1/jwt/user/create", post(api::users::create_user))
        .route("/v1/jwt/user/me", get(api::users::current_user))

        // Tokens
        .route("/v1/jwt/token/check", post(api::tokens::check_token))

        // Add middleware
        .layer(axum::middleware::from_fn(middleware::request_id_middleware))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::default())
        )
        .layer(CorsLayer::permissive())
        .with_state(state)
}
