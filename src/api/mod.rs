// API module - HTTP endpoints

pub mod categories;
pub mod health;
pub mod middleware;
pub mod questions;
pub mod quizzes;

use axum::{
    extract::FromRef,
    middleware::map_response,
    response::{IntoResponse, Response},
    routing::get,
    Router,
};
use sqlx::PgPool;

use crate::error::AppError;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub config: crate::config::Config,
    /// Reused for JWKS fetches
    pub http: reqwest::Client,
}

impl FromRef<AppState> for PgPool {
    fn from_ref(state: &AppState) -> PgPool {
        state.pool.clone()
    }
}

/// Assembles the full application router.
pub fn app(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_check))
        .merge(categories::router())
        .merge(questions::router())
        .merge(quizzes::router())
        .fallback(unknown_path)
        .layer(map_response(method_not_allowed_body))
        .with_state(state)
}

async fn unknown_path() -> AppError {
    AppError::NotFound("unknown path".to_string())
}

/// Routed 405s carry an empty body; rewrite them into the canonical
/// error shape so every error response looks the same.
async fn method_not_allowed_body(response: Response) -> Response {
    if response.status() == axum::http::StatusCode::METHOD_NOT_ALLOWED {
        return AppError::MethodNotAllowed.into_response();
    }
    response
}
