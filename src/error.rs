use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::services::token_verifier::AuthError;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("bad request: {0}")]
    BadRequest(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("unprocessable: {0}")]
    Unprocessable(String),

    #[error("method not allowed")]
    MethodNotAllowed,

    #[error("auth error: {0}")]
    Auth(#[from] AuthError),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl AppError {
    fn status(&self) -> StatusCode {
        match self {
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Unprocessable(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            AppError::Auth(e) => auth_status(e),
            AppError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Client-facing message. Fixed per status class so database and
    /// internal detail never reaches the response body.
    fn message(&self) -> String {
        match self {
            AppError::BadRequest(_) => "bad request".to_string(),
            AppError::NotFound(_) => "resource not found".to_string(),
            AppError::Unprocessable(_) => "unprocessable entity".to_string(),
            AppError::MethodNotAllowed => "method not allowed".to_string(),
            AppError::Auth(e) => e.to_string(),
            AppError::Database(_) => "internal server error".to_string(),
        }
    }
}

fn auth_status(error: &AuthError) -> StatusCode {
    match error {
        AuthError::MissingHeader
        | AuthError::MalformedHeader
        | AuthError::MissingKid
        | AuthError::TokenExpired
        | AuthError::InvalidClaims => StatusCode::UNAUTHORIZED,
        AuthError::UnknownKey | AuthError::InvalidToken => StatusCode::BAD_REQUEST,
        AuthError::Forbidden(_) => StatusCode::FORBIDDEN,
        AuthError::JwksFetch(_) => StatusCode::SERVICE_UNAVAILABLE,
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();

        if status.is_server_error() {
            tracing::error!(error = ?self, "request failed");
        } else {
            tracing::debug!(error = ?self, "request rejected");
        }

        let body = match &self {
            AppError::Auth(e) => Json(json!({
                "success": false,
                "error": status.as_u16(),
                "code": e.code(),
                "message": self.message(),
            })),
            _ => Json(json!({
                "success": false,
                "error": status.as_u16(),
                "message": self.message(),
            })),
        };

        (status, body).into_response()
    }
}

pub type Result<T> = std::result::Result<T, AppError>;
