use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use washday_core::is_not_found;
use washday_order::intake::IntakeError;
use washday_order::BoardError;

#[derive(Debug)]
pub enum AppError {
    AuthenticationError(String),
    AuthorizationError(String),
    ValidationError(String),
    NotFoundError(String),
    InternalServerError(String),
    Anyhow(anyhow::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            AppError::AuthenticationError(msg) => (StatusCode::UNAUTHORIZED, msg),
            AppError::AuthorizationError(msg) => (StatusCode::FORBIDDEN, msg),
            AppError::ValidationError(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::NotFoundError(msg) => (StatusCode::NOT_FOUND, msg),
            AppError::InternalServerError(msg) => {
                tracing::error!("Internal Server Error: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error".to_string())
            },
            AppError::Anyhow(err) => {
                tracing::error!("Internal Server Error: {}", err);
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error".to_string())
            },
        };

        let body = Json(json!({
            "error": error_message,
        }));

        (status, body).into_response()
    }
}

impl<E> From<E> for AppError
where
    E: Into<anyhow::Error>,
{
    fn from(err: E) -> Self {
        Self::Anyhow(err.into())
    }
}

/// Map a repository failure. Missing records become 404, the rest 500.
pub fn store_error(err: Box<dyn std::error::Error + Send + Sync>) -> AppError {
    if is_not_found(err.as_ref()) {
        AppError::NotFoundError(err.to_string())
    } else {
        AppError::InternalServerError(format!("Store error: {}", err))
    }
}

pub fn intake_error(err: IntakeError) -> AppError {
    AppError::ValidationError(err.to_string())
}

pub fn board_error(err: BoardError<AppError>) -> AppError {
    match err {
        BoardError::NotFound(id) => AppError::NotFoundError(format!("Order {} not found", id)),
        BoardError::Rejected(e) | BoardError::WriteFailed(e) => e,
    }
}
