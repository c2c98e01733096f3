use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

use crate::response::ApiError;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("validation failed: {}", .0.join("; "))]
    Validation(Vec<String>),
    #[error("{0}")]
    NotFound(String),
    #[error("upload failed: {0}")]
    Upload(String),
    #[error("upload timed out after {0}s")]
    UploadTimeout(u64),
    #[error("connection failed: {0}")]
    Connection(String),
    #[error("database error: {0}")]
    Database(#[from] sea_orm::DbErr),
    #[error("{0}")]
    BadRequest(String),
    #[error("{0}")]
    Internal(String),
}

impl AppError {
    pub fn invalid(message: impl Into<String>) -> Self {
        AppError::Validation(vec![message.into()])
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::Validation(_) | AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Upload(_) => StatusCode::BAD_GATEWAY,
            AppError::UploadTimeout(_) => StatusCode::GATEWAY_TIMEOUT,
            AppError::Connection(_) => StatusCode::SERVICE_UNAVAILABLE,
            AppError::Database(_) | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<AppError> for ApiError {
    fn from(err: AppError) -> Self {
        let status = err.status_code();
        match err {
            AppError::Validation(errors) => {
                ApiError::new(status, "validation failed").with_errors(errors)
            }
            AppError::Database(e) => {
                tracing::error!(error = %e, "Database error");
                ApiError::new(status, "Internal server error")
            }
            AppError::Internal(msg) => {
                tracing::error!(error = %msg, "Internal server error");
                ApiError::new(status, "Internal server error")
            }
            AppError::Upload(msg) => ApiError::new(status, "upload failed").with_errors(vec![msg]),
            other => ApiError::new(status, other.to_string()),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        ApiError::from(self).into_response()
    }
}
