//! HTTP error mapping

use axum::{
    extract::rejection::{JsonRejection, PathRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

use cms_core::error::{DomainError, FieldErrors};

pub const VALIDATION_MESSAGE: &str = "Validation errors";
const SERVER_ERROR_MESSAGE: &str = "Server Error";
const TOO_MANY_ATTEMPTS_MESSAGE: &str = "Too many login attempts. Please try again later.";

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Unprocessable: {message}")]
    Unprocessable {
        message: String,
        errors: Option<FieldErrors>,
    },

    #[error("Too many requests")]
    TooManyRequests,

    #[error("Internal error: {0}")]
    InternalError(String),
}

/// Failure envelope: `{success: false, message, errors?}`.
#[derive(Serialize)]
struct ErrorResponse {
    success: bool,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    errors: Option<FieldErrors>,
}

impl From<DomainError> for ApiError {
    fn from(err: DomainError) -> Self {
        match err {
            err @ (DomainError::Validation { .. } | DomainError::ValidationErrors(_)) => ApiError::Unprocessable {
                message: VALIDATION_MESSAGE.to_string(),
                errors: err.field_errors(),
            },
            DomainError::Conflict(msg) | DomainError::Rejected(msg) => {
                ApiError::Unprocessable { message: msg, errors: None }
            }
            DomainError::NotFound(msg) => ApiError::NotFound(msg),
            DomainError::Unauthorized(msg) => ApiError::Unauthorized(msg),
            DomainError::Forbidden(msg) => ApiError::Forbidden(msg),
            DomainError::DatabaseError(msg) | DomainError::InternalError(msg) => ApiError::InternalError(msg),
        }
    }
}

impl From<validator::ValidationErrors> for ApiError {
    fn from(errors: validator::ValidationErrors) -> Self {
        DomainError::from(errors).into()
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::Unprocessable {
            message: rejection.body_text(),
            errors: None,
        }
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError::Unprocessable {
            message: rejection.body_text(),
            errors: None,
        }
    }
}

impl From<PathRejection> for ApiError {
    fn from(_: PathRejection) -> Self {
        ApiError::NotFound("Resource not found".to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message, errors) = match self {
            ApiError::Unauthorized(msg) => {
                tracing::warn!("Unauthorized: {}", msg);
                (StatusCode::UNAUTHORIZED, msg, None)
            }
            ApiError::Forbidden(msg) => {
                tracing::warn!("Forbidden: {}", msg);
                (StatusCode::FORBIDDEN, msg, None)
            }
            ApiError::NotFound(msg) => {
                tracing::debug!("Not found: {}", msg);
                (StatusCode::NOT_FOUND, msg, None)
            }
            ApiError::Unprocessable { message, errors } => {
                tracing::debug!("Unprocessable: {}", message);
                (StatusCode::UNPROCESSABLE_ENTITY, message, errors)
            }
            ApiError::TooManyRequests => {
                tracing::warn!("Login rate limit exceeded");
                (StatusCode::TOO_MANY_REQUESTS, TOO_MANY_ATTEMPTS_MESSAGE.to_string(), None)
            }
            ApiError::InternalError(msg) => {
                tracing::error!("Internal error: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, SERVER_ERROR_MESSAGE.to_string(), None)
            }
        };

        let body = Json(ErrorResponse {
            success: false,
            message,
            errors,
        });

        (status, body).into_response()
    }
}
