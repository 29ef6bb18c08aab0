//! API error type
//!
//! Every failure leaves the API as the same JSON envelope:
//! `{"success": false, "message": "...", "error": "..."}`. The `error` field
//! carries the underlying detail when there is one.

use axum::{
    extract::rejection::{FormRejection, JsonRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::services::{BlogServiceError, UserServiceError};

/// Error response for API errors
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
    pub error: Option<String>,
}

/// Wire form of [`ApiError`]
#[derive(Debug, Serialize)]
struct ErrorEnvelope<'a> {
    success: bool,
    message: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<&'a str>,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
            error: None,
        }
    }

    pub fn with_error(mut self, error: impl Into<String>) -> Self {
        self.error = Some(error.into());
        self
    }

    pub fn validation_error(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(StatusCode::UNAUTHORIZED, message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, message)
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::new(StatusCode::CONFLICT, message)
    }

    /// `failure` is the operation-level message, `err` the underlying cause
    pub fn internal_error(failure: impl Into<String>, err: &anyhow::Error) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, failure).with_error(format!("{:#}", err))
    }

    /// Map a blog service error, using `failure` as the message for internal errors
    pub fn from_blog_error(err: BlogServiceError, failure: &str) -> Self {
        match err {
            BlogServiceError::ValidationError(msg) => Self::validation_error(msg),
            BlogServiceError::NotFound(msg) => Self::not_found(msg),
            BlogServiceError::InternalError(e) => Self::internal_error(failure, &e),
        }
    }

    /// Map a user service error, using `failure` as the message for internal errors
    pub fn from_user_error(err: UserServiceError, failure: &str) -> Self {
        match err {
            UserServiceError::ValidationError(msg) => Self::validation_error(msg),
            UserServiceError::NotFound(msg) => Self::not_found(msg),
            UserServiceError::AuthenticationError(msg) => Self::unauthorized(msg),
            UserServiceError::UserExists(msg) => Self::conflict("User already exists").with_error(msg),
            UserServiceError::InternalError(e) => Self::internal_error(failure, &e),
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::validation_error("Invalid request body").with_error(rejection.body_text())
    }
}

impl From<FormRejection> for ApiError {
    fn from(rejection: FormRejection) -> Self {
        Self::validation_error("Invalid request body").with_error(rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if self.status.is_server_error() {
            tracing::error!(
                status = %self.status,
                error = self.error.as_deref().unwrap_or_default(),
                "{}",
                self.message
            );
        } else {
            tracing::warn!(status = %self.status, "{}", self.message);
        }

        let body = ErrorEnvelope {
            success: false,
            message: &self.message,
            error: self.error.as_deref(),
        };
        (self.status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_service_errors_map_to_status() {
        let cases = [
            (
                ApiError::from_blog_error(BlogServiceError::ValidationError("x".into()), "f"),
                StatusCode::BAD_REQUEST,
            ),
            (
                ApiError::from_blog_error(BlogServiceError::NotFound("x".into()), "f"),
                StatusCode::NOT_FOUND,
            ),
            (
                ApiError::from_user_error(UserServiceError::AuthenticationError("x".into()), "f"),
                StatusCode::UNAUTHORIZED,
            ),
            (
                ApiError::from_user_error(UserServiceError::UserExists("x".into()), "f"),
                StatusCode::CONFLICT,
            ),
            (
                ApiError::from_user_error(
                    UserServiceError::InternalError(anyhow::anyhow!("db down")),
                    "f",
                ),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];

        for (error, status) in cases {
            assert_eq!(error.status, status);
        }
    }

    #[test]
    fn test_internal_error_keeps_operation_message_and_cause() {
        let cause = anyhow::anyhow!("connection refused").context("Failed to list blogs");
        let error = ApiError::from_blog_error(cause.into(), "Failed to get all blogs");

        assert_eq!(error.message, "Failed to get all blogs");
        let detail = error.error.expect("detail should be set");
        assert!(detail.contains("Failed to list blogs"));
        assert!(detail.contains("connection refused"));
    }

    #[test]
    fn test_envelope_omits_missing_error() {
        let body = ErrorEnvelope {
            success: false,
            message: "Blog not found",
            error: None,
        };
        let json = serde_json::to_value(&body).unwrap();

        assert_eq!(json, serde_json::json!({"success": false, "message": "Blog not found"}));
    }
}
