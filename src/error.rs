use axum::{Json, http::StatusCode, response::IntoResponse};
use serde::Serialize;
use sqlx::Error as SqlxError;
use std::time::Duration;
use thiserror::Error as ThisError;
use tracing::error;

#[derive(Debug, ThisError)]
pub enum HubError {
    #[error("URL parse error: {0}")]
    UrlParse(#[from] url::ParseError),

    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Database error: {0}")]
    Database(#[from] SqlxError),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Too many attempts; try again later")]
    RateLimited,

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Operation timed out after {0:?}")]
    Timeout(Duration),

    #[error("Service unavailable: {0}")]
    Unavailable(String),

    #[error("Upstream error with status: {0}")]
    UpstreamStatus(StatusCode),

    #[error("Ractor error: {0}")]
    Actor(String),

    #[error("Password hash error: {0}")]
    PasswordHash(String),
}

impl HubError {
    /// Authentication/authorization failures. Never retried.
    pub fn is_auth(&self) -> bool {
        match self {
            HubError::Unauthorized(_) | HubError::Forbidden(_) | HubError::RateLimited => true,
            HubError::UpstreamStatus(code) => {
                *code == StatusCode::UNAUTHORIZED || *code == StatusCode::FORBIDDEN
            }
            _ => false,
        }
    }

    /// Network-class failures worth another attempt.
    pub fn is_retryable(&self) -> bool {
        if self.is_auth() {
            return false;
        }
        match self {
            HubError::Http(e) => e.is_timeout() || e.is_connect() || e.is_request(),
            HubError::Timeout(_) | HubError::Unavailable(_) => true,
            HubError::UpstreamStatus(code) => {
                code.is_server_error()
                    || *code == StatusCode::TOO_MANY_REQUESTS
                    || *code == StatusCode::REQUEST_TIMEOUT
            }
            HubError::Database(e) => matches!(e, SqlxError::PoolTimedOut | SqlxError::Io(_)),
            _ => false,
        }
    }

    pub fn not_found(what: impl std::fmt::Display, id: impl std::fmt::Display) -> Self {
        HubError::NotFound(format!("{what} `{id}`"))
    }
}

impl From<validator::ValidationErrors> for HubError {
    fn from(e: validator::ValidationErrors) -> Self {
        HubError::Validation(e.to_string())
    }
}

impl From<argon2::password_hash::Error> for HubError {
    fn from(e: argon2::password_hash::Error) -> Self {
        HubError::PasswordHash(e.to_string())
    }
}

impl IntoResponse for HubError {
    fn into_response(self) -> axum::response::Response {
        let (status, error_body) = match self {
            HubError::Database(_)
            | HubError::Json(_)
            | HubError::Actor(_)
            | HubError::PasswordHash(_)
            | HubError::UrlParse(_) => {
                error!(error = %self, "internal error while serving request");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ApiErrorBody::new("INTERNAL_ERROR", "An internal server error occurred."),
                )
            }
            HubError::Unauthorized(msg) => (
                StatusCode::UNAUTHORIZED,
                ApiErrorBody::new("UNAUTHORIZED", msg),
            ),
            HubError::Forbidden(msg) => (StatusCode::FORBIDDEN, ApiErrorBody::new("FORBIDDEN", msg)),
            HubError::RateLimited => (
                StatusCode::TOO_MANY_REQUESTS,
                ApiErrorBody::new("RATE_LIMIT", "Too many attempts; try again later."),
            ),
            HubError::Validation(msg) => (
                StatusCode::BAD_REQUEST,
                ApiErrorBody::new("VALIDATION_ERROR", msg),
            ),
            HubError::NotFound(msg) => (StatusCode::NOT_FOUND, ApiErrorBody::new("NOT_FOUND", msg)),
            HubError::Conflict(msg) => (StatusCode::CONFLICT, ApiErrorBody::new("CONFLICT", msg)),
            HubError::Timeout(_) => (
                StatusCode::GATEWAY_TIMEOUT,
                ApiErrorBody::new("TIMEOUT", "The data service did not respond in time."),
            ),
            HubError::Http(_) | HubError::Unavailable(_) => (
                StatusCode::BAD_GATEWAY,
                ApiErrorBody::new("BAD_GATEWAY", "The data service is unavailable."),
            ),
            HubError::UpstreamStatus(code) => {
                let (err_code, msg) = match code {
                    StatusCode::TOO_MANY_REQUESTS => {
                        ("RATE_LIMIT", "Data service rate limit exceeded.")
                    }
                    StatusCode::UNAUTHORIZED => {
                        ("UNAUTHORIZED", "Data service authentication failed.")
                    }
                    StatusCode::FORBIDDEN => ("FORBIDDEN", "Data service permission denied."),
                    StatusCode::NOT_FOUND => ("NOT_FOUND", "Data service resource not found."),
                    _ => ("UPSTREAM_ERROR", "A data service error occurred."),
                };
                let status = if code.is_server_error() {
                    StatusCode::BAD_GATEWAY
                } else {
                    code
                };
                (status, ApiErrorBody::new(err_code, msg))
            }
        };
        (status, Json(ApiErrorResponse { error: error_body })).into_response()
    }
}

/// Standardized API error response body
#[derive(Serialize)]
pub struct ApiErrorBody {
    pub code: String,
    pub message: String,
}

impl ApiErrorBody {
    fn new(code: &str, message: impl Into<String>) -> Self {
        Self {
            code: code.to_string(),
            message: message.into(),
        }
    }
}

#[derive(Serialize)]
pub struct ApiErrorResponse {
    pub error: ApiErrorBody,
}
