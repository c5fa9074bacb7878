//! Error types for mantel.

use std::time::Duration;

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

/// Application result type.
pub type AppResult<T> = Result<T, AppError>;

/// Application error type.
#[derive(Debug, Error)]
pub enum AppError {
    // === Social graph ===
    /// A user sent a friend request to themselves.
    #[error("Cannot send a friend request to yourself")]
    SelfRequest,

    /// A user tried to follow themselves.
    #[error("Cannot follow yourself")]
    SelfFollow,

    /// No friend request in a state that allows the transition.
    #[error("The friend request does not exist")]
    NoSuchRequest,

    /// Status text that is not a valid transition target.
    #[error("Invalid friendship status: {0}")]
    InvalidStatus(String),

    // === Client Errors ===
    /// A resource other than a user or post is missing.
    #[error("Not found: {0}")]
    NotFound(String),

    /// No user with this ID.
    #[error("User not found: {0}")]
    UserNotFound(i64),

    /// No post with this ID.
    #[error("Post not found: {0}")]
    PostNotFound(i64),

    /// A unique constraint was violated.
    #[error("Already exists: {0}")]
    Duplicate(String),

    /// No acting user on the request.
    #[error("Unauthorized")]
    Unauthorized,

    /// Input failed validation.
    #[error("Validation error: {0}")]
    Validation(String),

    // === Server Errors ===
    /// A query exceeded the limit it carries.
    #[error("Query timed out after {0:?}")]
    Timeout(Duration),

    /// Storage failure.
    #[error("Database error: {0}")]
    Database(String),

    /// Configuration could not be loaded.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Unexpected internal failure.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Returns the HTTP status code for this error.
    #[must_use]
    pub const fn status_code(&self) -> StatusCode {
        match self {
            // 4xx Client Errors
            Self::SelfRequest
            | Self::SelfFollow
            | Self::InvalidStatus(_)
            | Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::NoSuchRequest
            | Self::NotFound(_)
            | Self::UserNotFound(_)
            | Self::PostNotFound(_) => StatusCode::NOT_FOUND,
            Self::Duplicate(_) => StatusCode::CONFLICT,
            Self::Unauthorized => StatusCode::UNAUTHORIZED,

            // 5xx Server Errors
            Self::Timeout(_) => StatusCode::GATEWAY_TIMEOUT,
            Self::Database(_) | Self::Config(_) | Self::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Returns the error code for API responses.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::SelfRequest => "SELF_REQUEST",
            Self::SelfFollow => "SELF_FOLLOW",
            Self::NoSuchRequest => "NO_SUCH_REQUEST",
            Self::InvalidStatus(_) => "INVALID_STATUS",
            Self::NotFound(_) => "NOT_FOUND",
            Self::UserNotFound(_) => "USER_NOT_FOUND",
            Self::PostNotFound(_) => "POST_NOT_FOUND",
            Self::Duplicate(_) => "DUPLICATE",
            Self::Unauthorized => "UNAUTHORIZED",
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::Timeout(_) => "TIMEOUT",
            Self::Database(_) => "DATABASE_ERROR",
            Self::Config(_) => "CONFIG_ERROR",
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Returns whether this error should be logged at error level.
    #[must_use]
    pub fn is_server_error(&self) -> bool {
        self.status_code().is_server_error()
    }

    /// Message shown to API clients. Storage details stay in the logs.
    #[must_use]
    pub fn public_message(&self) -> String {
        match self {
            Self::Database(_) | Self::Config(_) | Self::Internal(_) => {
                "the server encountered a problem and could not process your request".to_string()
            }
            _ => self.to_string(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let code = self.error_code();

        if self.is_server_error() {
            tracing::error!(error = %self, code = code, "Server error occurred");
        } else {
            tracing::debug!(error = %self, code = code, "Client error occurred");
        }

        let body = Json(json!({
            "error": {
                "code": code,
                "message": self.public_message(),
            }
        }));

        (status, body).into_response()
    }
}

// === From implementations ===

impl From<validator::ValidationErrors> for AppError {
    fn from(err: validator::ValidationErrors) -> Self {
        Self::Validation(err.to_string())
    }
}

impl From<config::ConfigError> for AppError {
    fn from(err: config::ConfigError) -> Self {
        Self::Config(err.to_string())
    }
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        Self::Internal(err.to_string())
    }
}
