// crates/backend-lib/src/error.rs

//! Central error type + Axum integration.
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

/// Application error types with error codes and context
#[derive(Error, Debug)]
pub enum AppError {
    #[error("User already exists. Please login.")]
    DuplicateAccount,

    #[error("Invalid email or password.")]
    InvalidCredentials,

    #[error("Account not found")]
    AccountNotFound,

    #[error("Authentication error: {0}")]
    Auth(String),

    #[error("Session required")]
    SessionRequired,

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Mail dispatch failed: {0}")]
    Mail(String),

    #[error("Rate limit exceeded")]
    RateLimitExceeded,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::DuplicateAccount => StatusCode::CONFLICT,
            AppError::InvalidCredentials
            | AppError::Auth(_)
            | AppError::SessionRequired => StatusCode::UNAUTHORIZED,
            AppError::AccountNotFound => StatusCode::NOT_FOUND,
            AppError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            AppError::Mail(_) => StatusCode::BAD_GATEWAY,
            AppError::RateLimitExceeded => StatusCode::TOO_MANY_REQUESTS,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Get the error code for this error
    pub fn error_code(&self) -> &'static str {
        match self {
            AppError::DuplicateAccount => "ACCT_001",
            AppError::AccountNotFound => "ACCT_002",
            AppError::InvalidCredentials => "AUTH_001",
            AppError::SessionRequired => "AUTH_002",
            AppError::Auth(_) => "AUTH_003",
            AppError::InvalidInput(_) => "VAL_001",
            AppError::Mail(_) => "MAIL_001",
            AppError::RateLimitExceeded => "RATE_001",
            AppError::Io(_) => "IO_001",
            AppError::Json(_) => "JSON_001",
            AppError::Internal(_) => "INT_001",
        }
    }

    /// Get a sanitized message suitable for production use
    pub fn sanitized_message(&self) -> String {
        match self {
            // Account existence leaks are part of the original contract for
            // registration and password reset, so these keep their wording.
            AppError::DuplicateAccount => "User already exists. Please login.".to_string(),
            AppError::AccountNotFound => "Email not found.".to_string(),
            // One generic message for unknown email and wrong password alike.
            AppError::InvalidCredentials => "Invalid email or password.".to_string(),
            AppError::SessionRequired | AppError::Auth(_) => {
                "Authentication required".to_string()
            },
            AppError::InvalidInput(_) => "Invalid input provided".to_string(),
            AppError::Mail(_) => "Failed to send email. Try again later.".to_string(),
            AppError::RateLimitExceeded => {
                "Rate limit exceeded, please try again later".to_string()
            },
            AppError::Io(_) | AppError::Internal(_) => {
                "An internal server error occurred".to_string()
            },
            AppError::Json(_) => "Invalid request format".to_string(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let error_code = self.error_code();

        // Use detailed messages in development, sanitized in production
        let message = if cfg!(debug_assertions) {
            self.to_string()
        } else {
            self.sanitized_message()
        };

        let body = serde_json::json!({
            "error": {
                "code": error_code,
                "message": message,
            }
        });

        (status, axum::Json(body)).into_response()
    }
}

impl From<String> for AppError {
    fn from(msg: String) -> Self {
        AppError::Internal(msg)
    }
}

impl From<&str> for AppError {
    fn from(msg: &str) -> Self {
        AppError::Internal(msg.to_string())
    }
}
