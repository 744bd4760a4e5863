//! Application error type mapping to HTTP status codes and envelope format.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use tally_types::error::{AuthError, ExpenseError};

use super::response::ApiResponse;

/// Application-level error that maps to HTTP responses.
#[derive(Debug)]
pub enum AppError {
    /// Expense-related errors.
    Expense(ExpenseError),
    /// Account and credential errors.
    Auth(AuthError),
    /// Missing or malformed credentials on the request.
    Unauthorized(String),
    /// Validation error.
    Validation(String),
}

impl From<ExpenseError> for AppError {
    fn from(e: ExpenseError) -> Self {
        AppError::Expense(e)
    }
}

impl From<AuthError> for AppError {
    fn from(e: AuthError) -> Self {
        AppError::Auth(e)
    }
}

impl AppError {
    fn parts(&self) -> (StatusCode, &'static str, String) {
        match self {
            AppError::Expense(ExpenseError::NotFound) => {
                (StatusCode::NOT_FOUND, "EXPENSE_NOT_FOUND", "Expense not found".to_string())
            }
            AppError::Expense(
                e @ (ExpenseError::InvalidTitle(_)
                | ExpenseError::InvalidAmount(_)
                | ExpenseError::UnknownCategory(_)
                | ExpenseError::InvalidFilter(_)),
            ) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", e.to_string()),
            AppError::Expense(e) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "EXPENSE_ERROR", e.to_string())
            }
            AppError::Auth(AuthError::InvalidCredentials | AuthError::InvalidApiKey) => {
                (StatusCode::UNAUTHORIZED, "UNAUTHORIZED", self.to_string())
            }
            AppError::Auth(AuthError::UsernameTaken(name)) => (
                StatusCode::CONFLICT,
                "USERNAME_TAKEN",
                format!("Username '{name}' is already taken"),
            ),
            AppError::Auth(
                e @ (AuthError::InvalidUsername(_)
                | AuthError::InvalidPassword(_)
                | AuthError::InvalidEmail(_)),
            ) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", e.to_string()),
            AppError::Auth(AuthError::UserNotFound) => {
                (StatusCode::NOT_FOUND, "USER_NOT_FOUND", "User not found".to_string())
            }
            AppError::Auth(e) => (StatusCode::INTERNAL_SERVER_ERROR, "AUTH_ERROR", e.to_string()),
            AppError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, "UNAUTHORIZED", msg.clone()),
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone()),
        }
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AppError::Expense(e) => write!(f, "{e}"),
            AppError::Auth(e) => write!(f, "{e}"),
            AppError::Unauthorized(msg) | AppError::Validation(msg) => write!(f, "{msg}"),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = self.parts();
        if status.is_server_error() {
            tracing::error!(code, error = %message, "request failed");
        }

        (status, Json(ApiResponse::error(code, &message))).into_response()
    }
}
