use thiserror::Error;

use crate::llm::LlmError;

/// Errors from repository operations (used by trait definitions in tally-core).
#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("database connection error")]
    Connection,

    #[error("query error: {0}")]
    Query(String),

    #[error("entity not found")]
    NotFound,

    #[error("conflict: {0}")]
    Conflict(String),
}

/// Errors related to expense operations.
#[derive(Debug, Error)]
pub enum ExpenseError {
    #[error("expense not found")]
    NotFound,

    #[error("invalid title: {0}")]
    InvalidTitle(String),

    #[error("invalid amount: {0}")]
    InvalidAmount(String),

    #[error("unknown category: '{0}'")]
    UnknownCategory(String),

    #[error("invalid filter: {0}")]
    InvalidFilter(String),

    #[error("storage error: {0}")]
    StorageError(String),
}

/// Errors related to accounts, credentials, and profiles.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("invalid username or password")]
    InvalidCredentials,

    #[error("invalid API key")]
    InvalidApiKey,

    #[error("username '{0}' is already taken")]
    UsernameTaken(String),

    #[error("invalid username: {0}")]
    InvalidUsername(String),

    #[error("invalid password: {0}")]
    InvalidPassword(String),

    #[error("invalid email: {0}")]
    InvalidEmail(String),

    #[error("user not found")]
    UserNotFound,

    #[error("password hashing failed")]
    HashingFailed,

    #[error("storage error: {0}")]
    StorageError(String),
}

/// Errors surfaced by the chat memory manager.
///
/// Store and completion failures are kept apart so callers can log them
/// with the right context, but the chat boundary treats both the same way.
#[derive(Debug, Error)]
pub enum ChatError {
    #[error("conversation store error: {0}")]
    Storage(#[from] RepositoryError),

    #[error("completion service error: {0}")]
    Completion(#[from] LlmError),
}
