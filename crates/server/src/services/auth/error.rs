//! Staff authentication errors.

use thiserror::Error;

use crate::db::RepositoryError;

/// Errors raised by login, registration, profile and token handling.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Wrong password, or no account for the email. Never says which.
    #[error("invalid email or password")]
    InvalidCredentials,

    /// The account behind a valid token no longer exists.
    #[error("account not found")]
    UserNotFound,

    /// Email already registered.
    #[error("an account with this email already exists")]
    UserAlreadyExists,

    #[error("invalid email: {0}")]
    InvalidEmail(#[from] academy_core::EmailError),

    /// Password outside the length limits.
    #[error("{0}")]
    WeakPassword(String),

    /// Display name missing or too long.
    #[error("{0}")]
    InvalidName(String),

    /// Bearer token missing, malformed, expired or badly signed.
    #[error("invalid token")]
    InvalidToken(#[source] jsonwebtoken::errors::Error),

    #[error("token signing failed")]
    TokenSigning(#[source] jsonwebtoken::errors::Error),

    #[error("argon2 hashing failed")]
    PasswordHash,

    #[error("database error: {0}")]
    Repository(#[from] RepositoryError),
}
