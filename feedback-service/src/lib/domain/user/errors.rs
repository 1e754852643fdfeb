use thiserror::Error;

use crate::domain::user::models::UserId;

/// Error for UserId parsing failures
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum UserIdError {
    #[error("Invalid UUID format: {0}")]
    InvalidFormat(String),
}

/// Error for EmailAddress validation failures
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum EmailError {
    #[error("Invalid email format: {0}")]
    InvalidFormat(String),
}

/// Error for passwords a client submits
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum PasswordPolicyError {
    #[error("Password must not be empty")]
    Empty,
}

/// Top-level error for all user-related operations
#[derive(Debug, Clone, Error)]
pub enum UserError {
    // Value object validation errors (automatically converted via #[from])
    #[error("Invalid user ID: {0}")]
    InvalidUserId(#[from] UserIdError),

    #[error("Invalid email: {0}")]
    InvalidEmail(#[from] EmailError),

    #[error("Invalid password: {0}")]
    InvalidPassword(#[from] PasswordPolicyError),

    // Domain-level errors
    #[error("User not found: {0}")]
    NotFound(String),

    #[error("Email already exists: {0}")]
    EmailAlreadyExists(String),

    #[error("Invalid credentials")]
    InvalidCredentials,

    // Infrastructure errors
    #[error("Password hashing failed: {0}")]
    Hashing(String),

    #[error("Token issuing failed: {0}")]
    TokenIssue(String),

    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Store call timed out: {0}")]
    Timeout(String),
}

/// Failure to authenticate an inbound request.
///
/// Every variant but `Store` is reported to the client as the same
/// unauthorized response; the variant only feeds server-side logs.
#[derive(Debug, Clone, Error)]
pub enum AuthGateError {
    #[error("Missing or malformed Authorization header")]
    MissingOrMalformedHeader,

    #[error("Invalid token: {0}")]
    InvalidToken(#[from] auth::JwtError),

    #[error("Token subject no longer exists: {0}")]
    UserNotFound(UserId),

    #[error("Credential store failure: {0}")]
    Store(UserError),
}
