//! Client error types

use thiserror::Error;

/// Client error type
#[derive(Debug, Error)]
pub enum ClientError {
    /// Network-level failure (connect, timeout, TLS)
    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// Invalid response format
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// Authentication required or rejected
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Permission denied
    #[error("Permission denied: {0}")]
    Forbidden(String),

    /// Resource not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Validation error
    #[error("Validation error: {0}")]
    Validation(String),

    /// Server-side failure
    #[error("Internal error: {0}")]
    Internal(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Operation requires a logged-in session
    #[error("Not logged in")]
    NotLoggedIn,
}

/// Result type for client operations
pub type ClientResult<T> = Result<T, ClientError>;
