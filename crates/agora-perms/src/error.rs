//! Error types for the permissions module.

use thiserror::Error;

/// Errors that can occur during privilege operations.
#[derive(Debug, Error)]
pub enum PermsError {
    /// Grant not found.
    #[error("grant not found: {0}")]
    GrantNotFound(u64),

    /// Grant has already been revoked.
    #[error("grant has been revoked: {0}")]
    GrantRevoked(u64),

    /// Invalid grant payload.
    #[error("invalid grant: {0}")]
    InvalidGrant(String),

    /// The backing privilege source failed.
    #[error("privilege backend error: {0}")]
    Backend(String),
}

/// Result type for permission operations.
pub type Result<T> = std::result::Result<T, PermsError>;
