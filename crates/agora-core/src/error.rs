//! Error types for the Agora core primitives.

use thiserror::Error;

/// Errors produced while constructing or decoding core values.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("invalid {kind} id: {raw:?}")]
    InvalidId { kind: &'static str, raw: String },

    #[error("unknown sort mode: {0:?}")]
    UnknownSortMode(String),

    #[error("malformed post record: {0}")]
    MalformedPost(String),
}

/// Result type for core operations.
pub type Result<T> = std::result::Result<T, CoreError>;
