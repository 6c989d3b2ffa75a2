//! Error types for the post services.

use agora_perms::PermsError;
use agora_store::StoreError;
use thiserror::Error;

/// Boxed error from a collaborator implementation.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Errors that can occur during post service operations.
///
/// Every collaborator failure is propagated unchanged, tagged with the
/// collaborator it came from.
#[derive(Debug, Error)]
pub enum PostsError {
    /// Sorted collection store error.
    #[error("storage error: {0}")]
    Store(#[from] StoreError),

    /// Privilege service error.
    #[error("privilege error: {0}")]
    Privileges(#[from] PermsError),

    /// User settings lookup failed.
    #[error("settings lookup failed: {0}")]
    Settings(#[source] BoxError),

    /// Content parser failed on a post.
    #[error("content parser failed: {0}")]
    Parser(#[source] BoxError),

    /// A filter hook failed.
    #[error("hook {hook} failed: {source}")]
    Hook {
        hook: String,
        #[source]
        source: BoxError,
    },

    /// Post summarizer failed.
    #[error("summarizer failed: {0}")]
    Summarizer(#[source] BoxError),

    /// The store broke the positional contract of a batched rank query.
    #[error("store returned {got} ranks for {expected} posts")]
    RankCountMismatch { expected: usize, got: usize },

    /// Invalid service configuration.
    #[error("invalid configuration: {0}")]
    Config(String),
}

/// Result type for post service operations.
pub type Result<T> = std::result::Result<T, PostsError>;
