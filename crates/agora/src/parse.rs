//! Content processing applied to each materialized post.

use async_trait::async_trait;

use agora_core::PostRecord;

/// Turns a stored post into its display-ready form.
///
/// Implementations are pure per-post transforms; the materializer runs them
/// concurrently and reassembles results in input order.
#[async_trait]
pub trait ContentParser: Send + Sync {
    async fn parse(&self, post: PostRecord) -> anyhow::Result<PostRecord>;
}

/// Leaves content as stored.
#[derive(Debug, Clone, Copy, Default)]
pub struct PassthroughParser;

#[async_trait]
impl ContentParser for PassthroughParser {
    async fn parse(&self, post: PostRecord) -> anyhow::Result<PostRecord> {
        Ok(post)
    }
}
