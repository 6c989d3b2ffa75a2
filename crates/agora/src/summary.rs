//! Post summaries for listing pages.

use std::sync::Arc;

use async_trait::async_trait;

use agora_core::{PostId, PostSummary, UserId};
use agora_store::SortedStore;

/// Options for [`Summarizer::summarize`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SummaryOptions {
    /// Remove markup from summary content.
    pub strip_tags: bool,
}

/// Builds short projections of posts.
#[async_trait]
pub trait Summarizer: Send + Sync {
    async fn summarize(
        &self,
        pids: &[PostId],
        uid: UserId,
        options: SummaryOptions,
    ) -> anyhow::Result<Vec<PostSummary>>;
}

/// Summarizer reading post records straight from the store.
///
/// Ids without a record are skipped.
pub struct StoreSummarizer<S: SortedStore> {
    store: Arc<S>,
}

impl<S: SortedStore> StoreSummarizer<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl<S: SortedStore> Summarizer for StoreSummarizer<S> {
    async fn summarize(
        &self,
        pids: &[PostId],
        _uid: UserId,
        options: SummaryOptions,
    ) -> anyhow::Result<Vec<PostSummary>> {
        let posts = self.store.get_posts(pids).await?;
        Ok(posts
            .iter()
            .flatten()
            .map(|post| {
                let mut summary = PostSummary::from(post);
                if options.strip_tags {
                    summary.content = strip_tags(&summary.content);
                }
                summary
            })
            .collect())
    }
}

/// Remove `<...>` markup, keeping the text between tags.
pub fn strip_tags(html: &str) -> String {
    let mut out = String::with_capacity(html.len());
    let mut in_tag = false;
    for c in html.chars() {
        match c {
            '<' => in_tag = true,
            '>' if in_tag => in_tag = false,
            _ if !in_tag => out.push(c),
            _ => {}
        }
    }
    out
}
